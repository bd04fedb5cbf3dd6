// ==========================================
// 分配报表重算工具 - 编辑界面契约
// ==========================================
// 职责: 定义月度表编辑界面的输入/输出契约
// 红线: 仅 Rebalancing 列可编辑，其余列只读；行数与列结构不变
// ==========================================
// 实现者: ScriptedEditSurface（固定编辑列表）
//         app::console::ConsoleEditSurface（终端交互）
// ==========================================

use crate::domain::allocation::columns;
use crate::domain::table::Table;
use crate::domain::types::CellValue;
use crate::engine::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 单条 Rebalancing 编辑（row 为 0 起始的数据行号）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RebalancingEdit {
    pub row: usize,
    pub value: f64,
}

impl RebalancingEdit {
    pub fn new(row: usize, value: f64) -> Self {
        Self { row, value }
    }
}

// ==========================================
// EditSurface Trait
// ==========================================
pub trait EditSurface {
    /// 展示月度表并返回编辑后的表
    ///
    /// # 返回
    /// - Ok(Table): 与输入同结构、同行数，仅 Rebalancing 可能变化
    /// - Err: 界面读写失败 / 编辑越界
    fn edit(&mut self, monthly: &Table) -> EngineResult<Table>;
}

/// 应用编辑（唯一的月度表修改入口）
///
/// 负数、0 均为合法输入；仅拒绝 NaN/Inf
pub fn apply_rebalancing_edits(monthly: &Table, edits: &[RebalancingEdit]) -> EngineResult<Table> {
    let col = monthly.require_column(columns::REBALANCING)?;
    let mut edited = monthly.clone();

    for edit in edits {
        if edit.row >= edited.row_count() {
            return Err(EngineError::RowOutOfRange {
                row: edit.row,
                row_count: edited.row_count(),
            });
        }
        if !edit.value.is_finite() {
            return Err(EngineError::InvalidEditValue {
                row: edit.row,
                value: edit.value,
            });
        }
        debug!(row = edit.row, value = edit.value, "应用 Rebalancing 编辑");
        edited.set_cell(edit.row, col, CellValue::Number(edit.value));
    }

    edited.refresh_column_type(col);
    Ok(edited)
}

/// 校验编辑契约：列结构、行数不变，仅 Rebalancing 单元格可变
pub fn verify_edit_contract(before: &Table, after: &Table) -> EngineResult<()> {
    if before.column_names() != after.column_names() {
        return Err(EngineError::EditContractViolation(format!(
            "列结构被修改: {:?} → {:?}",
            before.column_names(),
            after.column_names()
        )));
    }
    if before.row_count() != after.row_count() {
        return Err(EngineError::EditContractViolation(format!(
            "行数被修改: {} → {}",
            before.row_count(),
            after.row_count()
        )));
    }

    let editable = before.require_column(columns::REBALANCING)?;
    for (row, (old, new)) in before.rows().iter().zip(after.rows()).enumerate() {
        for (col, (a, b)) in old.iter().zip(new).enumerate() {
            if col != editable && a != b {
                return Err(EngineError::EditContractViolation(format!(
                    "只读列 {} 第 {} 行被修改",
                    before.columns()[col].name,
                    row
                )));
            }
        }
    }
    Ok(())
}

// ==========================================
// ScriptedEditSurface - 固定编辑列表
// ==========================================
// 用途: 非交互运行、测试
#[derive(Debug, Clone, Default)]
pub struct ScriptedEditSurface {
    edits: Vec<RebalancingEdit>,
}

impl ScriptedEditSurface {
    pub fn new(edits: Vec<RebalancingEdit>) -> Self {
        Self { edits }
    }
}

impl EditSurface for ScriptedEditSurface {
    fn edit(&mut self, monthly: &Table) -> EngineResult<Table> {
        apply_rebalancing_edits(monthly, &self.edits)
    }
}
