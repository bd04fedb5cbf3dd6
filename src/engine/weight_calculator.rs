// ==========================================
// 分配报表重算工具 - 权重计算引擎
// ==========================================
// 职责: Rebalanced = Rebalancing + Neptune_Allocation
//       country_weights = Rebalanced / 组内合计
// 分组: (SKU, PL, Plant, Market_level, Month)
// 红线: 组内合计为 0 时权重置 0，不允许 NaN/Inf 流入下游
// ==========================================
// 输入: 编辑后的月度表
// 输出: 同一张表 + 两个派生列（行数、行序不变）
// ==========================================

use crate::domain::allocation::{columns, GroupKey, MonthlyColumns, MonthlyRecord, WeightSummary};
use crate::domain::table::Table;
use crate::domain::types::{CellValue, ColumnType};
use crate::engine::error::EngineResult;
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

/// 权重计算结果
#[derive(Debug, Clone, PartialEq)]
pub struct WeightOutcome {
    pub table: Table,
    pub summary: WeightSummary,
}

// ==========================================
// WeightCalculator - 权重计算引擎
// ==========================================
#[derive(Debug, Default)]
pub struct WeightCalculator;

impl WeightCalculator {
    pub fn new() -> Self {
        Self
    }

    /// 计算 Rebalanced 与 country_weights
    ///
    /// # 规则
    /// 1. 逐行相加；任一操作数缺失 → Rebalanced 缺失
    /// 2. 按五元组分组，组内归一化
    ///
    /// # 边界处理
    /// - 组内合计为 0 → 组内所有权重为 0
    /// - 分组键缺失（空键保护）→ 权重为 0
    /// - Rebalanced 缺失 → 不计入组合计，权重为 0
    ///
    /// # 错误
    /// - 必需列缺失 / 数值列含文本 → 直接返回错误，不做强制转换
    #[instrument(skip(self, monthly), fields(rows = monthly.row_count()))]
    pub fn calculate(&self, monthly: &Table) -> EngineResult<WeightOutcome> {
        let cols = MonthlyColumns::resolve(monthly)?;
        let records = (0..monthly.row_count())
            .map(|row| cols.read(monthly, row))
            .collect::<Result<Vec<MonthlyRecord>, _>>()?;

        // 1. 逐行相加
        let rebalanced: Vec<Option<f64>> = records.iter().map(MonthlyRecord::rebalanced).collect();
        let keys: Vec<Option<GroupKey>> = records.iter().map(MonthlyRecord::group_key).collect();

        // 2. 组内合计
        let group_totals = group_totals(&keys, &rebalanced);

        let mut summary = WeightSummary {
            rows: records.len(),
            groups: group_totals.len(),
            ..WeightSummary::default()
        };

        for (key, total) in &group_totals {
            if *total == 0.0 {
                summary.zero_sum_groups += 1;
                warn!(group = ?key, "组内 Rebalanced 合计为 0，组内权重全部置 0");
            }
        }

        // 3. 归一化
        let mut weights = Vec::with_capacity(records.len());
        for (idx, (key, value)) in keys.iter().zip(&rebalanced).enumerate() {
            let weight = match (key, value) {
                (None, _) => {
                    summary.null_key_rows += 1;
                    warn!(row = idx, "分组键缺失，权重置 0");
                    0.0
                }
                (Some(_), None) => {
                    summary.missing_value_rows += 1;
                    debug!(row = idx, "Rebalanced 缺失，权重置 0");
                    0.0
                }
                (Some(key), Some(value)) => {
                    let total = group_totals.get(key).copied().unwrap_or(0.0);
                    normalize(*value, total)
                }
            };
            weights.push(weight);
        }

        // 4. 追加派生列
        let mut table = monthly.clone();
        table.append_or_replace_column(
            columns::REBALANCED,
            ColumnType::Numeric,
            rebalanced.into_iter().map(CellValue::from_option).collect(),
        )?;
        table.append_or_replace_column(
            columns::COUNTRY_WEIGHTS,
            ColumnType::Numeric,
            weights.into_iter().map(CellValue::Number).collect(),
        )?;

        info!(
            rows = summary.rows,
            groups = summary.groups,
            zero_sum_groups = summary.zero_sum_groups,
            null_key_rows = summary.null_key_rows,
            "权重计算完成"
        );

        Ok(WeightOutcome { table, summary })
    }
}

/// 组内 Rebalanced 合计（缺失值不计入）
fn group_totals(keys: &[Option<GroupKey>], rebalanced: &[Option<f64>]) -> HashMap<GroupKey, f64> {
    let mut totals: HashMap<GroupKey, f64> = HashMap::new();
    for (key, value) in keys.iter().zip(rebalanced) {
        if let Some(key) = key {
            *totals.entry(key.clone()).or_insert(0.0) += value.unwrap_or(0.0);
        }
    }
    totals
}

/// 单行权重；合计为 0 或结果非有限值时取 0
fn normalize(value: f64, total: f64) -> f64 {
    if total == 0.0 {
        return 0.0;
    }
    let weight = value / total;
    if weight.is_finite() {
        weight
    } else {
        0.0
    }
}
