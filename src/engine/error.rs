// ==========================================
// 分配报表重算工具 - 引擎层错误类型
// ==========================================

use crate::domain::table::TableError;
use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// 列缺失 / 类型不匹配（重算步骤直接中止）
    #[error(transparent)]
    Table(#[from] TableError),

    #[error("编辑行号越界: row={row}, 月度表共 {row_count} 行")]
    RowOutOfRange { row: usize, row_count: usize },

    #[error("编辑值无效 (行 {row}): {value}")]
    InvalidEditValue { row: usize, value: f64 },

    #[error("编辑契约违反: {0}")]
    EditContractViolation(String),

    #[error("编辑界面失败: {0}")]
    EditSurfaceFailure(String),
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
