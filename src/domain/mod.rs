// ==========================================
// 分配报表重算工具 - 领域模型层
// ==========================================
// 职责: 定义表模型、单元格类型、分配记录视图
// 红线: 不含文件读写逻辑,不含引擎逻辑
// ==========================================

pub mod allocation;
pub mod table;
pub mod types;

// 重导出核心类型
pub use allocation::{
    columns, GroupKey, MonthlyColumns, MonthlyRecord, PropagationSummary, WeeklyColumns,
    WeeklyRecord, WeightSummary,
};
pub use table::{Column, Table, TableError};
pub use types::{CellValue, ColumnType};
