// ==========================================
// 分配报表重算工具 - 导入层
// ==========================================
// 职责: 外部报表导入,生成带列类型的内存表
// 支持: Excel, CSV
// ==========================================

// 模块声明
pub mod error;
pub mod file_parser;
pub mod report_loader;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawSheet, UniversalFileParser};
pub use report_loader::{build_table, load_table_from_bytes, LoadedReports, ReportLoader};
