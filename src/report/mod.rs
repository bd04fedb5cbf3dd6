// ==========================================
// 分配报表重算工具 - 报表展示/导出层
// ==========================================
// 职责: 只读表格渲染 + xlsx 下载产物
// ==========================================

pub mod error;
pub mod exporter;
pub mod renderer;

pub use error::{ExportError, ExportResult};
pub use exporter::{
    build_weekly_artifact, export_workbook, ExportArtifact, EXPORT_FILE_NAME, WEEKLY_SHEET_NAME,
    XLSX_MIME_TYPE,
};
pub use renderer::{render_table, TableView};
