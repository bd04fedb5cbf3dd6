// ==========================================
// 分配报表重算工具 - Excel 导出器
// ==========================================
// 职责: 内存表 → xlsx 字节（不落盘）→ 下载产物
// 格式: 单工作表，首行为加粗表头，缺失值为空白单元格
// ==========================================

use crate::domain::table::Table;
use crate::domain::types::CellValue;
use crate::report::error::{ExportError, ExportResult};
use rust_xlsxwriter::{Format, Workbook};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// 下载文件名
pub const EXPORT_FILE_NAME: &str = "updated_weekly_report.xlsx";

/// xlsx MIME 类型
pub const XLSX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// 导出工作表名
pub const WEEKLY_SHEET_NAME: &str = "Weekly_Report";

// ==========================================
// ExportArtifact - 下载产物
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime_type: String,
    #[serde(skip_serializing)]
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// 写出到目录（终端模式下的"下载"动作）
    pub fn write_to<P: AsRef<Path>>(&self, dir: P) -> ExportResult<PathBuf> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        fs::write(&path, &self.bytes)?;
        info!(path = %path.display(), bytes = self.bytes.len(), "报表已写出");
        Ok(path)
    }
}

/// 内存表 → xlsx 字节
#[instrument(skip(table), fields(rows = table.row_count(), columns = table.column_count()))]
pub fn export_workbook(table: &Table, sheet_name: &str) -> ExportResult<Vec<u8>> {
    // xlsx 行/列上限
    if table.row_count() + 1 > 1_048_576 || table.column_count() > 16_384 {
        return Err(ExportError::SheetLimitExceeded(format!(
            "{} 行 × {} 列",
            table.row_count(),
            table.column_count()
        )));
    }

    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    for (col, column) in table.columns().iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, &column.name, &header_format)?;
    }

    for (row_idx, row) in table.rows().iter().enumerate() {
        let excel_row = (row_idx + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            match cell {
                CellValue::Number(v) => {
                    worksheet.write_number(excel_row, col as u16, *v)?;
                }
                CellValue::Text(s) => {
                    worksheet.write_string(excel_row, col as u16, s)?;
                }
                // 缺失值保持空白
                CellValue::Empty => {}
            }
        }
    }

    let buffer = workbook.save_to_buffer()?;
    Ok(buffer)
}

/// 生成周度报表下载产物
pub fn build_weekly_artifact(table: &Table, sheet_name: &str) -> ExportResult<ExportArtifact> {
    let bytes = export_workbook(table, sheet_name)?;
    Ok(ExportArtifact {
        file_name: EXPORT_FILE_NAME.to_string(),
        mime_type: XLSX_MIME_TYPE.to_string(),
        bytes,
    })
}
