// ==========================================
// 分配报表重算工具 - 报表加载器
// ==========================================
// 职责: 原始表格 → 带列类型的内存表 + 必需列检查
// 流程: 文件解析 → 列类型推断 → 结构校验
// ==========================================

use crate::domain::allocation::columns;
use crate::domain::table::{Column, Table};
use crate::domain::types::{CellValue, ColumnType};
use crate::importer::error::ImportResult;
use crate::importer::file_parser::{ExcelParser, RawSheet, UniversalFileParser};
use std::path::Path;
use tracing::{info, instrument};

/// 已加载的两张输入报表
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedReports {
    pub monthly: Table,
    pub weekly: Table,
}

// ==========================================
// ReportLoader - 报表加载器
// ==========================================
pub struct ReportLoader {
    parser: UniversalFileParser,
}

impl Default for ReportLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportLoader {
    pub fn new() -> Self {
        Self {
            parser: UniversalFileParser,
        }
    }

    /// 加载单张表（不做必需列检查）
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn load_table<P: AsRef<Path>>(&self, path: P, name: &str) -> ImportResult<Table> {
        let sheet = self.parser.parse(path.as_ref())?;
        let table = build_table(name, sheet)?;
        info!(
            table = name,
            rows = table.row_count(),
            columns = table.column_count(),
            "报表加载完成"
        );
        Ok(table)
    }

    /// 加载月度 + 周度报表，并校验必需列
    ///
    /// 任一文件缺失或损坏即失败（致命错误，不做恢复）
    pub fn load_reports<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        monthly_path: P,
        weekly_path: Q,
    ) -> ImportResult<LoadedReports> {
        let monthly = self.load_table(monthly_path, "monthly")?;
        monthly.require_columns(&columns::MONTHLY_REQUIRED)?;

        let weekly = self.load_table(weekly_path, "weekly")?;
        weekly.require_columns(&columns::WEEKLY_REQUIRED)?;

        Ok(LoadedReports { monthly, weekly })
    }
}

/// 从内存 xlsx 字节加载表（导出文件回读）
pub fn load_table_from_bytes(bytes: &[u8], name: &str) -> ImportResult<Table> {
    let sheet = ExcelParser.parse_bytes(bytes)?;
    build_table(name, sheet)
}

/// 原始表格 → 内存表（推断列类型）
pub fn build_table(name: &str, sheet: RawSheet) -> ImportResult<Table> {
    let dtypes: Vec<ColumnType> = (0..sheet.headers.len())
        .map(|col| infer_column_type(sheet.rows.iter().map(|row| &row[col])))
        .collect();

    let columns = sheet
        .headers
        .into_iter()
        .zip(dtypes)
        .map(|(header, dtype)| Column::new(header, dtype))
        .collect();

    let mut table = Table::new(name, columns);
    for row in sheet.rows {
        table.push_row(row)?;
    }
    Ok(table)
}

/// 所有非空单元格均为数值 → Numeric（全空列视为 Numeric）
fn infer_column_type<'a>(mut cells: impl Iterator<Item = &'a CellValue>) -> ColumnType {
    if cells.any(|c| matches!(c, CellValue::Text(_))) {
        ColumnType::Text
    } else {
        ColumnType::Numeric
    }
}
