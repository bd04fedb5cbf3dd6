// ==========================================
// 分配报表重算工具 - 文件解析器实现
// ==========================================
// 职责: 文件读取与解析 → 原始表格（表头 + 单元格）
// 支持: Excel (.xlsx/.xls) / CSV (.csv) / 内存 xlsx 字节
// ==========================================

use crate::domain::types::CellValue;
use crate::importer::error::{ImportError, ImportResult};
use calamine::{
    open_workbook_auto, open_workbook_from_rs, Data, ExcelDateTime, Range, Reader, Xlsx,
};
use chrono::NaiveTime;
use csv::ReaderBuilder;
use std::fs::File;
use std::io::Cursor;
use std::path::Path;

// ==========================================
// RawSheet - 原始表格
// ==========================================
// 列顺序与源文件一致；每行长度与表头一致
#[derive(Debug, Clone, PartialEq)]
pub struct RawSheet {
    pub sheet_name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

/// 文件解析接口
pub trait FileParser: Send + Sync {
    /// 解析文件为原始表格
    ///
    /// # 返回
    /// - Ok(RawSheet): 表头 + 数据行（已跳过完全空白的行）
    /// - Err: 文件不存在、格式错误
    fn parse_to_raw_sheet(&self, file_path: &Path) -> ImportResult<RawSheet>;
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_to_raw_sheet(&self, file_path: &Path) -> ImportResult<RawSheet> {
        let path = file_path;

        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        // 检查扩展名（不区分大小写）
        if let Some(ext) = path.extension() {
            let ext = ext.to_string_lossy();
            if !ext.eq_ignore_ascii_case("csv") {
                return Err(ImportError::UnsupportedFormat(ext.to_string()));
            }
        }

        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let headers = normalize_headers(reader.headers()?.iter().map(|h| h.to_string()));

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let mut row: Vec<CellValue> = record.iter().map(parse_csv_cell).collect();
            row.resize(headers.len(), CellValue::Empty);

            // 跳过完全空白的行
            if row.iter().all(CellValue::is_empty) {
                continue;
            }
            rows.push(row);
        }

        let sheet_name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(RawSheet {
            sheet_name,
            headers,
            rows,
        })
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_to_raw_sheet(&self, file_path: &Path) -> ImportResult<RawSheet> {
        let path = file_path;

        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        // 检查扩展名（不区分大小写）
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !ext.eq_ignore_ascii_case("xlsx") && !ext.eq_ignore_ascii_case("xls") {
            return Err(ImportError::UnsupportedFormat(ext.to_string()));
        }

        let mut workbook = open_workbook_auto(path)?;

        // 读取第一个 sheet
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;

        let range = workbook.worksheet_range(&sheet_name)?;
        range_to_raw_sheet(sheet_name, &range)
    }
}

impl ExcelParser {
    /// 解析内存中的 xlsx 字节（导出文件回读）
    pub fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<RawSheet> {
        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes.to_vec()))?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;

        let range = workbook.worksheet_range(&sheet_name)?;
        range_to_raw_sheet(sheet_name, &range)
    }
}

/// 第一行为表头，其余为数据行
fn range_to_raw_sheet(sheet_name: String, range: &Range<Data>) -> ImportResult<RawSheet> {
    let mut rows_iter = range.rows();
    let header_row = rows_iter
        .next()
        .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无数据行".to_string()))?;

    let headers = normalize_headers(header_row.iter().map(|cell| cell.to_string()));

    let mut rows = Vec::new();
    for data_row in rows_iter {
        let mut row: Vec<CellValue> = data_row.iter().map(convert_excel_cell).collect();
        row.resize(headers.len(), CellValue::Empty);

        // 跳过完全空白的行
        if row.iter().all(CellValue::is_empty) {
            continue;
        }
        rows.push(row);
    }

    Ok(RawSheet {
        sheet_name,
        headers,
        rows,
    })
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<RawSheet> {
        let path = file_path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => CsvParser.parse_to_raw_sheet(path),
            "xlsx" | "xls" => ExcelParser.parse_to_raw_sheet(path),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}

// ==========================================
// 单元格转换
// ==========================================

/// 表头去空白；空表头按列号命名
fn normalize_headers(raw: impl Iterator<Item = String>) -> Vec<String> {
    raw.enumerate()
        .map(|(idx, h)| {
            let trimmed = h.trim();
            if trimmed.is_empty() {
                format!("Unnamed: {}", idx)
            } else {
                trimmed.to_string()
            }
        })
        .collect()
}

fn parse_csv_cell(value: &str) -> CellValue {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return CellValue::Empty;
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => CellValue::Number(v),
        _ => CellValue::Text(trimmed.to_string()),
    }
}

fn convert_excel_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(v) => CellValue::Number(*v as f64),
        Data::Float(v) => CellValue::Number(*v),
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(trimmed.to_string())
            }
        }
        Data::Bool(b) => CellValue::Text(b.to_string().to_uppercase()),
        Data::DateTime(dt) => convert_excel_datetime(dt),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => {
            tracing::debug!(error = ?e, "Excel 错误单元格按缺失值处理");
            CellValue::Empty
        }
        Data::Empty => CellValue::Empty,
    }
}

/// Excel 日期序列号上限（9999-12-31）
const MAX_EXCEL_SERIAL: f64 = 2_958_466.0;

/// 日期单元格 → YYYY-MM-DD（含时刻时为 YYYY-MM-DD HH:MM:SS）
///
/// 1900/1904 日期系统由 calamine 处理；时长单元格与超出日期范围的序列号保留为数值
fn convert_excel_datetime(dt: &ExcelDateTime) -> CellValue {
    let serial = dt.as_f64();
    if dt.is_duration() || !(0.0..MAX_EXCEL_SERIAL).contains(&serial) {
        return CellValue::Number(serial);
    }
    match dt.as_datetime() {
        Some(value) if value.time() == NaiveTime::MIN => {
            CellValue::Text(value.format("%Y-%m-%d").to_string())
        }
        Some(value) => CellValue::Text(value.format("%Y-%m-%d %H:%M:%S").to_string()),
        None => CellValue::Number(serial),
    }
}
