// ==========================================
// 分配报表重算工具 - 领域类型定义
// ==========================================
// 职责: 单元格值 / 列类型
// 红线: 缺失值统一为 CellValue::Empty，不允许 NaN/Inf 流入下游
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 列类型 (Column Type)
// ==========================================
// 加载时推断: 所有非空单元格均为数值 → Numeric，否则 → Text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnType {
    Numeric,
    Text,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Numeric => write!(f, "NUMERIC"),
            ColumnType::Text => write!(f, "TEXT"),
        }
    }
}

// ==========================================
// 单元格值 (Cell Value)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Empty, // 缺失值（屏幕/导出均为空白单元格）
}

impl CellValue {
    /// 由计算结果构造单元格（None → Empty）
    pub fn from_option(value: Option<f64>) -> Self {
        match value {
            Some(v) => CellValue::Number(v),
            None => CellValue::Empty,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// 渲染为分组/关联键
    ///
    /// - Text: 去除首尾空白，空白串视为缺失
    /// - Number: 最短表示（3.0 → "3"）
    /// - Empty: None（空键保护）
    pub fn key_string(&self) -> Option<String> {
        match self {
            CellValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            CellValue::Number(v) => Some(format!("{}", v)),
            CellValue::Empty => None,
        }
    }

    /// 类型描述（用于错误信息）
    pub fn kind(&self) -> &'static str {
        match self {
            CellValue::Number(_) => "number",
            CellValue::Text(_) => "text",
            CellValue::Empty => "empty",
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(v) => write!(f, "{}", format_number(*v)),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Empty => Ok(()),
        }
    }
}

/// 数值显示格式：最多 6 位小数，去掉多余的 0
pub fn format_number(value: f64) -> String {
    let text = format!("{:.6}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}
