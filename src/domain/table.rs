// ==========================================
// 分配报表重算工具 - 内存表模型
// ==========================================
// 职责: 带显式列类型的二维表（加载层输出 / 引擎层输入输出 / 导出层输入）
// 红线: 数值运算前必须通过类型检查，类型不符立即失败
// ==========================================

use crate::domain::types::{CellValue, ColumnType};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 表结构错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    #[error("表 {table} 缺少必需列: {column}")]
    MissingColumn { table: String, column: String },

    #[error("类型不匹配 (表 {table}, 行 {row}, 列 {column}): 期望数值，实际 {found}")]
    TypeMismatch {
        table: String,
        row: usize,
        column: String,
        found: String,
    },

    #[error("行长度不一致 (表 {table}, 行 {row}): 期望 {expected} 列，实际 {actual} 列")]
    RowWidthMismatch {
        table: String,
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("列长度不一致 (表 {table}, 列 {column}): 期望 {expected} 行，实际 {actual} 行")]
    ColumnLengthMismatch {
        table: String,
        column: String,
        expected: usize,
        actual: usize,
    },
}

/// 列定义
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub dtype: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, dtype: ColumnType) -> Self {
        Self {
            name: name.into(),
            dtype,
        }
    }
}

// ==========================================
// Table - 内存表
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    columns: Vec<Column>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// 追加一行（长度必须与列数一致）
    pub fn push_row(&mut self, row: Vec<CellValue>) -> Result<(), TableError> {
        if row.len() != self.columns.len() {
            return Err(TableError::RowWidthMismatch {
                table: self.name.clone(),
                row: self.rows.len(),
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// 查找必需列，缺失时报错
    pub fn require_column(&self, name: &str) -> Result<usize, TableError> {
        self.column_index(name)
            .ok_or_else(|| TableError::MissingColumn {
                table: self.name.clone(),
                column: name.to_string(),
            })
    }

    /// 校验一组必需列均存在
    pub fn require_columns(&self, names: &[&str]) -> Result<(), TableError> {
        for name in names {
            self.require_column(name)?;
        }
        Ok(())
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// 读取数值单元格
    ///
    /// - Number → Some(v)
    /// - Empty → None
    /// - Text → TypeMismatch
    pub fn numeric_at(&self, row: usize, col: usize) -> Result<Option<f64>, TableError> {
        match self.cell(row, col) {
            Some(CellValue::Number(v)) => Ok(Some(*v)),
            Some(CellValue::Empty) | None => Ok(None),
            Some(other) => Err(TableError::TypeMismatch {
                table: self.name.clone(),
                row,
                column: self.columns[col].name.clone(),
                found: format!("{} {:?}", other.kind(), other.to_string()),
            }),
        }
    }

    /// 整列类型检查（列类型必须为 Numeric）
    pub fn require_numeric_column(&self, name: &str) -> Result<usize, TableError> {
        let col = self.require_column(name)?;
        if self.columns[col].dtype != ColumnType::Numeric {
            // 定位第一个非数值单元格，便于用户排查
            let (row, found) = self
                .rows
                .iter()
                .enumerate()
                .find_map(|(i, r)| match &r[col] {
                    CellValue::Text(s) => Some((i, format!("text {:?}", s))),
                    _ => None,
                })
                .unwrap_or((0, self.columns[col].dtype.to_string()));
            return Err(TableError::TypeMismatch {
                table: self.name.clone(),
                row,
                column: name.to_string(),
                found,
            });
        }
        Ok(col)
    }

    /// 覆写单元格（仅供编辑层使用）
    pub(crate) fn set_cell(&mut self, row: usize, col: usize, value: CellValue) {
        if let Some(cell) = self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell = value;
        }
    }

    /// 按当前单元格重新推断列类型（编辑后调用）
    pub(crate) fn refresh_column_type(&mut self, col: usize) {
        let has_text = self
            .rows
            .iter()
            .any(|r| matches!(r.get(col), Some(CellValue::Text(_))));
        if let Some(column) = self.columns.get_mut(col) {
            column.dtype = if has_text {
                ColumnType::Text
            } else {
                ColumnType::Numeric
            };
        }
    }

    /// 追加派生列；同名列已存在时原位覆写
    pub fn append_or_replace_column(
        &mut self,
        name: &str,
        dtype: ColumnType,
        values: Vec<CellValue>,
    ) -> Result<(), TableError> {
        if values.len() != self.rows.len() {
            return Err(TableError::ColumnLengthMismatch {
                table: self.name.clone(),
                column: name.to_string(),
                expected: self.rows.len(),
                actual: values.len(),
            });
        }

        match self.column_index(name) {
            Some(col) => {
                self.columns[col].dtype = dtype;
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[col] = value;
                }
            }
            None => {
                self.columns.push(Column::new(name, dtype));
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(())
    }
}
