// ==========================================
// 分配报表重算工具 - 表格渲染器
// ==========================================
// 职责: 内存表 → 定宽文本网格（只读展示）
// 格式: 表头 / 分隔线 / 数据行；数值最多 6 位小数；缺失值留空
// ==========================================

use crate::domain::table::Table;
use crate::domain::types::CellValue;
use std::fmt;

/// 单个格子
struct BoxFmt {
    width: usize,
    text: String,
    right_align: bool,
}

impl BoxFmt {
    fn label(text: &str) -> Self {
        Self {
            width: text.chars().count(),
            text: text.to_string(),
            right_align: false,
        }
    }

    fn cell(value: &CellValue) -> Self {
        let text = value.to_string();
        Self {
            width: text.chars().count(),
            right_align: matches!(value, CellValue::Number(_)),
            text,
        }
    }

    fn pad(&self, width: usize) -> String {
        let fill = " ".repeat(width.saturating_sub(self.width));
        if self.right_align {
            format!("{}{}", fill, self.text)
        } else {
            format!("{}{}", self.text, fill)
        }
    }
}

// ==========================================
// TableView - 只读表格视图
// ==========================================
pub struct TableView<'t> {
    table: &'t Table,
    title: Option<String>,
    show_row_numbers: bool,
}

impl<'t> TableView<'t> {
    pub fn new(table: &'t Table) -> Self {
        Self {
            table,
            title: None,
            show_row_numbers: false,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// 显示行号列（编辑界面用 "set <行号> <值>" 定位）
    pub fn with_row_numbers(mut self) -> Self {
        self.show_row_numbers = true;
        self
    }

    fn grid(&self) -> (Vec<BoxFmt>, Vec<Vec<BoxFmt>>) {
        let mut header: Vec<BoxFmt> = Vec::new();
        if self.show_row_numbers {
            header.push(BoxFmt::label("#"));
        }
        header.extend(self.table.columns().iter().map(|c| BoxFmt::label(&c.name)));

        let body = self
            .table
            .rows()
            .iter()
            .enumerate()
            .map(|(idx, row)| {
                let mut line = Vec::with_capacity(row.len() + 1);
                if self.show_row_numbers {
                    line.push(BoxFmt::cell(&CellValue::Number(idx as f64)));
                }
                line.extend(row.iter().map(BoxFmt::cell));
                line
            })
            .collect();

        (header, body)
    }
}

impl fmt::Display for TableView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (header, body) = self.grid();

        let widths: Vec<usize> = (0..header.len())
            .map(|col| {
                body.iter()
                    .map(|line| line[col].width)
                    .chain(std::iter::once(header[col].width))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        if let Some(title) = &self.title {
            writeln!(f, "{}", title)?;
        }

        let write_line = |f: &mut fmt::Formatter<'_>, line: &[BoxFmt]| -> fmt::Result {
            let cells: Vec<String> = line
                .iter()
                .zip(&widths)
                .map(|(b, w)| b.pad(*w))
                .collect();
            writeln!(f, "| {} |", cells.join(" | "))
        };

        write_line(f, &header)?;
        let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(f, "|-{}-|", separator.join("-|-"))?;
        for line in &body {
            write_line(f, line)?;
        }
        Ok(())
    }
}

/// 渲染整张表
pub fn render_table(table: &Table) -> String {
    TableView::new(table).to_string()
}
