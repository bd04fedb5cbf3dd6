// ==========================================
// 分配报表重算工具 - 终端交互层
// ==========================================
// 职责: 月度表编辑界面 + 结果展示 + 下载动作
// 说明: 仅负责读写终端，所有计算通过 RebalanceApi 显式调用
// ==========================================
// 编辑命令:
//   show              显示月度表（含行号）
//   set <行号> <值>   修改该行 Rebalancing
//   reset             撤销全部编辑
//   done              提交编辑并重算
// 结果命令:
//   download          写出 xlsx 报表
//   edit              回到编辑界面（从编辑步骤起完整重算）
//   quit              退出
// ==========================================

use crate::api::{ApiResult, RebalanceApi, TurnResult};
use crate::domain::table::Table;
use crate::engine::{apply_rebalancing_edits, EditSurface, EngineError, EngineResult, RebalancingEdit};
use crate::importer::LoadedReports;
use crate::report::TableView;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::info;

// ==========================================
// 编辑命令解析
// ==========================================
#[derive(Debug, Clone, PartialEq)]
enum EditCommand {
    Show,
    Set(RebalancingEdit),
    Reset,
    Done,
}

fn parse_edit_command(line: &str) -> Result<EditCommand, String> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    match parts.as_slice() {
        ["show"] => Ok(EditCommand::Show),
        ["reset"] => Ok(EditCommand::Reset),
        ["done"] | [] => Ok(EditCommand::Done),
        ["set", row, value] => {
            let row = row
                .parse::<usize>()
                .map_err(|_| format!("行号无效: {}", row))?;
            let value = value
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| format!("Rebalancing 必须为数值: {}", value))?;
            Ok(EditCommand::Set(RebalancingEdit::new(row, value)))
        }
        _ => Err(format!("无法识别的命令: {}", line.trim())),
    }
}

fn io_failure(err: std::io::Error) -> EngineError {
    EngineError::EditSurfaceFailure(err.to_string())
}

// ==========================================
// ConsoleEditSurface - 终端编辑界面
// ==========================================
// 编辑列表跨轮次保留（与表格控件的会话状态一致），reset 清空
pub struct ConsoleEditSurface<R, W> {
    input: R,
    output: W,
    edits: Vec<RebalancingEdit>,
}

impl<R: BufRead, W: Write> ConsoleEditSurface<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            edits: Vec::new(),
        }
    }

    /// 当前累计的编辑
    pub fn edits(&self) -> &[RebalancingEdit] {
        &self.edits
    }

    pub fn into_parts(self) -> (R, W) {
        (self.input, self.output)
    }

    /// 读取一行；None 表示输入结束
    fn read_line(&mut self) -> std::io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    fn prompt(&mut self, text: &str) -> std::io::Result<()> {
        write!(self.output, "{}", text)?;
        self.output.flush()
    }
}

impl<R: BufRead, W: Write> EditSurface for ConsoleEditSurface<R, W> {
    fn edit(&mut self, monthly: &Table) -> EngineResult<Table> {
        let current = apply_rebalancing_edits(monthly, &self.edits)?;
        writeln!(
            self.output,
            "{}",
            TableView::new(&current).with_title("月度报表").with_row_numbers()
        )
        .map_err(io_failure)?;
        writeln!(self.output, "仅 Rebalancing 列可编辑。命令: show | set <行号> <值> | reset | done")
            .map_err(io_failure)?;

        loop {
            self.prompt("edit> ").map_err(io_failure)?;
            let line = match self.read_line().map_err(io_failure)? {
                Some(line) => line,
                None => break,
            };

            match parse_edit_command(&line) {
                Ok(EditCommand::Show) => {
                    let preview = apply_rebalancing_edits(monthly, &self.edits)?;
                    writeln!(
                        self.output,
                        "{}",
                        TableView::new(&preview).with_row_numbers()
                    )
                    .map_err(io_failure)?;
                }
                Ok(EditCommand::Set(edit)) => {
                    if edit.row >= monthly.row_count() {
                        writeln!(
                            self.output,
                            "行号越界: {}（共 {} 行）",
                            edit.row,
                            monthly.row_count()
                        )
                        .map_err(io_failure)?;
                        continue;
                    }
                    self.edits.push(edit);
                }
                Ok(EditCommand::Reset) => self.edits.clear(),
                Ok(EditCommand::Done) => break,
                Err(message) => {
                    writeln!(self.output, "{}", message).map_err(io_failure)?;
                }
            }
        }

        info!(edits = self.edits.len(), "编辑完成");
        apply_rebalancing_edits(monthly, &self.edits)
    }
}

// ==========================================
// ConsoleSession - 终端会话
// ==========================================
pub struct ConsoleSession<R, W> {
    api: RebalanceApi,
    surface: ConsoleEditSurface<R, W>,
}

/// 会话结束状态
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOutcome {
    pub turns: usize,
    pub downloads: Vec<PathBuf>,
}

impl<R: BufRead, W: Write> ConsoleSession<R, W> {
    pub fn new(api: RebalanceApi, input: R, output: W) -> Self {
        Self {
            api,
            surface: ConsoleEditSurface::new(input, output),
        }
    }

    /// 编辑 → 重算 → 展示 → 下载；"edit" 从编辑步骤起完整重算
    pub fn run(&mut self, reports: &LoadedReports) -> ApiResult<SessionOutcome> {
        let mut outcome = SessionOutcome {
            turns: 0,
            downloads: Vec::new(),
        };

        'turns: loop {
            let result = self.api.run_with_surface(reports, &mut self.surface)?;
            outcome.turns += 1;
            self.show_result(&result)?;

            loop {
                self.surface
                    .prompt("download | edit | quit > ")
                    .map_err(anyhow::Error::from)?;
                let line = match self.surface.read_line().map_err(anyhow::Error::from)? {
                    Some(line) => line,
                    None => break 'turns,
                };

                match line.trim() {
                    "download" => {
                        let path = result.artifact.write_to(&self.api.config().output_dir)?;
                        writeln!(
                            self.surface.output,
                            "已下载: {} ({}, {} 字节)",
                            path.display(),
                            result.artifact.mime_type,
                            result.artifact.size()
                        )
                        .map_err(anyhow::Error::from)?;
                        outcome.downloads.push(path);
                    }
                    "edit" => continue 'turns,
                    "quit" | "" => break 'turns,
                    other => {
                        writeln!(self.surface.output, "无法识别的命令: {}", other)
                            .map_err(anyhow::Error::from)?;
                    }
                }
            }
        }

        Ok(outcome)
    }

    fn show_result(&mut self, result: &TurnResult) -> ApiResult<()> {
        let out = &mut self.surface.output;
        writeln!(out, "{}", TableView::new(&result.monthly).with_title("更新后的月度报表"))
            .map_err(anyhow::Error::from)?;
        writeln!(out, "{}", TableView::new(&result.weekly).with_title("更新后的周度报表"))
            .map_err(anyhow::Error::from)?;

        let summary = &result.propagation_summary;
        if !summary.ambiguous_countries.is_empty() {
            writeln!(
                out,
                "注意: 以下国家在月度表中对应多个权重，已按首行取值: {}",
                summary.ambiguous_countries.join(", ")
            )
            .map_err(anyhow::Error::from)?;
        }
        if summary.unmatched > 0 {
            writeln!(out, "{} 行周度记录未匹配到月度国家，权重留空", summary.unmatched)
                .map_err(anyhow::Error::from)?;
        }
        Ok(())
    }

    pub fn into_output(self) -> W {
        self.surface.into_parts().1
    }
}
