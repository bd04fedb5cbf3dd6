// ==========================================
// 分配报表重算工具 - 应用层
// ==========================================
// 职责: 终端展示层（编辑界面 / 结果展示 / 下载）
// ==========================================

pub mod console;

pub use console::{ConsoleEditSurface, ConsoleSession, SessionOutcome};
