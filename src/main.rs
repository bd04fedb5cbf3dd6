// ==========================================
// 分配报表重算工具 - 终端主入口
// ==========================================
// 输入: nwe.xlsx（月度）/ weekly.xlsx（周度），固定相对路径
// 输出: updated_weekly_report.xlsx
// ==========================================

use alloc_rebalance::api::RebalanceApi;
use alloc_rebalance::app::ConsoleSession;
use alloc_rebalance::config::{AppConfig, DEFAULT_CONFIG_FILE};
use alloc_rebalance::logging;
use anyhow::Context;
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // 任何失败都必须对用户可见
            eprintln!("错误: {:#}", err);
            tracing::error!("运行失败: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let config = AppConfig::load_or_default(DEFAULT_CONFIG_FILE)?;

    // 初始化日志系统
    if config.json_logs {
        logging::init_json();
    } else {
        logging::init();
    }

    tracing::info!("==================================================");
    tracing::info!("{}", alloc_rebalance::APP_NAME);
    tracing::info!("系统版本: {}", alloc_rebalance::VERSION);
    tracing::info!("==================================================");

    let api = RebalanceApi::new(config);
    let reports = api.load().context("无法加载输入报表")?;

    let stdin = io::stdin();
    let mut session = ConsoleSession::new(api, stdin.lock(), io::stdout());
    let outcome = session.run(&reports)?;

    tracing::info!(
        turns = outcome.turns,
        downloads = outcome.downloads.len(),
        "会话结束"
    );
    Ok(())
}
