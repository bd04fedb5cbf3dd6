// ==========================================
// 分配报表重算工具 - 配置层
// ==========================================
// 职责: 应用配置加载（固定默认值 + 可选 JSON 覆写）
// ==========================================

pub mod app_config;

pub use app_config::{AppConfig, ConfigError, DEFAULT_CONFIG_FILE};
