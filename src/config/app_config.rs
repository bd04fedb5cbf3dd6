// ==========================================
// 分配报表重算工具 - 应用配置
// ==========================================
// 职责: 输入/输出文件位置、导出工作表名
// 存储: 可选 JSON 文件（缺省时使用固定默认值）
// ==========================================

use crate::report::exporter::{EXPORT_FILE_NAME, WEEKLY_SHEET_NAME};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// 默认配置文件名（位于工作目录）
pub const DEFAULT_CONFIG_FILE: &str = "alloc_rebalance.json";

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置读取失败 ({path}): {message}")]
    ReadError { path: String, message: String },

    #[error("配置格式错误 ({path}): {message}")]
    ParseError { path: String, message: String },

    #[error("配置值无效 (key: {key}): {message}")]
    InvalidValue { key: String, message: String },
}

// ==========================================
// AppConfig - 应用配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 月度报表路径（相对工作目录）
    pub monthly_path: PathBuf,

    /// 周度报表路径（相对工作目录）
    pub weekly_path: PathBuf,

    /// 导出文件写出目录
    pub output_dir: PathBuf,

    /// 导出文件名
    pub output_file_name: String,

    /// 导出工作表名
    pub sheet_name: String,

    /// 日志输出为 JSON 格式
    pub json_logs: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            monthly_path: PathBuf::from("nwe.xlsx"),
            weekly_path: PathBuf::from("weekly.xlsx"),
            output_dir: PathBuf::from("."),
            output_file_name: EXPORT_FILE_NAME.to_string(),
            sheet_name: WEEKLY_SHEET_NAME.to_string(),
            json_logs: false,
        }
    }
}

impl AppConfig {
    /// 读取配置文件；文件不存在时返回默认配置
    ///
    /// # 错误
    /// - 文件存在但无法读取 / JSON 格式错误 / 值无效
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "配置文件不存在，使用默认配置");
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let config: AppConfig = serde_json::from_str(&raw).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        config.validate()?;
        info!(path = %path.display(), "配置文件已加载");
        Ok(config)
    }

    /// 校验配置值
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output_file_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "output_file_name".to_string(),
                message: "不能为空".to_string(),
            });
        }

        // Excel 工作表名: 1~31 字符，不含 []:*?/\
        let name = self.sheet_name.as_str();
        if name.is_empty()
            || name.chars().count() > 31
            || name.chars().any(|c| "[]:*?/\\".contains(c))
        {
            return Err(ConfigError::InvalidValue {
                key: "sheet_name".to_string(),
                message: format!("非法工作表名: {:?}", name),
            });
        }
        Ok(())
    }
}
