// ==========================================
// 分配报表重算工具 - API层错误类型
// ==========================================
// 职责: 汇总各层错误，转换为用户可读的错误消息
// 说明: 所有错误对当前轮次均为终止性错误，必须对用户可见
// ==========================================

use crate::config::ConfigError;
use crate::engine::EngineError;
use crate::importer::ImportError;
use crate::report::ExportError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 加载失败（文件缺失/损坏/缺列）：致命，界面不再继续渲染
    #[error("报表加载失败: {0}")]
    Load(#[from] ImportError),

    /// 重算失败（类型不匹配/编辑越界等）：中止本轮重算
    #[error("重算失败: {0}")]
    Recalc(#[from] EngineError),

    /// 导出失败
    #[error("报表导出失败: {0}")]
    Export(#[from] ExportError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 是否为加载阶段的致命错误
    pub fn is_fatal_load(&self) -> bool {
        matches!(self, ApiError::Load(_) | ApiError::Config(_))
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
