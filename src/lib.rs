// ==========================================
// 分配报表重算工具 - 核心库
// ==========================================
// 流程: 报表加载 → Rebalancing 编辑 → 权重计算 → 周度传播 → 展示/导出
// 定位: 单用户、单轮前向批处理（无持久化、无并发）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 表模型与分配记录
pub mod domain;

// 导入层 - 外部报表
pub mod importer;

// 引擎层 - 权重计算与传播
pub mod engine;

// 报表层 - 渲染与导出
pub mod report;

// 配置层
pub mod config;

// API 层 - 请求/响应轮次
pub mod api;

// 应用层 - 终端交互
pub mod app;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

pub use domain::{CellValue, Column, ColumnType, Table};

pub use engine::{
    EditSurface, Propagator, RebalancingEdit, ScriptedEditSurface, WeightCalculator,
};

pub use api::{ApiError, RebalanceApi, TurnResult};

pub use config::AppConfig;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "月度→周度分配报表重算工具";
