// ==========================================
// 分配报表重算工具 - API层
// ==========================================
// 职责: 展示层与纯数据核心之间的显式调用边界
// ==========================================

pub mod error;
pub mod rebalance_api;

pub use error::{ApiError, ApiResult};
pub use rebalance_api::{RebalanceApi, TurnResult};
