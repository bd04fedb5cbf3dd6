// ==========================================
// 分配报表重算工具 - 引擎层
// ==========================================
// 职责: 纯数据变换核心（无界面、无全局状态）
// 流程: 编辑契约 → 权重计算 → 周度传播
// ==========================================

pub mod edit_surface;
pub mod error;
pub mod propagator;
pub mod weight_calculator;

// 重导出核心引擎
pub use edit_surface::{
    apply_rebalancing_edits, verify_edit_contract, EditSurface, RebalancingEdit,
    ScriptedEditSurface,
};
pub use error::{EngineError, EngineResult};
pub use propagator::{CountryWeightIndex, PropagationOutcome, Propagator};
pub use weight_calculator::{WeightCalculator, WeightOutcome};
