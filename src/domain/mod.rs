// ==========================================
// 门店拜访调度系统 - 领域层
// ==========================================
// 职责: 实体与类型定义,不含持久化/业务流程
// ==========================================

pub mod driver;
pub mod metrics;
pub mod performance;
pub mod plan;
pub mod run_log;
pub mod store;
pub mod types;

// 重导出核心实体
pub use driver::Driver;
pub use metrics::{DerivedSignals, MetricsSnapshot};
pub use performance::PerformanceSnapshot;
pub use plan::RoutePlan;
pub use run_log::{CycleOutcome, CycleResults, CycleRunLog, StepResult};
pub use store::{StalenessAssessment, Store};
