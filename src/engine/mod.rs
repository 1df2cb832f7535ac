// ==========================================
// 门店拜访调度系统 - 引擎层
// ==========================================
// 引擎职责划分:
// - staleness: 拜访时效分类
// - scoring: 绩效评分与派生信号
// - balancer: 路线分配均衡
// - orchestrator: 周期编排 (串联上述引擎与 Repository)
// ==========================================

pub mod balancer;
pub mod orchestrator;
pub mod scoring;
pub mod staleness;

pub use balancer::{AssignmentBalancer, AssignmentError, VisitCandidate};
pub use orchestrator::{CycleError, CycleOrchestrator};
pub use scoring::{PerformanceScorer, ScoringContext, ScoringVerdict};
pub use staleness::{VisitStalenessEngine, DEFAULT_VISIT_FREQUENCY_DAYS, NEVER_VISITED_DAYS};

/// 受保护的比率计算
///
/// 分母为 0 (或非有限值) 时返回哨兵值,所有比率计算统一走该入口,
/// 任何路径不得出现除零
pub fn safe_ratio(numerator: f64, denominator: f64, sentinel_on_zero: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() {
        return sentinel_on_zero;
    }
    numerator / denominator
}
