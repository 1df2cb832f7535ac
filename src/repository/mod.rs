// ==========================================
// 门店拜访调度系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod driver_repo;
pub mod error;
pub mod follow_up_repo;
pub mod metrics_repo;
pub mod performance_snapshot_repo;
pub mod report_repo;
pub mod route_plan_repo;
pub mod run_log_repo;
pub mod store_repo;

// 重导出核心仓储
pub use driver_repo::DriverRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use follow_up_repo::{FollowUpRepository, FollowUpTask};
pub use metrics_repo::MetricsRepository;
pub use performance_snapshot_repo::PerformanceSnapshotRepository;
pub use report_repo::ReportRepository;
pub use route_plan_repo::RoutePlanRepository;
pub use run_log_repo::RunLogRepository;
pub use store_repo::StoreRepository;
