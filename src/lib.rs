// ==========================================
// 门店拜访调度系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite + axum
// 系统定位: 拜访优先级与路线分配决策引擎
// (外部 CRUD 流程负责原始数据录入)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 外部评分服务接入层
pub mod intelligence;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施 (连接初始化/PRAGMA 统一)
pub mod db;

// 日志系统
pub mod logging;

// 应用层 - 状态组装与 HTTP 触发面
pub mod app;

// 决策层 - 只读报告聚合
pub mod decision;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{CycleType, EntityStatus, PerformanceTier, VisitRiskLevel};

// 领域实体
pub use domain::{
    CycleOutcome, CycleResults, CycleRunLog, Driver, MetricsSnapshot, PerformanceSnapshot,
    RoutePlan, StalenessAssessment, StepResult, Store,
};

// 引擎
pub use engine::{
    AssignmentBalancer, CycleOrchestrator, PerformanceScorer, VisitStalenessEngine,
};

// 决策对象
pub use decision::{IntelligenceReport, IntelligenceReporter};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "门店拜访调度系统";

// ==========================================
// 预编译检查
// ==========================================
