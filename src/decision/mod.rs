// ==========================================
// 门店拜访调度系统 - 决策层
// ==========================================
// 只读聚合,规则阈值来自 ReportConfig
// ==========================================

pub mod models;
pub mod reporter;

pub use models::{
    BottleneckFlag, BrandTrend, IntelligenceReport, PerformerEntry, ReceivableRisk, StockRisk,
};
pub use reporter::{IntelligenceReporter, STOCK_DAYS_SENTINEL};
