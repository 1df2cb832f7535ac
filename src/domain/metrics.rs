// ==========================================
// 门店拜访调度系统 - 指标快照领域模型
// ==========================================
// 每周期由原始流水 (销售/拜访/沟通/库存) 聚合而来,
// 不做长期存储,仅作为 Performance Scorer 的输入
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// MetricsSnapshot - 门店指标快照 (固定回看窗口)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub store_id: String,               // 门店ID

    // ===== 销售指标 =====
    pub daily_sales: f64,               // 当日销售额
    pub weekly_sales: f64,              // 近7日销售额
    pub monthly_sales: f64,             // 近30日销售额

    // ===== 拜访/沟通指标 =====
    pub driver_visit_count_30d: i64,    // 近30日配送员拜访次数
    pub communication_count_30d: i64,   // 近30日沟通次数

    // ===== 库存指标 =====
    pub inventory_age_days: i64,        // 库存账龄 (天)
}

// ==========================================
// DerivedSignals - 评分派生信号
// ==========================================
// 由指标快照推导的代理信号,随请求一并交给评分服务
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedSignals {
    pub sell_through_rate: f64,   // 动销率代理 0-100
    pub communication_score: f64, // 沟通活跃度 0-100
    pub restock_frequency: i64,   // 补货频次 (次/周)
}
