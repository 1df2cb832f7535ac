// ==========================================
// 门店拜访调度系统 - 绩效快照领域模型
// ==========================================
// 用途: 历史趋势查询,只追加不更新
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// PerformanceSnapshot - 门店绩效快照 (append-only)
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    pub snapshot_id: String,            // 快照ID
    pub store_id: String,               // 门店ID
    pub snapshot_date: NaiveDate,       // 快照日期

    // ===== 原始指标 =====
    pub daily_sales: f64,               // 当日销售额
    pub weekly_sales: f64,              // 近7日销售额
    pub monthly_sales: f64,             // 近30日销售额
    pub visit_count_30d: i64,           // 近30日拜访次数
    pub communication_count_30d: i64,   // 近30日沟通次数
    pub inventory_age_days: i64,        // 库存账龄

    // ===== 派生信号 =====
    pub sell_through_rate: f64,         // 动销率代理
    pub communication_score: f64,       // 沟通活跃度
    pub restock_frequency: i64,         // 补货频次

    // ===== 评分结果 =====
    pub performance_score: f64,         // 绩效得分 0-100
    pub risk_score: f64,                // 风险得分 0-100
    pub recommendation: String,         // 运营建议 (短文本)

    // ===== 元数据 =====
    pub created_at: NaiveDateTime,      // 创建时间
}
