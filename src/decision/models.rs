// ==========================================
// 门店拜访调度系统 - 决策报告数据模型
// ==========================================
// 报告是纯读聚合的返回值,不落库
// ==========================================

use crate::domain::types::PerformanceTier;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// BrandTrend - 品牌周环比趋势
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandTrend {
    pub brand: String,         // 品牌
    pub this_week_sales: f64,  // 近7日销售额
    pub last_week_sales: f64,  // 前7日销售额
    pub growth_rate: f64,      // 周环比增长率 % (前7日为0时恒为0)
}

// ==========================================
// StockRisk - 门店库存风险
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockRisk {
    pub store_id: String,
    pub total_units: f64,           // 库存总量
    pub avg_daily_consumption: f64, // 日均消耗
    pub days_until_critical: f64,   // 可售天数 (消耗为0时哨兵999)
    pub low_stock: bool,            // 低于告警天数阈值
}

// ==========================================
// ReceivableRisk - 门店应收风险
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceivableRisk {
    pub store_id: String,
    pub owed_amount: f64,   // 欠款金额
    pub days_past_due: i64, // 逾期天数
    pub high_risk: bool,    // 逾期>30天 或 欠款>2000
}

// ==========================================
// BottleneckFlag - 配送员负载瓶颈
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BottleneckFlag {
    pub driver_id: String,
    pub stop_count: i64, // 当日计划站点数
    pub critical: bool,  // 达到阈值1.5倍
}

// ==========================================
// PerformerEntry - 绩效排行条目
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformerEntry {
    pub store_id: String,
    pub store_name: String,
    pub performance_score: f64,
    pub performance_tier: Option<PerformanceTier>,
}

// ==========================================
// IntelligenceReport - 决策报告
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntelligenceReport {
    pub report_date: NaiveDate,                 // 报告基准日
    pub generated_at: NaiveDateTime,            // 生成时间
    pub brand_trends: Vec<BrandTrend>,          // 品牌周环比
    pub stock_risks: Vec<StockRisk>,            // 库存风险 (全量,low_stock 标记)
    pub total_unpaid: f64,                      // 应收欠款合计
    pub receivable_risks: Vec<ReceivableRisk>,  // 应收风险 (仅有欠款门店)
    pub bottlenecks: Vec<BottleneckFlag>,       // 当日负载瓶颈
    pub top_performers: Vec<PerformerEntry>,    // 绩效前5
    pub bottom_performers: Vec<PerformerEntry>, // 绩效后5
    pub fleet_health_score: f64,                // 车队健康度 0-100
}
