// ==========================================
// 门店拜访调度系统 - 门店领域模型
// ==========================================
// 门店的增删改由外部 CRUD 流程维护,
// 本引擎只读取快照并回写风险等级/绩效字段
// ==========================================

use crate::domain::types::{EntityStatus, PerformanceTier, VisitRiskLevel};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// Store - 门店
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store {
    pub store_id: String,                        // 门店ID
    pub store_name: String,                      // 门店名称
    pub region: Option<String>,                  // 区域标签

    // ===== 拜访节奏 =====
    pub last_visit_date: Option<NaiveDate>,      // 最近拜访日期 (可空=从未拜访)
    pub visit_frequency_days: i64,               // 目标拜访周期 (天,默认7)
    pub visit_risk_level: VisitRiskLevel,        // 拜访风险等级 (每周期重算)

    // ===== 绩效 =====
    pub performance_score: Option<f64>,          // 绩效得分 0-100 (可空=未评分)
    pub performance_tier: Option<PerformanceTier>, // 绩效档位

    // ===== 元数据 =====
    pub status: EntityStatus,                    // 状态 (仅 ACTIVE 参与调度)
    pub updated_at: NaiveDateTime,               // 更新时间
}

// ==========================================
// StalenessAssessment - 拜访时效评估结果
// ==========================================
// Visit Staleness Engine 的输出
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StalenessAssessment {
    pub risk_level: VisitRiskLevel, // 风险等级
    pub days_since_visit: i64,      // 距上次拜访天数 (从未拜访=999)
    pub needs_visit: bool,          // 是否需要纳入本周期拜访
}
