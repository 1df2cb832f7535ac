// ==========================================
// 门店拜访调度系统 - 拜访时效引擎
// ==========================================
// 职责: 单门店拜访逾期程度分类
// 输入: 门店 (last_visit_date 可空) + 基准日期
// 输出: StalenessAssessment (等级/天数/是否需拜访)
// 约束: 无错误路径;周期缺失/非法必须回落默认值,
//       不允许除零或 panic
// ==========================================

use crate::domain::store::{StalenessAssessment, Store};
use crate::domain::types::VisitRiskLevel;
use chrono::NaiveDate;

/// 从未拜访的哨兵天数
pub const NEVER_VISITED_DAYS: i64 = 999;

/// 目标拜访周期默认值 (天)
pub const DEFAULT_VISIT_FREQUENCY_DAYS: i64 = 7;

// ==========================================
// VisitStalenessEngine - 拜访时效引擎
// ==========================================
pub struct VisitStalenessEngine {
    // 无状态引擎,不需要注入依赖
    // Repository 操作由调用方处理
    retention_score_threshold: f64,
    default_frequency_days: i64,
}

impl VisitStalenessEngine {
    /// 构造函数
    ///
    /// # 参数
    /// - `retention_score_threshold`: 高绩效保留阈值,
    ///   绩效得分高于该值的门店即使未逾期也标记需拜访
    /// - `default_frequency_days`: 门店周期缺失/非法时的回落值
    pub fn new(retention_score_threshold: f64, default_frequency_days: i64) -> Self {
        let default_frequency_days = if default_frequency_days > 0 {
            default_frequency_days
        } else {
            DEFAULT_VISIT_FREQUENCY_DAYS
        };

        Self {
            retention_score_threshold,
            default_frequency_days,
        }
    }

    /// 分类单门店拜访时效
    ///
    /// # 规则
    /// - days > 2*target: CRITICAL
    /// - target < days <= 2*target: AT_RISK
    /// - 其余: NORMAL
    /// - 从未拜访: days = 999 哨兵,必然 CRITICAL
    /// - needs_visit: 等级非 NORMAL,或绩效得分超过保留阈值
    ///   (高绩效门店主动保留,即使未逾期)
    ///
    /// # 参数
    /// - `store`: 门店
    /// - `today`: 基准日期
    pub fn classify(&self, store: &Store, today: NaiveDate) -> StalenessAssessment {
        let target = if store.visit_frequency_days > 0 {
            store.visit_frequency_days
        } else {
            self.default_frequency_days
        };

        let days_since_visit = match store.last_visit_date {
            Some(last) => (today - last).num_days().max(0),
            None => NEVER_VISITED_DAYS,
        };

        let risk_level = if days_since_visit > 2 * target {
            VisitRiskLevel::Critical
        } else if days_since_visit > target {
            VisitRiskLevel::AtRisk
        } else {
            VisitRiskLevel::Normal
        };

        let high_performer = store
            .performance_score
            .map(|s| s > self.retention_score_threshold)
            .unwrap_or(false);

        let needs_visit = risk_level != VisitRiskLevel::Normal || high_performer;

        StalenessAssessment {
            risk_level,
            days_since_visit,
            needs_visit,
        }
    }
}

impl Default for VisitStalenessEngine {
    fn default() -> Self {
        Self::new(70.0, DEFAULT_VISIT_FREQUENCY_DAYS)
    }
}
