// ==========================================
// 门店拜访调度系统 - 绩效评分引擎
// ==========================================
// 职责: 单门店绩效评分与档位派生
// 输入: 指标快照 + 上下文 (距上次拜访天数/库存账龄)
// 输出: ScoringVerdict (得分/风险分/建议/档位)
// 红线: 评分服务失败必须降级,不得中断周期;
//       AtRisk 覆盖规则在基础档位之后应用,永远胜出
// ==========================================

use crate::domain::metrics::{DerivedSignals, MetricsSnapshot};
use crate::domain::types::PerformanceTier;
use crate::engine::safe_ratio;
use crate::intelligence::{fallback_response, ScoringProvider, ScoringRequest};
use tracing::debug;

/// 动销率换算基准 (周销售额)
const SELL_THROUGH_BASELINE_SALES: f64 = 1000.0;

/// 单次沟通的活跃度权重
const COMMUNICATION_WEIGHT: f64 = 5.0;

/// 覆盖为 AtRisk 时风险分下限
const AT_RISK_FLOOR_RISK_SCORE: f64 = 70.0;

// ==========================================
// ScoringContext - 评分上下文
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext {
    pub days_since_driver_visit: i64, // 距上次配送员拜访天数
}

// ==========================================
// ScoringVerdict - 评分结论
// ==========================================
#[derive(Debug, Clone)]
pub struct ScoringVerdict {
    pub signals: DerivedSignals,    // 派生信号
    pub performance_score: f64,     // 绩效得分 0-100
    pub risk_score: f64,            // 风险得分 0-100
    pub recommendation: String,     // 运营建议
    pub tier: PerformanceTier,      // 绩效档位
    pub used_fallback: bool,        // 是否走了降级路径
}

// ==========================================
// PerformanceScorer - 绩效评分引擎
// ==========================================
pub struct PerformanceScorer {
    // 无状态引擎,评分服务由调用方注入
}

impl PerformanceScorer {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 派生信号
    // ==========================================

    /// 由指标快照推导代理信号
    ///
    /// # 规则
    /// - sell_through_rate = min(100, weekly_sales / 1000 * 100)
    /// - communication_score = min(100, communications * 5)
    /// - restock_frequency = visit_count / 4 (整除)
    pub fn derive_signals(&self, metrics: &MetricsSnapshot) -> DerivedSignals {
        let sell_through_rate =
            (safe_ratio(metrics.weekly_sales, SELL_THROUGH_BASELINE_SALES, 0.0) * 100.0).min(100.0);

        let communication_score =
            (metrics.communication_count_30d as f64 * COMMUNICATION_WEIGHT).min(100.0);

        let restock_frequency = metrics.driver_visit_count_30d / 4;

        DerivedSignals {
            sell_through_rate,
            communication_score,
            restock_frequency,
        }
    }

    // ==========================================
    // 评分 (外部服务 + 确定性降级)
    // ==========================================

    /// 评分单门店
    ///
    /// 评分步骤委托给外部评分服务 (严格 JSON 契约);
    /// 服务不可用/超时/响应畸形时回落确定性默认值
    /// (performance=50, risk=0, "Maintain current operations"),
    /// 周期继续执行。
    pub async fn score(
        &self,
        metrics: &MetricsSnapshot,
        ctx: ScoringContext,
        provider: &dyn ScoringProvider,
    ) -> ScoringVerdict {
        let signals = self.derive_signals(metrics);

        let request = ScoringRequest {
            store_id: metrics.store_id.clone(),
            metrics: metrics.clone(),
            signals,
            days_since_driver_visit: ctx.days_since_driver_visit,
        };

        let (response, used_fallback) = match provider.score(&request).await {
            Ok(resp) if resp.is_valid() => (resp, false),
            Ok(resp) => {
                debug!(
                    store_id = %metrics.store_id,
                    performance_score = resp.performance_score,
                    "评分响应越界,使用降级默认值"
                );
                (fallback_response(), true)
            }
            Err(e) => {
                debug!(store_id = %metrics.store_id, error = %e, "评分服务失败,使用降级默认值");
                (fallback_response(), true)
            }
        };

        let (tier, risk_score) = self.derive_tier(
            response.performance_score,
            response.risk_score,
            metrics,
            ctx,
        );

        ScoringVerdict {
            signals,
            performance_score: response.performance_score,
            risk_score,
            recommendation: response.recommendation,
            tier,
            used_fallback,
        }
    }

    // ==========================================
    // 档位派生
    // ==========================================

    /// 由绩效得分派生档位,并应用 AtRisk 覆盖规则
    ///
    /// # 基础档位
    /// - > 85: Platinum
    /// - 70-85: Gold
    /// - 55-69: Silver
    /// - < 55: Standard
    ///
    /// # AtRisk 覆盖 (在基础档位之后应用,永远胜出)
    /// - 得分 < 35
    /// - 或 距上次拜访 > 14 天
    /// - 或 (月销售额为 0 且 距上次拜访 > 21 天)
    /// 覆盖时 risk_score 抬升至不低于 70
    ///
    /// # 返回
    /// (档位, 调整后的风险分)
    pub fn derive_tier(
        &self,
        performance_score: f64,
        risk_score: f64,
        metrics: &MetricsSnapshot,
        ctx: ScoringContext,
    ) -> (PerformanceTier, f64) {
        let base_tier = if performance_score > 85.0 {
            PerformanceTier::Platinum
        } else if performance_score >= 70.0 {
            PerformanceTier::Gold
        } else if performance_score >= 55.0 {
            PerformanceTier::Silver
        } else {
            PerformanceTier::Standard
        };

        let at_risk = performance_score < 35.0
            || ctx.days_since_driver_visit > 14
            || (metrics.monthly_sales == 0.0 && ctx.days_since_driver_visit > 21);

        if at_risk {
            (PerformanceTier::AtRisk, risk_score.max(AT_RISK_FLOOR_RISK_SCORE))
        } else {
            (base_tier, risk_score)
        }
    }
}

impl Default for PerformanceScorer {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::intelligence::{
        NoOpScoringProvider, ScoringProviderError, ScoringResponse,
    };
    use async_trait::async_trait;

    /// 创建测试用的指标快照
    fn create_test_metrics(weekly: f64, monthly: f64, visits: i64, comms: i64) -> MetricsSnapshot {
        MetricsSnapshot {
            store_id: "S001".to_string(),
            daily_sales: 100.0,
            weekly_sales: weekly,
            monthly_sales: monthly,
            driver_visit_count_30d: visits,
            communication_count_30d: comms,
            inventory_age_days: 10,
        }
    }

    fn ctx(days: i64) -> ScoringContext {
        ScoringContext {
            days_since_driver_visit: days,
        }
    }

    /// 固定响应的评分服务
    struct FixedScoringProvider {
        response: ScoringResponse,
    }

    #[async_trait]
    impl ScoringProvider for FixedScoringProvider {
        async fn score(
            &self,
            _request: &ScoringRequest,
        ) -> Result<ScoringResponse, ScoringProviderError> {
            Ok(self.response.clone())
        }
    }

    #[test]
    fn test_derive_signals() {
        let scorer = PerformanceScorer::new();
        let metrics = create_test_metrics(500.0, 2000.0, 9, 7);

        let signals = scorer.derive_signals(&metrics);

        assert_eq!(signals.sell_through_rate, 50.0); // 500/1000*100
        assert_eq!(signals.communication_score, 35.0); // 7*5
        assert_eq!(signals.restock_frequency, 2); // 9/4 整除
    }

    #[test]
    fn test_derive_signals_capped_at_100() {
        let scorer = PerformanceScorer::new();
        let metrics = create_test_metrics(5000.0, 20000.0, 40, 50);

        let signals = scorer.derive_signals(&metrics);

        assert_eq!(signals.sell_through_rate, 100.0);
        assert_eq!(signals.communication_score, 100.0);
        assert_eq!(signals.restock_frequency, 10);
    }

    #[test]
    fn test_base_tier_boundaries() {
        let scorer = PerformanceScorer::new();
        let metrics = create_test_metrics(500.0, 2000.0, 9, 7);

        let cases = [
            (90.0, PerformanceTier::Platinum),
            (85.0, PerformanceTier::Gold), // 85 含在 Gold
            (70.0, PerformanceTier::Gold),
            (69.0, PerformanceTier::Silver),
            (55.0, PerformanceTier::Silver),
            (54.0, PerformanceTier::Standard),
            (35.0, PerformanceTier::Standard),
        ];

        for (score, expected) in cases {
            let (tier, _) = scorer.derive_tier(score, 0.0, &metrics, ctx(3));
            assert_eq!(tier, expected, "score={}", score);
        }
    }

    #[test]
    fn test_at_risk_override_always_wins() {
        let scorer = PerformanceScorer::new();
        let metrics = create_test_metrics(500.0, 2000.0, 9, 7);

        // 得分 90 本应 Platinum,但 20 天未拜访 -> AtRisk
        let (tier, risk) = scorer.derive_tier(90.0, 10.0, &metrics, ctx(20));
        assert_eq!(tier, PerformanceTier::AtRisk);
        assert_eq!(risk, 70.0); // 抬升至下限

        // 得分 < 35 -> AtRisk
        let (tier, _) = scorer.derive_tier(30.0, 0.0, &metrics, ctx(3));
        assert_eq!(tier, PerformanceTier::AtRisk);

        // 月销售为 0 且 22 天未拜访 -> AtRisk
        let zero_sales = create_test_metrics(0.0, 0.0, 0, 0);
        let (tier, _) = scorer.derive_tier(60.0, 0.0, &zero_sales, ctx(22));
        assert_eq!(tier, PerformanceTier::AtRisk);

        // 月销售为 0 但仅 16 天 (>14) 未拜访: 命中独立的 >14 规则
        let (tier, _) = scorer.derive_tier(60.0, 0.0, &zero_sales, ctx(16));
        assert_eq!(tier, PerformanceTier::AtRisk);
    }

    #[test]
    fn test_at_risk_keeps_higher_risk_score() {
        let scorer = PerformanceScorer::new();
        let metrics = create_test_metrics(500.0, 2000.0, 9, 7);

        // 原风险分高于下限时保留原值
        let (_, risk) = scorer.derive_tier(20.0, 88.0, &metrics, ctx(3));
        assert_eq!(risk, 88.0);
    }

    #[tokio::test]
    async fn test_score_falls_back_when_provider_unavailable() {
        let scorer = PerformanceScorer::new();
        let metrics = create_test_metrics(500.0, 2000.0, 9, 7);

        let verdict = scorer.score(&metrics, ctx(3), &NoOpScoringProvider).await;

        assert!(verdict.used_fallback);
        assert_eq!(verdict.performance_score, 50.0);
        assert_eq!(verdict.risk_score, 0.0);
        assert_eq!(verdict.recommendation, "Maintain current operations");
        assert_eq!(verdict.tier, PerformanceTier::Standard);
    }

    #[tokio::test]
    async fn test_score_falls_back_on_out_of_range_response() {
        let scorer = PerformanceScorer::new();
        let metrics = create_test_metrics(500.0, 2000.0, 9, 7);

        let provider = FixedScoringProvider {
            response: ScoringResponse {
                performance_score: 250.0,
                risk_score: 0.0,
                recommendation: "bogus".to_string(),
            },
        };

        let verdict = scorer.score(&metrics, ctx(3), &provider).await;

        assert!(verdict.used_fallback);
        assert_eq!(verdict.performance_score, 50.0);
    }

    #[tokio::test]
    async fn test_score_uses_provider_response() {
        let scorer = PerformanceScorer::new();
        let metrics = create_test_metrics(1200.0, 5000.0, 12, 10);

        let provider = FixedScoringProvider {
            response: ScoringResponse {
                performance_score: 88.0,
                risk_score: 5.0,
                recommendation: "Expand product range".to_string(),
            },
        };

        let verdict = scorer.score(&metrics, ctx(3), &provider).await;

        assert!(!verdict.used_fallback);
        assert_eq!(verdict.performance_score, 88.0);
        assert_eq!(verdict.tier, PerformanceTier::Platinum);
        assert_eq!(verdict.recommendation, "Expand product range");
    }
}
