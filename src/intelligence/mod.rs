// ==========================================
// 门店拜访调度系统 - 外部评分服务接口
// ==========================================
// 契约: 评分服务必须返回严格匹配
//   {performance_score, risk_score, recommendation}
// 的 JSON;任何传输错误/超时/越界/畸形响应
// 都由调用方降级为确定性默认值,不得中断周期
// ==========================================

pub mod http_provider;

pub use http_provider::HttpScoringProvider;

use crate::domain::metrics::{DerivedSignals, MetricsSnapshot};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 降级默认建议文案
pub const FALLBACK_RECOMMENDATION: &str = "Maintain current operations";

// ==========================================
// ScoringRequest - 评分请求
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct ScoringRequest {
    pub store_id: String,                 // 门店ID
    pub metrics: MetricsSnapshot,         // 原始指标
    pub signals: DerivedSignals,          // 派生信号
    pub days_since_driver_visit: i64,     // 距上次配送员拜访天数
}

// ==========================================
// ScoringResponse - 评分响应 (严格 JSON 契约)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScoringResponse {
    pub performance_score: f64, // 绩效得分 0-100
    pub risk_score: f64,        // 风险得分 0-100
    pub recommendation: String, // 运营建议
}

impl ScoringResponse {
    /// 响应值域校验 (越界视为畸形响应)
    pub fn is_valid(&self) -> bool {
        (0.0..=100.0).contains(&self.performance_score)
            && (0.0..=100.0).contains(&self.risk_score)
    }
}

/// 确定性降级响应
///
/// 评分服务不可用/响应畸形时使用,保证周期不中断
pub fn fallback_response() -> ScoringResponse {
    ScoringResponse {
        performance_score: 50.0,
        risk_score: 0.0,
        recommendation: FALLBACK_RECOMMENDATION.to_string(),
    }
}

// ==========================================
// ScoringProviderError - 评分服务错误
// ==========================================
#[derive(Error, Debug)]
pub enum ScoringProviderError {
    #[error("评分服务未配置")]
    NotConfigured,

    #[error("评分请求失败: {0}")]
    RequestFailed(String),

    #[error("评分响应畸形: {0}")]
    MalformedResponse(String),
}

// ==========================================
// Trait: ScoringProvider
// ==========================================
// 评分服务接入点,HTTP 实现见 http_provider,
// 测试中以 mock 实现替换
#[async_trait]
pub trait ScoringProvider: Send + Sync {
    /// 对单门店指标评分
    async fn score(&self, request: &ScoringRequest)
        -> Result<ScoringResponse, ScoringProviderError>;
}

// ==========================================
// NoOpScoringProvider - 空实现
// ==========================================
// 未配置评分服务时使用,始终返回错误,
// 由调用方走确定性降级路径
pub struct NoOpScoringProvider;

#[async_trait]
impl ScoringProvider for NoOpScoringProvider {
    async fn score(
        &self,
        _request: &ScoringRequest,
    ) -> Result<ScoringResponse, ScoringProviderError> {
        Err(ScoringProviderError::NotConfigured)
    }
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_response_is_deterministic() {
        let fallback = fallback_response();
        assert_eq!(fallback.performance_score, 50.0);
        assert_eq!(fallback.risk_score, 0.0);
        assert_eq!(fallback.recommendation, "Maintain current operations");
    }

    #[test]
    fn test_response_range_validation() {
        let mut resp = fallback_response();
        assert!(resp.is_valid());

        resp.performance_score = 101.0;
        assert!(!resp.is_valid());

        resp.performance_score = 50.0;
        resp.risk_score = -1.0;
        assert!(!resp.is_valid());
    }

    #[test]
    fn test_strict_contract_rejects_unknown_fields() {
        let malformed = r#"{"performance_score":50,"risk_score":0,"recommendation":"ok","extra":1}"#;
        assert!(serde_json::from_str::<ScoringResponse>(malformed).is_err());

        let valid = r#"{"performance_score":72.5,"risk_score":10,"recommendation":"Increase visits"}"#;
        let parsed: ScoringResponse = serde_json::from_str(valid).unwrap();
        assert_eq!(parsed.performance_score, 72.5);
    }
}
