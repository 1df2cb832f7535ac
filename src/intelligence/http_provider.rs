// ==========================================
// 门店拜访调度系统 - HTTP 评分服务客户端
// ==========================================
// 请求超时在客户端级别统一配置,
// 超时/非 2xx/畸形 JSON 一律作为错误返回,
// 由 PerformanceScorer 降级处理
// ==========================================

use crate::intelligence::{ScoringProvider, ScoringProviderError, ScoringRequest, ScoringResponse};
use async_trait::async_trait;
use std::time::Duration;

// ==========================================
// HttpScoringProvider - HTTP 评分客户端
// ==========================================
pub struct HttpScoringProvider {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpScoringProvider {
    /// 创建 HTTP 评分客户端
    ///
    /// # 参数
    /// - `endpoint`: 评分服务地址
    /// - `timeout`: 单次请求超时
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, ScoringProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScoringProviderError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl ScoringProvider for HttpScoringProvider {
    async fn score(
        &self,
        request: &ScoringRequest,
    ) -> Result<ScoringResponse, ScoringProviderError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| ScoringProviderError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ScoringProviderError::RequestFailed(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ScoringProviderError::RequestFailed(e.to_string()))?;

        let parsed: ScoringResponse = serde_json::from_str(&body)
            .map_err(|e| ScoringProviderError::MalformedResponse(e.to_string()))?;

        if !parsed.is_valid() {
            return Err(ScoringProviderError::MalformedResponse(format!(
                "得分越界: performance={}, risk={}",
                parsed.performance_score, parsed.risk_score
            )));
        }

        Ok(parsed)
    }
}
