// ==========================================
// 门店拜访调度系统 - HTTP 触发面
// ==========================================
// 外部调度器 (cron) 经由 HTTP 触发周期:
//   POST /api/cycle/run  执行一次周期,返回 CycleOutcome
//   GET  /api/report     生成只读决策报告
//   GET  /api/health     健康检查
// 状态码约定:
// - 周期完成 (含部分失败): 200,success 字段区分
// - 致命前置条件 (无门店/无配送员): 409
// - 仓储/内部错误: 500
// ==========================================

use crate::app::state::AppState;
use crate::domain::types::CycleType;
use crate::engine::CycleError;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;

// ==========================================
// 请求体
// ==========================================
#[derive(Debug, Deserialize)]
pub struct RunCycleRequest {
    pub cycle_type: CycleType,            // "morning" | "evening"
    pub target_date: Option<NaiveDate>,   // 缺省为当日
}

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub date: Option<NaiveDate>, // 缺省为当日
}

/// 构建路由
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/cycle/run", post(run_cycle))
        .route("/api/report", get(generate_report))
        .route("/api/health", get(health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

// ==========================================
// 处理器
// ==========================================

/// POST /api/cycle/run
async fn run_cycle(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RunCycleRequest>,
) -> Response {
    let target_date = request
        .target_date
        .unwrap_or_else(|| Utc::now().date_naive());

    let orchestrator = match state.build_orchestrator() {
        Ok(o) => o,
        Err(message) => return internal_error(&message),
    };

    match orchestrator.run_cycle(request.cycle_type, target_date).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(e @ (CycleError::NoActiveStores | CycleError::NoActiveDrivers)) => (
            StatusCode::CONFLICT,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
        Err(CycleError::Repository(e)) => internal_error(&e.to_string()),
    }
}

/// GET /api/report
async fn generate_report(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReportQuery>,
) -> Response {
    let report_date = query.date.unwrap_or_else(|| Utc::now().date_naive());

    let reporter = match state.build_reporter() {
        Ok(r) => r,
        Err(message) => return internal_error(&message),
    };

    match reporter.generate_report(report_date) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => internal_error(&e.to_string()),
    }
}

/// GET /api/health
async fn health() -> Response {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "name": crate::APP_NAME,
            "version": crate::VERSION,
        })),
    )
        .into_response()
}

fn internal_error(message: &str) -> Response {
    error!(error = %message, "请求处理失败");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message })),
    )
        .into_response()
}
