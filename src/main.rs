// ==========================================
// 门店拜访调度系统 - HTTP 服务主入口
// ==========================================
// 由外部调度器 (cron) 经 HTTP 触发周期,
// 端口来自 PORT 环境变量,默认 8080
// ==========================================

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use store_visit_aps::app::{create_router, get_default_db_path, AppState};
use store_visit_aps::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("门店拜访调度系统 - 拜访决策引擎");
    tracing::info!("系统版本: {}", store_visit_aps::VERSION);
    tracing::info!("==================================================");

    // 获取数据库路径
    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    // 创建AppState
    let app_state = AppState::new(db_path)
        .map_err(|e| anyhow::anyhow!(e))
        .context("无法初始化AppState")?;

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let router = create_router(Arc::new(app_state));

    tracing::info!("HTTP 服务监听: http://{}", addr);
    tracing::info!("  POST /api/cycle/run  触发周期");
    tracing::info!("  GET  /api/report     决策报告");
    tracing::info!("  GET  /api/health     健康检查");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("端口绑定失败")?;

    axum::serve(listener, router).await.context("HTTP 服务异常退出")?;

    Ok(())
}
