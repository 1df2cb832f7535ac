// ==========================================
// 门店拜访调度系统 - 日志初始化
// ==========================================
// 基于 tracing / tracing-subscriber
// HTTP 请求日志由 tower-http 的 TraceLayer 产生,
// 默认过滤器需要一并放行
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 初始化服务进程的日志系统
///
/// # 环境变量
/// - RUST_LOG: 过滤器,未设置时默认
///   `info,tower_http=info`
///   排查周期执行问题时可用:
///   RUST_LOG=store_visit_aps::engine=debug
///
/// # 示例
/// ```no_run
/// use store_visit_aps::logging;
/// logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .init();
}

/// 初始化测试用日志
///
/// 只放开本 crate 的 debug,可重复调用
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("store_visit_aps=debug"))
        .with_test_writer()
        .try_init();
}
