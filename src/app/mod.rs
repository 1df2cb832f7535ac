// ==========================================
// 门店拜访调度系统 - 应用层
// ==========================================
// 职责: 共享状态组装 + HTTP 触发面
// ==========================================

pub mod http;
pub mod state;

// 重导出
pub use http::create_router;
pub use state::{get_default_db_path, AppState};
