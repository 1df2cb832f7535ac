// ==========================================
// 门店拜访调度系统 - 配置层
// ==========================================
// 存储: config_kv 表,scope_id='global'
// ==========================================

pub mod config_manager;

pub use config_manager::{ConfigManager, CycleConfig, ReportConfig};
