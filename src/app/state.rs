// ==========================================
// 门店拜访调度系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态,
// 按请求物化配置并组装编排引擎/报告生成器
// ==========================================

use rusqlite::Connection;
use std::sync::{Arc, Mutex};

use crate::config::config_manager::ConfigManager;
use crate::db::{ensure_schema, open_sqlite_connection};
use crate::decision::IntelligenceReporter;
use crate::engine::CycleOrchestrator;
use crate::intelligence::{HttpScoringProvider, NoOpScoringProvider, ScoringProvider};

/// 应用状态
///
/// 持有共享数据库连接与配置管理器,
/// 编排引擎按请求组装 (配置在周期开始时物化一次)
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 共享数据库连接
    conn: Arc<Mutex<Connection>>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 说明
    /// 该方法会:
    /// 1. 打开共享连接并应用统一 PRAGMA
    /// 2. 幂等建表
    /// 3. 初始化 ConfigManager
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState,数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;

        ensure_schema(&conn).map_err(|e| format!("建表失败: {}", e))?;

        let conn = Arc::new(Mutex::new(conn));

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            conn,
            config_manager,
        })
    }

    /// 组装周期编排引擎
    ///
    /// 配置在此刻物化一份,整个周期内不变;
    /// 未配置评分服务地址时注入 NoOp 实现 (评分步骤走确定性降级)
    pub fn build_orchestrator(&self) -> Result<CycleOrchestrator, String> {
        let config = self
            .config_manager
            .load_cycle_config()
            .map_err(|e| format!("周期配置加载失败: {}", e))?;

        let provider: Arc<dyn ScoringProvider> = match &config.scoring_endpoint {
            Some(endpoint) => {
                let http = HttpScoringProvider::new(endpoint, config.scoring_timeout)
                    .map_err(|e| format!("评分客户端初始化失败: {}", e))?;
                Arc::new(http)
            }
            None => {
                tracing::info!("未配置评分服务,评分步骤将使用降级默认值");
                Arc::new(NoOpScoringProvider)
            }
        };

        Ok(CycleOrchestrator::new(self.conn.clone(), provider, config))
    }

    /// 组装决策报告生成器
    pub fn build_reporter(&self) -> Result<IntelligenceReporter, String> {
        let config = self
            .config_manager
            .load_report_config()
            .map_err(|e| format!("报告配置加载失败: {}", e))?;

        Ok(IntelligenceReporter::new(self.conn.clone(), config))
    }

    /// 获取数据库路径
    pub fn get_db_path(&self) -> &str {
        &self.db_path
    }
}

// ==========================================
// 默认数据库路径辅助函数
// ==========================================

/// 获取默认数据库路径
///
/// # 返回
/// - 环境变量 STORE_VISIT_APS_DB_PATH 优先
/// - 开发环境: 用户数据目录/store-visit-aps-dev/store_visit_aps.db
/// - 生产环境: 用户数据目录/store-visit-aps/store_visit_aps.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径 (便于调试/测试/CI)
    if let Ok(path) = std::env::var("STORE_VISIT_APS_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./store_visit_aps.db");

    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录,避免污染生产数据
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("store-visit-aps-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("store-visit-aps");
        }

        std::fs::create_dir_all(&path).ok();
        path = path.join("store_visit_aps.db");
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }

    // 注意: AppState::new() 的测试需要真实的数据库文件
    // 这些测试在集成测试中进行
}
