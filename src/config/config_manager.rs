// ==========================================
// 门店拜访调度系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、默认值管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::db::open_sqlite_connection;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ==========================================
// CycleConfig - 单次周期的物化配置
// ==========================================
// 红线: 不允许隐藏的全局时钟/全局可变配置,
// 周期开始时物化一份,整个周期内不变
#[derive(Debug, Clone)]
pub struct CycleConfig {
    pub visit_frequency_default_days: i64, // 目标拜访周期默认值
    pub retention_score_threshold: f64,    // 高绩效保留阈值 (>该分即使未逾期也拜访)
    pub scoring_endpoint: Option<String>,  // 评分服务地址 (None=始终降级)
    pub scoring_timeout: Duration,         // 评分请求超时
    pub scoring_concurrency: usize,        // 评分并发上限
    pub per_stop_distance_km: f64,         // 每站平摊里程
    pub per_stop_duration_minutes: i64,    // 每站平摊耗时
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            visit_frequency_default_days: 7,
            retention_score_threshold: 70.0,
            scoring_endpoint: None,
            scoring_timeout: Duration::from_millis(10_000),
            scoring_concurrency: 4,
            per_stop_distance_km: 5.0,
            per_stop_duration_minutes: 30,
        }
    }
}

// ==========================================
// ReportConfig - 决策报告阈值配置
// ==========================================
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub bottleneck_stop_threshold: i64,   // 配送员站点数瓶颈阈值
    pub low_stock_days_threshold: f64,    // 低库存告警天数
    pub receivable_overdue_days: i64,     // 应收逾期高风险天数
    pub receivable_high_risk_amount: f64, // 应收高风险金额
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            bottleneck_stop_threshold: 12,
            low_stock_days_threshold: 7.0,
            receivable_overdue_days: 30,
            receivable_high_risk_amount: 2000.0,
        }
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明: 为保证连接行为一致,会对传入连接再次应用统一 PRAGMA (幂等)
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值 (scope_id='global')
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 从 config_kv 表读取配置值,带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 写入 global scope 配置值
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            r#"INSERT INTO config_kv (scope_id, key, value, updated_at)
               VALUES ('global', ?1, ?2, datetime('now'))
               ON CONFLICT(scope_id, key) DO UPDATE SET
                 value = excluded.value, updated_at = datetime('now')"#,
            params![key, value],
        )?;

        Ok(())
    }

    /// 物化周期配置 (非法值回落默认)
    pub fn load_cycle_config(&self) -> Result<CycleConfig, Box<dyn Error>> {
        let defaults = CycleConfig::default();

        let visit_frequency_default_days = self
            .get_config_or_default("visit_frequency_default_days", "7")?
            .parse::<i64>()
            .ok()
            .filter(|v| *v > 0)
            .unwrap_or(defaults.visit_frequency_default_days);

        let retention_score_threshold = self
            .get_config_or_default("retention_score_threshold", "70")?
            .parse::<f64>()
            .unwrap_or(defaults.retention_score_threshold);

        let scoring_endpoint = self
            .get_config_value("scoring_endpoint")?
            .filter(|v| !v.trim().is_empty());

        let scoring_timeout_ms = self
            .get_config_or_default("scoring_timeout_ms", "10000")?
            .parse::<u64>()
            .ok()
            .filter(|v| *v > 0)
            .unwrap_or(10_000);

        let scoring_concurrency = self
            .get_config_or_default("scoring_concurrency", "4")?
            .parse::<usize>()
            .ok()
            .filter(|v| *v > 0)
            .unwrap_or(defaults.scoring_concurrency);

        let per_stop_distance_km = self
            .get_config_or_default("per_stop_distance_km", "5")?
            .parse::<f64>()
            .unwrap_or(defaults.per_stop_distance_km);

        let per_stop_duration_minutes = self
            .get_config_or_default("per_stop_duration_minutes", "30")?
            .parse::<i64>()
            .unwrap_or(defaults.per_stop_duration_minutes);

        Ok(CycleConfig {
            visit_frequency_default_days,
            retention_score_threshold,
            scoring_endpoint,
            scoring_timeout: Duration::from_millis(scoring_timeout_ms),
            scoring_concurrency,
            per_stop_distance_km,
            per_stop_duration_minutes,
        })
    }

    /// 物化决策报告配置
    pub fn load_report_config(&self) -> Result<ReportConfig, Box<dyn Error>> {
        let defaults = ReportConfig::default();

        let bottleneck_stop_threshold = self
            .get_config_or_default("bottleneck_stop_threshold", "12")?
            .parse::<i64>()
            .ok()
            .filter(|v| *v > 0)
            .unwrap_or(defaults.bottleneck_stop_threshold);

        let low_stock_days_threshold = self
            .get_config_or_default("low_stock_days_threshold", "7")?
            .parse::<f64>()
            .unwrap_or(defaults.low_stock_days_threshold);

        let receivable_overdue_days = self
            .get_config_or_default("receivable_overdue_days", "30")?
            .parse::<i64>()
            .unwrap_or(defaults.receivable_overdue_days);

        let receivable_high_risk_amount = self
            .get_config_or_default("receivable_high_risk_amount", "2000")?
            .parse::<f64>()
            .unwrap_or(defaults.receivable_high_risk_amount);

        Ok(ReportConfig {
            bottleneck_stop_threshold,
            low_stock_days_threshold,
            receivable_overdue_days,
            receivable_high_risk_amount,
        })
    }
}
