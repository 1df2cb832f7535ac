// ==========================================
// 门店拜访调度系统 - 指标聚合仓储
// ==========================================
// 职责: 从原始流水 (销售/拜访/沟通/库存) 聚合出
//       单门店的 MetricsSnapshot,窗口固定
// 约束: 所有查询参数化,不拼业务规则
// ==========================================

use crate::domain::metrics::MetricsSnapshot;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{Duration, NaiveDate};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// MetricsRepository - 指标聚合仓储
// ==========================================
pub struct MetricsRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MetricsRepository {
    /// 创建新的 MetricsRepository 实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 聚合单门店指标快照
    ///
    /// # 参数
    /// - `store_id`: 门店ID
    /// - `as_of`: 基准日期 (窗口右端点,含当日)
    ///
    /// # 返回
    /// MetricsSnapshot,无流水时各计数为 0
    pub fn snapshot(&self, store_id: &str, as_of: NaiveDate) -> RepositoryResult<MetricsSnapshot> {
        let conn = self.get_conn()?;

        let day_start = as_of.format("%Y-%m-%d").to_string();
        let week_start = (as_of - Duration::days(6)).format("%Y-%m-%d").to_string();
        let month_start = (as_of - Duration::days(29)).format("%Y-%m-%d").to_string();
        let day_end = (as_of + Duration::days(1)).format("%Y-%m-%d").to_string();

        // 销售三窗口一次聚合
        let (daily_sales, weekly_sales, monthly_sales): (f64, f64, f64) = conn.query_row(
            r#"SELECT
                 COALESCE(SUM(CASE WHEN sold_at >= ?2 THEN amount ELSE 0 END), 0),
                 COALESCE(SUM(CASE WHEN sold_at >= ?3 THEN amount ELSE 0 END), 0),
                 COALESCE(SUM(amount), 0)
               FROM sales_record
               WHERE store_id = ?1 AND sold_at >= ?4 AND sold_at < ?5"#,
            params![store_id, day_start, week_start, month_start, day_end],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

        let driver_visit_count_30d: i64 = conn.query_row(
            r#"SELECT COUNT(*) FROM visit_record
               WHERE store_id = ?1 AND visited_at >= ?2 AND visited_at < ?3"#,
            params![store_id, month_start, day_end],
            |row| row.get(0),
        )?;

        let communication_count_30d: i64 = conn.query_row(
            r#"SELECT COUNT(*) FROM communication_record
               WHERE store_id = ?1 AND occurred_at >= ?2 AND occurred_at < ?3"#,
            params![store_id, month_start, day_end],
            |row| row.get(0),
        )?;

        let inventory_age_days: i64 = conn
            .query_row(
                "SELECT age_days FROM inventory_status WHERE store_id = ?1",
                params![store_id],
                |row| row.get(0),
            )
            .unwrap_or(0);

        Ok(MetricsSnapshot {
            store_id: store_id.to_string(),
            daily_sales,
            weekly_sales,
            monthly_sales,
            driver_visit_count_30d,
            communication_count_30d,
            inventory_age_days,
        })
    }
}
