// ==========================================
// 门店拜访调度系统 - 绩效快照仓储
// ==========================================
// append-only: 只插入,永不更新
// 重跑同日周期会产生重复历史 (已知限制,非数据损坏)
// ==========================================

use crate::domain::performance::PerformanceSnapshot;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// PerformanceSnapshotRepository - 绩效快照仓储
// ==========================================
pub struct PerformanceSnapshotRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PerformanceSnapshotRepository {
    /// 创建新的 PerformanceSnapshotRepository 实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 追加绩效快照
    pub fn append(&self, snapshot: &PerformanceSnapshot) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO performance_snapshot (
                 snapshot_id, store_id, snapshot_date,
                 daily_sales, weekly_sales, monthly_sales,
                 visit_count_30d, communication_count_30d, inventory_age_days,
                 sell_through_rate, communication_score, restock_frequency,
                 performance_score, risk_score, recommendation, created_at
               ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, datetime('now'))"#,
            params![
                &snapshot.snapshot_id,
                &snapshot.store_id,
                &snapshot.snapshot_date,
                snapshot.daily_sales,
                snapshot.weekly_sales,
                snapshot.monthly_sales,
                snapshot.visit_count_30d,
                snapshot.communication_count_30d,
                snapshot.inventory_age_days,
                snapshot.sell_through_rate,
                snapshot.communication_score,
                snapshot.restock_frequency,
                snapshot.performance_score,
                snapshot.risk_score,
                &snapshot.recommendation,
            ],
        )?;

        Ok(snapshot.snapshot_id.clone())
    }

    /// 查询单门店快照历史 (时间降序)
    pub fn list_by_store(
        &self,
        store_id: &str,
        limit: i64,
    ) -> RepositoryResult<Vec<PerformanceSnapshot>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT snapshot_id, store_id, snapshot_date,
                      daily_sales, weekly_sales, monthly_sales,
                      visit_count_30d, communication_count_30d, inventory_age_days,
                      sell_through_rate, communication_score, restock_frequency,
                      performance_score, risk_score, recommendation, created_at
               FROM performance_snapshot
               WHERE store_id = ?
               ORDER BY snapshot_date DESC, created_at DESC
               LIMIT ?"#,
        )?;

        let snapshots = stmt
            .query_map(params![store_id, limit], |row| map_row(row))?
            .collect::<Result<Vec<PerformanceSnapshot>, _>>()?;

        Ok(snapshots)
    }
}

/// 行映射
fn map_row(row: &Row) -> rusqlite::Result<PerformanceSnapshot> {
    Ok(PerformanceSnapshot {
        snapshot_id: row.get(0)?,
        store_id: row.get(1)?,
        snapshot_date: row.get(2)?,
        daily_sales: row.get(3)?,
        weekly_sales: row.get(4)?,
        monthly_sales: row.get(5)?,
        visit_count_30d: row.get(6)?,
        communication_count_30d: row.get(7)?,
        inventory_age_days: row.get(8)?,
        sell_through_rate: row.get(9)?,
        communication_score: row.get(10)?,
        restock_frequency: row.get(11)?,
        performance_score: row.get(12)?,
        risk_score: row.get(13)?,
        recommendation: row.get(14)?,
        created_at: row.get(15)?,
    })
}
