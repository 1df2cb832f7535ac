// ==========================================
// 门店拜访调度系统 - 配送员仓储
// ==========================================

use crate::domain::driver::Driver;
use crate::domain::types::EntityStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{Connection, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// DriverRepository - 配送员仓储
// ==========================================
pub struct DriverRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DriverRepository {
    /// 创建新的 DriverRepository 实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 查询所有 ACTIVE 配送员
    ///
    /// # 返回
    /// - `Ok(Vec<Driver>)`: 按 health_score 降序 (分配时的优先顺序),
    ///   同分按 driver_id 升序保证稳定
    pub fn list_active(&self) -> RepositoryResult<Vec<Driver>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT driver_id, driver_name, health_score, status, updated_at
               FROM driver
               WHERE status = 'ACTIVE'
               ORDER BY health_score DESC, driver_id"#,
        )?;

        let drivers = stmt
            .query_map([], |row| map_row(row))?
            .collect::<Result<Vec<Driver>, _>>()?;

        Ok(drivers)
    }
}

/// 行映射
fn map_row(row: &Row) -> rusqlite::Result<Driver> {
    let status: String = row.get(3)?;

    Ok(Driver {
        driver_id: row.get(0)?,
        driver_name: row.get(1)?,
        health_score: row.get(2)?,
        status: EntityStatus::from_str(&status),
        updated_at: row.get(4)?,
    })
}
