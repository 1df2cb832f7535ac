// ==========================================
// 门店拜访调度系统 - 跟进任务仓储
// ==========================================
// 次日跟进任务播种的持久化目标,
// (store_id, due_date) 唯一,重复播种幂等忽略
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// ==========================================
// FollowUpTask - 跟进任务实体
// ==========================================
#[derive(Debug, Clone)]
pub struct FollowUpTask {
    pub task_id: String,
    pub store_id: String,
    pub due_date: NaiveDate,
    pub reason: String,
    pub created_at: chrono::NaiveDateTime,
}

// ==========================================
// FollowUpRepository - 跟进任务仓储
// ==========================================
pub struct FollowUpRepository {
    conn: Arc<Mutex<Connection>>,
}

impl FollowUpRepository {
    /// 创建新的 FollowUpRepository 实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 播种跟进任务 (已存在则忽略)
    ///
    /// # 返回
    /// - `Ok(true)`: 新插入
    /// - `Ok(false)`: 同键任务已存在,忽略
    pub fn seed(
        &self,
        store_id: &str,
        due_date: NaiveDate,
        reason: &str,
    ) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;

        let affected = conn.execute(
            r#"INSERT INTO follow_up_task (task_id, store_id, due_date, reason)
               VALUES (?, ?, ?, ?)
               ON CONFLICT(store_id, due_date) DO NOTHING"#,
            params![Uuid::new_v4().to_string(), store_id, due_date, reason],
        )?;

        Ok(affected > 0)
    }

    /// 查询某日到期的跟进任务
    pub fn list_due(&self, due_date: NaiveDate) -> RepositoryResult<Vec<FollowUpTask>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT task_id, store_id, due_date, reason, created_at
               FROM follow_up_task
               WHERE due_date = ?
               ORDER BY store_id"#,
        )?;

        let tasks = stmt
            .query_map(params![due_date], |row| {
                Ok(FollowUpTask {
                    task_id: row.get(0)?,
                    store_id: row.get(1)?,
                    due_date: row.get(2)?,
                    reason: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<FollowUpTask>, _>>()?;

        Ok(tasks)
    }
}
