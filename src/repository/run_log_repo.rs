// ==========================================
// 门店拜访调度系统 - 周期运行日志仓储
// ==========================================
// append-only 审计轨迹,成功失败都要落一条
// ==========================================

use crate::domain::run_log::{CycleResults, CycleRunLog};
use crate::domain::types::CycleType;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// RunLogRepository - 周期运行日志仓储
// ==========================================
pub struct RunLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RunLogRepository {
    /// 创建新的 RunLogRepository 实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 追加运行日志
    pub fn append(&self, log: &CycleRunLog) -> RepositoryResult<String> {
        let results_json = serde_json::to_string(&log.results)?;
        let errors_json = serde_json::to_string(&log.errors)?;

        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO cycle_run_log (
                 run_id, cycle_type, plan_date, results, success,
                 errors, duration_ms, started_at, completed_at
               ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            params![
                &log.run_id,
                log.cycle_type.to_db_str(),
                &log.plan_date,
                &results_json,
                log.success as i64,
                &errors_json,
                log.duration_ms,
                &log.started_at,
                &log.completed_at,
            ],
        )?;

        Ok(log.run_id.clone())
    }

    /// 查询最近 N 条运行日志 (时间降序)
    pub fn list_recent(&self, limit: i64) -> RepositoryResult<Vec<CycleRunLog>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT run_id, cycle_type, plan_date, results, success,
                      errors, duration_ms, started_at, completed_at
               FROM cycle_run_log
               ORDER BY started_at DESC
               LIMIT ?"#,
        )?;

        let raw = stmt
            .query_map(params![limit], |row| map_row(row))?
            .collect::<Result<Vec<RawLogRow>, _>>()?;

        raw.into_iter().map(finish_row).collect()
    }
}

/// 未反序列化 JSON 列的中间行
struct RawLogRow {
    run_id: String,
    cycle_type: String,
    plan_date: chrono::NaiveDate,
    results_json: String,
    success: bool,
    errors_json: String,
    duration_ms: i64,
    started_at: chrono::NaiveDateTime,
    completed_at: chrono::NaiveDateTime,
}

fn map_row(row: &Row) -> rusqlite::Result<RawLogRow> {
    Ok(RawLogRow {
        run_id: row.get(0)?,
        cycle_type: row.get(1)?,
        plan_date: row.get(2)?,
        results_json: row.get(3)?,
        success: row.get::<_, i64>(4)? != 0,
        errors_json: row.get(5)?,
        duration_ms: row.get(6)?,
        started_at: row.get(7)?,
        completed_at: row.get(8)?,
    })
}

fn finish_row(raw: RawLogRow) -> RepositoryResult<CycleRunLog> {
    let results: CycleResults = serde_json::from_str(&raw.results_json)?;
    let errors: Vec<String> = serde_json::from_str(&raw.errors_json)?;
    let cycle_type = CycleType::from_str(&raw.cycle_type).ok_or_else(|| {
        RepositoryError::ValidationError(format!("未知周期类型: {}", raw.cycle_type))
    })?;

    Ok(CycleRunLog {
        run_id: raw.run_id,
        cycle_type,
        plan_date: raw.plan_date,
        results,
        success: raw.success,
        errors,
        duration_ms: raw.duration_ms,
        started_at: raw.started_at,
        completed_at: raw.completed_at,
    })
}
