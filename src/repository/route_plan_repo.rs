// ==========================================
// 门店拜访调度系统 - 路线计划仓储
// ==========================================
// upsert 语义: 以 (driver_id, plan_date) 为键,
// 已存在则保留 plan_id 原地覆盖,不存在则新建
// ==========================================

use crate::domain::plan::RoutePlan;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// RoutePlanRepository - 路线计划仓储
// ==========================================
pub struct RoutePlanRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RoutePlanRepository {
    /// 创建新的 RoutePlanRepository 实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 写入路线计划 (upsert)
    ///
    /// # 参数
    /// - `plan`: 路线计划对象
    ///
    /// # 返回
    /// - `Ok(plan_id)`: 实际持久化的计划ID (冲突时为既有ID)
    pub fn upsert(&self, plan: &RoutePlan) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        let store_ids_json = serde_json::to_string(&plan.store_ids)?;

        conn.execute(
            r#"INSERT INTO route_plan (
                 plan_id, driver_id, plan_date, store_ids, stop_count,
                 optimization_score, estimated_distance_km,
                 estimated_duration_minutes, created_at, updated_at
               ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, datetime('now'), datetime('now'))
               ON CONFLICT(driver_id, plan_date) DO UPDATE SET
                 store_ids = excluded.store_ids,
                 stop_count = excluded.stop_count,
                 optimization_score = excluded.optimization_score,
                 estimated_distance_km = excluded.estimated_distance_km,
                 estimated_duration_minutes = excluded.estimated_duration_minutes,
                 updated_at = datetime('now')"#,
            params![
                &plan.plan_id,
                &plan.driver_id,
                &plan.plan_date,
                &store_ids_json,
                plan.store_ids.len() as i64,
                plan.optimization_score,
                plan.estimated_distance_km,
                plan.estimated_duration_minutes,
            ],
        )?;

        // 冲突路径下保留既有 plan_id
        let plan_id: String = conn.query_row(
            "SELECT plan_id FROM route_plan WHERE driver_id = ? AND plan_date = ?",
            params![&plan.driver_id, &plan.plan_date],
            |row| row.get(0),
        )?;

        Ok(plan_id)
    }

    /// 按 (driver_id, plan_date) 查询计划
    pub fn find_by_driver_date(
        &self,
        driver_id: &str,
        plan_date: NaiveDate,
    ) -> RepositoryResult<Option<RoutePlan>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            r#"SELECT plan_id, driver_id, plan_date, store_ids,
                      optimization_score, estimated_distance_km,
                      estimated_duration_minutes, created_at, updated_at
               FROM route_plan
               WHERE driver_id = ? AND plan_date = ?"#,
            params![driver_id, plan_date],
            |row| map_row(row),
        ) {
            Ok(row) => {
                let plan = finish_row(row)?;
                Ok(Some(plan))
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 查询某日全部计划
    pub fn list_by_date(&self, plan_date: NaiveDate) -> RepositoryResult<Vec<RoutePlan>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT plan_id, driver_id, plan_date, store_ids,
                      optimization_score, estimated_distance_km,
                      estimated_duration_minutes, created_at, updated_at
               FROM route_plan
               WHERE plan_date = ?
               ORDER BY driver_id"#,
        )?;

        let raw_rows = stmt
            .query_map(params![plan_date], |row| map_row(row))?
            .collect::<Result<Vec<RawPlanRow>, _>>()?;

        raw_rows.into_iter().map(finish_row).collect()
    }
}

/// 未反序列化 store_ids 的中间行
struct RawPlanRow {
    plan_id: String,
    driver_id: String,
    plan_date: NaiveDate,
    store_ids_json: String,
    optimization_score: i64,
    estimated_distance_km: f64,
    estimated_duration_minutes: i64,
    created_at: chrono::NaiveDateTime,
    updated_at: chrono::NaiveDateTime,
}

/// 行映射 (JSON 列在锁外反序列化)
fn map_row(row: &Row) -> rusqlite::Result<RawPlanRow> {
    Ok(RawPlanRow {
        plan_id: row.get(0)?,
        driver_id: row.get(1)?,
        plan_date: row.get(2)?,
        store_ids_json: row.get(3)?,
        optimization_score: row.get(4)?,
        estimated_distance_km: row.get(5)?,
        estimated_duration_minutes: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn finish_row(raw: RawPlanRow) -> RepositoryResult<RoutePlan> {
    let store_ids: Vec<String> = serde_json::from_str(&raw.store_ids_json)?;
    Ok(RoutePlan {
        plan_id: raw.plan_id,
        driver_id: raw.driver_id,
        plan_date: raw.plan_date,
        store_ids,
        optimization_score: raw.optimization_score,
        estimated_distance_km: raw.estimated_distance_km,
        estimated_duration_minutes: raw.estimated_duration_minutes,
        created_at: raw.created_at,
        updated_at: raw.updated_at,
    })
}
