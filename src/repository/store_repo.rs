// ==========================================
// 门店拜访调度系统 - 门店仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::store::Store;
use crate::domain::types::{EntityStatus, PerformanceTier, VisitRiskLevel};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// StoreRepository - 门店仓储
// ==========================================
pub struct StoreRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StoreRepository {
    /// 创建新的 StoreRepository 实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 查询所有 ACTIVE 门店
    ///
    /// # 返回
    /// - `Ok(Vec<Store>)`: 门店列表,按 store_id 升序 (保证分配的稳定顺序)
    pub fn list_active(&self) -> RepositoryResult<Vec<Store>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT store_id, store_name, region, last_visit_date,
                      visit_frequency_days, visit_risk_level,
                      performance_score, performance_tier, status, updated_at
               FROM store
               WHERE status = 'ACTIVE'
               ORDER BY store_id"#,
        )?;

        let stores = stmt
            .query_map([], |row| map_row(row))?
            .collect::<Result<Vec<Store>, _>>()?;

        Ok(stores)
    }

    /// 按 store_id 查询门店
    pub fn find_by_id(&self, store_id: &str) -> RepositoryResult<Option<Store>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            r#"SELECT store_id, store_name, region, last_visit_date,
                      visit_frequency_days, visit_risk_level,
                      performance_score, performance_tier, status, updated_at
               FROM store
               WHERE store_id = ?"#,
            params![store_id],
            |row| map_row(row),
        ) {
            Ok(store) => Ok(Some(store)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 回写风险等级
    ///
    /// 调用方负责"仅在等级变化时回写"的判断
    pub fn update_risk_level(
        &self,
        store_id: &str,
        level: VisitRiskLevel,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let affected = conn.execute(
            r#"UPDATE store
               SET visit_risk_level = ?, updated_at = datetime('now')
               WHERE store_id = ?"#,
            params![level.to_db_str(), store_id],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Store".to_string(),
                id: store_id.to_string(),
            });
        }

        Ok(())
    }

    /// 回写绩效得分与档位
    pub fn update_performance(
        &self,
        store_id: &str,
        score: f64,
        tier: PerformanceTier,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let affected = conn.execute(
            r#"UPDATE store
               SET performance_score = ?, performance_tier = ?,
                   updated_at = datetime('now')
               WHERE store_id = ?"#,
            params![score, tier.to_db_str(), store_id],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Store".to_string(),
                id: store_id.to_string(),
            });
        }

        Ok(())
    }

    /// 绩效排行 (降序/升序各取 limit 条,用于决策报告)
    pub fn list_by_performance(
        &self,
        limit: i64,
        descending: bool,
    ) -> RepositoryResult<Vec<Store>> {
        let conn = self.get_conn()?;

        let order = if descending { "DESC" } else { "ASC" };
        let sql = format!(
            r#"SELECT store_id, store_name, region, last_visit_date,
                      visit_frequency_days, visit_risk_level,
                      performance_score, performance_tier, status, updated_at
               FROM store
               WHERE status = 'ACTIVE' AND performance_score IS NOT NULL
               ORDER BY performance_score {}
               LIMIT ?"#,
            order
        );

        let mut stmt = conn.prepare(&sql)?;
        let stores = stmt
            .query_map(params![limit], |row| map_row(row))?
            .collect::<Result<Vec<Store>, _>>()?;

        Ok(stores)
    }
}

/// 行映射
fn map_row(row: &Row) -> rusqlite::Result<Store> {
    let risk_level: String = row.get(5)?;
    let tier: Option<String> = row.get(7)?;
    let status: String = row.get(8)?;

    Ok(Store {
        store_id: row.get(0)?,
        store_name: row.get(1)?,
        region: row.get(2)?,
        last_visit_date: row.get(3)?,
        visit_frequency_days: row.get(4)?,
        visit_risk_level: VisitRiskLevel::from_str(&risk_level),
        performance_score: row.get(6)?,
        performance_tier: tier.map(|t| PerformanceTier::from_str(&t)),
        status: EntityStatus::from_str(&status),
        updated_at: row.get(9)?,
    })
}
