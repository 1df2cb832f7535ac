// ==========================================
// 门店拜访调度系统 - 决策报告聚合仓储
// ==========================================
// 职责: 为决策报告提供只读聚合行
// (品牌销售双周窗口/库存状态/应收账款)
// 约束: 只读,不做任何风险判定,阈值规则在决策层
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{Duration, NaiveDate};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// BrandSalesWindow - 品牌双周销售窗口
// ==========================================
#[derive(Debug, Clone)]
pub struct BrandSalesWindow {
    pub brand: String,         // 品牌
    pub this_week_sales: f64,  // 近7日销售额
    pub last_week_sales: f64,  // 前7日销售额
}

// ==========================================
// InventoryRow - 门店库存状态行
// ==========================================
#[derive(Debug, Clone)]
pub struct InventoryRow {
    pub store_id: String,
    pub total_units: f64,            // 库存总量
    pub avg_daily_consumption: f64,  // 日均消耗
    pub age_days: i64,               // 库存账龄
}

// ==========================================
// ReceivableRow - 门店应收账款行
// ==========================================
#[derive(Debug, Clone)]
pub struct ReceivableRow {
    pub store_id: String,
    pub owed_amount: f64,    // 欠款金额
    pub days_past_due: i64,  // 逾期天数
}

// ==========================================
// ReportRepository - 决策报告聚合仓储
// ==========================================
pub struct ReportRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ReportRepository {
    /// 创建新的 ReportRepository 实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按品牌聚合双周销售窗口
    ///
    /// # 窗口定义 (含当日)
    /// - 近7日: [as_of-6, as_of+1)
    /// - 前7日: [as_of-13, as_of-6)
    pub fn brand_sales_windows(&self, as_of: NaiveDate) -> RepositoryResult<Vec<BrandSalesWindow>> {
        let conn = self.get_conn()?;

        let this_week_start = (as_of - Duration::days(6)).format("%Y-%m-%d").to_string();
        let last_week_start = (as_of - Duration::days(13)).format("%Y-%m-%d").to_string();
        let day_end = (as_of + Duration::days(1)).format("%Y-%m-%d").to_string();

        let mut stmt = conn.prepare(
            r#"SELECT brand,
                 COALESCE(SUM(CASE WHEN sold_at >= ?1 THEN amount ELSE 0 END), 0),
                 COALESCE(SUM(CASE WHEN sold_at < ?1 THEN amount ELSE 0 END), 0)
               FROM sales_record
               WHERE sold_at >= ?2 AND sold_at < ?3
               GROUP BY brand
               ORDER BY brand"#,
        )?;

        let windows = stmt
            .query_map(params![this_week_start, last_week_start, day_end], |row| {
                Ok(BrandSalesWindow {
                    brand: row.get(0)?,
                    this_week_sales: row.get(1)?,
                    last_week_sales: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<BrandSalesWindow>, _>>()?;

        Ok(windows)
    }

    /// 查询全部门店库存状态
    pub fn list_inventory(&self) -> RepositoryResult<Vec<InventoryRow>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT store_id, total_units, avg_daily_consumption, age_days
               FROM inventory_status
               ORDER BY store_id"#,
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(InventoryRow {
                    store_id: row.get(0)?,
                    total_units: row.get(1)?,
                    avg_daily_consumption: row.get(2)?,
                    age_days: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<InventoryRow>, _>>()?;

        Ok(rows)
    }

    /// 查询全部应收账款 (仅有欠款的门店)
    pub fn list_receivables(&self) -> RepositoryResult<Vec<ReceivableRow>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT store_id, owed_amount, days_past_due
               FROM receivable_account
               WHERE owed_amount > 0
               ORDER BY store_id"#,
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(ReceivableRow {
                    store_id: row.get(0)?,
                    owed_amount: row.get(1)?,
                    days_past_due: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<ReceivableRow>, _>>()?;

        Ok(rows)
    }
}
