// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================
// 职责: 临时数据库初始化 + 门店/配送员构建器 +
//       原始流水播种辅助函数
// ==========================================

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;
use uuid::Uuid;

use store_visit_aps::db::{configure_sqlite_connection, ensure_schema};
use store_visit_aps::domain::types::{EntityStatus, VisitRiskLevel};

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件 (需要保持存活)
/// - Arc<Mutex<Connection>>: 共享连接
pub fn create_test_db() -> (NamedTempFile, Arc<Mutex<Connection>>) {
    let temp_file = NamedTempFile::new().expect("创建临时文件失败");
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = Connection::open(&db_path).expect("打开测试数据库失败");
    configure_sqlite_connection(&conn).expect("配置连接失败");
    ensure_schema(&conn).expect("初始化 schema 失败");

    (temp_file, Arc::new(Mutex::new(conn)))
}

// ==========================================
// Store 构建器
// ==========================================

pub struct StoreBuilder {
    store_id: String,
    store_name: String,
    region: Option<String>,
    last_visit_date: Option<NaiveDate>,
    visit_frequency_days: i64,
    visit_risk_level: VisitRiskLevel,
    performance_score: Option<f64>,
    status: EntityStatus,
}

impl StoreBuilder {
    pub fn new(store_id: &str) -> Self {
        Self {
            store_id: store_id.to_string(),
            store_name: format!("门店{}", store_id),
            region: None,
            last_visit_date: None,
            visit_frequency_days: 7,
            visit_risk_level: VisitRiskLevel::Normal,
            performance_score: None,
            status: EntityStatus::Active,
        }
    }

    pub fn last_visit(mut self, date: NaiveDate) -> Self {
        self.last_visit_date = Some(date);
        self
    }

    pub fn frequency(mut self, days: i64) -> Self {
        self.visit_frequency_days = days;
        self
    }

    pub fn region(mut self, region: &str) -> Self {
        self.region = Some(region.to_string());
        self
    }

    pub fn risk_level(mut self, level: VisitRiskLevel) -> Self {
        self.visit_risk_level = level;
        self
    }

    pub fn performance(mut self, score: f64) -> Self {
        self.performance_score = Some(score);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.status = EntityStatus::Inactive;
        self
    }

    /// 插入数据库
    pub fn insert(self, conn: &Arc<Mutex<Connection>>) {
        let guard = conn.lock().unwrap();
        guard
            .execute(
                r#"INSERT INTO store (
                     store_id, store_name, region, last_visit_date,
                     visit_frequency_days, visit_risk_level,
                     performance_score, status
                   ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
                params![
                    self.store_id,
                    self.store_name,
                    self.region,
                    self.last_visit_date,
                    self.visit_frequency_days,
                    self.visit_risk_level.to_db_str(),
                    self.performance_score,
                    self.status.to_db_str(),
                ],
            )
            .expect("插入门店失败");
    }
}

// ==========================================
// Driver 构建器
// ==========================================

pub struct DriverBuilder {
    driver_id: String,
    driver_name: String,
    health_score: f64,
    status: EntityStatus,
}

impl DriverBuilder {
    pub fn new(driver_id: &str) -> Self {
        Self {
            driver_id: driver_id.to_string(),
            driver_name: format!("配送员{}", driver_id),
            health_score: 100.0,
            status: EntityStatus::Active,
        }
    }

    pub fn health(mut self, score: f64) -> Self {
        self.health_score = score;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.status = EntityStatus::Inactive;
        self
    }

    /// 插入数据库
    pub fn insert(self, conn: &Arc<Mutex<Connection>>) {
        let guard = conn.lock().unwrap();
        guard
            .execute(
                r#"INSERT INTO driver (driver_id, driver_name, health_score, status)
                   VALUES (?, ?, ?, ?)"#,
                params![
                    self.driver_id,
                    self.driver_name,
                    self.health_score,
                    self.status.to_db_str(),
                ],
            )
            .expect("插入配送员失败");
    }
}

// ==========================================
// 原始流水播种辅助
// ==========================================

pub fn seed_sales(
    conn: &Arc<Mutex<Connection>>,
    store_id: &str,
    brand: &str,
    amount: f64,
    sold_at: NaiveDate,
) {
    let guard = conn.lock().unwrap();
    guard
        .execute(
            "INSERT INTO sales_record (record_id, store_id, brand, amount, sold_at) VALUES (?, ?, ?, ?, ?)",
            params![Uuid::new_v4().to_string(), store_id, brand, amount, sold_at],
        )
        .expect("插入销售流水失败");
}

pub fn seed_visit(
    conn: &Arc<Mutex<Connection>>,
    store_id: &str,
    driver_id: &str,
    visited_at: NaiveDate,
) {
    let guard = conn.lock().unwrap();
    guard
        .execute(
            "INSERT INTO visit_record (record_id, store_id, driver_id, visited_at) VALUES (?, ?, ?, ?)",
            params![Uuid::new_v4().to_string(), store_id, driver_id, visited_at],
        )
        .expect("插入拜访流水失败");
}

pub fn seed_communication(conn: &Arc<Mutex<Connection>>, store_id: &str, occurred_at: NaiveDate) {
    let guard = conn.lock().unwrap();
    guard
        .execute(
            "INSERT INTO communication_record (record_id, store_id, channel, occurred_at) VALUES (?, ?, 'phone', ?)",
            params![Uuid::new_v4().to_string(), store_id, occurred_at],
        )
        .expect("插入沟通流水失败");
}

pub fn seed_inventory(
    conn: &Arc<Mutex<Connection>>,
    store_id: &str,
    total_units: f64,
    avg_daily_consumption: f64,
    age_days: i64,
) {
    let guard = conn.lock().unwrap();
    guard
        .execute(
            r#"INSERT INTO inventory_status (store_id, total_units, avg_daily_consumption, age_days)
               VALUES (?, ?, ?, ?)"#,
            params![store_id, total_units, avg_daily_consumption, age_days],
        )
        .expect("插入库存状态失败");
}

pub fn seed_receivable(
    conn: &Arc<Mutex<Connection>>,
    store_id: &str,
    owed_amount: f64,
    days_past_due: i64,
) {
    let guard = conn.lock().unwrap();
    guard
        .execute(
            "INSERT INTO receivable_account (store_id, owed_amount, days_past_due) VALUES (?, ?, ?)",
            params![store_id, owed_amount, days_past_due],
        )
        .expect("插入应收账款失败");
}
