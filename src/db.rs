// ==========================================
// 门店拜访调度系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为,避免"部分模块外键开启/部分不开启"
// - 统一 busy_timeout,减少并发写入时的偶发 busy 错误
// - 幂等建表 (CREATE TABLE IF NOT EXISTS),不做自动迁移
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// 默认 busy_timeout(毫秒)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明:
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 幂等地创建全部表结构
///
/// 说明:
/// - store/driver 及原始流水表由外部 CRUD 流程写入,本引擎读取
/// - route_plan / performance_snapshot / cycle_run_log / follow_up_task
///   是本引擎的持久化输出
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS store (
          store_id TEXT PRIMARY KEY,
          store_name TEXT NOT NULL,
          region TEXT,
          last_visit_date TEXT,
          visit_frequency_days INTEGER NOT NULL DEFAULT 7,
          visit_risk_level TEXT NOT NULL DEFAULT 'NORMAL',
          performance_score REAL,
          performance_tier TEXT,
          status TEXT NOT NULL DEFAULT 'ACTIVE',
          updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_store_status
          ON store(status, visit_risk_level);

        CREATE TABLE IF NOT EXISTS driver (
          driver_id TEXT PRIMARY KEY,
          driver_name TEXT NOT NULL,
          health_score REAL NOT NULL DEFAULT 100,
          status TEXT NOT NULL DEFAULT 'ACTIVE',
          updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS sales_record (
          record_id TEXT PRIMARY KEY,
          store_id TEXT NOT NULL,
          brand TEXT NOT NULL,
          amount REAL NOT NULL,
          sold_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_sales_store_date
          ON sales_record(store_id, sold_at);
        CREATE INDEX IF NOT EXISTS idx_sales_brand_date
          ON sales_record(brand, sold_at);

        CREATE TABLE IF NOT EXISTS visit_record (
          record_id TEXT PRIMARY KEY,
          store_id TEXT NOT NULL,
          driver_id TEXT NOT NULL,
          visited_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_visit_store_date
          ON visit_record(store_id, visited_at);

        CREATE TABLE IF NOT EXISTS communication_record (
          record_id TEXT PRIMARY KEY,
          store_id TEXT NOT NULL,
          channel TEXT,
          occurred_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_comm_store_date
          ON communication_record(store_id, occurred_at);

        CREATE TABLE IF NOT EXISTS inventory_status (
          store_id TEXT PRIMARY KEY,
          total_units REAL NOT NULL DEFAULT 0,
          avg_daily_consumption REAL NOT NULL DEFAULT 0,
          age_days INTEGER NOT NULL DEFAULT 0,
          updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS receivable_account (
          store_id TEXT PRIMARY KEY,
          owed_amount REAL NOT NULL DEFAULT 0,
          days_past_due INTEGER NOT NULL DEFAULT 0,
          updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS route_plan (
          plan_id TEXT PRIMARY KEY,
          driver_id TEXT NOT NULL,
          plan_date TEXT NOT NULL,
          store_ids TEXT NOT NULL,
          stop_count INTEGER NOT NULL DEFAULT 0,
          optimization_score INTEGER NOT NULL DEFAULT 0,
          estimated_distance_km REAL NOT NULL DEFAULT 0,
          estimated_duration_minutes INTEGER NOT NULL DEFAULT 0,
          created_at TEXT NOT NULL DEFAULT (datetime('now')),
          updated_at TEXT NOT NULL DEFAULT (datetime('now')),
          UNIQUE(driver_id, plan_date)
        );

        CREATE TABLE IF NOT EXISTS performance_snapshot (
          snapshot_id TEXT PRIMARY KEY,
          store_id TEXT NOT NULL,
          snapshot_date TEXT NOT NULL,
          daily_sales REAL NOT NULL DEFAULT 0,
          weekly_sales REAL NOT NULL DEFAULT 0,
          monthly_sales REAL NOT NULL DEFAULT 0,
          visit_count_30d INTEGER NOT NULL DEFAULT 0,
          communication_count_30d INTEGER NOT NULL DEFAULT 0,
          inventory_age_days INTEGER NOT NULL DEFAULT 0,
          sell_through_rate REAL NOT NULL DEFAULT 0,
          communication_score REAL NOT NULL DEFAULT 0,
          restock_frequency INTEGER NOT NULL DEFAULT 0,
          performance_score REAL NOT NULL DEFAULT 0,
          risk_score REAL NOT NULL DEFAULT 0,
          recommendation TEXT NOT NULL DEFAULT '',
          created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_perf_snapshot_store_date
          ON performance_snapshot(store_id, snapshot_date DESC);

        CREATE TABLE IF NOT EXISTS cycle_run_log (
          run_id TEXT PRIMARY KEY,
          cycle_type TEXT NOT NULL,
          plan_date TEXT NOT NULL,
          results TEXT NOT NULL,
          success INTEGER NOT NULL DEFAULT 0,
          errors TEXT NOT NULL DEFAULT '[]',
          duration_ms INTEGER NOT NULL DEFAULT 0,
          started_at TEXT NOT NULL,
          completed_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_run_log_date
          ON cycle_run_log(plan_date, started_at DESC);

        CREATE TABLE IF NOT EXISTS follow_up_task (
          task_id TEXT PRIMARY KEY,
          store_id TEXT NOT NULL,
          due_date TEXT NOT NULL,
          reason TEXT NOT NULL,
          created_at TEXT NOT NULL DEFAULT (datetime('now')),
          UNIQUE(store_id, due_date)
        );

        CREATE TABLE IF NOT EXISTS config_kv (
          scope_id TEXT NOT NULL DEFAULT 'global',
          key TEXT NOT NULL,
          value TEXT NOT NULL,
          updated_at TEXT NOT NULL DEFAULT (datetime('now')),
          PRIMARY KEY (scope_id, key)
        );
        "#,
    )?;
    Ok(())
}
