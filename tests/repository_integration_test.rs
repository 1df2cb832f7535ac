// ==========================================
// Repository 层集成测试
// ==========================================
// 测试目标: 指标窗口聚合/计划 upsert/跟进幂等/
// 运行日志往返/配置加载
// ==========================================

mod helpers;

use chrono::{Duration, NaiveDate, Utc};
use helpers::test_data_builder::*;

use store_visit_aps::config::ConfigManager;
use store_visit_aps::domain::run_log::{CycleResults, CycleRunLog, StepResult};
use store_visit_aps::domain::types::{CycleType, PerformanceTier, VisitRiskLevel};
use store_visit_aps::domain::RoutePlan;
use store_visit_aps::logging;
use store_visit_aps::repository::{
    FollowUpRepository, MetricsRepository, RepositoryError, RoutePlanRepository,
    RunLogRepository, StoreRepository,
};

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 25).unwrap()
}

// ==========================================
// 门店仓储
// ==========================================

#[test]
fn test_store_repo_update_and_not_found() {
    logging::init_test();

    let (_temp, conn) = create_test_db();
    StoreBuilder::new("S1").insert(&conn);

    let repo = StoreRepository::new(conn);

    repo.update_risk_level("S1", VisitRiskLevel::Critical).unwrap();
    repo.update_performance("S1", 88.0, PerformanceTier::Platinum).unwrap();

    let store = repo.find_by_id("S1").unwrap().unwrap();
    assert_eq!(store.visit_risk_level, VisitRiskLevel::Critical);
    assert_eq!(store.performance_score, Some(88.0));
    assert_eq!(store.performance_tier, Some(PerformanceTier::Platinum));

    // 不存在的门店: NotFound
    let err = repo
        .update_risk_level("MISSING", VisitRiskLevel::Normal)
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));
    assert!(repo.find_by_id("MISSING").unwrap().is_none());
}

// ==========================================
// 指标聚合
// ==========================================

#[test]
fn test_metrics_snapshot_windows() {
    logging::init_test();

    let (_temp, conn) = create_test_db();
    StoreBuilder::new("S1").insert(&conn);

    let d = as_of();

    // 当日/近7日/近30日三窗口
    seed_sales(&conn, "S1", "Alpha", 100.0, d);
    seed_sales(&conn, "S1", "Alpha", 200.0, d - Duration::days(3));
    seed_sales(&conn, "S1", "Alpha", 400.0, d - Duration::days(20));
    // 窗口外 (31天前) 不计入
    seed_sales(&conn, "S1", "Alpha", 999.0, d - Duration::days(31));
    // 其他门店不计入
    seed_sales(&conn, "S2", "Alpha", 999.0, d);

    seed_visit(&conn, "S1", "D1", d - Duration::days(2));
    seed_visit(&conn, "S1", "D1", d - Duration::days(15));
    seed_communication(&conn, "S1", d - Duration::days(1));
    seed_inventory(&conn, "S1", 100.0, 10.0, 12);

    let snapshot = MetricsRepository::new(conn).snapshot("S1", d).unwrap();

    assert_eq!(snapshot.daily_sales, 100.0);
    assert_eq!(snapshot.weekly_sales, 300.0);
    assert_eq!(snapshot.monthly_sales, 700.0);
    assert_eq!(snapshot.driver_visit_count_30d, 2);
    assert_eq!(snapshot.communication_count_30d, 1);
    assert_eq!(snapshot.inventory_age_days, 12);
}

#[test]
fn test_metrics_snapshot_empty_store() {
    logging::init_test();

    let (_temp, conn) = create_test_db();

    let snapshot = MetricsRepository::new(conn).snapshot("S1", as_of()).unwrap();

    assert_eq!(snapshot.daily_sales, 0.0);
    assert_eq!(snapshot.monthly_sales, 0.0);
    assert_eq!(snapshot.driver_visit_count_30d, 0);
    assert_eq!(snapshot.inventory_age_days, 0);
}

// ==========================================
// 路线计划 upsert
// ==========================================

#[test]
fn test_route_plan_upsert_preserves_plan_id() {
    logging::init_test();

    let (_temp, conn) = create_test_db();
    let repo = RoutePlanRepository::new(conn);
    let now = Utc::now().naive_utc();

    let make_plan = |plan_id: &str, store_ids: Vec<&str>| RoutePlan {
        plan_id: plan_id.to_string(),
        driver_id: "D1".to_string(),
        plan_date: as_of(),
        store_ids: store_ids.into_iter().map(String::from).collect(),
        optimization_score: 90,
        estimated_distance_km: 10.0,
        estimated_duration_minutes: 60,
        created_at: now,
        updated_at: now,
    };

    let first_id = repo.upsert(&make_plan("P1", vec!["S1", "S2"])).unwrap();
    assert_eq!(first_id, "P1");

    // 同键重写: plan_id 保留,内容覆盖
    let second_id = repo.upsert(&make_plan("P2", vec!["S3"])).unwrap();
    assert_eq!(second_id, "P1");

    let plan = repo.find_by_driver_date("D1", as_of()).unwrap().unwrap();
    assert_eq!(plan.plan_id, "P1");
    assert_eq!(plan.store_ids, vec!["S3"]);
    assert_eq!(repo.list_by_date(as_of()).unwrap().len(), 1);
}

// ==========================================
// 跟进任务
// ==========================================

#[test]
fn test_follow_up_seed_is_idempotent() {
    logging::init_test();

    let (_temp, conn) = create_test_db();
    let repo = FollowUpRepository::new(conn);
    let due = as_of() + Duration::days(1);

    assert!(repo.seed("S1", due, "拜访逾期").unwrap());
    assert!(!repo.seed("S1", due, "拜访逾期").unwrap());
    assert!(repo.seed("S1", due + Duration::days(1), "拜访逾期").unwrap());

    let tasks = repo.list_due(due).unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].store_id, "S1");
}

// ==========================================
// 运行日志
// ==========================================

#[test]
fn test_run_log_round_trip() {
    logging::init_test();

    let (_temp, conn) = create_test_db();
    let repo = RunLogRepository::new(conn);
    let now = Utc::now().naive_utc();

    let mut results = CycleResults::default();
    results.stores_classified = 3;
    results.steps.push(StepResult {
        step_name: "risk_sweep".to_string(),
        rows_affected: 3,
        duration_ms: 12,
        error: None,
    });

    let log = CycleRunLog {
        run_id: "run-1".to_string(),
        cycle_type: CycleType::Morning,
        plan_date: as_of(),
        results,
        success: true,
        errors: vec![],
        duration_ms: 42,
        started_at: now,
        completed_at: now,
    };

    repo.append(&log).unwrap();

    let logs = repo.list_recent(10).unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].run_id, "run-1");
    assert_eq!(logs[0].cycle_type, CycleType::Morning);
    assert_eq!(logs[0].results.stores_classified, 3);
    assert_eq!(logs[0].results.steps.len(), 1);
    assert!(logs[0].success);
}

// ==========================================
// 配置管理
// ==========================================

#[test]
fn test_config_manager_defaults_and_overrides() {
    logging::init_test();

    let (_temp, conn) = create_test_db();
    let manager = ConfigManager::from_connection(conn).unwrap();

    // 空表: 全默认
    let config = manager.load_cycle_config().unwrap();
    assert_eq!(config.visit_frequency_default_days, 7);
    assert_eq!(config.retention_score_threshold, 70.0);
    assert!(config.scoring_endpoint.is_none());
    assert_eq!(config.scoring_concurrency, 4);

    // 覆盖 + 非法值回落默认
    manager.set_config_value("retention_score_threshold", "80").unwrap();
    manager.set_config_value("scoring_endpoint", "http://localhost:9000/score").unwrap();
    manager.set_config_value("scoring_concurrency", "not-a-number").unwrap();

    let config = manager.load_cycle_config().unwrap();
    assert_eq!(config.retention_score_threshold, 80.0);
    assert_eq!(
        config.scoring_endpoint.as_deref(),
        Some("http://localhost:9000/score")
    );
    assert_eq!(config.scoring_concurrency, 4);

    let report_config = manager.load_report_config().unwrap();
    assert_eq!(report_config.bottleneck_stop_threshold, 12);
    assert_eq!(report_config.low_stock_days_threshold, 7.0);
}
