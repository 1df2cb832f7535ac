// ==========================================
// 决策报告生成器集成测试
// ==========================================
// 测试目标: 品牌周环比/库存风险/应收风险/
// 负载瓶颈/绩效排行/车队健康度
// ==========================================

mod helpers;

use chrono::{NaiveDate, Utc};
use helpers::test_data_builder::*;
use std::sync::Arc;

use store_visit_aps::config::ReportConfig;
use store_visit_aps::decision::{IntelligenceReporter, STOCK_DAYS_SENTINEL};
use store_visit_aps::domain::RoutePlan;
use store_visit_aps::logging;
use store_visit_aps::repository::RoutePlanRepository;

fn report_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 25).unwrap()
}

fn build_reporter(conn: &Arc<std::sync::Mutex<rusqlite::Connection>>) -> IntelligenceReporter {
    IntelligenceReporter::new(conn.clone(), ReportConfig::default())
}

/// 播种一份指定站点数的当日计划
fn seed_plan(conn: &Arc<std::sync::Mutex<rusqlite::Connection>>, driver_id: &str, stops: usize) {
    let now = Utc::now().naive_utc();
    let plan = RoutePlan {
        plan_id: uuid::Uuid::new_v4().to_string(),
        driver_id: driver_id.to_string(),
        plan_date: report_date(),
        store_ids: (0..stops).map(|i| format!("{}-S{:02}", driver_id, i)).collect(),
        optimization_score: 80,
        estimated_distance_km: stops as f64 * 5.0,
        estimated_duration_minutes: stops as i64 * 30,
        created_at: now,
        updated_at: now,
    };
    RoutePlanRepository::new(conn.clone())
        .upsert(&plan)
        .expect("播种计划失败");
}

// ==========================================
// 测试用例
// ==========================================

#[test]
fn test_brand_week_over_week_growth() {
    logging::init_test();

    let (_temp, conn) = create_test_db();
    let d = report_date();

    // Alpha: 本周1500 上周1000 -> +50%
    seed_sales(&conn, "S1", "Alpha", 1500.0, d - chrono::Duration::days(5));
    seed_sales(&conn, "S1", "Alpha", 1000.0, d - chrono::Duration::days(12));

    // Beta: 上周为0 -> 环比恒为0
    seed_sales(&conn, "S2", "Beta", 500.0, d - chrono::Duration::days(2));

    let report = build_reporter(&conn).generate_report(d).unwrap();

    assert_eq!(report.brand_trends.len(), 2);
    let alpha = &report.brand_trends[0];
    assert_eq!(alpha.brand, "Alpha");
    assert_eq!(alpha.this_week_sales, 1500.0);
    assert_eq!(alpha.last_week_sales, 1000.0);
    assert!((alpha.growth_rate - 50.0).abs() < 1e-9);

    let beta = &report.brand_trends[1];
    assert_eq!(beta.brand, "Beta");
    assert_eq!(beta.growth_rate, 0.0);
}

#[test]
fn test_stock_risk_sentinel_and_threshold() {
    logging::init_test();

    let (_temp, conn) = create_test_db();

    // 10件库存,日耗5 -> 可售2天,低于阈值7
    seed_inventory(&conn, "S1", 10.0, 5.0, 20);
    // 日耗为0 -> 哨兵999,不算低库存
    seed_inventory(&conn, "S2", 100.0, 0.0, 5);
    // 充足库存
    seed_inventory(&conn, "S3", 700.0, 10.0, 5);

    let report = build_reporter(&conn).generate_report(report_date()).unwrap();

    assert_eq!(report.stock_risks.len(), 3);
    let s1 = &report.stock_risks[0];
    assert_eq!(s1.days_until_critical, 2.0);
    assert!(s1.low_stock);

    let s2 = &report.stock_risks[1];
    assert_eq!(s2.days_until_critical, STOCK_DAYS_SENTINEL);
    assert!(!s2.low_stock);

    assert!(!report.stock_risks[2].low_stock);
}

#[test]
fn test_receivable_high_risk_rules() {
    logging::init_test();

    let (_temp, conn) = create_test_db();

    seed_receivable(&conn, "S1", 5000.0, 3); // 金额>2000 -> 高风险
    seed_receivable(&conn, "S2", 100.0, 45); // 逾期>30天 -> 高风险
    seed_receivable(&conn, "S3", 300.0, 10); // 均未超限

    let report = build_reporter(&conn).generate_report(report_date()).unwrap();

    assert_eq!(report.total_unpaid, 5400.0);
    assert_eq!(report.receivable_risks.len(), 3);
    assert!(report.receivable_risks[0].high_risk);
    assert!(report.receivable_risks[1].high_risk);
    assert!(!report.receivable_risks[2].high_risk);
}

#[test]
fn test_bottleneck_detection() {
    logging::init_test();

    let (_temp, conn) = create_test_db();

    seed_plan(&conn, "D1", 10); // 未超阈值12
    seed_plan(&conn, "D2", 13); // 瓶颈,未到临界
    seed_plan(&conn, "D3", 20); // 临界 (>= 18)

    let report = build_reporter(&conn).generate_report(report_date()).unwrap();

    assert_eq!(report.bottlenecks.len(), 2);
    let d2 = report.bottlenecks.iter().find(|b| b.driver_id == "D2").unwrap();
    assert_eq!(d2.stop_count, 13);
    assert!(!d2.critical);

    let d3 = report.bottlenecks.iter().find(|b| b.driver_id == "D3").unwrap();
    assert!(d3.critical);
}

#[test]
fn test_performer_rankings() {
    logging::init_test();

    let (_temp, conn) = create_test_db();

    for i in 1..=7 {
        StoreBuilder::new(&format!("S{}", i))
            .performance(i as f64 * 10.0)
            .insert(&conn);
    }
    // 未评分门店不进排行
    StoreBuilder::new("S8").insert(&conn);

    let report = build_reporter(&conn).generate_report(report_date()).unwrap();

    assert_eq!(report.top_performers.len(), 5);
    assert_eq!(report.top_performers[0].store_id, "S7");
    assert_eq!(report.top_performers[0].performance_score, 70.0);

    assert_eq!(report.bottom_performers.len(), 5);
    assert_eq!(report.bottom_performers[0].store_id, "S1");
    assert_eq!(report.bottom_performers[0].performance_score, 10.0);
}

#[test]
fn test_fleet_health_score() {
    logging::init_test();

    let (_temp, conn) = create_test_db();

    // 1个临界瓶颈 (-15),1家低库存 (-5),1个高风险应收 (-5)
    seed_plan(&conn, "D1", 20);
    seed_inventory(&conn, "S1", 10.0, 5.0, 20);
    seed_receivable(&conn, "S2", 5000.0, 3);

    let report = build_reporter(&conn).generate_report(report_date()).unwrap();

    assert_eq!(report.fleet_health_score, 75.0);
}

#[test]
fn test_fleet_health_floored_at_zero() {
    logging::init_test();

    let (_temp, conn) = create_test_db();

    // 7个临界瓶颈 -> 100 - 105,下限0
    for i in 1..=7 {
        seed_plan(&conn, &format!("D{}", i), 20);
    }

    let report = build_reporter(&conn).generate_report(report_date()).unwrap();

    assert_eq!(report.fleet_health_score, 0.0);
}

#[test]
fn test_empty_database_yields_healthy_report() {
    logging::init_test();

    let (_temp, conn) = create_test_db();

    let report = build_reporter(&conn).generate_report(report_date()).unwrap();

    assert!(report.brand_trends.is_empty());
    assert!(report.stock_risks.is_empty());
    assert!(report.receivable_risks.is_empty());
    assert!(report.bottlenecks.is_empty());
    assert_eq!(report.total_unpaid, 0.0);
    assert_eq!(report.fleet_health_score, 100.0);
}
