// ==========================================
// 门店拜访调度系统 - 决策报告生成器
// ==========================================
// 职责: 从评分后的累积数据生成只读车队报告
// 红线: 只读,不产生任何副作用 (不回写/不播种)
// 规则:
// - 品牌周环比: (本周-上周)/上周*100,上周为0恒为0
// - 可售天数: total_units / avg_daily_consumption,消耗为0哨兵999
// - 应收高风险: 逾期>30天 或 欠款>2000
// - 瓶颈: 当日站点数>阈值(默认12),达1.5倍为 critical
// - 车队健康度: 100 - 15*critical瓶颈 - 5*低库存 - 5*高风险应收,下限0
// ==========================================

use crate::config::ReportConfig;
use crate::decision::models::{
    BottleneckFlag, BrandTrend, IntelligenceReport, PerformerEntry, ReceivableRisk, StockRisk,
};
use crate::engine::safe_ratio;
use crate::repository::{
    ReportRepository, RepositoryResult, RoutePlanRepository, StoreRepository,
};
use chrono::{NaiveDate, Utc};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tracing::info;

/// 库存消耗为0时的可售天数哨兵
pub const STOCK_DAYS_SENTINEL: f64 = 999.0;

/// 绩效排行条数
const PERFORMER_LIMIT: i64 = 5;

/// critical 瓶颈的健康度罚分
const CRITICAL_BOTTLENECK_PENALTY: f64 = 15.0;

/// 低库存门店的健康度罚分
const LOW_STOCK_PENALTY: f64 = 5.0;

/// 高风险应收的健康度罚分
const HIGH_RISK_RECEIVABLE_PENALTY: f64 = 5.0;

// ==========================================
// IntelligenceReporter - 决策报告生成器
// ==========================================
pub struct IntelligenceReporter {
    report_repo: ReportRepository,
    plan_repo: RoutePlanRepository,
    store_repo: StoreRepository,
    config: ReportConfig,
}

impl IntelligenceReporter {
    /// 构造函数
    pub fn new(conn: Arc<Mutex<Connection>>, config: ReportConfig) -> Self {
        Self {
            report_repo: ReportRepository::new(conn.clone()),
            plan_repo: RoutePlanRepository::new(conn.clone()),
            store_repo: StoreRepository::new(conn),
            config,
        }
    }

    /// 生成车队决策报告
    ///
    /// # 参数
    /// - `report_date`: 报告基准日 (品牌窗口右端点,瓶颈取该日计划)
    pub fn generate_report(&self, report_date: NaiveDate) -> RepositoryResult<IntelligenceReport> {
        let brand_trends = self.compute_brand_trends(report_date)?;
        let stock_risks = self.compute_stock_risks()?;
        let (total_unpaid, receivable_risks) = self.compute_receivable_risks()?;
        let bottlenecks = self.compute_bottlenecks(report_date)?;
        let top_performers = self.list_performers(true)?;
        let bottom_performers = self.list_performers(false)?;

        let critical_bottlenecks = bottlenecks.iter().filter(|b| b.critical).count();
        let low_stock_count = stock_risks.iter().filter(|s| s.low_stock).count();
        let high_risk_count = receivable_risks.iter().filter(|r| r.high_risk).count();

        let fleet_health_score = (100.0
            - CRITICAL_BOTTLENECK_PENALTY * critical_bottlenecks as f64
            - LOW_STOCK_PENALTY * low_stock_count as f64
            - HIGH_RISK_RECEIVABLE_PENALTY * high_risk_count as f64)
            .max(0.0);

        info!(
            report_date = %report_date,
            brands = brand_trends.len(),
            critical_bottlenecks,
            low_stock_count,
            high_risk_count,
            fleet_health_score,
            "决策报告生成完成"
        );

        Ok(IntelligenceReport {
            report_date,
            generated_at: Utc::now().naive_utc(),
            brand_trends,
            stock_risks,
            total_unpaid,
            receivable_risks,
            bottlenecks,
            top_performers,
            bottom_performers,
            fleet_health_score,
        })
    }

    /// 品牌周环比趋势
    fn compute_brand_trends(&self, as_of: NaiveDate) -> RepositoryResult<Vec<BrandTrend>> {
        let windows = self.report_repo.brand_sales_windows(as_of)?;

        Ok(windows
            .into_iter()
            .map(|w| {
                // 上周为0时环比恒为0,不区分"从0增长"与"持平"
                let growth_rate = safe_ratio(
                    w.this_week_sales - w.last_week_sales,
                    w.last_week_sales,
                    0.0,
                ) * 100.0;

                BrandTrend {
                    brand: w.brand,
                    this_week_sales: w.this_week_sales,
                    last_week_sales: w.last_week_sales,
                    growth_rate,
                }
            })
            .collect())
    }

    /// 库存风险 (全量门店,low_stock 标记)
    fn compute_stock_risks(&self) -> RepositoryResult<Vec<StockRisk>> {
        let rows = self.report_repo.list_inventory()?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let days_until_critical = safe_ratio(
                    row.total_units,
                    row.avg_daily_consumption,
                    STOCK_DAYS_SENTINEL,
                );

                StockRisk {
                    store_id: row.store_id,
                    total_units: row.total_units,
                    avg_daily_consumption: row.avg_daily_consumption,
                    days_until_critical,
                    low_stock: days_until_critical < self.config.low_stock_days_threshold,
                }
            })
            .collect())
    }

    /// 应收风险与欠款合计
    fn compute_receivable_risks(&self) -> RepositoryResult<(f64, Vec<ReceivableRisk>)> {
        let rows = self.report_repo.list_receivables()?;

        let total_unpaid = rows.iter().map(|r| r.owed_amount).sum();

        let risks = rows
            .into_iter()
            .map(|row| {
                let high_risk = row.days_past_due > self.config.receivable_overdue_days
                    || row.owed_amount > self.config.receivable_high_risk_amount;

                ReceivableRisk {
                    store_id: row.store_id,
                    owed_amount: row.owed_amount,
                    days_past_due: row.days_past_due,
                    high_risk,
                }
            })
            .collect();

        Ok((total_unpaid, risks))
    }

    /// 当日负载瓶颈 (只看超阈值的配送员)
    fn compute_bottlenecks(&self, plan_date: NaiveDate) -> RepositoryResult<Vec<BottleneckFlag>> {
        let plans = self.plan_repo.list_by_date(plan_date)?;

        let critical_threshold =
            (self.config.bottleneck_stop_threshold as f64 * 1.5).ceil() as i64;

        Ok(plans
            .into_iter()
            .filter(|p| p.stop_count() as i64 > self.config.bottleneck_stop_threshold)
            .map(|p| {
                let stop_count = p.stop_count() as i64;
                BottleneckFlag {
                    driver_id: p.driver_id,
                    stop_count,
                    critical: stop_count >= critical_threshold,
                }
            })
            .collect())
    }

    /// 绩效排行 (前/后各5)
    fn list_performers(&self, descending: bool) -> RepositoryResult<Vec<PerformerEntry>> {
        let stores = self.store_repo.list_by_performance(PERFORMER_LIMIT, descending)?;

        Ok(stores
            .into_iter()
            .map(|s| PerformerEntry {
                store_id: s.store_id,
                store_name: s.store_name,
                performance_score: s.performance_score.unwrap_or(0.0),
                performance_tier: s.performance_tier,
            })
            .collect())
    }
}
