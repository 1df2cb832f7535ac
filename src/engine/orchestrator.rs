// ==========================================
// 门店拜访调度系统 - 周期编排引擎
// ==========================================
// 职责: 串联四个周期步骤并落审计日志
//   1. risk_sweep            拜访时效分类 + 风险等级回写
//   2. performance_scoring   指标聚合 + 评分 + 快照追加
//   3. route_assignment      候选分配 + 路线计划 upsert
//   4. follow_up_seeding     CRITICAL 门店次日跟进播种
// 失败语义:
// - 无 ACTIVE 门店/配送员: 周期级致命,立即返回,不写运行日志
// - 单步失败: 捕获进 StepResult,后续步骤继续
// - 运行日志: 无论成败必须落一条
// 并发约束: 数据库锁不得跨 await 持有,
// 评分步骤按 读取 -> 并发评分 -> 顺序回写 三段执行
// ==========================================

use crate::config::CycleConfig;
use crate::domain::run_log::{CycleOutcome, CycleResults, CycleRunLog, StepResult};
use crate::domain::store::{StalenessAssessment, Store};
use crate::domain::types::{CycleType, VisitRiskLevel};
use crate::engine::balancer::{AssignmentBalancer, VisitCandidate};
use crate::engine::scoring::{PerformanceScorer, ScoringContext};
use crate::engine::staleness::VisitStalenessEngine;
use crate::intelligence::ScoringProvider;
use crate::repository::{
    DriverRepository, FollowUpRepository, MetricsRepository, PerformanceSnapshotRepository,
    RepositoryError, RoutePlanRepository, RunLogRepository, StoreRepository,
};
use chrono::{Duration, NaiveDate, Utc};
use futures::stream::{self, StreamExt};
use rusqlite::Connection;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

/// 周期取消时记录的错误文案
const CANCELLED_MESSAGE: &str = "周期已取消,后续步骤未执行";

// ==========================================
// CycleError - 周期级错误
// ==========================================
// 仅致命前置条件与日志落库失败走该通道,
// 步骤内错误一律进 StepResult
#[derive(Error, Debug)]
pub enum CycleError {
    #[error("没有 ACTIVE 门店,周期终止")]
    NoActiveStores,

    #[error("没有 ACTIVE 配送员,周期终止")]
    NoActiveDrivers,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

// ==========================================
// CycleOrchestrator - 周期编排引擎
// ==========================================
pub struct CycleOrchestrator {
    store_repo: StoreRepository,
    driver_repo: DriverRepository,
    metrics_repo: MetricsRepository,
    plan_repo: RoutePlanRepository,
    snapshot_repo: PerformanceSnapshotRepository,
    run_log_repo: RunLogRepository,
    follow_up_repo: FollowUpRepository,
    scoring_provider: Arc<dyn ScoringProvider>,
    config: CycleConfig,
    cancel_flag: Arc<AtomicBool>,
}

impl CycleOrchestrator {
    /// 构造函数
    ///
    /// # 参数
    /// - `conn`: 共享数据库连接
    /// - `scoring_provider`: 评分服务接入点 (未配置时传 NoOpScoringProvider)
    /// - `config`: 周期开始前物化的配置,周期内不变
    pub fn new(
        conn: Arc<Mutex<Connection>>,
        scoring_provider: Arc<dyn ScoringProvider>,
        config: CycleConfig,
    ) -> Self {
        Self {
            store_repo: StoreRepository::new(conn.clone()),
            driver_repo: DriverRepository::new(conn.clone()),
            metrics_repo: MetricsRepository::new(conn.clone()),
            plan_repo: RoutePlanRepository::new(conn.clone()),
            snapshot_repo: PerformanceSnapshotRepository::new(conn.clone()),
            run_log_repo: RunLogRepository::new(conn.clone()),
            follow_up_repo: FollowUpRepository::new(conn),
            scoring_provider,
            config,
            cancel_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 取消句柄 (置 true 后,步骤边界处停止执行)
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancel_flag.clone()
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_flag.load(Ordering::SeqCst)
    }

    // ==========================================
    // 周期入口
    // ==========================================

    /// 执行一次完整周期
    ///
    /// # 参数
    /// - `cycle_type`: 早班/晚班
    /// - `target_date`: 计划日期 (时效分类与指标窗口的基准日)
    ///
    /// # 返回
    /// - `Ok(CycleOutcome)`: 周期完成 (含部分失败),运行日志已落库
    /// - `Err(CycleError)`: 致命前置条件不满足,未执行任何步骤
    pub async fn run_cycle(
        &self,
        cycle_type: CycleType,
        target_date: NaiveDate,
    ) -> Result<CycleOutcome, CycleError> {
        let run_id = Uuid::new_v4().to_string();
        let started_at = Utc::now().naive_utc();
        let cycle_started = Instant::now();

        info!(
            run_id = %run_id,
            cycle_type = %cycle_type,
            plan_date = %target_date,
            "周期开始"
        );

        // ===== 致命前置检查 (不写运行日志) =====
        let stores = self.store_repo.list_active()?;
        if stores.is_empty() {
            return Err(CycleError::NoActiveStores);
        }

        let drivers = self.driver_repo.list_active()?;
        if drivers.is_empty() {
            return Err(CycleError::NoActiveDrivers);
        }

        let mut results = CycleResults::default();
        let mut errors: Vec<String> = Vec::new();
        let mut assessments: HashMap<String, StalenessAssessment> = HashMap::new();

        // ===== 步骤 1: 拜访时效分类 =====
        self.execute_step("risk_sweep", &mut results, &mut errors, |r| {
            self.step_risk_sweep(&stores, target_date, r, &mut assessments)
        });

        // ===== 步骤 2: 绩效评分 =====
        if !self.check_cancelled(&mut results, &mut errors) {
            let step_started = Instant::now();
            let outcome = self
                .step_performance_scoring(&stores, target_date, &assessments, &mut results)
                .await;
            self.record_step("performance_scoring", step_started, outcome, &mut results, &mut errors);
        }

        // ===== 步骤 3: 路线分配 =====
        if !self.check_cancelled(&mut results, &mut errors) {
            self.execute_step("route_assignment", &mut results, &mut errors, |r| {
                self.step_route_assignment(&stores, &drivers, target_date, &assessments, r)
            });
        }

        // ===== 步骤 4: 跟进任务播种 =====
        if !self.check_cancelled(&mut results, &mut errors) {
            self.execute_step("follow_up_seeding", &mut results, &mut errors, |r| {
                self.step_follow_up_seeding(target_date, &assessments, r)
            });
        }

        // ===== 运行日志 (无论成败必落) =====
        let completed_at = Utc::now().naive_utc();
        let duration_ms = cycle_started.elapsed().as_millis() as i64;
        let success = errors.is_empty();

        let log = CycleRunLog {
            run_id: run_id.clone(),
            cycle_type,
            plan_date: target_date,
            results: results.clone(),
            success,
            errors: errors.clone(),
            duration_ms,
            started_at,
            completed_at,
        };

        if let Err(e) = self.run_log_repo.append(&log) {
            // 日志落库失败不吞掉周期结果,只记录
            error!(run_id = %run_id, error = %e, "运行日志写入失败");
        }

        info!(
            run_id = %run_id,
            success,
            stores_classified = results.stores_classified,
            stores_scored = results.stores_scored,
            plans_written = results.plans_written,
            follow_ups_seeded = results.follow_ups_seeded,
            duration_ms,
            "周期完成"
        );

        Ok(CycleOutcome {
            run_id,
            cycle_type,
            plan_date: target_date,
            success,
            results,
            errors,
            duration_ms,
        })
    }

    // ==========================================
    // 步骤封装
    // ==========================================

    /// 执行同步步骤并记录 StepResult (失败被捕获,不向上冒泡)
    fn execute_step<F>(
        &self,
        step_name: &str,
        results: &mut CycleResults,
        errors: &mut Vec<String>,
        body: F,
    ) where
        F: FnOnce(&mut CycleResults) -> Result<i64, String>,
    {
        let step_started = Instant::now();
        let outcome = body(results);
        self.record_step(step_name, step_started, outcome, results, errors);
    }

    fn record_step(
        &self,
        step_name: &str,
        step_started: Instant,
        outcome: Result<i64, String>,
        results: &mut CycleResults,
        errors: &mut Vec<String>,
    ) {
        let duration_ms = step_started.elapsed().as_millis() as i64;

        let step = match outcome {
            Ok(rows_affected) => {
                info!(step = step_name, rows_affected, duration_ms, "步骤完成");
                StepResult {
                    step_name: step_name.to_string(),
                    rows_affected,
                    duration_ms,
                    error: None,
                }
            }
            Err(message) => {
                warn!(step = step_name, error = %message, duration_ms, "步骤失败,后续步骤继续");
                errors.push(format!("{}: {}", step_name, message));
                StepResult {
                    step_name: step_name.to_string(),
                    rows_affected: 0,
                    duration_ms,
                    error: Some(message),
                }
            }
        };

        results.steps.push(step);
    }

    /// 步骤边界取消检查,取消时只记录一次
    fn check_cancelled(&self, results: &mut CycleResults, errors: &mut Vec<String>) -> bool {
        if !self.is_cancelled() {
            return false;
        }

        if !errors.iter().any(|e| e == CANCELLED_MESSAGE) {
            warn!("周期被取消");
            errors.push(CANCELLED_MESSAGE.to_string());
            results.steps.push(StepResult {
                step_name: "cancelled".to_string(),
                rows_affected: 0,
                duration_ms: 0,
                error: Some(CANCELLED_MESSAGE.to_string()),
            });
        }

        true
    }

    // ==========================================
    // 步骤 1: 拜访时效分类
    // ==========================================
    fn step_risk_sweep(
        &self,
        stores: &[Store],
        target_date: NaiveDate,
        results: &mut CycleResults,
        assessments: &mut HashMap<String, StalenessAssessment>,
    ) -> Result<i64, String> {
        let engine = VisitStalenessEngine::new(
            self.config.retention_score_threshold,
            self.config.visit_frequency_default_days,
        );

        for store in stores {
            let assessment = engine.classify(store, target_date);

            // 仅在等级变化时回写
            if assessment.risk_level != store.visit_risk_level {
                self.store_repo
                    .update_risk_level(&store.store_id, assessment.risk_level)
                    .map_err(|e| e.to_string())?;
                results.risk_levels_updated += 1;
            }

            results.stores_classified += 1;
            assessments.insert(store.store_id.clone(), assessment);
        }

        Ok(results.stores_classified)
    }

    // ==========================================
    // 步骤 2: 绩效评分
    // ==========================================
    // 三段式: 锁内读取 -> 锁外并发评分 -> 锁内顺序回写
    async fn step_performance_scoring(
        &self,
        stores: &[Store],
        target_date: NaiveDate,
        assessments: &HashMap<String, StalenessAssessment>,
        results: &mut CycleResults,
    ) -> Result<i64, String> {
        // 第一段: 读取指标快照
        let mut inputs = Vec::with_capacity(stores.len());
        for store in stores {
            let metrics = self
                .metrics_repo
                .snapshot(&store.store_id, target_date)
                .map_err(|e| e.to_string())?;

            let days_since_driver_visit = assessments
                .get(&store.store_id)
                .map(|a| a.days_since_visit)
                .unwrap_or(crate::engine::staleness::NEVER_VISITED_DAYS);

            inputs.push((metrics, ScoringContext { days_since_driver_visit }));
        }

        // 第二段: 并发评分 (无数据库锁)
        let scorer = PerformanceScorer::new();
        let scorer_ref = &scorer;
        let provider = self.scoring_provider.clone();

        let verdicts: Vec<_> = stream::iter(inputs)
            .map(|(metrics, ctx)| {
                let provider = provider.clone();
                async move {
                    let verdict = scorer_ref.score(&metrics, ctx, provider.as_ref()).await;
                    (metrics, verdict)
                }
            })
            .buffer_unordered(self.config.scoring_concurrency)
            .collect()
            .await;

        // 第三段: 顺序回写
        let now = Utc::now().naive_utc();
        for (metrics, verdict) in verdicts {
            self.store_repo
                .update_performance(&metrics.store_id, verdict.performance_score, verdict.tier)
                .map_err(|e| e.to_string())?;

            let snapshot = crate::domain::performance::PerformanceSnapshot {
                snapshot_id: Uuid::new_v4().to_string(),
                store_id: metrics.store_id.clone(),
                snapshot_date: target_date,
                daily_sales: metrics.daily_sales,
                weekly_sales: metrics.weekly_sales,
                monthly_sales: metrics.monthly_sales,
                visit_count_30d: metrics.driver_visit_count_30d,
                communication_count_30d: metrics.communication_count_30d,
                inventory_age_days: metrics.inventory_age_days,
                sell_through_rate: verdict.signals.sell_through_rate,
                communication_score: verdict.signals.communication_score,
                restock_frequency: verdict.signals.restock_frequency,
                performance_score: verdict.performance_score,
                risk_score: verdict.risk_score,
                recommendation: verdict.recommendation.clone(),
                created_at: now,
            };

            self.snapshot_repo
                .append(&snapshot)
                .map_err(|e| e.to_string())?;

            results.stores_scored += 1;
            results.snapshots_appended += 1;
            if verdict.used_fallback {
                results.fallback_scores += 1;
            }
        }

        Ok(results.stores_scored)
    }

    // ==========================================
    // 步骤 3: 路线分配
    // ==========================================
    fn step_route_assignment(
        &self,
        stores: &[Store],
        drivers: &[crate::domain::driver::Driver],
        target_date: NaiveDate,
        assessments: &HashMap<String, StalenessAssessment>,
        results: &mut CycleResults,
    ) -> Result<i64, String> {
        // 候选顺序继承 stores 的 store_id 升序,保证平级分配稳定
        let candidates: Vec<VisitCandidate> = stores
            .iter()
            .filter_map(|store| {
                assessments
                    .get(&store.store_id)
                    .filter(|a| a.needs_visit)
                    .map(|a| VisitCandidate::from_risk(&store.store_id, a.risk_level))
            })
            .collect();

        // 无候选是正常空转,不是错误
        if candidates.is_empty() {
            info!("无待拜访门店,跳过路线分配");
            return Ok(0);
        }

        let balancer = AssignmentBalancer::new(
            self.config.per_stop_distance_km,
            self.config.per_stop_duration_minutes,
        );

        let plans = balancer
            .build_plans(target_date, &candidates, drivers)
            .map_err(|e| e.to_string())?;

        for plan in &plans {
            self.plan_repo.upsert(plan).map_err(|e| e.to_string())?;
            results.plans_written += 1;
            results.stores_assigned += plan.stop_count() as i64;
        }

        Ok(results.plans_written)
    }

    // ==========================================
    // 步骤 4: 跟进任务播种
    // ==========================================
    // 分类后仍为 CRITICAL 的门店播种次日跟进,同键幂等忽略
    fn step_follow_up_seeding(
        &self,
        target_date: NaiveDate,
        assessments: &HashMap<String, StalenessAssessment>,
        results: &mut CycleResults,
    ) -> Result<i64, String> {
        let due_date = target_date + Duration::days(1);

        // 排序保证重跑时播种顺序稳定
        let mut critical: Vec<(&String, &StalenessAssessment)> = assessments
            .iter()
            .filter(|(_, a)| a.risk_level == VisitRiskLevel::Critical)
            .collect();
        critical.sort_by(|a, b| a.0.cmp(b.0));

        for (store_id, assessment) in critical {
            let reason = format!("拜访逾期 {} 天,风险等级 CRITICAL", assessment.days_since_visit);
            let inserted = self
                .follow_up_repo
                .seed(store_id, due_date, &reason)
                .map_err(|e| e.to_string())?;

            if inserted {
                results.follow_ups_seeded += 1;
            }
        }

        Ok(results.follow_ups_seeded)
    }
}
