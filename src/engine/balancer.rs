// ==========================================
// 门店拜访调度系统 - 分配均衡引擎
// ==========================================
// 职责: 将待拜访门店按优先级切分到可用配送员
// 算法: 稳定排序 + 上取整均分 + 连续切块
// 保证:
// - 每个待拜访门店恰好分配给一个配送员
// - 各块站点数不超过上取整均分值,只有末块可能更小
// - 高优先级门店集中在健康度靠前的配送员
// ==========================================

use crate::domain::driver::Driver;
use crate::domain::plan::RoutePlan;
use crate::domain::types::VisitRiskLevel;
use crate::engine::safe_ratio;
use chrono::{NaiveDate, Utc};
use thiserror::Error;
use uuid::Uuid;

// ==========================================
// VisitCandidate - 待拜访候选
// ==========================================
#[derive(Debug, Clone)]
pub struct VisitCandidate {
    pub store_id: String,           // 门店ID
    pub risk_level: VisitRiskLevel, // 风险等级
    pub priority: u8,               // 数值优先级 (3/2/1)
}

impl VisitCandidate {
    /// 由风险等级构造候选
    ///
    /// # 优先级
    /// - CRITICAL = 3
    /// - AT_RISK = 2
    /// - NORMAL (高绩效保留) = 1
    pub fn from_risk(store_id: &str, risk_level: VisitRiskLevel) -> Self {
        let priority = match risk_level {
            VisitRiskLevel::Critical => 3,
            VisitRiskLevel::AtRisk => 2,
            VisitRiskLevel::Normal => 1,
        };

        Self {
            store_id: store_id.to_string(),
            risk_level,
            priority,
        }
    }

    /// 是否属于风险覆盖统计口径 (AT_RISK 或 CRITICAL)
    fn is_risky(&self) -> bool {
        self.priority >= 2
    }
}

// ==========================================
// AssignmentError - 分配错误
// ==========================================
// 无可分配对象是周期级致命条件,
// 必须显式短路,不允许静默产出空计划
#[derive(Error, Debug, PartialEq)]
pub enum AssignmentError {
    #[error("没有可用配送员,无法分配")]
    NoActiveDrivers,

    #[error("没有待拜访门店,无法分配")]
    NoVisitCandidates,
}

// ==========================================
// AssignmentBalancer - 分配均衡引擎
// ==========================================
pub struct AssignmentBalancer {
    per_stop_distance_km: f64,     // 每站平摊里程
    per_stop_duration_minutes: i64, // 每站平摊耗时
}

impl AssignmentBalancer {
    /// 构造函数
    ///
    /// # 参数
    /// - `per_stop_distance_km`: 每站平摊里程 (声明式成本,非真实路由)
    /// - `per_stop_duration_minutes`: 每站平摊耗时
    pub fn new(per_stop_distance_km: f64, per_stop_duration_minutes: i64) -> Self {
        Self {
            per_stop_distance_km,
            per_stop_duration_minutes,
        }
    }

    /// 生成单日路线计划
    ///
    /// # 算法
    /// 1. 候选按优先级降序稳定排序 (同级保持输入顺序,不重排)
    /// 2. 配送员按健康度降序 (同分按ID稳定)
    /// 3. stops_per_driver = ceil(候选数 / 配送员数)
    /// 4. 排序后的候选连续切块,第 i 块给第 i 个配送员
    ///
    /// # 参数
    /// - `plan_date`: 计划日期
    /// - `candidates`: 待拜访候选 (保持调用方给出的原始顺序作平级次序)
    /// - `drivers`: 可用配送员
    ///
    /// # 返回
    /// 每个拿到切块的配送员一份 RoutePlan
    pub fn build_plans(
        &self,
        plan_date: NaiveDate,
        candidates: &[VisitCandidate],
        drivers: &[Driver],
    ) -> Result<Vec<RoutePlan>, AssignmentError> {
        if drivers.is_empty() {
            return Err(AssignmentError::NoActiveDrivers);
        }
        if candidates.is_empty() {
            return Err(AssignmentError::NoVisitCandidates);
        }

        // 稳定排序: 优先级降序,同级保持输入顺序
        let mut sorted: Vec<&VisitCandidate> = candidates.iter().collect();
        sorted.sort_by(|a, b| b.priority.cmp(&a.priority));

        // 健康度降序的配送员顺序 (入参已排序时该排序是幂等的)
        let mut ordered_drivers: Vec<&Driver> = drivers.iter().collect();
        ordered_drivers.sort_by(|a, b| {
            b.health_score
                .partial_cmp(&a.health_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let total = sorted.len();
        let stops_per_driver = (total + ordered_drivers.len() - 1) / ordered_drivers.len();

        let now = Utc::now().naive_utc();
        let mut plans = Vec::new();

        for (chunk, driver) in sorted.chunks(stops_per_driver).zip(ordered_drivers.iter()) {
            let stops = chunk.len();
            let risky_covered = chunk.iter().filter(|c| c.is_risky()).count();

            let balance_score =
                (safe_ratio(stops as f64, stops_per_driver as f64, 0.0) * 100.0).min(100.0);
            // 风险覆盖率分母是全部待拜访门店数,不是 risky 门店数
            let risk_coverage_score =
                safe_ratio(risky_covered as f64, total as f64, 0.0) * 100.0;
            let optimization_score =
                ((balance_score + risk_coverage_score) / 2.0).round() as i64;

            plans.push(RoutePlan {
                plan_id: Uuid::new_v4().to_string(),
                driver_id: driver.driver_id.clone(),
                plan_date,
                store_ids: chunk.iter().map(|c| c.store_id.clone()).collect(),
                optimization_score,
                estimated_distance_km: stops as f64 * self.per_stop_distance_km,
                estimated_duration_minutes: stops as i64 * self.per_stop_duration_minutes,
                created_at: now,
                updated_at: now,
            });
        }

        Ok(plans)
    }
}

impl Default for AssignmentBalancer {
    fn default() -> Self {
        Self::new(5.0, 30)
    }
}
