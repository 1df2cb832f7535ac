// ==========================================
// 门店拜访调度系统 - 周期运行日志领域模型
// ==========================================
// 每次周期执行写入一条,只追加 (审计轨迹)
// 部分失败语义: 单步失败被捕获记录,其余步骤继续
// ==========================================

use crate::domain::types::CycleType;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// StepResult - 单步执行结果
// ==========================================
// 红线: 步骤失败必须显式建模,不允许散落的 try/catch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub step_name: String,     // 步骤名
    pub rows_affected: i64,    // 影响行数 (分类数/评分数/计划数...)
    pub duration_ms: i64,      // 步骤耗时
    pub error: Option<String>, // 失败原因 (None=成功)
}

impl StepResult {
    /// 步骤是否成功
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

// ==========================================
// CycleResults - 周期级汇总计数
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CycleResults {
    pub stores_classified: i64,   // 完成时效分类的门店数
    pub risk_levels_updated: i64, // 风险等级发生变化并回写的门店数
    pub stores_scored: i64,       // 完成评分的门店数
    pub fallback_scores: i64,     // 评分服务降级为默认值的门店数
    pub snapshots_appended: i64,  // 追加的绩效快照数
    pub plans_written: i64,       // 写入的路线计划数
    pub stores_assigned: i64,     // 纳入计划的门店数
    pub follow_ups_seeded: i64,   // 播种的次日跟进任务数
    pub steps: Vec<StepResult>,   // 分步结果
}

// ==========================================
// CycleRunLog - 周期运行日志
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleRunLog {
    pub run_id: String,              // 运行ID
    pub cycle_type: CycleType,       // 周期类型
    pub plan_date: NaiveDate,        // 计划日期
    pub results: CycleResults,       // 结构化结果
    pub success: bool,               // errors 为空时为 true
    pub errors: Vec<String>,         // 累积的步骤错误
    pub duration_ms: i64,            // 周期总耗时
    pub started_at: NaiveDateTime,   // 开始时间
    pub completed_at: NaiveDateTime, // 完成时间
}

// ==========================================
// CycleOutcome - 周期执行返回值 (触发面响应体)
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleOutcome {
    pub run_id: String,        // 运行ID
    pub cycle_type: CycleType, // 周期类型
    pub plan_date: NaiveDate,  // 计划日期
    pub success: bool,         // 是否全部步骤成功
    pub results: CycleResults, // 结构化结果
    pub errors: Vec<String>,   // 步骤错误列表
    pub duration_ms: i64,      // 周期总耗时
}
