// ==========================================
// 门店拜访调度系统 - 路线计划领域模型
// ==========================================
// 每周期按 (driver_id, plan_date) 整体覆盖 (upsert),
// 周期内不做局部修改
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// RoutePlan - 单配送员单日路线计划
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePlan {
    pub plan_id: String,                 // 计划ID
    pub driver_id: String,               // 配送员ID
    pub plan_date: NaiveDate,            // 计划日期

    // ===== 站点 =====
    pub store_ids: Vec<String>,          // 分配的门店ID列表 (优先级降序)

    // ===== 评估指标 =====
    pub optimization_score: i64,         // 优化得分 0-100
    pub estimated_distance_km: f64,      // 估算里程 (平摊常量,非真实路由)
    pub estimated_duration_minutes: i64, // 估算耗时 (平摊常量,非真实路由)

    // ===== 元数据 =====
    pub created_at: NaiveDateTime,       // 创建时间
    pub updated_at: NaiveDateTime,       // 更新时间
}

impl RoutePlan {
    /// 站点数
    pub fn stop_count(&self) -> usize {
        self.store_ids.len()
    }
}
