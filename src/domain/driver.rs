// ==========================================
// 门店拜访调度系统 - 配送员领域模型
// ==========================================

use crate::domain::types::EntityStatus;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Driver - 配送员
// ==========================================
// health_score 作为可靠性代理指标,
// 分配时按其降序决定配送员优先顺序
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    pub driver_id: String,         // 配送员ID
    pub driver_name: String,       // 姓名
    pub health_score: f64,         // 健康度 0-100
    pub status: EntityStatus,      // 状态 (仅 ACTIVE 参与分配)
    pub updated_at: NaiveDateTime, // 更新时间
}
