// ==========================================
// 门店拜访调度系统 - 领域类型定义
// ==========================================
// 红线: 等级制,不是连续评分制
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 拜访风险等级 (Visit Risk Level)
// ==========================================
// 依据拜访间隔与目标周期的比值判定
// 顺序: Normal < AtRisk < Critical
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VisitRiskLevel {
    Normal,   // 正常
    AtRisk,   // 临界
    Critical, // 严重逾期
}

impl fmt::Display for VisitRiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VisitRiskLevel::Normal => write!(f, "NORMAL"),
            VisitRiskLevel::AtRisk => write!(f, "AT_RISK"),
            VisitRiskLevel::Critical => write!(f, "CRITICAL"),
        }
    }
}

impl VisitRiskLevel {
    /// 从字符串解析风险等级
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "AT_RISK" => VisitRiskLevel::AtRisk,
            "CRITICAL" => VisitRiskLevel::Critical,
            _ => VisitRiskLevel::Normal, // 默认值
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            VisitRiskLevel::Normal => "NORMAL",
            VisitRiskLevel::AtRisk => "AT_RISK",
            VisitRiskLevel::Critical => "CRITICAL",
        }
    }
}

// ==========================================
// 绩效档位 (Performance Tier)
// ==========================================
// 由绩效得分派生,AtRisk 覆盖规则优先于基础档位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PerformanceTier {
    Platinum, // 白金 (>85)
    Gold,     // 金牌 (70-85)
    Silver,   // 银牌 (55-69)
    Standard, // 标准 (<55)
    AtRisk,   // 流失风险 (覆盖档位)
}

impl fmt::Display for PerformanceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PerformanceTier::Platinum => write!(f, "PLATINUM"),
            PerformanceTier::Gold => write!(f, "GOLD"),
            PerformanceTier::Silver => write!(f, "SILVER"),
            PerformanceTier::Standard => write!(f, "STANDARD"),
            PerformanceTier::AtRisk => write!(f, "AT_RISK"),
        }
    }
}

impl PerformanceTier {
    /// 从字符串解析绩效档位
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "PLATINUM" => PerformanceTier::Platinum,
            "GOLD" => PerformanceTier::Gold,
            "SILVER" => PerformanceTier::Silver,
            "AT_RISK" => PerformanceTier::AtRisk,
            _ => PerformanceTier::Standard, // 默认值
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            PerformanceTier::Platinum => "PLATINUM",
            PerformanceTier::Gold => "GOLD",
            PerformanceTier::Silver => "SILVER",
            PerformanceTier::Standard => "STANDARD",
            PerformanceTier::AtRisk => "AT_RISK",
        }
    }
}

// ==========================================
// 周期类型 (Cycle Type)
// ==========================================
// 外部调度器按早/晚两次触发
// API 入参使用小写 ("morning"/"evening")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleType {
    Morning, // 晨间周期
    Evening, // 晚间周期
}

impl fmt::Display for CycleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleType::Morning => write!(f, "MORNING"),
            CycleType::Evening => write!(f, "EVENING"),
        }
    }
}

impl CycleType {
    /// 从字符串解析周期类型
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "MORNING" => Some(CycleType::Morning),
            "EVENING" => Some(CycleType::Evening),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            CycleType::Morning => "MORNING",
            CycleType::Evening => "EVENING",
        }
    }
}

// ==========================================
// 实体状态 (Entity Status)
// ==========================================
// 门店与配送员共用,仅 ACTIVE 参与调度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityStatus {
    Active,   // 启用
    Inactive, // 停用
}

impl fmt::Display for EntityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityStatus::Active => write!(f, "ACTIVE"),
            EntityStatus::Inactive => write!(f, "INACTIVE"),
        }
    }
}

impl EntityStatus {
    /// 从字符串解析实体状态
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "ACTIVE" => EntityStatus::Active,
            _ => EntityStatus::Inactive,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            EntityStatus::Active => "ACTIVE",
            EntityStatus::Inactive => "INACTIVE",
        }
    }
}
