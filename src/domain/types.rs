// ==========================================
// 生产工艺排产系统 - 领域类型定义
// ==========================================
// 职责: 工作中心类型、排产策略、产能模式等枚举
// 序列化格式: 与配置存储中的字符串保持一致
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 工作中心类型 (Work Center Type)
// ==========================================
// 红线: 仅 MACHINE / BOTH 计入开工、收尾、换型时间
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkCenterType {
    Machine, // 机器
    Human,   // 人工
    Both,    // 机器 + 人工
}

impl WorkCenterType {
    /// 是否需要挂接机器
    pub fn is_machine_capable(&self) -> bool {
        matches!(self, WorkCenterType::Machine | WorkCenterType::Both)
    }
}

impl fmt::Display for WorkCenterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkCenterType::Machine => write!(f, "MACHINE"),
            WorkCenterType::Human => write!(f, "HUMAN"),
            WorkCenterType::Both => write!(f, "BOTH"),
        }
    }
}

// ==========================================
// 排产策略 (Planning Strategy Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanningStrategyType {
    AtTheEarliest, // 正排：尽早
    AtTheLatest,   // 倒排：尽晚
}

impl PlanningStrategyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanningStrategyType::AtTheEarliest => "at_the_earliest",
            PlanningStrategyType::AtTheLatest => "at_the_latest",
        }
    }

    pub fn title_cn(&self) -> &'static str {
        match self {
            PlanningStrategyType::AtTheEarliest => "正排（尽早）",
            PlanningStrategyType::AtTheLatest => "倒排（尽晚）",
        }
    }
}

impl Default for PlanningStrategyType {
    fn default() -> Self {
        PlanningStrategyType::AtTheLatest
    }
}

impl fmt::Display for PlanningStrategyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PlanningStrategyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "at_the_earliest" | "at-the-earliest" | "earliest" => Ok(PlanningStrategyType::AtTheEarliest),
            "at_the_latest" | "at-the-latest" | "latest" => Ok(PlanningStrategyType::AtTheLatest),
            other => Err(format!("未知排产策略: {}", other)),
        }
    }
}

// ==========================================
// 产能模式 (Capacity Mode)
// ==========================================
// Infinite: 忽略机器已占用时段
// Finite:   已占用时段视为不可用，落位后登记占用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityMode {
    Infinite,
    Finite,
}

impl CapacityMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CapacityMode::Infinite => "infinite",
            CapacityMode::Finite => "finite",
        }
    }
}

impl Default for CapacityMode {
    fn default() -> Self {
        CapacityMode::Infinite
    }
}

impl fmt::Display for CapacityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CapacityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "infinite" | "infinite_capacity" => Ok(CapacityMode::Infinite),
            "finite" | "finite_capacity" => Ok(CapacityMode::Finite),
            other => Err(format!("未知产能模式: {}", other)),
        }
    }
}

// ==========================================
// 计划开始早于当前时间的处理策略
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PastStartPolicy {
    Ignore, // 不检查
    Warn,   // 标记并记录告警
    Reject, // 视为错误，中止本次排产
}

impl PastStartPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PastStartPolicy::Ignore => "ignore",
            PastStartPolicy::Warn => "warn",
            PastStartPolicy::Reject => "reject",
        }
    }
}

impl Default for PastStartPolicy {
    fn default() -> Self {
        PastStartPolicy::Warn
    }
}

impl fmt::Display for PastStartPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PastStartPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ignore" => Ok(PastStartPolicy::Ignore),
            "warn" => Ok(PastStartPolicy::Warn),
            "reject" => Ok(PastStartPolicy::Reject),
            other => Err(format!("未知过期开始处理策略: {}", other)),
        }
    }
}
