use crate::config::config_manager::config_keys;
use crate::config::error::{ConfigError, ConfigResult};
use crate::domain::types::{CapacityMode, PastStartPolicy, PlanningStrategyType};
use crate::engine::machine_calendar::{MachineCalendar, DEFAULT_SEARCH_HORIZON_DAYS, MAX_SEARCH_HORIZON_DAYS};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 排产配置
///
/// 存储位置：config_kv（scope_id='global'），或独立 JSON 文件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningConfig {
    /// 排产策略（at_the_latest / at_the_earliest）
    #[serde(default)]
    pub strategy: PlanningStrategyType,

    /// 产能模式（infinite / finite）
    #[serde(default)]
    pub capacity_mode: CapacityMode,

    /// 计划开始早于当前时间时的处理（ignore / warn / reject）
    #[serde(default)]
    pub past_start_policy: PastStartPolicy,

    /// 机器时间段搜索范围（天）
    #[serde(default = "default_horizon_days")]
    pub slot_search_horizon_days: i64,
}

fn default_horizon_days() -> i64 {
    DEFAULT_SEARCH_HORIZON_DAYS
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            strategy: PlanningStrategyType::default(),
            capacity_mode: CapacityMode::default(),
            past_start_policy: PastStartPolicy::default(),
            slot_search_horizon_days: DEFAULT_SEARCH_HORIZON_DAYS,
        }
    }
}

impl PlanningConfig {
    pub fn from_json_str(raw: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// 校验取值范围
    pub fn validate(&self) -> ConfigResult<()> {
        if !(1..=MAX_SEARCH_HORIZON_DAYS).contains(&self.slot_search_horizon_days) {
            return Err(ConfigError::ParseError {
                key: config_keys::SLOT_SEARCH_HORIZON_DAYS.to_string(),
                message: format!(
                    "搜索范围必须在 1..={} 天之间，实际为 {}",
                    MAX_SEARCH_HORIZON_DAYS, self.slot_search_horizon_days
                ),
            });
        }
        Ok(())
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// 按搜索范围创建空机器日历
    pub fn new_machine_calendar(&self) -> MachineCalendar {
        MachineCalendar::new(self.slot_search_horizon_days)
    }
}
