// ==========================================
// 生产工艺排产系统 - 排产配置读取 Trait
// ==========================================
// 职责: 定义排产引擎所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::error::ConfigResult;
use crate::config::planning_config::PlanningConfig;
use crate::domain::types::{CapacityMode, PastStartPolicy, PlanningStrategyType};

// ==========================================
// PlanningConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
pub trait PlanningConfigReader {
    /// 获取排产策略
    ///
    /// # 默认值
    /// - at_the_latest
    fn get_planning_strategy(&self) -> ConfigResult<PlanningStrategyType>;

    /// 获取产能模式
    ///
    /// # 默认值
    /// - infinite
    fn get_capacity_mode(&self) -> ConfigResult<CapacityMode>;

    /// 获取过期开始处理策略
    ///
    /// # 默认值
    /// - warn
    fn get_past_start_policy(&self) -> ConfigResult<PastStartPolicy>;

    /// 获取机器时间段搜索范围（天）
    ///
    /// # 默认值
    /// - 365
    fn get_slot_search_horizon_days(&self) -> ConfigResult<i64>;

    /// 一次性读取完整排产配置
    fn load_planning_config(&self) -> ConfigResult<PlanningConfig> {
        Ok(PlanningConfig {
            strategy: self.get_planning_strategy()?,
            capacity_mode: self.get_capacity_mode()?,
            past_start_policy: self.get_past_start_policy()?,
            slot_search_horizon_days: self.get_slot_search_horizon_days()?,
        })
    }
}
