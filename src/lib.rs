// ==========================================
// 生产工艺排产系统 - 核心库
// ==========================================
// 职责: 工序周期工时、工艺路线交期与作业排产落位
// 定位: 纯计算核心，实体由上层加载后传入
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 工时计算与排产
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（配置存储）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

pub use domain::{
    AvailabilityWindow, CapacityMode, Machine, MachineTimeSlot, ManufOrder, OperationOrder,
    PastStartPolicy, PlanningStrategyType, ProdProcess, ProdProcessLine, WorkCenter, WorkCenterType,
};

pub use engine::{
    CycleDurationCalculator, CycleDurations, ErrorCategory, MachineAvailability, MachineCalendar,
    ManufOrderPlanningReport, OperationOrderPlanner, PlanningOutcome, PlanningStrategy,
    ProductionError, ProductionResult,
};

pub use config::{ConfigManager, PlanningConfig, PlanningConfigReader};

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "生产工艺排产系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
