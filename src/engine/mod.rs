// ==========================================
// 生产工艺排产系统 - 引擎层
// ==========================================
// 职责: 工时计算、机器日历、作业排产
// 红线: 引擎不做持久化，输入由调用方一次性提供
// ==========================================

pub mod cycle_duration;
pub mod error;
pub mod machine_calendar;
pub mod planning;

// 重导出核心引擎
pub use cycle_duration::{CycleDurationCalculator, CycleDurations};
pub use error::{ErrorCategory, ProductionError, ProductionResult};
pub use machine_calendar::{MachineAvailability, MachineCalendar};
pub use planning::{
    strategy_for, AtTheEarliestPlanning, AtTheLatestPlanning, ManufOrderPlanningReport,
    OperationOrderPlanner, PlanningContext, PlanningOutcome, PlanningStrategy,
};
