// ==========================================
// 生产工艺排产系统 - 作业排产层
// ==========================================
// 职责: 以工时计算结果为基础，将作业放置到时间轴上
// ==========================================

pub mod at_the_earliest;
pub mod at_the_latest;
pub mod planner;
pub mod strategy;


pub use at_the_earliest::AtTheEarliestPlanning;
pub use at_the_latest::{compute_planned_start_date, AtTheLatestPlanning};
pub use planner::{ManufOrderPlanningReport, OperationOrderPlanner};
pub use strategy::{strategy_for, PlanningContext, PlanningOutcome, PlanningStrategy};
