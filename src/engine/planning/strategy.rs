// ==========================================
// 生产工艺排产系统 - 排产策略接口
// ==========================================
// 策略组合: {正排, 倒排} × {无限产能, 有限产能}
// 各策略共用同一工时计算器与机器日历
// ==========================================

use crate::domain::operation::OperationOrder;
use crate::domain::time_slot::MachineTimeSlot;
use crate::domain::types::{CapacityMode, PastStartPolicy, PlanningStrategyType};
use crate::domain::work_center::Machine;
use crate::engine::cycle_duration::{apply_cycle_durations, CycleDurationCalculator};
use crate::engine::error::{ProductionError, ProductionResult};
use crate::engine::machine_calendar::MachineAvailability;
use crate::engine::planning::at_the_earliest::AtTheEarliestPlanning;
use crate::engine::planning::at_the_latest::AtTheLatestPlanning;
use chrono::{Duration, NaiveDateTime};
use rust_decimal::Decimal;

/// 单个作业的落位结果
#[derive(Debug, Clone, PartialEq)]
pub struct PlanningOutcome {
    pub operation_code: String,
    pub planned_start: NaiveDateTime,
    pub planned_end: NaiveDateTime,
    /// 墙钟时长（秒）
    pub planned_duration_s: i64,
    /// 名义计划工时（秒）
    pub nominal_duration_s: i64,
    /// 是否按机器日历落位
    pub calendar_adjusted: bool,
    /// 计划开始是否早于当前时间
    pub starts_in_past: bool,
}

// ==========================================
// PlanningContext - 单次排产上下文
// ==========================================
pub struct PlanningContext<'a> {
    pub calculator: &'a CycleDurationCalculator,
    pub availability: &'a mut dyn MachineAvailability,
    pub past_start_policy: PastStartPolicy,
    /// 作业计划数量（取制造订单数量）
    pub qty: Decimal,
    pub now: NaiveDateTime,
    reserved: Vec<(Machine, MachineTimeSlot)>,
}

impl<'a> PlanningContext<'a> {
    pub fn new(
        calculator: &'a CycleDurationCalculator,
        availability: &'a mut dyn MachineAvailability,
        past_start_policy: PastStartPolicy,
        qty: Decimal,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            calculator,
            availability,
            past_start_policy,
            qty,
            now,
            reserved: Vec::new(),
        }
    }

    /// 计算作业名义工时，并写入计划机器工时 / 人工工时
    pub fn operation_duration(&self, operation_order: &mut OperationOrder) -> ProductionResult<i64> {
        let durations = self
            .calculator
            .compute_cycle_durations(&operation_order.prod_process_line, self.qty)?;
        apply_cycle_durations(operation_order, &durations);
        Ok(durations.planned_duration)
    }

    /// 登记占用，并记录以便失败时回滚
    pub fn reserve(&mut self, machine: &Machine, slot: MachineTimeSlot) {
        self.availability.reserve(machine, slot);
        self.reserved.push((machine.clone(), slot));
    }

    /// 回滚本次上下文登记的全部占用
    pub fn rollback_reservations(&mut self) {
        for (machine, slot) in self.reserved.drain(..).rev() {
            self.availability.release(&machine, &slot);
        }
    }

    /// 检查计划开始是否早于当前时间
    ///
    /// # 返回
    /// - Ok(true): 早于当前时间且策略为 Warn
    /// - Ok(false): 未早于当前时间，或策略为 Ignore
    /// - Err: 早于当前时间且策略为 Reject
    pub fn check_planned_start(&self, operation_order: &OperationOrder) -> ProductionResult<bool> {
        let planned_start = match operation_order.planned_start {
            Some(start) if start < self.now => start,
            _ => return Ok(false),
        };

        match self.past_start_policy {
            PastStartPolicy::Ignore => Ok(false),
            PastStartPolicy::Warn => {
                tracing::warn!(
                    operation = %operation_order.code,
                    planned_start = %planned_start,
                    now = %self.now,
                    "作业计划开始时间早于当前时间"
                );
                Ok(true)
            }
            PastStartPolicy::Reject => Err(ProductionError::PlannedStartInPast {
                operation: operation_order.code.clone(),
                planned_start,
                now: self.now,
            }),
        }
    }
}

/// 时间点后移 `seconds` 秒；越界时报工时溢出
pub(crate) fn later_by(
    at: NaiveDateTime,
    seconds: i64,
    operation_order: &OperationOrder,
) -> ProductionResult<NaiveDateTime> {
    Duration::try_seconds(seconds)
        .and_then(|delta| at.checked_add_signed(delta))
        .ok_or_else(|| duration_overflow(operation_order))
}

/// 时间点前移 `seconds` 秒；越界时报工时溢出
pub(crate) fn earlier_by(
    at: NaiveDateTime,
    seconds: i64,
    operation_order: &OperationOrder,
) -> ProductionResult<NaiveDateTime> {
    Duration::try_seconds(seconds)
        .and_then(|delta| at.checked_sub_signed(delta))
        .ok_or_else(|| duration_overflow(operation_order))
}

fn duration_overflow(operation_order: &OperationOrder) -> ProductionError {
    ProductionError::DurationOverflow {
        line_name: operation_order.prod_process_line.name.clone(),
    }
}

/// 参与日历落位的机器（外协作业不占用内部机器）
pub(crate) fn placement_machine(operation_order: &OperationOrder) -> Option<Machine> {
    if operation_order.outsourcing {
        return None;
    }
    operation_order.machine.clone()
}

// ==========================================
// Trait: PlanningStrategy
// ==========================================
pub trait PlanningStrategy {
    fn strategy_type(&self) -> PlanningStrategyType;

    fn capacity_mode(&self) -> CapacityMode;

    /// 为单个作业落位
    ///
    /// # 参数
    /// - `neighbour_date`: 倒排时为后续作业的最早开始；正排时为前序作业的最晚结束
    fn plan_operation(
        &self,
        ctx: &mut PlanningContext<'_>,
        operation_order: &mut OperationOrder,
        neighbour_date: Option<NaiveDateTime>,
    ) -> ProductionResult<PlanningOutcome>;
}

/// 按策略类型与产能模式创建策略
pub fn strategy_for(strategy_type: PlanningStrategyType, capacity_mode: CapacityMode) -> Box<dyn PlanningStrategy> {
    match strategy_type {
        PlanningStrategyType::AtTheLatest => Box::new(AtTheLatestPlanning::new(capacity_mode)),
        PlanningStrategyType::AtTheEarliest => Box::new(AtTheEarliestPlanning::new(capacity_mode)),
    }
}
