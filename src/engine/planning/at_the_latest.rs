// ==========================================
// 生产工艺排产系统 - 倒排策略（尽晚）
// ==========================================
// 规则:
// 1) 候选结束 = min(作业当前计划结束, 后续作业最早开始)
// 2) 挂接机器: 在机器日历中取候选结束之前最晚的时间段
//    未挂接机器 / 外协: 结束 = 候选结束, 开始 = 结束 − 名义工时
// 3) 计划时长 = 墙钟 (结束 − 开始)，日历受限时可大于名义工时
// 4) 检查计划开始是否早于当前时间
// ==========================================

use crate::domain::operation::OperationOrder;
use crate::domain::time_slot::MachineTimeSlot;
use crate::domain::types::{CapacityMode, PlanningStrategyType};
use crate::engine::cycle_duration::CycleDurationCalculator;
use crate::engine::error::{ProductionError, ProductionResult};
use crate::engine::planning::strategy::{
    earlier_by, placement_machine, PlanningContext, PlanningOutcome, PlanningStrategy,
};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use tracing::instrument;

pub struct AtTheLatestPlanning {
    capacity_mode: CapacityMode,
}

impl AtTheLatestPlanning {
    pub fn new(capacity_mode: CapacityMode) -> Self {
        Self { capacity_mode }
    }

    pub fn infinite_capacity() -> Self {
        Self::new(CapacityMode::Infinite)
    }

    pub fn finite_capacity() -> Self {
        Self::new(CapacityMode::Finite)
    }
}

impl PlanningStrategy for AtTheLatestPlanning {
    fn strategy_type(&self) -> PlanningStrategyType {
        PlanningStrategyType::AtTheLatest
    }

    fn capacity_mode(&self) -> CapacityMode {
        self.capacity_mode
    }

    #[instrument(skip(self, ctx, operation_order), fields(
        operation = %operation_order.code,
        capacity_mode = %self.capacity_mode
    ))]
    fn plan_operation(
        &self,
        ctx: &mut PlanningContext<'_>,
        operation_order: &mut OperationOrder,
        neighbour_date: Option<NaiveDateTime>,
    ) -> ProductionResult<PlanningOutcome> {
        let planned_end = operation_order
            .planned_end
            .ok_or_else(|| ProductionError::MissingPlannedDate {
                operation: operation_order.code.clone(),
                field: "planned_end",
            })?;

        let candidate_end = neighbour_date.map_or(planned_end, |next| planned_end.min(next));
        operation_order.planned_end = Some(candidate_end);

        let nominal_duration = ctx.operation_duration(operation_order)?;
        let machine = placement_machine(operation_order);

        let ideal_start = earlier_by(candidate_end, nominal_duration, operation_order)?;

        let (start, end) = match machine.as_ref() {
            Some(machine) => {
                let slot = ctx.availability.furthest_time_slot_from(
                    machine,
                    ideal_start,
                    candidate_end,
                    nominal_duration,
                    self.capacity_mode,
                )?;
                (slot.start, slot.end)
            }
            None => (ideal_start, candidate_end),
        };

        operation_order.planned_start = Some(start);
        operation_order.planned_end = Some(end);
        operation_order.planned_duration = (end - start).num_seconds();

        let starts_in_past = ctx.check_planned_start(operation_order)?;

        if let (Some(machine), CapacityMode::Finite) = (machine.as_ref(), self.capacity_mode) {
            ctx.reserve(machine, MachineTimeSlot::new(start, end));
        }

        Ok(PlanningOutcome {
            operation_code: operation_order.code.clone(),
            planned_start: start,
            planned_end: end,
            planned_duration_s: operation_order.planned_duration,
            nominal_duration_s: nominal_duration,
            calendar_adjusted: machine.is_some(),
            starts_in_past,
        })
    }
}

/// 由计划结束倒推计划开始
///
/// 挂接工作中心时: 计划结束 − 完整周期工时（同时写入机器 / 人工工时）
/// 否则: 计划结束
pub fn compute_planned_start_date(
    calculator: &CycleDurationCalculator,
    operation_order: &mut OperationOrder,
    qty: Decimal,
) -> ProductionResult<NaiveDateTime> {
    let planned_end = operation_order
        .planned_end
        .ok_or_else(|| ProductionError::MissingPlannedDate {
            operation: operation_order.code.clone(),
            field: "planned_end",
        })?;

    if operation_order.work_center.is_none() {
        return Ok(planned_end);
    }

    let line = operation_order.prod_process_line.clone();
    let duration = calculator.compute_entire_cycle_duration(Some(operation_order), &line, qty)?;
    earlier_by(planned_end, duration, operation_order)
}
