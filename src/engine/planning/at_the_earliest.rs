// ==========================================
// 生产工艺排产系统 - 正排策略（尽早）
// ==========================================
// 倒排策略的镜像:
// 候选开始 = max(作业当前计划开始, 前序作业最晚结束)
// 挂接机器时取候选开始之后最早的时间段
// ==========================================

use crate::domain::operation::OperationOrder;
use crate::domain::time_slot::MachineTimeSlot;
use crate::domain::types::{CapacityMode, PlanningStrategyType};
use crate::engine::error::{ProductionError, ProductionResult};
use crate::engine::planning::strategy::{
    later_by, placement_machine, PlanningContext, PlanningOutcome, PlanningStrategy,
};
use chrono::NaiveDateTime;
use tracing::instrument;

pub struct AtTheEarliestPlanning {
    capacity_mode: CapacityMode,
}

impl AtTheEarliestPlanning {
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

impl PlanningStrategy for AtTheEarliestPlanning {
    fn strategy_type(&self) -> PlanningStrategyType {
        PlanningStrategyType::AtTheEarliest
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
        let planned_start = operation_order
            .planned_start
            .ok_or_else(|| ProductionError::MissingPlannedDate {
                operation: operation_order.code.clone(),
                field: "planned_start",
            })?;

        let candidate_start = neighbour_date.map_or(planned_start, |previous| planned_start.max(previous));
        let nominal_duration = ctx.operation_duration(operation_order)?;
        let machine = placement_machine(operation_order);

        let ideal_end = later_by(candidate_start, nominal_duration, operation_order)?;

        let (start, end) = match machine.as_ref() {
            Some(machine) => {
                let slot = ctx.availability.closest_time_slot_from(
                    machine,
                    candidate_start,
                    ideal_end,
                    nominal_duration,
                    self.capacity_mode,
                )?;
                (slot.start, slot.end)
            }
            None => (candidate_start, ideal_end),
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
