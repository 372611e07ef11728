// ==========================================
// 生产工艺排产系统 - 制造订单排产编排
// ==========================================
// 职责: 按 priority 串联制造订单下的全部作业
//       倒排: priority 从大到小，后续层级的最早开始作为截止
//       正排: priority 从小到大，前序层级的最晚结束作为起点
// 红线: 任一作业失败则整单放弃，不回写部分结果
// ==========================================

use crate::config::PlanningConfig;
use crate::domain::operation::{ManufOrder, OperationOrder};
use crate::domain::types::{CapacityMode, PlanningStrategyType};
use crate::engine::cycle_duration::{next_priority, previous_priority, CycleDurationCalculator};
use crate::engine::error::{ProductionError, ProductionResult};
use crate::engine::machine_calendar::MachineAvailability;
use crate::engine::planning::strategy::{strategy_for, PlanningContext, PlanningOutcome};
use chrono::NaiveDateTime;
use tracing::instrument;

/// 制造订单排产结果
#[derive(Debug, Clone)]
pub struct ManufOrderPlanningReport {
    pub manuf_order_code: String,
    pub strategy: PlanningStrategyType,
    pub capacity_mode: CapacityMode,
    pub planned_start: Option<NaiveDateTime>,
    pub planned_end: Option<NaiveDateTime>,
    /// 按落位顺序
    pub outcomes: Vec<PlanningOutcome>,
}

impl ManufOrderPlanningReport {
    /// 计划开始早于当前时间的作业数
    pub fn starts_in_past_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.starts_in_past).count()
    }
}

// ==========================================
// OperationOrderPlanner - 作业排产编排器
// ==========================================
pub struct OperationOrderPlanner<'a> {
    calculator: &'a CycleDurationCalculator,
    availability: &'a mut dyn MachineAvailability,
    config: &'a PlanningConfig,
}

impl<'a> OperationOrderPlanner<'a> {
    pub fn new(
        calculator: &'a CycleDurationCalculator,
        availability: &'a mut dyn MachineAvailability,
        config: &'a PlanningConfig,
    ) -> Self {
        Self {
            calculator,
            availability,
            config,
        }
    }

    /// 为制造订单的全部作业落位
    ///
    /// # 参数
    /// - `manuf_order`: 制造订单（成功时回写作业计划时间与订单起止）
    /// - `now`: 当前时间（用于过期开始检查与正排默认起点）
    #[instrument(skip(self, manuf_order), fields(
        manuf_order = %manuf_order.code,
        operations = manuf_order.operation_orders.len(),
        strategy = %self.config.strategy,
        capacity_mode = %self.config.capacity_mode
    ))]
    pub fn plan_manuf_order(
        &mut self,
        manuf_order: &mut ManufOrder,
        now: NaiveDateTime,
    ) -> ProductionResult<ManufOrderPlanningReport> {
        let strategy = strategy_for(self.config.strategy, self.config.capacity_mode);
        let strategy_type = strategy.strategy_type();

        // 在副本上排产，成功后整体回写
        let mut operations = manuf_order.operation_orders.clone();
        initialize_anchor_dates(manuf_order, &mut operations, strategy_type, now)?;

        let mut priorities: Vec<i32> = operations.iter().map(|o| o.priority).collect();
        priorities.sort_unstable();
        priorities.dedup();
        if strategy_type == PlanningStrategyType::AtTheLatest {
            priorities.reverse();
        }

        let mut ctx = PlanningContext::new(
            self.calculator,
            &mut *self.availability,
            self.config.past_start_policy,
            manuf_order.qty,
            now,
        );

        let mut outcomes = Vec::with_capacity(operations.len());
        for priority in priorities {
            let neighbour_date = neighbour_date(&operations, priority, strategy_type);

            for operation_order in operations.iter_mut().filter(|o| o.priority == priority) {
                match strategy.plan_operation(&mut ctx, operation_order, neighbour_date) {
                    Ok(outcome) => outcomes.push(outcome),
                    Err(err) => {
                        tracing::warn!(
                            operation = %operation_order.code,
                            error = %err,
                            "作业排产失败，整单放弃"
                        );
                        ctx.rollback_reservations();
                        return Err(err);
                    }
                }
            }
        }

        manuf_order.planned_start = operations.iter().filter_map(|o| o.planned_start).min();
        manuf_order.planned_end = operations.iter().filter_map(|o| o.planned_end).max();
        manuf_order.operation_orders = operations;

        tracing::info!(
            strategy = strategy_type.title_cn(),
            planned_start = ?manuf_order.planned_start,
            planned_end = ?manuf_order.planned_end,
            "制造订单排产完成"
        );

        Ok(ManufOrderPlanningReport {
            manuf_order_code: manuf_order.code.clone(),
            strategy: strategy_type,
            capacity_mode: strategy.capacity_mode(),
            planned_start: manuf_order.planned_start,
            planned_end: manuf_order.planned_end,
            outcomes,
        })
    }
}

/// 为缺少锚点时间的作业填充默认值
///
/// - 倒排: 计划结束缺失时取订单计划结束（订单必须有计划结束）
/// - 正排: 计划开始缺失时取订单计划开始，订单也缺失时取当前时间
fn initialize_anchor_dates(
    manuf_order: &ManufOrder,
    operations: &mut [OperationOrder],
    strategy_type: PlanningStrategyType,
    now: NaiveDateTime,
) -> ProductionResult<()> {
    match strategy_type {
        PlanningStrategyType::AtTheLatest => {
            if operations.iter().all(|o| o.planned_end.is_some()) {
                return Ok(());
            }
            let order_end = manuf_order
                .planned_end
                .ok_or_else(|| ProductionError::MissingPlannedDate {
                    operation: manuf_order.code.clone(),
                    field: "planned_end",
                })?;
            for operation_order in operations.iter_mut().filter(|o| o.planned_end.is_none()) {
                operation_order.planned_end = Some(order_end);
            }
        }
        PlanningStrategyType::AtTheEarliest => {
            let order_start = manuf_order.planned_start.unwrap_or(now);
            for operation_order in operations.iter_mut().filter(|o| o.planned_start.is_none()) {
                operation_order.planned_start = Some(order_start);
            }
        }
    }
    Ok(())
}

/// 相邻 priority 层级的边界时间
///
/// - 倒排: 下一层级作业中最早的计划开始
/// - 正排: 上一层级作业中最晚的计划结束
fn neighbour_date(
    operations: &[OperationOrder],
    priority: i32,
    strategy_type: PlanningStrategyType,
) -> Option<NaiveDateTime> {
    let priorities = operations.iter().map(|o| o.priority);
    match strategy_type {
        PlanningStrategyType::AtTheLatest => {
            let next = next_priority(priorities, priority)?;
            operations
                .iter()
                .filter(|o| o.priority == next)
                .filter_map(|o| o.planned_start)
                .min()
        }
        PlanningStrategyType::AtTheEarliest => {
            let previous = previous_priority(priorities, priority)?;
            operations
                .iter()
                .filter(|o| o.priority == previous)
                .filter_map(|o| o.planned_end)
                .max()
        }
    }
}
