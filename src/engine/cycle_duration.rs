// ==========================================
// 生产工艺排产系统 - 工序周期工时计算引擎
// ==========================================
// 职责: 工序行 + 目标数量 → 机器工时 / 人工工时 / 计划工时
//       工艺路线 → 总工时 / 交期（按 priority 取关键路径）
// 输入: 工艺路线、工序行、工作中心与机器元数据（由调用方提供）
// 输出: 时长（秒）；可选写入作业的计划机器工时与人工工时
// ==========================================
// 数量运算使用 Decimal，收窄为整秒时向零截断
// ==========================================

use crate::domain::operation::OperationOrder;
use crate::domain::process::{ProdProcess, ProdProcessLine};
use crate::engine::error::{ProductionError, ProductionResult};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::BTreeMap;
use tracing::instrument;

/// 单个工序行的工时计算结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleDurations {
    pub nb_cycles: Decimal,
    /// 固定时长 + 周期数 × 机器单周期时长
    pub machine_duration: i64,
    /// 周期数 × 人工单周期时长
    pub human_duration: i64,
    /// 按单周期时长较大者选取的计划工时（相等时取机器）
    pub planned_duration: i64,
}

// ==========================================
// CycleDurationCalculator - 周期工时计算器
// ==========================================
pub struct CycleDurationCalculator {
    // 无状态引擎，不需要注入依赖
}

impl CycleDurationCalculator {
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 计算工序行在目标数量下的完整周期工时
    ///
    /// # 参数
    /// - `operation_order`: 可选作业；传入时写入 planned_machine_duration / planned_human_duration
    /// - `line`: 工序行
    /// - `qty`: 目标数量
    ///
    /// # 返回
    /// 计划工时（秒），与是否传入作业无关
    pub fn compute_entire_cycle_duration(
        &self,
        operation_order: Option<&mut OperationOrder>,
        line: &ProdProcessLine,
        qty: Decimal,
    ) -> ProductionResult<i64> {
        let durations = self.compute_cycle_durations(line, qty)?;

        if let Some(operation_order) = operation_order {
            apply_cycle_durations(operation_order, &durations);
        }

        Ok(durations.planned_duration)
    }

    /// 计算工序行的机器 / 人工 / 计划工时
    ///
    /// 规则：
    /// 1) 先确定固定时长与周期数
    /// 2) machine = fixed + nb_cycles × duration_per_cycle
    /// 3) human = nb_cycles × human_duration
    /// 4) 机器单周期时长等于最大值时取机器工时，否则人工单周期时长等于最大值时取人工工时
    pub fn compute_cycle_durations(
        &self,
        line: &ProdProcessLine,
        qty: Decimal,
    ) -> ProductionResult<CycleDurations> {
        self.compute_cycle_durations_in(None, line, qty)
    }

    /// 同 compute_cycle_durations；工序行未回填 process_code 时以 `process_code` 定位错误
    #[instrument(skip(self, process_code, line, qty), fields(line = %line.name, qty = %qty))]
    fn compute_cycle_durations_in(
        &self,
        process_code: Option<&str>,
        line: &ProdProcessLine,
        qty: Decimal,
    ) -> ProductionResult<CycleDurations> {
        let (fixed_duration, nb_cycles) = self.compute_fixed_duration_and_cycles(process_code, line, qty)?;

        let machine_per_cycle = line.duration_per_cycle.unwrap_or(0);
        let human_per_cycle = line.human_duration.unwrap_or(0);
        let max_per_cycle = machine_per_cycle.max(human_per_cycle);

        let machine_duration = fixed_duration
            .checked_add(mul_to_seconds(line, nb_cycles, machine_per_cycle)?)
            .ok_or_else(|| overflow(line))?;
        let human_duration = mul_to_seconds(line, nb_cycles, human_per_cycle)?;

        let planned_duration = if machine_per_cycle == max_per_cycle {
            machine_duration
        } else if human_per_cycle == max_per_cycle {
            human_duration
        } else {
            0
        };

        tracing::debug!(
            nb_cycles = %nb_cycles,
            fixed_duration,
            machine_duration,
            human_duration,
            planned_duration,
            "工序工时计算完成"
        );

        Ok(CycleDurations {
            nb_cycles,
            machine_duration,
            human_duration,
            planned_duration,
        })
    }

    /// 计算工艺路线总工时（各工序行计划工时之和，按行顺序）
    #[instrument(skip(self, process), fields(process = %process.code, lines = process.lines.len()))]
    pub fn compute_entire_duration(&self, process: &ProdProcess, qty: Decimal) -> ProductionResult<i64> {
        let mut total_duration: i64 = 0;
        for line in process.lines.iter() {
            let duration = self
                .compute_cycle_durations_in(Some(&process.code), line, qty)?
                .planned_duration;
            total_duration = total_duration
                .checked_add(duration)
                .ok_or_else(|| overflow(line))?;
        }
        Ok(total_duration)
    }

    /// 计算工艺路线交期工时
    ///
    /// 同一 priority 内并行（取最大值），不同 priority 之间串行（求和）
    #[instrument(skip(self, process), fields(process = %process.code, lines = process.lines.len()))]
    pub fn compute_lead_time_duration(&self, process: &ProdProcess, qty: Decimal) -> ProductionResult<i64> {
        let mut max_duration_per_priority: BTreeMap<i32, i64> = BTreeMap::new();

        for line in process.lines.iter() {
            let computed = self
                .compute_cycle_durations_in(Some(&process.code), line, qty)?
                .planned_duration;
            max_duration_per_priority
                .entry(line.priority)
                .and_modify(|current| {
                    if computed > *current {
                        *current = computed;
                    }
                })
                .or_insert(computed);
        }

        max_duration_per_priority
            .values()
            .try_fold(0i64, |acc, d| acc.checked_add(*d))
            .ok_or_else(|| ProductionError::DurationOverflow {
                line_name: process.code.clone(),
            })
    }

    /// 获取下一个 priority（严格大于给定值的最小 priority）
    ///
    /// # 返回
    /// - None: priority 或工艺路线缺失、工艺路线无工序行、不存在更大的 priority
    pub fn get_next_priority(&self, process: Option<&ProdProcess>, priority: Option<i32>) -> Option<i32> {
        let (process, priority) = (process?, priority?);
        next_priority(process.lines.iter().map(|l| l.priority), priority)
    }

    /// 获取上一个 priority（严格小于给定值的最大 priority）
    pub fn get_previous_priority(&self, process: Option<&ProdProcess>, priority: Option<i32>) -> Option<i32> {
        let (process, priority) = (process?, priority?);
        previous_priority(process.lines.iter().map(|l| l.priority), priority)
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    /// 计算周期数
    ///
    /// - max_capacity_per_cycle = 0: 周期数 = 数量
    /// - 否则: 数量 / 每周期产能，向上取整（远离零）
    pub fn compute_nb_cycles(&self, line: &ProdProcessLine, qty: Decimal) -> ProductionResult<Decimal> {
        if line.max_capacity_per_cycle.is_zero() {
            return Ok(qty);
        }
        qty.checked_div(line.max_capacity_per_cycle)
            .map(|cycles| cycles.round_dp_with_strategy(0, RoundingStrategy::AwayFromZero))
            .ok_or_else(|| overflow(line))
    }

    /// 计算固定时长与周期数
    ///
    /// 机器型工作中心: starting + ending + (nb_cycles - 1) × setup
    /// 人工型工作中心: 0
    fn compute_fixed_duration_and_cycles(
        &self,
        process_code: Option<&str>,
        line: &ProdProcessLine,
        qty: Decimal,
    ) -> ProductionResult<(i64, Decimal)> {
        let work_center = line
            .work_center
            .as_ref()
            .ok_or_else(|| ProductionError::MissingWorkCenter {
                process_code: line
                    .process_code
                    .as_deref()
                    .or(process_code)
                    .unwrap_or("UNKNOWN")
                    .to_string(),
                line_name: line.name.clone(),
            })?;

        let nb_cycles = self.compute_nb_cycles(line, qty)?;

        let mut duration: i64 = 0;
        if work_center.is_machine_capable() {
            if work_center.machine.is_none() {
                return Err(ProductionError::WorkCenterNoMachine {
                    work_center: work_center.name.clone(),
                });
            }
            let setup_cycles = nb_cycles.checked_sub(Decimal::ONE).ok_or_else(|| overflow(line))?;
            let setup = mul_to_seconds(line, setup_cycles, line.setup_duration)?;
            duration = line
                .starting_duration
                .checked_add(line.ending_duration)
                .and_then(|d| d.checked_add(setup))
                .ok_or_else(|| overflow(line))?;
        }

        Ok((duration, nb_cycles))
    }
}

impl Default for CycleDurationCalculator {
    fn default() -> Self {
        Self::new()
    }
}

/// 将工时写入作业
pub fn apply_cycle_durations(operation_order: &mut OperationOrder, durations: &CycleDurations) {
    operation_order.planned_machine_duration = durations.machine_duration;
    operation_order.planned_human_duration = durations.human_duration;
}

/// 严格大于 priority 的最小值
pub(crate) fn next_priority(priorities: impl Iterator<Item = i32>, priority: i32) -> Option<i32> {
    priorities.filter(|p| *p > priority).min()
}

/// 严格小于 priority 的最大值
pub(crate) fn previous_priority(priorities: impl Iterator<Item = i32>, priority: i32) -> Option<i32> {
    priorities.filter(|p| *p < priority).max()
}

/// 周期数 × 单周期秒数，向零截断为整秒
fn mul_to_seconds(line: &ProdProcessLine, cycles: Decimal, seconds: i64) -> ProductionResult<i64> {
    cycles
        .checked_mul(Decimal::from(seconds))
        .and_then(|d| d.trunc().to_i64())
        .ok_or_else(|| overflow(line))
}

fn overflow(line: &ProdProcessLine) -> ProductionError {
    ProductionError::DurationOverflow {
        line_name: line.name.clone(),
    }
}

// ==========================================
// 测试模块
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::WorkCenterType;
    use crate::domain::work_center::{Machine, WorkCenter};

    fn machine_center() -> WorkCenter {
        WorkCenter::machine("WC-PRESS", "Press", Machine::new("M01", "Press 01"))
    }

    fn machine_line(capacity: i64, machine_s: i64, human_s: i64) -> ProdProcessLine {
        ProdProcessLine::new("Pressing", 10, Some(machine_center()))
            .with_capacity(Decimal::from(capacity))
            .with_cycle_durations(Some(machine_s), Some(human_s))
            .with_fixed_durations(60, 30, 20)
    }

    #[test]
    fn test_nb_cycles_without_capacity_equals_qty() {
        let calc = CycleDurationCalculator::new();
        let line = machine_line(0, 10, 0);
        for qty in [0, 1, 7, 250] {
            let cycles = calc.compute_nb_cycles(&line, Decimal::from(qty)).unwrap();
            assert_eq!(cycles, Decimal::from(qty));
        }
    }

    #[test]
    fn test_nb_cycles_rounds_up() {
        let calc = CycleDurationCalculator::new();
        let line = machine_line(3, 10, 0);
        assert_eq!(calc.compute_nb_cycles(&line, Decimal::from(10)).unwrap(), Decimal::from(4));
        assert_eq!(calc.compute_nb_cycles(&line, Decimal::from(9)).unwrap(), Decimal::from(3));
        // 10.5 / 3 = 3.5 → 4
        assert_eq!(calc.compute_nb_cycles(&line, Decimal::new(105, 1)).unwrap(), Decimal::from(4));
    }

    #[test]
    fn test_machine_durations() {
        // qty=10, capacity=3 → 4 cycles
        // fixed = 60 + 30 + 3 × 20 = 150
        // machine = 150 + 4 × 100 = 550, human = 4 × 40 = 160
        let calc = CycleDurationCalculator::new();
        let line = machine_line(3, 100, 40);
        let d = calc.compute_cycle_durations(&line, Decimal::from(10)).unwrap();
        assert_eq!(d.nb_cycles, Decimal::from(4));
        assert_eq!(d.machine_duration, 550);
        assert_eq!(d.human_duration, 160);
        assert_eq!(d.planned_duration, 550);
    }

    #[test]
    fn test_human_selected_when_longer_per_cycle() {
        let calc = CycleDurationCalculator::new();
        let line = machine_line(3, 40, 100);
        let d = calc.compute_cycle_durations(&line, Decimal::from(10)).unwrap();
        assert_eq!(d.machine_duration, 150 + 160);
        assert_eq!(d.human_duration, 400);
        assert_eq!(d.planned_duration, 400);
    }

    #[test]
    fn test_tie_prefers_machine() {
        let calc = CycleDurationCalculator::new();
        let line = machine_line(0, 50, 50);
        let d = calc.compute_cycle_durations(&line, Decimal::from(2)).unwrap();
        // fixed = 60 + 30 + 1 × 20 = 110
        assert_eq!(d.machine_duration, 110 + 100);
        assert_eq!(d.human_duration, 100);
        assert_eq!(d.planned_duration, d.machine_duration);
    }

    #[test]
    fn test_human_work_center_has_no_fixed_duration() {
        let calc = CycleDurationCalculator::new();
        let line = ProdProcessLine::new("Packing", 20, Some(WorkCenter::human("WC-PACK", "Packing")))
            .with_cycle_durations(None, Some(30))
            .with_fixed_durations(600, 600, 600);
        let d = calc.compute_cycle_durations(&line, Decimal::from(3)).unwrap();
        assert_eq!(d.machine_duration, 0);
        assert_eq!(d.human_duration, 90);
        assert_eq!(d.planned_duration, 90);
    }

    #[test]
    fn test_fractional_qty_truncates_seconds() {
        // 2.5 cycles × 7s = 17.5 → 17
        let calc = CycleDurationCalculator::new();
        let line = ProdProcessLine::new("Coating", 10, Some(WorkCenter::human("WC-COAT", "Coating")))
            .with_cycle_durations(None, Some(7));
        let d = calc.compute_cycle_durations(&line, Decimal::new(25, 1)).unwrap();
        assert_eq!(d.human_duration, 17);
    }

    #[test]
    fn test_operation_order_receives_durations() {
        let calc = CycleDurationCalculator::new();
        let line = machine_line(3, 40, 100);
        let mut op = OperationOrder::from_line("OP-01", line.clone());
        let planned = calc
            .compute_entire_cycle_duration(Some(&mut op), &line, Decimal::from(10))
            .unwrap();
        assert_eq!(planned, 400);
        assert_eq!(op.planned_machine_duration, 310);
        assert_eq!(op.planned_human_duration, 400);
    }

    #[test]
    fn test_missing_machine_fails() {
        let calc = CycleDurationCalculator::new();
        let mut wc = machine_center();
        wc.work_center_type = WorkCenterType::Both;
        wc.machine = None;
        let line = ProdProcessLine::new("Welding", 10, Some(wc)).with_cycle_durations(Some(10), None);
        let err = calc.compute_cycle_durations(&line, Decimal::ONE).unwrap_err();
        assert!(matches!(
            err,
            ProductionError::WorkCenterNoMachine { ref work_center } if work_center == "Press"
        ));
    }

    #[test]
    fn test_missing_work_center_fails_with_context() {
        let calc = CycleDurationCalculator::new();
        let process = ProdProcess::new(
            "PP-100",
            "Frame",
            vec![ProdProcessLine::new("Deburring", 10, None)],
        );
        let err = calc.compute_entire_duration(&process, Decimal::ONE).unwrap_err();
        match err {
            ProductionError::MissingWorkCenter { process_code, line_name } => {
                assert_eq!(process_code, "PP-100");
                assert_eq!(line_name, "Deburring");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_work_center_names_process_without_attached_lines() {
        let calc = CycleDurationCalculator::new();
        // 未经 ProdProcess::new / attach_lines（如直接反序列化）
        let process = ProdProcess {
            code: "PP-RAW".to_string(),
            name: "Raw".to_string(),
            lines: vec![ProdProcessLine::new("Deburr", 1, None)],
        };
        assert!(process.lines[0].process_code.is_none());

        for err in [
            calc.compute_entire_duration(&process, Decimal::ONE).unwrap_err(),
            calc.compute_lead_time_duration(&process, Decimal::ONE).unwrap_err(),
        ] {
            match err {
                ProductionError::MissingWorkCenter { process_code, line_name } => {
                    assert_eq!(process_code, "PP-RAW");
                    assert_eq!(line_name, "Deburr");
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        // 单行入口无工艺路线可参考
        let err = calc.compute_cycle_durations(&process.lines[0], Decimal::ONE).unwrap_err();
        assert!(err.to_string().contains("UNKNOWN"));
    }

    #[test]
    fn test_zero_qty_with_capacity_keeps_negative_setup() {
        let calc = CycleDurationCalculator::new();
        // nb_cycles = 0 → 60 + 30 + (0 - 1) × 20
        let d = calc.compute_cycle_durations(&machine_line(5, 30, 0), Decimal::ZERO).unwrap();
        assert_eq!(d.nb_cycles, Decimal::ZERO);
        assert_eq!(d.machine_duration, 70);
        assert_eq!(d.planned_duration, 70);

        let setup_only = ProdProcessLine::new("Setup", 10, Some(machine_center()))
            .with_capacity(Decimal::from(5))
            .with_cycle_durations(Some(30), None)
            .with_fixed_durations(0, 0, 60);
        let d = calc.compute_cycle_durations(&setup_only, Decimal::ZERO).unwrap();
        assert_eq!(d.planned_duration, -60);
    }

    #[test]
    fn test_next_and_previous_priority() {
        let calc = CycleDurationCalculator::new();
        let wc = WorkCenter::human("WC", "Bench");
        let lines = [1, 1, 3, 5]
            .iter()
            .map(|p| ProdProcessLine::new("L", *p, Some(wc.clone())))
            .collect();
        let process = ProdProcess::new("PP", "Chain", lines);

        assert_eq!(calc.get_next_priority(Some(&process), Some(1)), Some(3));
        assert_eq!(calc.get_next_priority(Some(&process), Some(5)), None);
        assert_eq!(calc.get_next_priority(None, Some(1)), None);
        assert_eq!(calc.get_next_priority(Some(&process), None), None);
        assert_eq!(calc.get_previous_priority(Some(&process), Some(5)), Some(3));
        assert_eq!(calc.get_previous_priority(Some(&process), Some(1)), None);

        let empty = ProdProcess::new("PP-EMPTY", "Empty", Vec::new());
        assert_eq!(calc.get_next_priority(Some(&empty), Some(0)), None);
    }
}
