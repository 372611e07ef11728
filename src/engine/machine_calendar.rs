// ==========================================
// 生产工艺排产系统 - 机器可用日历
// ==========================================
// 职责: 在机器可用窗口内为作业查找时间段
//       倒排: 截止时间之前最晚的时间段
//       正排: 起始时间之后最早的时间段
// 规则: 可用 = 可用窗口 − 停机时段 （− 已占用时段，仅有限产能）
//       未登记可用窗口的机器视为全天可用
// ==========================================

use crate::domain::time_slot::{AvailabilityWindow, MachineTimeSlot};
use crate::domain::types::CapacityMode;
use crate::domain::work_center::Machine;
use crate::engine::error::{ProductionError, ProductionResult};
use chrono::{Duration, NaiveDateTime};
use std::collections::HashMap;

/// 默认搜索范围（天）
pub const DEFAULT_SEARCH_HORIZON_DAYS: i64 = 365;

/// 搜索范围上限（天）
pub const MAX_SEARCH_HORIZON_DAYS: i64 = 3_650;

// ==========================================
// Trait: MachineAvailability
// ==========================================
// 用途: 排产策略查询机器空闲时间段
pub trait MachineAvailability {
    /// 查找截止 `to` 之前、累计可用时长达到 `min_duration_s` 的最晚时间段
    ///
    /// `from` 为理想开始时间（`to - 名义工时`），可用时间不足时向更早处延伸
    fn furthest_time_slot_from(
        &self,
        machine: &Machine,
        from: NaiveDateTime,
        to: NaiveDateTime,
        min_duration_s: i64,
        mode: CapacityMode,
    ) -> ProductionResult<MachineTimeSlot>;

    /// 查找 `from` 之后、累计可用时长达到 `min_duration_s` 的最早时间段
    fn closest_time_slot_from(
        &self,
        machine: &Machine,
        from: NaiveDateTime,
        to: NaiveDateTime,
        min_duration_s: i64,
        mode: CapacityMode,
    ) -> ProductionResult<MachineTimeSlot>;

    /// 登记机器占用（有限产能模式）
    fn reserve(&mut self, machine: &Machine, slot: MachineTimeSlot);

    /// 撤销一条已登记的占用
    fn release(&mut self, machine: &Machine, slot: &MachineTimeSlot);
}

/// 单台机器的日历数据
#[derive(Debug, Clone, Default)]
struct MachineSchedule {
    windows: Vec<AvailabilityWindow>,
    blocked: Vec<AvailabilityWindow>,
    reservations: Vec<MachineTimeSlot>,
}

// ==========================================
// MachineCalendar - 内存机器日历
// ==========================================
#[derive(Debug, Clone)]
pub struct MachineCalendar {
    schedules: HashMap<String, MachineSchedule>,
    search_horizon: Duration,
}

impl MachineCalendar {
    pub fn new(search_horizon_days: i64) -> Self {
        Self {
            schedules: HashMap::new(),
            search_horizon: Duration::days(search_horizon_days.clamp(1, MAX_SEARCH_HORIZON_DAYS)),
        }
    }

    /// 登记可用窗口
    pub fn add_window(&mut self, machine_code: &str, start: NaiveDateTime, end: NaiveDateTime) {
        self.schedule_mut(machine_code)
            .windows
            .push(AvailabilityWindow::new(start, end));
    }

    /// 登记停机时段（优先于可用窗口）
    pub fn add_blocked_period(&mut self, machine_code: &str, start: NaiveDateTime, end: NaiveDateTime) {
        self.schedule_mut(machine_code)
            .blocked
            .push(AvailabilityWindow::new(start, end));
    }

    pub fn with_window(mut self, machine_code: &str, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        self.add_window(machine_code, start, end);
        self
    }

    pub fn with_blocked_period(mut self, machine_code: &str, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        self.add_blocked_period(machine_code, start, end);
        self
    }

    /// 已登记的占用时段
    pub fn reservations(&self, machine_code: &str) -> &[MachineTimeSlot] {
        self.schedules
            .get(machine_code)
            .map(|s| s.reservations.as_slice())
            .unwrap_or(&[])
    }

    fn schedule_mut(&mut self, machine_code: &str) -> &mut MachineSchedule {
        self.schedules.entry(machine_code.to_string()).or_default()
    }

    /// 计算 [lo, hi) 内的空闲区间（已排序、已合并）
    fn free_intervals(
        &self,
        machine_code: &str,
        lo: NaiveDateTime,
        hi: NaiveDateTime,
        mode: CapacityMode,
    ) -> Vec<AvailabilityWindow> {
        let range = AvailabilityWindow::new(lo, hi);
        let schedule = match self.schedules.get(machine_code) {
            Some(s) => s,
            None => return vec![range],
        };

        let base = if schedule.windows.is_empty() {
            vec![range]
        } else {
            let clipped = schedule
                .windows
                .iter()
                .filter_map(|w| clip(w, &range))
                .collect();
            merge(clipped)
        };

        let mut cuts: Vec<AvailabilityWindow> = schedule.blocked.clone();
        if mode == CapacityMode::Finite {
            cuts.extend(schedule.reservations.iter().map(|r| AvailabilityWindow::from(*r)));
        }

        subtract(base, &merge(cuts))
    }
}

impl Default for MachineCalendar {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_HORIZON_DAYS)
    }
}

impl MachineAvailability for MachineCalendar {
    fn furthest_time_slot_from(
        &self,
        machine: &Machine,
        from: NaiveDateTime,
        to: NaiveDateTime,
        min_duration_s: i64,
        mode: CapacityMode,
    ) -> ProductionResult<MachineTimeSlot> {
        if min_duration_s <= 0 {
            return Ok(MachineTimeSlot::new(to, to));
        }

        let lo = from.min(to.checked_sub_signed(self.search_horizon).unwrap_or(NaiveDateTime::MIN));
        let free = self.free_intervals(&machine.code, lo, to, mode);

        let mut remaining = min_duration_s;
        let mut slot_end: Option<NaiveDateTime> = None;
        for interval in free.iter().rev() {
            let end = *slot_end.get_or_insert(interval.end);
            let available = (interval.end - interval.start).num_seconds();
            if available >= remaining {
                let slot = MachineTimeSlot::new(interval.end - Duration::seconds(remaining), end);
                tracing::debug!(
                    machine = %machine.code,
                    start = %slot.start,
                    end = %slot.end,
                    "倒排时间段已找到"
                );
                return Ok(slot);
            }
            remaining -= available;
        }

        Err(ProductionError::NoAvailableTimeSlot {
            machine: machine.code.clone(),
            from: lo,
            to,
            required_s: min_duration_s,
        })
    }

    fn closest_time_slot_from(
        &self,
        machine: &Machine,
        from: NaiveDateTime,
        to: NaiveDateTime,
        min_duration_s: i64,
        mode: CapacityMode,
    ) -> ProductionResult<MachineTimeSlot> {
        if min_duration_s <= 0 {
            return Ok(MachineTimeSlot::new(from, from));
        }

        let hi = to.max(from.checked_add_signed(self.search_horizon).unwrap_or(NaiveDateTime::MAX));
        let free = self.free_intervals(&machine.code, from, hi, mode);

        let mut remaining = min_duration_s;
        let mut slot_start: Option<NaiveDateTime> = None;
        for interval in free.iter() {
            let start = *slot_start.get_or_insert(interval.start);
            let available = (interval.end - interval.start).num_seconds();
            if available >= remaining {
                let slot = MachineTimeSlot::new(start, interval.start + Duration::seconds(remaining));
                tracing::debug!(
                    machine = %machine.code,
                    start = %slot.start,
                    end = %slot.end,
                    "正排时间段已找到"
                );
                return Ok(slot);
            }
            remaining -= available;
        }

        Err(ProductionError::NoAvailableTimeSlot {
            machine: machine.code.clone(),
            from,
            to: hi,
            required_s: min_duration_s,
        })
    }

    fn reserve(&mut self, machine: &Machine, slot: MachineTimeSlot) {
        self.schedule_mut(&machine.code).reservations.push(slot);
    }

    fn release(&mut self, machine: &Machine, slot: &MachineTimeSlot) {
        if let Some(schedule) = self.schedules.get_mut(&machine.code) {
            if let Some(pos) = schedule.reservations.iter().rposition(|r| r == slot) {
                schedule.reservations.remove(pos);
            }
        }
    }
}

// ==========================================
// 区间运算
// ==========================================

fn clip(window: &AvailabilityWindow, range: &AvailabilityWindow) -> Option<AvailabilityWindow> {
    let clipped = AvailabilityWindow::new(window.start.max(range.start), window.end.min(range.end));
    (!clipped.is_empty()).then_some(clipped)
}

/// 排序并合并重叠 / 相邻区间
fn merge(mut windows: Vec<AvailabilityWindow>) -> Vec<AvailabilityWindow> {
    windows.retain(|w| !w.is_empty());
    windows.sort_by_key(|w| w.start);

    let mut merged: Vec<AvailabilityWindow> = Vec::with_capacity(windows.len());
    for w in windows {
        match merged.last_mut() {
            Some(last) if w.start <= last.end => last.end = last.end.max(w.end),
            _ => merged.push(w),
        }
    }
    merged
}

/// base − cuts（两者均已排序合并）
fn subtract(base: Vec<AvailabilityWindow>, cuts: &[AvailabilityWindow]) -> Vec<AvailabilityWindow> {
    let mut result = Vec::with_capacity(base.len());
    for w in base {
        let mut cursor = w.start;
        for cut in cuts.iter().filter(|c| c.start < w.end && c.end > w.start) {
            if cut.start > cursor {
                result.push(AvailabilityWindow::new(cursor, cut.start));
            }
            cursor = cursor.max(cut.end);
        }
        if cursor < w.end {
            result.push(AvailabilityWindow::new(cursor, w.end));
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn press() -> Machine {
        Machine::new("M01", "Press 01")
    }

    /// 3 月 2 / 3 日，每天 08:00-12:00 与 13:00-17:00
    fn two_shift_calendar() -> MachineCalendar {
        let mut calendar = MachineCalendar::new(30);
        for day in [2, 3] {
            calendar.add_window("M01", at(day, 8), at(day, 12));
            calendar.add_window("M01", at(day, 13), at(day, 17));
        }
        calendar
    }

    #[test]
    fn test_oversized_horizon_is_clamped() {
        let calendar = MachineCalendar::new(100_000_000).with_window("M01", at(2, 8), at(2, 12));
        assert_eq!(calendar.search_horizon, Duration::days(MAX_SEARCH_HORIZON_DAYS));

        for result in [
            calendar.furthest_time_slot_from(&press(), at(2, 7), at(2, 12), 5 * 3600, CapacityMode::Infinite),
            calendar.closest_time_slot_from(&press(), at(2, 8), at(2, 13), 5 * 3600, CapacityMode::Infinite),
        ] {
            assert!(matches!(result, Err(ProductionError::NoAvailableTimeSlot { .. })));
        }
    }

    #[test]
    fn test_search_near_datetime_limits_saturates() {
        let calendar = MachineCalendar::new(MAX_SEARCH_HORIZON_DAYS);
        let near_min = NaiveDateTime::MIN + Duration::days(1);
        let slot = calendar
            .furthest_time_slot_from(&press(), near_min, near_min, 3600, CapacityMode::Infinite)
            .unwrap();
        assert_eq!(slot.end, near_min);
        assert_eq!(slot.duration_s(), 3600);

        let near_max = NaiveDateTime::MAX - Duration::days(1);
        let slot = calendar
            .closest_time_slot_from(&press(), near_max, near_max, 3600, CapacityMode::Infinite)
            .unwrap();
        assert_eq!(slot.start, near_max);
        assert_eq!(slot.duration_s(), 3600);
    }

    #[test]
    fn test_unregistered_machine_is_always_available() {
        let calendar = MachineCalendar::default();
        let slot = calendar
            .furthest_time_slot_from(&press(), at(2, 10), at(2, 12), 7200, CapacityMode::Infinite)
            .unwrap();
        assert_eq!(slot, MachineTimeSlot::new(at(2, 10), at(2, 12)));

        let slot = calendar
            .closest_time_slot_from(&press(), at(2, 10), at(2, 12), 7200, CapacityMode::Infinite)
            .unwrap();
        assert_eq!(slot, MachineTimeSlot::new(at(2, 10), at(2, 12)));
    }

    #[test]
    fn test_furthest_snaps_end_into_window() {
        // 截止 3 日 20:00，工作到 17:00 结束，需要 2 小时
        let calendar = two_shift_calendar();
        let slot = calendar
            .furthest_time_slot_from(&press(), at(3, 18), at(3, 20), 7200, CapacityMode::Infinite)
            .unwrap();
        assert_eq!(slot, MachineTimeSlot::new(at(3, 15), at(3, 17)));
    }

    #[test]
    fn test_furthest_spans_lunch_break() {
        // 需要 6 小时: 13-17 (4h) + 10-12 (2h)
        let calendar = two_shift_calendar();
        let slot = calendar
            .furthest_time_slot_from(&press(), at(3, 11), at(3, 17), 6 * 3600, CapacityMode::Infinite)
            .unwrap();
        assert_eq!(slot, MachineTimeSlot::new(at(3, 10), at(3, 17)));
        assert_eq!(slot.duration_s(), 7 * 3600);
    }

    #[test]
    fn test_closest_skips_blocked_period() {
        let calendar = two_shift_calendar().with_blocked_period("M01", at(2, 8), at(2, 10));
        let slot = calendar
            .closest_time_slot_from(&press(), at(2, 6), at(2, 8), 3 * 3600, CapacityMode::Infinite)
            .unwrap();
        // 10-12 (2h) + 13-14 (1h)
        assert_eq!(slot, MachineTimeSlot::new(at(2, 10), at(2, 14)));
    }

    #[test]
    fn test_reservations_respected_only_in_finite_mode() {
        let mut calendar = two_shift_calendar();
        calendar.reserve(&press(), MachineTimeSlot::new(at(3, 13), at(3, 17)));

        let infinite = calendar
            .furthest_time_slot_from(&press(), at(3, 15), at(3, 17), 7200, CapacityMode::Infinite)
            .unwrap();
        assert_eq!(infinite, MachineTimeSlot::new(at(3, 15), at(3, 17)));

        let finite = calendar
            .furthest_time_slot_from(&press(), at(3, 15), at(3, 17), 7200, CapacityMode::Finite)
            .unwrap();
        assert_eq!(finite, MachineTimeSlot::new(at(3, 10), at(3, 12)));
        assert_eq!(calendar.reservations("M01").len(), 1);

        calendar.release(&press(), &MachineTimeSlot::new(at(3, 13), at(3, 17)));
        assert!(calendar.reservations("M01").is_empty());
    }

    #[test]
    fn test_no_slot_inside_horizon() {
        let calendar = two_shift_calendar();
        let err = calendar
            .furthest_time_slot_from(&press(), at(1, 0), at(2, 9), 4 * 3600, CapacityMode::Infinite)
            .unwrap_err();
        assert!(matches!(err, ProductionError::NoAvailableTimeSlot { ref machine, .. } if machine == "M01"));
    }

    #[test]
    fn test_merge_and_subtract() {
        let merged = merge(vec![
            AvailabilityWindow::new(at(2, 10), at(2, 12)),
            AvailabilityWindow::new(at(2, 8), at(2, 10)),
            AvailabilityWindow::new(at(2, 14), at(2, 15)),
        ]);
        assert_eq!(
            merged,
            vec![
                AvailabilityWindow::new(at(2, 8), at(2, 12)),
                AvailabilityWindow::new(at(2, 14), at(2, 15)),
            ]
        );

        let rest = subtract(merged, &[AvailabilityWindow::new(at(2, 9), at(2, 14))]);
        assert_eq!(
            rest,
            vec![
                AvailabilityWindow::new(at(2, 8), at(2, 9)),
                AvailabilityWindow::new(at(2, 14), at(2, 15)),
            ]
        );
    }
}
