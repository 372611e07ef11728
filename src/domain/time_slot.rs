// ==========================================
// 生产工艺排产系统 - 时间段模型
// ==========================================
// 区间约定: [start, end) 半开区间
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// 机器时间段（排产落位结果）
///
/// 时间段可跨越机器的不可用间隙，墙钟长度可能大于名义工时。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineTimeSlot {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl MachineTimeSlot {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// 墙钟时长（秒）
    pub fn duration_s(&self) -> i64 {
        (self.end - self.start).num_seconds()
    }

    pub fn overlaps(&self, other: &MachineTimeSlot) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// 机器可用 / 停机窗口
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl AvailabilityWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

impl From<MachineTimeSlot> for AvailabilityWindow {
    fn from(slot: MachineTimeSlot) -> Self {
        Self::new(slot.start, slot.end)
    }
}
