// ==========================================
// 生产工艺排产系统 - 工艺路线领域模型
// ==========================================
// 职责: 工艺路线（ProdProcess）及工序行（ProdProcessLine）
// 约定: 同一 priority 的工序并行，不同 priority 顺序执行
// ==========================================

use crate::domain::work_center::WorkCenter;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==========================================
// ProdProcessLine - 工序行
// ==========================================
// 所有时长单位: 秒
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProdProcessLine {
    pub name: String,
    pub priority: i32,

    #[serde(default)]
    pub work_center: Option<WorkCenter>,

    // ===== 产能参数 =====
    /// 每周期最大加工数量；0 表示不拆分周期
    #[serde(default)]
    pub max_capacity_per_cycle: Decimal,

    // ===== 周期时长 =====
    #[serde(default)]
    pub duration_per_cycle: Option<i64>, // 机器单周期时长
    #[serde(default)]
    pub human_duration: Option<i64>, // 人工单周期时长

    // ===== 固定时长（仅机器型工作中心） =====
    #[serde(default)]
    pub starting_duration: i64,
    #[serde(default)]
    pub ending_duration: i64,
    #[serde(default)]
    pub setup_duration: i64, // 周期间换型

    /// 所属工艺路线代码（用于错误定位）
    #[serde(default)]
    pub process_code: Option<String>,
}

impl ProdProcessLine {
    pub fn new(name: &str, priority: i32, work_center: Option<WorkCenter>) -> Self {
        Self {
            name: name.to_string(),
            priority,
            work_center,
            max_capacity_per_cycle: Decimal::ZERO,
            duration_per_cycle: None,
            human_duration: None,
            starting_duration: 0,
            ending_duration: 0,
            setup_duration: 0,
            process_code: None,
        }
    }

    pub fn with_capacity(mut self, max_capacity_per_cycle: Decimal) -> Self {
        self.max_capacity_per_cycle = max_capacity_per_cycle;
        self
    }

    pub fn with_cycle_durations(mut self, machine_s: Option<i64>, human_s: Option<i64>) -> Self {
        self.duration_per_cycle = machine_s;
        self.human_duration = human_s;
        self
    }

    pub fn with_fixed_durations(mut self, starting_s: i64, ending_s: i64, setup_s: i64) -> Self {
        self.starting_duration = starting_s;
        self.ending_duration = ending_s;
        self.setup_duration = setup_s;
        self
    }
}

// ==========================================
// ProdProcess - 工艺路线
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProdProcess {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub lines: Vec<ProdProcessLine>,
}

impl ProdProcess {
    /// 创建工艺路线，并为每个工序行回填所属路线代码
    pub fn new(code: &str, name: &str, lines: Vec<ProdProcessLine>) -> Self {
        let mut process = Self {
            code: code.to_string(),
            name: name.to_string(),
            lines,
        };
        process.attach_lines();
        process
    }

    /// 回填工序行的 process_code（从 JSON 加载后调用）
    pub fn attach_lines(&mut self) {
        for line in self.lines.iter_mut() {
            line.process_code = Some(self.code.clone());
        }
    }
}
