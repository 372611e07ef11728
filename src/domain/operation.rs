// ==========================================
// 生产工艺排产系统 - 制造订单与作业
// ==========================================
// 职责: 制造订单（ManufOrder）与其下的作业（OperationOrder）
// 红线: 作业的计划工时由工时计算器写入，本模块不做计算
// ==========================================

use crate::domain::process::ProdProcessLine;
use crate::domain::work_center::{Machine, WorkCenter};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==========================================
// OperationOrder - 作业
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationOrder {
    pub code: String,
    pub priority: i32,
    pub prod_process_line: ProdProcessLine,

    // ===== 资源 =====
    #[serde(default)]
    pub work_center: Option<WorkCenter>,
    #[serde(default)]
    pub machine: Option<Machine>,
    /// 外协作业：不占用内部机器日历
    #[serde(default)]
    pub outsourcing: bool,

    // ===== 计划时间 =====
    #[serde(default)]
    pub planned_start: Option<NaiveDateTime>,
    #[serde(default)]
    pub planned_end: Option<NaiveDateTime>,
    #[serde(default)]
    pub planned_duration: i64, // 墙钟时长（秒）

    // ===== 计划工时（由工时计算器写入） =====
    #[serde(default)]
    pub planned_machine_duration: i64,
    #[serde(default)]
    pub planned_human_duration: i64,
}

impl OperationOrder {
    /// 从工序行创建作业，复制优先级、工作中心与机器
    pub fn from_line(code: &str, line: ProdProcessLine) -> Self {
        let work_center = line.work_center.clone();
        let machine = work_center.as_ref().and_then(|wc| wc.machine.clone());
        Self {
            code: code.to_string(),
            priority: line.priority,
            prod_process_line: line,
            work_center,
            machine,
            outsourcing: false,
            planned_start: None,
            planned_end: None,
            planned_duration: 0,
            planned_machine_duration: 0,
            planned_human_duration: 0,
        }
    }

    pub fn with_outsourcing(mut self, outsourcing: bool) -> Self {
        self.outsourcing = outsourcing;
        self
    }

    pub fn with_planned_end(mut self, planned_end: NaiveDateTime) -> Self {
        self.planned_end = Some(planned_end);
        self
    }

    pub fn with_planned_start(mut self, planned_start: NaiveDateTime) -> Self {
        self.planned_start = Some(planned_start);
        self
    }
}

// ==========================================
// ManufOrder - 制造订单
// ==========================================
// 作业按 priority 串联；作业的计划数量取订单数量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManufOrder {
    pub code: String,
    pub qty: Decimal,
    #[serde(default)]
    pub planned_start: Option<NaiveDateTime>,
    #[serde(default)]
    pub planned_end: Option<NaiveDateTime>,
    #[serde(default)]
    pub operation_orders: Vec<OperationOrder>,
}

impl ManufOrder {
    pub fn new(code: &str, qty: Decimal, operation_orders: Vec<OperationOrder>) -> Self {
        Self {
            code: code.to_string(),
            qty,
            planned_start: None,
            planned_end: None,
            operation_orders,
        }
    }

    /// 由工艺路线的每个工序行生成作业，作业代码为 `{订单代码}-{序号}`
    pub fn from_lines(code: &str, qty: Decimal, lines: &[ProdProcessLine]) -> Self {
        let operation_orders = lines
            .iter()
            .enumerate()
            .map(|(idx, line)| OperationOrder::from_line(&format!("{}-{:02}", code, idx + 1), line.clone()))
            .collect();
        Self::new(code, qty, operation_orders)
    }
}
