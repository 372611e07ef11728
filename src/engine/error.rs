// ==========================================
// 生产工艺排产系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 错误必须携带可定位的上下文（路线代码 / 工序名 / 工作中心名）
// ==========================================

use chrono::NaiveDateTime;
use thiserror::Error;

/// 错误类别
///
/// - Inconsistency: 数据不一致（如工序行缺少工作中心）
/// - MissingField: 必填字段缺失（如机器型工作中心未配置机器）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Inconsistency,
    MissingField,
}

/// 引擎层错误类型
///
/// 所有错误均为终止性错误：本次计算整体放弃，不产生部分结果。
#[derive(Error, Debug)]
pub enum ProductionError {
    // ===== 工时计算错误 =====
    #[error("工序行缺少工作中心: process={process_code}, line={line_name}")]
    MissingWorkCenter {
        process_code: String,
        line_name: String,
    },

    #[error("工作中心未配置机器: work_center={work_center}")]
    WorkCenterNoMachine { work_center: String },

    #[error("工时计算溢出: line={line_name}")]
    DurationOverflow { line_name: String },

    // ===== 排产落位错误 =====
    #[error("作业缺少计划时间: operation={operation}, field={field}")]
    MissingPlannedDate {
        operation: String,
        field: &'static str,
    },

    #[error("机器无可用时间段: machine={machine}, window=[{from}, {to}], required={required_s}s")]
    NoAvailableTimeSlot {
        machine: String,
        from: NaiveDateTime,
        to: NaiveDateTime,
        required_s: i64,
    },

    #[error("计划开始时间早于当前时间: operation={operation}, planned_start={planned_start}, now={now}")]
    PlannedStartInPast {
        operation: String,
        planned_start: NaiveDateTime,
        now: NaiveDateTime,
    },

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ProductionError {
    /// 错误类别（供上层决定提示方式）
    pub fn category(&self) -> ErrorCategory {
        match self {
            ProductionError::WorkCenterNoMachine { .. }
            | ProductionError::MissingPlannedDate { .. } => ErrorCategory::MissingField,
            _ => ErrorCategory::Inconsistency,
        }
    }
}

/// Result 类型别名
pub type ProductionResult<T> = Result<T, ProductionError>;
