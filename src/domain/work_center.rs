// ==========================================
// 生产工艺排产系统 - 工作中心领域模型
// ==========================================
// 职责: 工作中心（机器 / 人工 / 两者）及其挂接的机器
// ==========================================

use crate::domain::types::WorkCenterType;
use serde::{Deserialize, Serialize};

// ==========================================
// Machine - 机器
// ==========================================
// 可用日历由机器可用性服务按 code 维护
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Machine {
    pub code: String,
    pub name: String,
}

impl Machine {
    pub fn new(code: &str, name: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
        }
    }
}

// ==========================================
// WorkCenter - 工作中心
// ==========================================
// 红线: MACHINE / BOTH 类型必须挂接机器，否则工时计算失败
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkCenter {
    pub code: String,
    pub name: String,
    pub work_center_type: WorkCenterType,
    #[serde(default)]
    pub machine: Option<Machine>,
}

impl WorkCenter {
    /// 机器型工作中心
    pub fn machine(code: &str, name: &str, machine: Machine) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            work_center_type: WorkCenterType::Machine,
            machine: Some(machine),
        }
    }

    /// 人工型工作中心（不挂机器）
    pub fn human(code: &str, name: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            work_center_type: WorkCenterType::Human,
            machine: None,
        }
    }

    pub fn is_machine_capable(&self) -> bool {
        self.work_center_type.is_machine_capable()
    }
}
