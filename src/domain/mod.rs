// ==========================================
// 生产工艺排产系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体与类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod operation;
pub mod process;
pub mod time_slot;
pub mod types;
pub mod work_center;

// 重导出核心类型
pub use operation::{ManufOrder, OperationOrder};
pub use process::{ProdProcess, ProdProcessLine};
pub use time_slot::{AvailabilityWindow, MachineTimeSlot};
pub use types::{CapacityMode, PastStartPolicy, PlanningStrategyType, WorkCenterType};
pub use work_center::{Machine, WorkCenter};
