// ==========================================
// 生产工艺排产系统 - 配置层
// ==========================================
// 职责: 排产配置管理
// 存储: config_kv 表 或 JSON 文件
// ==========================================

pub mod config_manager;
pub mod error;
pub mod planning_config;
pub mod planning_config_reader;

// 重导出核心配置管理器
pub use config_manager::{config_keys, default_config_db_path, ConfigManager};
pub use error::{ConfigError, ConfigResult};
pub use planning_config::PlanningConfig;
pub use planning_config_reader::PlanningConfigReader;
