// ==========================================
// 生产工艺排产系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::planning_config_reader::PlanningConfigReader;
use crate::db::{init_config_schema, open_sqlite_connection};
use crate::domain::types::{CapacityMode, PastStartPolicy, PlanningStrategyType};
use crate::engine::machine_calendar::{DEFAULT_SEARCH_HORIZON_DAYS, MAX_SEARCH_HORIZON_DAYS};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例（config_kv 表不存在时创建）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（":memory:" 表示内存库）
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        init_config_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn.lock().map_err(|e| ConfigError::LockError(e.to_string()))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
            init_config_schema(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| ConfigError::LockError(e.to_string()))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.conn.lock().map_err(|e| ConfigError::LockError(e.to_string()))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }

    /// 读取并解析配置；缺失时取默认值，格式错误时告警并取默认值
    fn get_parsed_or_default<T: FromStr>(&self, key: &str, default: T) -> ConfigResult<T> {
        let raw = match self.get_config_value(key)? {
            Some(v) => v,
            None => return Ok(default),
        };

        match raw.parse::<T>() {
            Ok(value) => Ok(value),
            Err(_) => {
                tracing::warn!(
                    config_key = key,
                    raw_value = %raw,
                    "配置格式错误，使用默认值"
                );
                Ok(default)
            }
        }
    }

    /// 获取所有配置的快照（JSON格式）
    ///
    /// # 用途
    /// - 记录排产时使用的配置，便于复现
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self.conn.lock().map_err(|e| ConfigError::LockError(e.to_string()))?;

        let mut stmt = conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&config_map)?)
    }

    /// 从配置快照恢复配置
    ///
    /// # 返回
    /// - Ok(usize): 恢复的配置项数量
    ///
    /// # 注意
    /// - 此方法会覆盖现有的global配置
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> ConfigResult<usize> {
        let config_map: HashMap<String, String> = serde_json::from_str(snapshot_json)?;

        let mut conn = self.conn.lock().map_err(|e| ConfigError::LockError(e.to_string()))?;
        let tx = conn.transaction()?;

        let mut count = 0;
        for (key, value) in config_map.iter() {
            count += tx.execute(
                "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
                 ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
                params![key, value],
            )?;
        }

        tx.commit()?;
        Ok(count)
    }
}

// ==========================================
// PlanningConfigReader Trait 实现
// ==========================================
impl PlanningConfigReader for ConfigManager {
    fn get_planning_strategy(&self) -> ConfigResult<PlanningStrategyType> {
        self.get_parsed_or_default(config_keys::PLANNING_STRATEGY, PlanningStrategyType::AtTheLatest)
    }

    fn get_capacity_mode(&self) -> ConfigResult<CapacityMode> {
        self.get_parsed_or_default(config_keys::CAPACITY_MODE, CapacityMode::Infinite)
    }

    fn get_past_start_policy(&self) -> ConfigResult<PastStartPolicy> {
        self.get_parsed_or_default(config_keys::PAST_START_POLICY, PastStartPolicy::Warn)
    }

    fn get_slot_search_horizon_days(&self) -> ConfigResult<i64> {
        let days = self.get_parsed_or_default(config_keys::SLOT_SEARCH_HORIZON_DAYS, DEFAULT_SEARCH_HORIZON_DAYS)?;
        if !(1..=MAX_SEARCH_HORIZON_DAYS).contains(&days) {
            tracing::warn!(
                config_key = config_keys::SLOT_SEARCH_HORIZON_DAYS,
                days,
                max_days = MAX_SEARCH_HORIZON_DAYS,
                "搜索范围超出允许区间，使用默认值"
            );
            return Ok(DEFAULT_SEARCH_HORIZON_DAYS);
        }
        Ok(days)
    }
}

/// 默认配置库路径
///
/// 优先级: 环境变量 PRODUCTION_APS_CONFIG_DB → 用户数据目录 → 当前目录
pub fn default_config_db_path() -> String {
    if let Ok(path) = std::env::var("PRODUCTION_APS_CONFIG_DB") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    match dirs::data_dir() {
        Some(dir) => dir
            .join("production-aps")
            .join("production_aps_config.db")
            .to_string_lossy()
            .to_string(),
        None => "./production_aps_config.db".to_string(),
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 排产策略
    pub const PLANNING_STRATEGY: &str = "planning_strategy";
    pub const CAPACITY_MODE: &str = "capacity_mode";

    // 过期开始
    pub const PAST_START_POLICY: &str = "past_start_policy";

    // 机器日历
    pub const SLOT_SEARCH_HORIZON_DAYS: &str = "slot_search_horizon_days";
}
