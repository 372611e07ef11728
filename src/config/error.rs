// ==========================================
// 生产工艺排产系统 - 配置层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 配置层错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置存储访问失败: {0}")]
    StorageError(String),

    #[error("配置存储锁获取失败: {0}")]
    LockError(String),

    #[error("配置解析失败 (key={key}): {message}")]
    ParseError { key: String, message: String },

    #[error("配置快照格式错误: {0}")]
    SnapshotFormat(#[from] serde_json::Error),

    #[error("配置文件读取失败: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for ConfigError {
    fn from(err: rusqlite::Error) -> Self {
        ConfigError::StorageError(err.to_string())
    }
}

/// Result 类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
