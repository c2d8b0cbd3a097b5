//! ExecutorConfig - confinement executor の設定
//!
//! JSON から読み込めるように serde で定義し、省略したフィールドは既定値で補います。

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// ExecutorConfig は registry を所有するスレッドとキューの設定
///
/// # 例
/// ```ignore
/// let config = ExecutorConfig::from_json_str(r#"{ "thread_name": "routes" }"#)?;
/// assert_eq!(config.queue_capacity, 256);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// registry を所有する OS スレッドの名前
    pub thread_name: String,
    /// 未処理ジョブの上限（満杯のとき送信側が待つ）
    pub queue_capacity: usize,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid executor config json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("queue_capacity must be greater than zero")]
    ZeroCapacity,

    #[error("queue_capacity must be at most {max}, got {got}")]
    CapacityTooLarge { max: usize, got: usize },

    #[error("thread_name must not be empty")]
    EmptyThreadName,
}

impl ExecutorConfig {
    pub const DEFAULT_THREAD_NAME: &'static str = "switchboard-registry";
    pub const DEFAULT_QUEUE_CAPACITY: usize = 256;
    pub const MAX_QUEUE_CAPACITY: usize = 1 << 16;

    /// JSON 文字列から読み込んで検証
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 設定値を検証（`RegistryExecutor::spawn` も起動前に呼ぶ）
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.queue_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.queue_capacity > Self::MAX_QUEUE_CAPACITY {
            return Err(ConfigError::CapacityTooLarge {
                max: Self::MAX_QUEUE_CAPACITY,
                got: self.queue_capacity,
            });
        }
        if self.thread_name.trim().is_empty() {
            return Err(ConfigError::EmptyThreadName);
        }
        Ok(())
    }

    pub fn with_thread_name(mut self, thread_name: impl Into<String>) -> Self {
        self.thread_name = thread_name.into();
        self
    }

    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            thread_name: Self::DEFAULT_THREAD_NAME.to_string(),
            queue_capacity: Self::DEFAULT_QUEUE_CAPACITY,
        }
    }
}
