//! Registry configuration

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default bound on each destination queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1000;

/// Default time `Registry::shutdown_timeout` callers are expected to allow.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Settings shared by every logger and destination a registry creates.
///
/// Deserializes from partial documents; missing fields take their defaults.
///
/// ```
/// use async_logger_system::core::RegistryConfig;
/// use async_logger_system::LogLevel;
///
/// let config: RegistryConfig =
///     serde_json::from_str(r#"{"level":"Debug","queue_capacity":64}"#).unwrap();
/// assert_eq!(config.level, LogLevel::Debug);
/// assert_eq!(config.queue_capacity, 64);
/// assert!(config.create_parent_dirs);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Initial global minimum level
    pub level: LogLevel,
    /// Bound of each destination queue; must be at least 1
    pub queue_capacity: usize,
    /// Create missing parent directories when opening a file destination
    pub create_parent_dirs: bool,
    /// Budget used by `Registry::shutdown_default`
    #[serde(with = "duration_millis", rename = "shutdown_timeout_ms")]
    pub shutdown_timeout: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            create_parent_dirs: true,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }
}

impl RegistryConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn create_parent_dirs(mut self, create: bool) -> Self {
        self.create_parent_dirs = create;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            return Err(LoggerError::config(
                "RegistryConfig",
                "queue_capacity must be at least 1",
            ));
        }
        if self.shutdown_timeout.is_zero() {
            return Err(LoggerError::config(
                "RegistryConfig",
                "shutdown_timeout must be greater than zero",
            ));
        }
        Ok(())
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
