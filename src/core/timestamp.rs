//! Timestamp rendering for formatters
//!
//! Every event carries a `DateTime<Utc>`; formatters pick how to print it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// strftime pattern used by the human-readable formatter.
pub const SIMPLE_PATTERN: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// How a formatter renders an event timestamp.
///
/// # Examples
///
/// ```
/// use async_logger_system::core::TimestampFormat;
/// use chrono::{TimeZone, Utc};
///
/// let ts = Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).single().unwrap();
/// assert_eq!(TimestampFormat::Iso8601.format(&ts), "2025-01-08T10:30:45.000Z");
/// assert_eq!(TimestampFormat::simple().format(&ts), "2025-01-08 10:30:45.000");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// `2025-01-08T10:30:45.123Z`
    #[default]
    Iso8601,

    /// `2025-01-08T10:30:45.123456Z`
    Iso8601Micros,

    /// `2025-01-08T10:30:45.123+00:00`
    Rfc3339,

    /// Milliseconds since the Unix epoch: `1736332245123`
    UnixMillis,

    /// Any strftime pattern understood by chrono.
    Custom(String),
}

impl TimestampFormat {
    /// `yyyy-MM-dd HH:mm:ss.SSS`, the default of `SimpleFormatter`.
    #[must_use]
    pub fn simple() -> Self {
        TimestampFormat::Custom(SIMPLE_PATTERN.to_string())
    }

    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>) -> String {
        match self {
            TimestampFormat::Iso8601 => datetime.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            TimestampFormat::Iso8601Micros => datetime.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
            TimestampFormat::Rfc3339 => {
                datetime.to_rfc3339_opts(chrono::SecondsFormat::Millis, false)
            }
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::Custom(pattern) => datetime.format(pattern).to_string(),
        }
    }

    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, TimestampFormat::UnixMillis)
    }
}
