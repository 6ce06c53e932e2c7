//! Appender trait for log output destinations

use super::{error::Result, log_event::LogEvent};
use async_trait::async_trait;

/// Adapter that turns events into output.
///
/// `append` runs inside a logger's fan-out task, never on the caller's
/// thread, and may await (for example on a full destination queue).
///
/// # Example
///
/// ```no_run
/// use async_logger_system::core::{Appender, LogEvent, Result};
/// use async_trait::async_trait;
///
/// struct CountingAppender(std::sync::atomic::AtomicUsize);
///
/// #[async_trait]
/// impl Appender for CountingAppender {
///     async fn append(&self, _event: &LogEvent) -> Result<()> {
///         self.0.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
///         Ok(())
///     }
///
///     fn name(&self) -> &str {
///         "counting"
///     }
/// }
/// ```
#[async_trait]
pub trait Appender: Send + Sync {
    async fn append(&self, event: &LogEvent) -> Result<()>;

    /// Called when the owning logger is created. Must be idempotent.
    fn start(&self) {}

    /// Called once when the owning logger shuts down.
    async fn stop(&self) {}

    fn name(&self) -> &str;
}
