//! Contextual key/value data attached to the current unit of work
//!
//! This module provides:
//! - `ContextData`: the resolved map carried by every event
//! - `with_context` / `with_unit_of_work`: task-local scopes for async code
//! - `with_context_sync`: the same scope for a synchronous closure
//! - `propagate`: carry the current scope into a spawned child task
//!
//! The pipeline only ever *reads* the current context when it builds an event.

use std::collections::BTreeMap;
use std::future::Future;

/// Resolved context data; ordered so every formatter renders it deterministically.
pub type ContextData = BTreeMap<String, String>;

/// Snapshot of the logging context visible to the current task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingContext {
    pub unit_of_work: Option<String>,
    pub data: ContextData,
}

tokio::task_local! {
    static LOGGING_CONTEXT: LoggingContext;
}

/// Build a `ContextData` from key/value pairs.
///
/// # Example
///
/// ```
/// use async_logger_system::core::log_context::scope_data;
///
/// let data = scope_data([("user_id", "42"), ("request_id", "abc")]);
/// assert_eq!(data.get("user_id").map(String::as_str), Some("42"));
/// ```
pub fn scope_data<I, K, V>(pairs: I) -> ContextData
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// The context visible to the caller, or an empty one outside any scope.
pub fn current() -> LoggingContext {
    LOGGING_CONTEXT
        .try_with(LoggingContext::clone)
        .unwrap_or_default()
}

/// Context data of the current scope; empty outside any scope.
pub fn current_context_data() -> ContextData {
    LOGGING_CONTEXT
        .try_with(|ctx| ctx.data.clone())
        .unwrap_or_default()
}

/// Name of the current unit of work, if one was set.
pub fn current_unit_of_work() -> Option<String> {
    LOGGING_CONTEXT
        .try_with(|ctx| ctx.unit_of_work.clone())
        .ok()
        .flatten()
}

/// Run `fut` with `data` merged over the enclosing context.
///
/// Keys in `data` override keys of the same name from the outer scope.
///
/// ```
/// use async_logger_system::core::log_context::{current_context_data, scope_data, with_context};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let seen = with_context(scope_data([("user", "alice")]), async {
///     current_context_data()
/// })
/// .await;
/// assert_eq!(seen.get("user").map(String::as_str), Some("alice"));
/// assert!(current_context_data().is_empty());
/// # }
/// ```
pub async fn with_context<F>(data: ContextData, fut: F) -> F::Output
where
    F: Future,
{
    let mut ctx = current();
    ctx.data.extend(data);
    LOGGING_CONTEXT.scope(ctx, fut).await
}

/// Run `fut` as a named unit of work, keeping the enclosing context data.
pub async fn with_unit_of_work<F>(name: impl Into<String>, fut: F) -> F::Output
where
    F: Future,
{
    let mut ctx = current();
    ctx.unit_of_work = Some(name.into());
    LOGGING_CONTEXT.scope(ctx, fut).await
}

/// Synchronous counterpart of [`with_context`] for plain threads.
pub fn with_context_sync<F, R>(data: ContextData, f: F) -> R
where
    F: FnOnce() -> R,
{
    let mut ctx = current();
    ctx.data.extend(data);
    LOGGING_CONTEXT.sync_scope(ctx, f)
}

/// Wrap `fut` so it runs inside a copy of the caller's context.
///
/// Task-local values are not inherited by `tokio::spawn`; wrap the child
/// future with this before spawning it.
pub fn propagate<F>(fut: F) -> impl Future<Output = F::Output>
where
    F: Future,
{
    LOGGING_CONTEXT.scope(current(), fut)
}
