//! Main logger implementation
//!
//! A `Logger` checks levels and filters on the caller's thread, builds the
//! event, and hands it to a fan-out task spawned on the registry's runtime.
//! The caller never waits on I/O.
//!
//! Fan-out tasks of one logger pass a baton (a chained oneshot) so they
//! deliver to the appenders in submission order even though each call runs
//! as its own task.

use super::{
    appender::Appender,
    fallback,
    filter::{Filter, FilterChain, FilterId},
    log_context::ContextData,
    log_event::LogEvent,
    log_level::{AtomicLevel, LogLevel},
};
use futures::FutureExt;
use parking_lot::{Mutex, RwLock};
use std::error::Error;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::{JoinError, JoinSet};

static NEXT_LOGGER_ID: AtomicU64 = AtomicU64::new(1);

type Appenders = Arc<Vec<Arc<dyn Appender>>>;

struct Dispatch {
    tasks: JoinSet<()>,
    /// Completion signal of the most recently spawned fan-out task
    baton: Option<oneshot::Receiver<()>>,
}

pub struct Logger {
    name: String,
    id: u64,
    level: AtomicLevel,
    global_level: Arc<AtomicLevel>,
    filters: FilterChain,
    /// Registry-wide filters, consulted after this logger's own chain
    global_filters: Arc<FilterChain>,
    appenders: RwLock<Appenders>,
    dispatch: Mutex<Dispatch>,
    closed: AtomicBool,
    handle: Handle,
}

impl Logger {
    pub(crate) fn new(
        name: impl Into<String>,
        level: LogLevel,
        global_level: Arc<AtomicLevel>,
        global_filters: Arc<FilterChain>,
        handle: Handle,
    ) -> Self {
        Self {
            name: name.into(),
            id: NEXT_LOGGER_ID.fetch_add(1, Ordering::Relaxed),
            level: AtomicLevel::new(level),
            global_level,
            filters: FilterChain::new(),
            global_filters,
            appenders: RwLock::new(Arc::new(Vec::new())),
            dispatch: Mutex::new(Dispatch {
                tasks: JoinSet::new(),
                baton: None,
            }),
            closed: AtomicBool::new(false),
            handle,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Process-unique id, distinct for every logger ever created.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn level(&self) -> LogLevel {
        self.level.load()
    }

    pub fn set_level(&self, level: LogLevel) {
        self.level.store(level);
    }

    /// Whether `level` passes both the global and this logger's minimum.
    #[inline]
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level.is_enabled(self.global_level.load()) && level.is_enabled(self.level.load())
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn add_filter<F: Filter + 'static>(&self, filter: F) -> FilterId {
        self.filters.add(filter)
    }

    pub(crate) fn add_shared_filter(&self, filter: Arc<dyn Filter>) -> FilterId {
        self.filters.add_shared(filter)
    }

    pub fn remove_filter(&self, id: FilterId) -> bool {
        self.filters.remove(id)
    }

    /// Start `appender` and deliver every later event to it.
    pub fn add_appender(&self, appender: Arc<dyn Appender>) {
        appender.start();
        let mut appenders = self.appenders.write();
        let mut next = Vec::with_capacity(appenders.len() + 1);
        next.extend(appenders.iter().cloned());
        next.push(appender);
        *appenders = Arc::new(next);
    }

    pub fn appender_count(&self) -> usize {
        self.appenders.read().len()
    }

    /// Log a message produced by `message`.
    ///
    /// `message` is only called when `level` is enabled, so expensive
    /// formatting costs nothing for disabled levels.
    pub fn log<F, S>(&self, level: LogLevel, error: Option<&(dyn Error + 'static)>, message: F)
    where
        F: FnOnce() -> S,
        S: AsRef<str>,
    {
        self.log_with_context(level, error, ContextData::new(), message);
    }

    /// Like [`log`](Self::log), with `context` merged over the task-local context.
    pub fn log_with_context<F, S>(
        &self,
        level: LogLevel,
        error: Option<&(dyn Error + 'static)>,
        context: ContextData,
        message: F,
    ) where
        F: FnOnce() -> S,
        S: AsRef<str>,
    {
        if self.is_closed() || !self.is_enabled(level) {
            return;
        }

        let mut event = LogEvent::new(level, self.name.as_str(), message().as_ref());
        if let Some(error) = error {
            event = event.with_error(error);
        }
        if !context.is_empty() {
            event = event.with_context(context);
        }

        if !self.filters.accepts(&event) || !self.global_filters.accepts(&event) {
            return;
        }
        self.dispatch(event);
    }

    pub fn log_error(&self, level: LogLevel, error: &(dyn Error + 'static), message: &str) {
        self.log(level, Some(error), || message);
    }

    #[inline]
    pub fn trace(&self, message: &str) {
        self.log(LogLevel::Trace, None, || message);
    }

    #[inline]
    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, None, || message);
    }

    #[inline]
    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, None, || message);
    }

    #[inline]
    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, None, || message);
    }

    #[inline]
    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, None, || message);
    }

    /// Fan-out tasks spawned and not yet reaped.
    pub fn pending_tasks(&self) -> usize {
        let mut dispatch = self.dispatch.lock();
        self.reap(&mut dispatch);
        dispatch.tasks.len()
    }

    fn dispatch(&self, event: LogEvent) {
        let mut dispatch = self.dispatch.lock();
        // Checked again under the lock so no task is spawned after shutdown
        // has collected the outstanding ones.
        if self.is_closed() {
            return;
        }
        self.reap(&mut dispatch);

        let (done, next_baton) = oneshot::channel();
        let previous = dispatch.baton.replace(next_baton);
        let appenders = Arc::clone(&*self.appenders.read());

        dispatch
            .tasks
            .spawn_on(fan_out(event, appenders, previous, done), &self.handle);
    }

    fn reap(&self, dispatch: &mut Dispatch) {
        while let Some(result) = dispatch.tasks.try_join_next() {
            self.report_join(result);
        }
    }

    fn report_join(&self, result: Result<(), JoinError>) {
        if let Err(e) = result {
            if e.is_panic() {
                fallback::critical(format_args!(
                    "Fan-out task of logger '{}' panicked: {}",
                    self.name,
                    fallback::panic_message(e.into_panic().as_ref())
                ));
            } else {
                fallback::warning(format_args!(
                    "Fan-out task of logger '{}' was cancelled",
                    self.name
                ));
            }
        }
    }

    /// Stop accepting events, wait for every outstanding fan-out task, then
    /// stop each appender.
    ///
    /// Idempotent: only the first call does any work. Logging afterwards is a
    /// silent no-op.
    pub async fn shutdown(&self) {
        let tasks = {
            let mut dispatch = self.dispatch.lock();
            if self.closed.swap(true, Ordering::AcqRel) {
                return;
            }
            dispatch.baton = None;
            std::mem::replace(&mut dispatch.tasks, JoinSet::new())
        };

        let mut tasks = tasks;
        while let Some(result) = tasks.join_next().await {
            self.report_join(result);
        }

        let appenders = Arc::clone(&*self.appenders.read());
        for appender in appenders.iter() {
            if let Err(panic) = AssertUnwindSafe(appender.stop()).catch_unwind().await {
                fallback::critical(format_args!(
                    "Appender '{}' of logger '{}' panicked while stopping: {}",
                    appender.name(),
                    self.name,
                    fallback::panic_message(panic.as_ref())
                ));
            }
        }
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("level", &self.level())
            .field("filters", &self.filters)
            .field("appenders", &self.appender_count())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Deliver one event to every appender, in order, after the previous task
/// of the same logger has finished.
///
/// **Per-Appender Panic Isolation**: each append is wrapped in `catch_unwind`
/// so a failing appender never keeps the event from the others.
async fn fan_out(
    event: LogEvent,
    appenders: Appenders,
    previous: Option<oneshot::Receiver<()>>,
    done: oneshot::Sender<()>,
) {
    if let Some(previous) = previous {
        // Err means the previous task is gone; nothing left to wait for.
        let _ = previous.await;
    }

    for appender in appenders.iter() {
        match AssertUnwindSafe(appender.append(&event)).catch_unwind().await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                fallback::error(format_args!(
                    "Appender '{}' failed for logger '{}': {}",
                    appender.name(),
                    event.logger_name,
                    e
                ));
            }
            Err(panic) => {
                fallback::critical(format_args!(
                    "Appender '{}' panicked for logger '{}': {}. \
                     Other appenders continue to function.",
                    appender.name(),
                    event.logger_name,
                    fallback::panic_message(panic.as_ref())
                ));
            }
        }
    }

    let _ = done.send(());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LoggerError, Result};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct MemoryAppender {
        lines: Mutex<Vec<String>>,
        stops: AtomicUsize,
    }

    #[async_trait]
    impl Appender for MemoryAppender {
        async fn append(&self, event: &LogEvent) -> Result<()> {
            self.lines
                .lock()
                .push(format!("{} {}", event.level, event.message));
            Ok(())
        }

        async fn stop(&self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }

        fn name(&self) -> &str {
            "memory"
        }
    }

    struct PanickingAppender;

    #[async_trait]
    impl Appender for PanickingAppender {
        async fn append(&self, _event: &LogEvent) -> Result<()> {
            panic!("appender exploded")
        }

        fn name(&self) -> &str {
            "panicking"
        }
    }

    struct FailingAppender;

    #[async_trait]
    impl Appender for FailingAppender {
        async fn append(&self, _event: &LogEvent) -> Result<()> {
            Err(LoggerError::destination_closed("memory"))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn logger(level: LogLevel) -> Logger {
        Logger::new(
            "test",
            level,
            Arc::new(AtomicLevel::new(LogLevel::Trace)),
            Arc::new(FilterChain::new()),
            Handle::current(),
        )
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_order_preserved_per_logger() {
        let logger = logger(LogLevel::Trace);
        let memory = Arc::new(MemoryAppender::default());
        logger.add_appender(memory.clone());

        for i in 0..500 {
            logger.info(&format!("event {}", i));
        }
        logger.shutdown().await;

        let lines = memory.lines.lock();
        let expected: Vec<String> = (0..500).map(|i| format!("INFO event {}", i)).collect();
        assert_eq!(*lines, expected);
        assert_eq!(memory.stops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_disabled_level_skips_thunk() {
        let logger = logger(LogLevel::Warn);
        let calls = AtomicUsize::new(0);

        logger.log(LogLevel::Debug, None, || {
            calls.fetch_add(1, Ordering::SeqCst);
            "expensive"
        });
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(logger.pending_tasks(), 0);
    }

    #[tokio::test]
    async fn test_global_level_gates() {
        let global = Arc::new(AtomicLevel::new(LogLevel::Error));
        let logger = Logger::new(
            "gated",
            LogLevel::Trace,
            Arc::clone(&global),
            Arc::new(FilterChain::new()),
            Handle::current(),
        );

        assert!(!logger.is_enabled(LogLevel::Warn));
        global.store(LogLevel::Debug);
        assert!(logger.is_enabled(LogLevel::Warn));
        assert!(!logger.is_enabled(LogLevel::Trace));
    }

    #[tokio::test]
    async fn test_filter_rejects_silently() {
        let logger = logger(LogLevel::Trace);
        let memory = Arc::new(MemoryAppender::default());
        logger.add_appender(memory.clone());

        let id = logger.add_filter(|e: &LogEvent| !e.message.contains("health"));
        logger.info("GET /health");
        logger.info("GET /orders");
        assert!(logger.remove_filter(id));
        logger.info("GET /health again");
        logger.shutdown().await;

        let lines = memory.lines.lock();
        assert_eq!(*lines, vec!["INFO GET /orders", "INFO GET /health again"]);
    }

    #[tokio::test]
    async fn test_global_filters_run_after_local() {
        let global = Arc::new(FilterChain::new());
        let logger = Logger::new(
            "layered",
            LogLevel::Trace,
            Arc::new(AtomicLevel::new(LogLevel::Trace)),
            Arc::clone(&global),
            Handle::current(),
        );
        let memory = Arc::new(MemoryAppender::default());
        logger.add_appender(memory.clone());

        let global_calls = Arc::new(AtomicUsize::new(0));
        {
            let global_calls = Arc::clone(&global_calls);
            global.add(move |e: &LogEvent| {
                global_calls.fetch_add(1, Ordering::SeqCst);
                !e.message.contains("secret")
            });
        }
        logger.add_filter(|e: &LogEvent| !e.message.contains("noise"));

        logger.info("noise");
        logger.info("secret token");
        logger.info("kept");
        logger.shutdown().await;

        assert_eq!(*memory.lines.lock(), vec!["INFO kept"]);
        // The local rejection of "noise" never reaches the global chain.
        assert_eq!(global_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_failing_appenders_do_not_block_others() {
        let logger = logger(LogLevel::Trace);
        let memory = Arc::new(MemoryAppender::default());
        logger.add_appender(Arc::new(PanickingAppender));
        logger.add_appender(Arc::new(FailingAppender));
        logger.add_appender(memory.clone());

        logger.warn("still delivered");
        logger.error("and this");
        logger.shutdown().await;

        assert_eq!(memory.lines.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_shutdown_idempotent_and_terminal() {
        let logger = logger(LogLevel::Trace);
        let memory = Arc::new(MemoryAppender::default());
        logger.add_appender(memory.clone());

        logger.info("before");
        logger.shutdown().await;
        logger.shutdown().await;
        logger.info("after");

        assert!(logger.is_closed());
        assert_eq!(logger.pending_tasks(), 0);
        assert_eq!(*memory.lines.lock(), vec!["INFO before"]);
        assert_eq!(memory.stops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_log_error_carries_chain() {
        let logger = logger(LogLevel::Trace);
        let captured = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&captured);
        logger.add_filter(move |e: &LogEvent| {
            *sink.lock() = e.error.clone();
            true
        });

        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        logger.log_error(LogLevel::Error, &io, "write failed");
        logger.shutdown().await;

        assert_eq!(captured.lock().as_deref(), Some("disk full"));
    }

    #[test]
    fn test_log_from_plain_thread() {
        let runtime = tokio::runtime::Runtime::new().expect("runtime");
        let logger = Arc::new(Logger::new(
            "threaded",
            LogLevel::Trace,
            Arc::new(AtomicLevel::new(LogLevel::Trace)),
            Arc::new(FilterChain::new()),
            runtime.handle().clone(),
        ));
        let memory = Arc::new(MemoryAppender::default());
        logger.add_appender(memory.clone());

        let worker = {
            let logger = Arc::clone(&logger);
            std::thread::spawn(move || logger.info("from a plain thread"))
        };
        worker.join().expect("thread panicked");

        runtime.block_on(logger.shutdown());
        assert_eq!(*memory.lines.lock(), vec!["INFO from a plain thread"]);
    }
}
