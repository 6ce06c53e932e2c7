//! Registry of loggers and destination writers
//!
//! The registry is the single owner of every logger and every destination
//! writer it creates. It guarantees one logger per name and one writer per
//! physical sink, holds the global minimum level, and shuts everything down
//! in order: loggers first, then writers.

use super::{
    appender::Appender,
    config::RegistryConfig,
    error::{LoggerError, Result},
    fallback,
    filter::{Filter, FilterChain, FilterId},
    log_event::LogEvent,
    log_level::{AtomicLevel, LogLevel},
    logger::Logger,
};
use crate::appenders::{
    sink::{self, ConsoleTarget, SinkHandle, SinkId},
    DestinationWriter, QueuedAppender,
};
use crate::formatters::Formatter;
use futures::future::join_all;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;

pub struct Registry {
    config: RegistryConfig,
    global_level: Arc<AtomicLevel>,
    filters: Arc<FilterChain>,
    loggers: Mutex<HashMap<String, Arc<Logger>>>,
    writers: Mutex<HashMap<SinkId, Arc<DestinationWriter>>>,
    shut_down: AtomicBool,
    handle: Handle,
}

impl Registry {
    /// Create a registry bound to the tokio runtime the caller is running on.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if `config` does not validate, `NoRuntime` when
    /// called outside a tokio runtime.
    pub fn new(config: RegistryConfig) -> Result<Arc<Self>> {
        let handle = Handle::try_current().map_err(|e| LoggerError::NoRuntime(e.to_string()))?;
        Self::with_handle(config, handle)
    }

    /// Create a registry that spawns its tasks on `handle`.
    pub fn with_handle(config: RegistryConfig, handle: Handle) -> Result<Arc<Self>> {
        config.validate()?;
        Ok(Arc::new(Self {
            global_level: Arc::new(AtomicLevel::new(config.level)),
            filters: Arc::new(FilterChain::new()),
            config,
            loggers: Mutex::new(HashMap::new()),
            writers: Mutex::new(HashMap::new()),
            shut_down: AtomicBool::new(false),
            handle,
        }))
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }

    pub fn set_global_level(&self, level: LogLevel) {
        self.global_level.store(level);
    }

    pub fn global_level(&self) -> LogLevel {
        self.global_level.load()
    }

    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level.is_enabled(self.global_level.load())
    }

    /// Add a filter applied to every logger's events, existing and future.
    ///
    /// Registry filters run after a logger's own filters; an event is
    /// delivered only if both chains accept it.
    pub fn add_filter<F: Filter + 'static>(&self, filter: F) -> FilterId {
        self.filters.add(filter)
    }

    pub fn remove_filter(&self, id: FilterId) -> bool {
        self.filters.remove(id)
    }

    /// Whether the registry-wide filters accept `event`.
    pub fn filter_all(&self, event: &LogEvent) -> bool {
        self.filters.accepts(event)
    }

    /// Look up the logger called `name`, creating it if it does not exist.
    ///
    /// The first call for a name decides the logger's configuration; later
    /// calls return the same instance and ignore their arguments. Appenders
    /// of a new logger are started before it is returned.
    ///
    /// # Errors
    ///
    /// `RegistryShutDown` once [`shutdown`](Self::shutdown) has begun.
    pub fn get_or_create_logger(
        &self,
        name: &str,
        level: LogLevel,
        filters: Vec<Arc<dyn Filter>>,
        appenders: Vec<Arc<dyn Appender>>,
    ) -> Result<Arc<Logger>> {
        let mut loggers = self.loggers.lock();
        if self.is_shut_down() {
            return Err(LoggerError::RegistryShutDown);
        }
        if let Some(existing) = loggers.get(name) {
            return Ok(Arc::clone(existing));
        }

        let logger = Arc::new(Logger::new(
            name,
            level,
            Arc::clone(&self.global_level),
            Arc::clone(&self.filters),
            self.handle.clone(),
        ));
        for filter in filters {
            logger.add_shared_filter(filter);
        }
        for appender in appenders {
            logger.add_appender(appender);
        }
        loggers.insert(name.to_string(), Arc::clone(&logger));
        Ok(logger)
    }

    /// Builder over [`get_or_create_logger`](Self::get_or_create_logger).
    ///
    /// ```no_run
    /// use async_logger_system::prelude::*;
    /// use std::sync::Arc;
    ///
    /// # async fn example() -> Result<()> {
    /// let registry = Registry::new(RegistryConfig::default())?;
    /// let console = registry.console_appender(ConsoleTarget::Stdout, Arc::new(SimpleFormatter::new()))?;
    /// let logger = registry
    ///     .logger("svc")
    ///     .level(LogLevel::Debug)
    ///     .appender(console)
    ///     .build()?;
    /// logger.info("ready");
    /// registry.shutdown().await;
    /// # Ok(())
    /// # }
    /// ```
    pub fn logger(&self, name: impl Into<String>) -> LoggerBuilder<'_> {
        LoggerBuilder {
            registry: self,
            name: name.into(),
            level: LogLevel::Trace,
            filters: Vec::new(),
            appenders: Vec::new(),
        }
    }

    /// Existing logger called `name`, without creating one.
    pub fn get_logger(&self, name: &str) -> Option<Arc<Logger>> {
        self.loggers.lock().get(name).cloned()
    }

    /// Appender writing to a process standard stream.
    pub fn console_appender(
        &self,
        target: ConsoleTarget,
        formatter: Arc<dyn Formatter>,
    ) -> Result<Arc<QueuedAppender>> {
        let id = target.sink_id();
        let writer = self.writer_for(id.clone(), || Ok(target.open()))?;
        Ok(Arc::new(QueuedAppender::new(id.to_string(), formatter, writer)))
    }

    /// Appender writing to a file opened in append mode.
    ///
    /// Two appenders for the same file, however the path is spelled, share
    /// one writer.
    ///
    /// # Errors
    ///
    /// A configuration error if the parent directory cannot be created or
    /// the file cannot be opened. Callers may fall back to a console appender.
    pub fn file_appender(
        &self,
        path: impl AsRef<Path>,
        formatter: Arc<dyn Formatter>,
    ) -> Result<Arc<QueuedAppender>> {
        let id = sink::resolve_file(path.as_ref(), self.config.create_parent_dirs)?;
        let writer = self.writer_for(id.clone(), || match &id {
            SinkId::File(resolved) => sink::open_file(resolved),
            other => Err(LoggerError::other(format!("'{}' is not a file sink", other))),
        })?;
        Ok(Arc::new(QueuedAppender::new(id.to_string(), formatter, writer)))
    }

    /// Appender writing to a caller-supplied sink registered under `name`.
    ///
    /// If a sink is already registered under `name`, the existing writer is
    /// reused and `sink` is dropped.
    pub fn sink_appender(
        &self,
        name: impl Into<String>,
        sink: SinkHandle,
        formatter: Arc<dyn Formatter>,
    ) -> Result<Arc<QueuedAppender>> {
        let id = SinkId::Named(name.into());
        let writer = self.writer_for(id.clone(), || Ok(sink))?;
        Ok(Arc::new(QueuedAppender::new(id.to_string(), formatter, writer)))
    }

    /// Writer cached under `id`, opening the sink only on first use.
    fn writer_for<F>(&self, id: SinkId, open: F) -> Result<Arc<DestinationWriter>>
    where
        F: FnOnce() -> Result<SinkHandle>,
    {
        let mut writers = self.writers.lock();
        if self.is_shut_down() {
            return Err(LoggerError::RegistryShutDown);
        }
        if let Some(existing) = writers.get(&id) {
            return Ok(Arc::clone(existing));
        }

        let writer = Arc::new(DestinationWriter::new(
            id.clone(),
            self.config.queue_capacity,
            open()?,
            self.handle.clone(),
        ));
        writers.insert(id, Arc::clone(&writer));
        Ok(writer)
    }

    pub fn loggers_len(&self) -> usize {
        self.loggers.lock().len()
    }

    pub fn writers_len(&self) -> usize {
        self.writers.lock().len()
    }

    /// Shut down every logger, then drain and close every writer.
    ///
    /// Loggers are shut down concurrently and all of them finish before any
    /// writer is stopped, so every event accepted before this call reaches
    /// its sink. Idempotent: only the first call does any work.
    pub async fn shutdown(&self) {
        let loggers: Vec<Arc<Logger>> = {
            let loggers = self.loggers.lock();
            if self.shut_down.swap(true, Ordering::AcqRel) {
                return;
            }
            loggers.values().cloned().collect()
        };

        join_all(loggers.iter().map(|logger| logger.shutdown())).await;

        let writers: Vec<Arc<DestinationWriter>> =
            self.writers.lock().values().cloned().collect();
        join_all(writers.iter().map(|writer| writer.stop())).await;

        self.loggers.lock().clear();
        self.writers.lock().clear();
    }

    /// [`shutdown`](Self::shutdown) bounded by `timeout`.
    ///
    /// On expiry every writer is aborted, discarding lines not yet written,
    /// and `false` is returned.
    pub async fn shutdown_timeout(&self, timeout: Duration) -> bool {
        if tokio::time::timeout(timeout, self.shutdown()).await.is_ok() {
            return true;
        }

        fallback::warning(format_args!(
            "Registry shutdown did not finish within {:?}; aborting writers. Some logs may be lost.",
            timeout
        ));
        let writers: Vec<Arc<DestinationWriter>> =
            self.writers.lock().drain().map(|(_, writer)| writer).collect();
        for writer in &writers {
            writer.abort();
        }
        self.loggers.lock().clear();
        false
    }

    /// [`shutdown_timeout`](Self::shutdown_timeout) with the configured budget.
    pub async fn shutdown_default(&self) -> bool {
        self.shutdown_timeout(self.config.shutdown_timeout).await
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        if !self.shut_down.load(Ordering::Acquire) && !self.writers.get_mut().is_empty() {
            fallback::warning(format_args!(
                "Registry dropped without shutdown; {} destination(s) were not drained",
                self.writers.get_mut().len()
            ));
        }
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("global_level", &self.global_level())
            .field("filters", &self.filters)
            .field("loggers", &self.loggers_len())
            .field("writers", &self.writers_len())
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}

/// Fluent construction of a registered logger.
pub struct LoggerBuilder<'a> {
    registry: &'a Registry,
    name: String,
    level: LogLevel,
    filters: Vec<Arc<dyn Filter>>,
    appenders: Vec<Arc<dyn Appender>>,
}

impl LoggerBuilder<'_> {
    /// Logger-local minimum level; the global level still applies.
    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn filter<F: Filter + 'static>(mut self, filter: F) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn appender(mut self, appender: Arc<dyn Appender>) -> Self {
        self.appenders.push(appender);
        self
    }

    pub fn build(self) -> Result<Arc<Logger>> {
        self.registry
            .get_or_create_logger(&self.name, self.level, self.filters, self.appenders)
    }
}
