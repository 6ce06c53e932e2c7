//! Event filters and the copy-on-write filter chain

use super::log_event::LogEvent;
use super::log_level::LogLevel;
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Pure predicate over an event. `true` keeps the event.
pub trait Filter: Send + Sync {
    fn filter(&self, event: &LogEvent) -> bool;
}

impl<F> Filter for F
where
    F: Fn(&LogEvent) -> bool + Send + Sync,
{
    fn filter(&self, event: &LogEvent) -> bool {
        self(event)
    }
}

/// Accepts events at or above `min_level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelFilter {
    min_level: LogLevel,
}

impl LevelFilter {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }
}

impl Filter for LevelFilter {
    fn filter(&self, event: &LogEvent) -> bool {
        event.level.is_enabled(self.min_level)
    }
}

/// Handle returned by [`FilterChain::add`], used to remove the filter again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FilterId(u64);

static NEXT_FILTER_ID: AtomicU64 = AtomicU64::new(1);

type Entries = Arc<Vec<(FilterId, Arc<dyn Filter>)>>;

/// Ordered AND of filters.
///
/// Mutation swaps in a fresh list; evaluation works on a snapshot, so filters
/// can be added or removed while other threads are evaluating the chain.
#[derive(Default)]
pub struct FilterChain {
    entries: RwLock<Entries>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<F: Filter + 'static>(&self, filter: F) -> FilterId {
        self.add_shared(Arc::new(filter))
    }

    pub fn add_shared(&self, filter: Arc<dyn Filter>) -> FilterId {
        let id = FilterId(NEXT_FILTER_ID.fetch_add(1, Ordering::Relaxed));
        let mut entries = self.entries.write();
        let mut next = Vec::with_capacity(entries.len() + 1);
        next.extend(entries.iter().cloned());
        next.push((id, filter));
        *entries = Arc::new(next);
        id
    }

    /// Returns `false` if no filter with this id is in the chain.
    pub fn remove(&self, id: FilterId) -> bool {
        let mut entries = self.entries.write();
        if !entries.iter().any(|(existing, _)| *existing == id) {
            return false;
        }
        let next: Vec<_> = entries
            .iter()
            .filter(|(existing, _)| *existing != id)
            .cloned()
            .collect();
        *entries = Arc::new(next);
        true
    }

    /// Short-circuiting AND over the chain; an empty chain accepts everything.
    pub fn accepts(&self, event: &LogEvent) -> bool {
        let snapshot = Arc::clone(&*self.entries.read());
        snapshot.iter().all(|(_, filter)| filter.filter(event))
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterChain").field("len", &self.len()).finish()
    }
}
