//! Filter pipeline applied to events before routing
//!
//! A filter takes the context and an event and returns the (possibly
//! rewritten) event together with a proceed flag. A [`FilterChain`] folds its
//! filters left to right and stops at the first one that blocks.
//!
//! Built-in filters live in the submodules and are re-exported here.

pub mod builtin;
pub mod context;
pub mod logging;
pub mod metrics;
pub mod rate_limit;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::events::event::Event;
use crate::events::EventError;

pub use builtin::{
    any, compose, AnyFilter, ComposeFilter, ConditionalFilter, ContextFilter, DiscardFilter,
    OnceFilter, PassthroughFilter, PermissionFilter, TransformFilter,
};
pub use context::{CancellationToken, FilterContext};
pub use logging::{LogSink, LoggingFilter};
pub use metrics::{MetricsFilter, MetricsSnapshot};
pub use rate_limit::RateLimitFilter;

/// An interceptor applied to every event before dispatch
pub trait Filter: Send + Sync {
    /// Returns the event to pass on and whether processing should proceed
    fn apply(&self, ctx: &FilterContext, event: Event) -> (Event, bool);
}

impl<F> Filter for F
where
    F: Fn(&FilterContext, Event) -> (Event, bool) + Send + Sync,
{
    fn apply(&self, ctx: &FilterContext, event: Event) -> (Event, bool) {
        self(ctx, event)
    }
}

/// Shared, type-erased filter
pub type SharedFilter = Arc<dyn Filter>;

/// Handle returned by [`FilterChain::add`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FilterId(u64);

/// Ordered, mutable list of filters
///
/// Filters may be added or removed from any thread while another thread is
/// processing; `process` runs over a snapshot of the list.
#[derive(Default)]
pub struct FilterChain {
    filters: RwLock<Vec<(FilterId, SharedFilter)>>,
    next_id: AtomicU64,
}

impl fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterChain")
            .field("filters", &self.len())
            .finish()
    }
}

impl FilterChain {
    /// Create an empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter to the end of the chain
    pub fn add(&self, filter: impl Filter + 'static) -> Result<FilterId, EventError> {
        self.add_shared(Arc::new(filter))
    }

    /// Append an already shared filter (for filters the caller keeps a handle to)
    pub fn add_shared(&self, filter: SharedFilter) -> Result<FilterId, EventError> {
        let id = FilterId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut filters = self
            .filters
            .write()
            .map_err(|e| EventError::LockError(format!("Failed to lock filter chain: {e}")))?;
        filters.push((id, filter));
        Ok(id)
    }

    /// Remove a filter; returns whether it was present
    pub fn remove(&self, id: FilterId) -> Result<bool, EventError> {
        let mut filters = self
            .filters
            .write()
            .map_err(|e| EventError::LockError(format!("Failed to lock filter chain: {e}")))?;
        let before = filters.len();
        filters.retain(|(filter_id, _)| *filter_id != id);
        Ok(filters.len() != before)
    }

    /// Remove all filters
    pub fn clear(&self) -> Result<(), EventError> {
        let mut filters = self
            .filters
            .write()
            .map_err(|e| EventError::LockError(format!("Failed to lock filter chain: {e}")))?;
        filters.clear();
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.filters.read().map(|filters| filters.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run the event through every filter, stopping at the first block
    ///
    /// An empty chain returns the event unchanged and proceeds.
    pub fn process(&self, ctx: &FilterContext, event: Event) -> (Event, bool) {
        let snapshot: Vec<SharedFilter> = match self.filters.read() {
            Ok(filters) => filters.iter().map(|(_, filter)| filter.clone()).collect(),
            Err(e) => {
                log::warn!("filter chain unavailable, passing event through: {e}");
                return (event, true);
            }
        };

        let mut event = event;
        for filter in snapshot {
            let (next, proceed) = filter.apply(ctx, event);
            event = next;
            if !proceed {
                log::debug!("{} blocked by filter chain", event.event_type());
                return (event, false);
            }
        }
        (event, true)
    }
}

impl Filter for FilterChain {
    fn apply(&self, ctx: &FilterContext, event: Event) -> (Event, bool) {
        self.process(ctx, event)
    }
}
