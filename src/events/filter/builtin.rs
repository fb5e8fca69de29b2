//! General-purpose filters and combinators

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::{Filter, FilterContext, SharedFilter};
use crate::events::event::Event;

/// Always proceeds with the event unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughFilter;

impl Filter for PassthroughFilter {
    fn apply(&self, _ctx: &FilterContext, event: Event) -> (Event, bool) {
        (event, true)
    }
}

/// Always blocks
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardFilter;

impl Filter for DiscardFilter {
    fn apply(&self, _ctx: &FilterContext, event: Event) -> (Event, bool) {
        (event, false)
    }
}

/// Applies a mapping to the event and always proceeds
pub struct TransformFilter<F> {
    transform: F,
}

impl<F> TransformFilter<F>
where
    F: Fn(Event) -> Event + Send + Sync,
{
    pub fn new(transform: F) -> Self {
        Self { transform }
    }
}

impl<F> Filter for TransformFilter<F>
where
    F: Fn(Event) -> Event + Send + Sync,
{
    fn apply(&self, _ctx: &FilterContext, event: Event) -> (Event, bool) {
        ((self.transform)(event), true)
    }
}

impl<F> fmt::Debug for TransformFilter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformFilter").finish_non_exhaustive()
    }
}

/// Blocks unless the predicate allows the event
pub struct PermissionFilter<P> {
    allow: P,
}

impl<P> PermissionFilter<P>
where
    P: Fn(&FilterContext, &Event) -> bool + Send + Sync,
{
    pub fn new(allow: P) -> Self {
        Self { allow }
    }
}

impl<P> Filter for PermissionFilter<P>
where
    P: Fn(&FilterContext, &Event) -> bool + Send + Sync,
{
    fn apply(&self, ctx: &FilterContext, event: Event) -> (Event, bool) {
        let allowed = (self.allow)(ctx, &event);
        if !allowed {
            log::debug!("{} denied by permission filter", event.event_type());
        }
        (event, allowed)
    }
}

impl<P> fmt::Debug for PermissionFilter<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PermissionFilter").finish_non_exhaustive()
    }
}

/// Blocks new events once the context has been cancelled
///
/// Events already past the chain are not affected.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextFilter;

impl Filter for ContextFilter {
    fn apply(&self, ctx: &FilterContext, event: Event) -> (Event, bool) {
        let proceed = !ctx.is_cancelled();
        (event, proceed)
    }
}

/// Delegates to the wrapped filter on its first invocation only
///
/// Later invocations proceed without consulting the wrapped filter until
/// [`OnceFilter::reset`] re-arms it.
pub struct OnceFilter {
    inner: SharedFilter,
    fired: AtomicBool,
}

impl OnceFilter {
    pub fn new(inner: impl Filter + 'static) -> Self {
        Self::from_shared(Arc::new(inner))
    }

    pub fn from_shared(inner: SharedFilter) -> Self {
        Self {
            inner,
            fired: AtomicBool::new(false),
        }
    }

    /// Re-arm the filter so the wrapped filter runs once more
    pub fn reset(&self) {
        self.fired.store(false, Ordering::SeqCst);
    }

    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }
}

impl Filter for OnceFilter {
    fn apply(&self, ctx: &FilterContext, event: Event) -> (Event, bool) {
        if self.fired.swap(true, Ordering::SeqCst) {
            return (event, true);
        }
        self.inner.apply(ctx, event)
    }
}

impl fmt::Debug for OnceFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnceFilter")
            .field("fired", &self.has_fired())
            .finish_non_exhaustive()
    }
}

/// Delegates to the wrapped filter only while the predicate holds
pub struct ConditionalFilter<P> {
    condition: P,
    inner: SharedFilter,
}

impl<P> ConditionalFilter<P>
where
    P: Fn(&FilterContext, &Event) -> bool + Send + Sync,
{
    pub fn new(condition: P, inner: impl Filter + 'static) -> Self {
        Self {
            condition,
            inner: Arc::new(inner),
        }
    }
}

impl<P> Filter for ConditionalFilter<P>
where
    P: Fn(&FilterContext, &Event) -> bool + Send + Sync,
{
    fn apply(&self, ctx: &FilterContext, event: Event) -> (Event, bool) {
        if (self.condition)(ctx, &event) {
            self.inner.apply(ctx, event)
        } else {
            (event, true)
        }
    }
}

impl<P> fmt::Debug for ConditionalFilter<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionalFilter").finish_non_exhaustive()
    }
}

/// Logical AND: runs filters in order, the first block short-circuits
pub struct ComposeFilter {
    filters: Vec<SharedFilter>,
}

impl Filter for ComposeFilter {
    fn apply(&self, ctx: &FilterContext, event: Event) -> (Event, bool) {
        let mut event = event;
        for filter in &self.filters {
            let (next, proceed) = filter.apply(ctx, event);
            if !proceed {
                return (next, false);
            }
            event = next;
        }
        (event, true)
    }
}

impl fmt::Debug for ComposeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComposeFilter")
            .field("filters", &self.filters.len())
            .finish()
    }
}

/// Logical OR: runs every filter and blocks only if all of them blocked
///
/// The event is threaded through each filter in turn. An empty list proceeds.
pub struct AnyFilter {
    filters: Vec<SharedFilter>,
}

impl Filter for AnyFilter {
    fn apply(&self, ctx: &FilterContext, event: Event) -> (Event, bool) {
        if self.filters.is_empty() {
            return (event, true);
        }
        let mut event = event;
        let mut proceed = false;
        for filter in &self.filters {
            let (next, passed) = filter.apply(ctx, event);
            event = next;
            proceed |= passed;
        }
        (event, proceed)
    }
}

impl fmt::Debug for AnyFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyFilter")
            .field("filters", &self.filters.len())
            .finish()
    }
}

/// Combine filters with AND semantics
pub fn compose(filters: impl IntoIterator<Item = SharedFilter>) -> ComposeFilter {
    ComposeFilter {
        filters: filters.into_iter().collect(),
    }
}

/// Combine filters with OR semantics
pub fn any(filters: impl IntoIterator<Item = SharedFilter>) -> AnyFilter {
    AnyFilter {
        filters: filters.into_iter().collect(),
    }
}
