//! Event engine
//!
//! Ties the filter pipeline to the dispatcher. Every incoming event first runs
//! through the filter chain; only events the chain lets through are routed.

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::events::filter::{FilterChain, FilterContext, MetricsFilter};
use crate::events::{Dispatcher, Event, EventError, EventResult};
use crate::layout::{LayoutBox, LayoutTree, NodeId};

/// Filter chain plus dispatcher for one UI event loop
#[derive(Debug, Default)]
pub struct EventEngine {
    filters: FilterChain,
    dispatcher: Dispatcher,
    metrics: Option<Arc<MetricsFilter>>,
}

impl EventEngine {
    /// Engine with an empty filter chain and the default dispatcher
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the filter chain and dispatcher described by `config`
    pub fn from_config(config: &EngineConfig) -> Result<Self, EventError> {
        let (filters, metrics) = config.filters.build_chain()?;
        Ok(Self {
            filters,
            dispatcher: Dispatcher::with_config(config.dispatcher.clone()),
            metrics,
        })
    }

    pub fn filters(&self) -> &FilterChain {
        &self.filters
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Metrics filter installed from configuration, if any
    pub fn metrics(&self) -> Option<&Arc<MetricsFilter>> {
        self.metrics.as_ref()
    }

    /// Filter an event and route it through the layout snapshot
    ///
    /// Returns `None` when a filter blocked the event.
    pub fn process(
        &mut self,
        ctx: &FilterContext,
        tree: &LayoutTree,
        boxes: &[LayoutBox],
        event: Event,
    ) -> Option<EventResult> {
        let mut event = self.admit(ctx, event)?;
        Some(self.dispatcher.dispatch(tree, boxes, &mut event))
    }

    /// Filter an event and route it to the focused node
    pub fn process_focused(
        &mut self,
        ctx: &FilterContext,
        tree: &LayoutTree,
        focused: NodeId,
        event: Event,
    ) -> Option<EventResult> {
        let mut event = self.admit(ctx, event)?;
        Some(self.dispatcher.dispatch_to(tree, focused, &mut event))
    }

    fn admit(&self, ctx: &FilterContext, event: Event) -> Option<Event> {
        let (event, proceed) = self.filters.process(ctx, event);
        if !proceed {
            log::debug!("{} blocked by filter chain", event.event_type());
            return None;
        }
        Some(event)
    }
}
