//! Metrics filter

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use serde::Serialize;

use super::{Filter, FilterContext};
use crate::events::event::Event;
use crate::events::types::EventType;

#[derive(Debug, Default)]
struct Counters {
    counts: HashMap<EventType, u64>,
    times: HashMap<EventType, Duration>,
}

/// Counts events per type and accumulates their time spent before this filter
///
/// The time recorded for an event is the span between its creation and the
/// moment it reaches the filter. Always proceeds.
#[derive(Debug, Default)]
pub struct MetricsFilter {
    counters: Mutex<Counters>,
}

/// Point-in-time copy of the metrics, ready for an external sink
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub counts: HashMap<EventType, u64>,
    /// Cumulative time per type in microseconds
    pub times_us: HashMap<EventType, u64>,
}

impl MetricsFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events seen per type
    pub fn get_counts(&self) -> HashMap<EventType, u64> {
        self.counters
            .lock()
            .map(|counters| counters.counts.clone())
            .unwrap_or_default()
    }

    /// Cumulative processing time per type
    pub fn get_times(&self) -> HashMap<EventType, Duration> {
        self.counters
            .lock()
            .map(|counters| counters.times.clone())
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let Ok(counters) = self.counters.lock() else {
            return MetricsSnapshot::default();
        };
        MetricsSnapshot {
            counts: counters.counts.clone(),
            times_us: counters
                .times
                .iter()
                .map(|(event_type, time)| {
                    (*event_type, u64::try_from(time.as_micros()).unwrap_or(u64::MAX))
                })
                .collect(),
        }
    }

    /// Forget everything recorded so far
    pub fn reset(&self) {
        match self.counters.lock() {
            Ok(mut counters) => *counters = Counters::default(),
            Err(e) => log::warn!("failed to reset event metrics: {e}"),
        }
    }
}

impl Filter for MetricsFilter {
    fn apply(&self, _ctx: &FilterContext, event: Event) -> (Event, bool) {
        let elapsed = event.timestamp().elapsed();
        match self.counters.lock() {
            Ok(mut counters) => {
                *counters.counts.entry(event.event_type()).or_default() += 1;
                *counters.times.entry(event.event_type()).or_default() += elapsed;
            }
            Err(e) => log::warn!("event metrics unavailable: {e}"),
        }
        (event, true)
    }
}
