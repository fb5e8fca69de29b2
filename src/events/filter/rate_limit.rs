//! Per-type rate limiting

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::{Filter, FilterContext};
use crate::events::event::Event;
use crate::events::types::EventType;

#[derive(Debug, Clone, Copy)]
struct Window {
    start: Instant,
    count: u32,
}

/// Lets at most `max_count` events of each type through per `interval`
///
/// Each event type has its own window. A window restarts once `interval` has
/// elapsed since it opened.
#[derive(Debug)]
pub struct RateLimitFilter {
    interval: Duration,
    max_count: u32,
    windows: Mutex<HashMap<EventType, Window>>,
}

impl RateLimitFilter {
    pub fn new(interval: Duration, max_count: u32) -> Self {
        Self {
            interval,
            max_count,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn max_count(&self) -> u32 {
        self.max_count
    }

    /// Whether one more event of `event_type` fits into its window at `now`
    fn admit(&self, event_type: EventType, now: Instant) -> bool {
        let Ok(mut windows) = self.windows.lock() else {
            log::warn!("rate limit state unavailable, admitting {event_type}");
            return true;
        };

        let window = windows.entry(event_type).or_insert(Window { start: now, count: 0 });
        if now.duration_since(window.start) >= self.interval {
            window.start = now;
            window.count = 0;
        }

        if window.count >= self.max_count {
            log::debug!("{event_type} rate limited ({} per {:?})", self.max_count, self.interval);
            return false;
        }
        window.count += 1;
        true
    }
}

impl Filter for RateLimitFilter {
    fn apply(&self, _ctx: &FilterContext, event: Event) -> (Event, bool) {
        let proceed = self.admit(event.event_type(), Instant::now());
        (event, proceed)
    }
}
