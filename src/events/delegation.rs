//! Event delegation for components
//!
//! An [`EventDelegator`] is a per-component registry of handlers keyed by
//! event type. Each handler carries:
//! - a priority (higher runs first, ties keep registration order)
//! - an optional phase filter (capture, target or bubble only)
//! - a once flag (removed after it fires)
//!
//! Registration may happen from any thread while another thread is handling
//! an event, so the registry sits behind a lock and handlers run on a
//! snapshot taken outside of it.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::events::event::Event;
use crate::events::result::EventResult;
use crate::events::types::{EventPhase, EventType};
use crate::events::EventError;

/// Type alias for a delegated event handler
pub type DelegatedHandler = Arc<dyn Fn(&mut Event) -> EventResult + Send + Sync>;

/// Ordering weight of a handler; higher values run first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Priority(pub i32);

impl Priority {
    pub const LOWEST: Priority = Priority(-1000);
    pub const LOW: Priority = Priority(-100);
    pub const DEFAULT: Priority = Priority(0);
    pub const HIGH: Priority = Priority(100);
    pub const HIGHEST: Priority = Priority(1000);
}

/// Handle returned by registration, used to remove a handler again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

#[derive(Clone)]
struct HandlerEntry {
    id: HandlerId,
    handler: DelegatedHandler,
    priority: Priority,
    phase: Option<EventPhase>,
    once: bool,
}

impl HandlerEntry {
    fn accepts(&self, phase: EventPhase) -> bool {
        self.phase.is_none_or(|wanted| wanted == phase)
    }
}

/// Registry of prioritized, phase-scoped handlers for one component
#[derive(Default)]
pub struct EventDelegator {
    handlers: RwLock<HashMap<EventType, Vec<HandlerEntry>>>,
    next_id: AtomicU64,
}

impl fmt::Debug for EventDelegator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registered = self
            .handlers
            .read()
            .map(|handlers| handlers.values().map(Vec::len).sum::<usize>())
            .unwrap_or_default();
        f.debug_struct("EventDelegator")
            .field("handlers", &registered)
            .finish()
    }
}

impl EventDelegator {
    /// Create an empty delegator
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for all phases at default priority
    pub fn on<F>(&self, event_type: EventType, handler: F) -> Result<HandlerId, EventError>
    where
        F: Fn(&mut Event) -> EventResult + Send + Sync + 'static,
    {
        self.register(event_type, Arc::new(handler), Priority::DEFAULT, None, false)
    }

    /// Register a handler with an explicit priority
    pub fn on_with_priority<F>(
        &self,
        event_type: EventType,
        handler: F,
        priority: Priority,
    ) -> Result<HandlerId, EventError>
    where
        F: Fn(&mut Event) -> EventResult + Send + Sync + 'static,
    {
        self.register(event_type, Arc::new(handler), priority, None, false)
    }

    /// Register a handler that only runs while the event is in `phase`
    pub fn on_during_phase<F>(
        &self,
        event_type: EventType,
        handler: F,
        phase: EventPhase,
    ) -> Result<HandlerId, EventError>
    where
        F: Fn(&mut Event) -> EventResult + Send + Sync + 'static,
    {
        self.register(event_type, Arc::new(handler), Priority::DEFAULT, Some(phase), false)
    }

    /// Register a handler that is removed after it fires once
    pub fn once<F>(&self, event_type: EventType, handler: F) -> Result<HandlerId, EventError>
    where
        F: Fn(&mut Event) -> EventResult + Send + Sync + 'static,
    {
        self.register(event_type, Arc::new(handler), Priority::DEFAULT, None, true)
    }

    /// Register a handler with every option spelled out
    pub fn register(
        &self,
        event_type: EventType,
        handler: DelegatedHandler,
        priority: Priority,
        phase: Option<EventPhase>,
        once: bool,
    ) -> Result<HandlerId, EventError> {
        let id = HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut handlers = self
            .handlers
            .write()
            .map_err(|e| EventError::LockError(format!("Failed to lock delegated handlers: {e}")))?;

        let entries = handlers.entry(event_type).or_default();
        entries.push(HandlerEntry {
            id,
            handler,
            priority,
            phase,
            once,
        });
        // Stable sort keeps registration order within equal priority
        entries.sort_by(|a, b| b.priority.cmp(&a.priority));

        Ok(id)
    }

    /// Remove a handler; returns whether it was still registered
    pub fn off(&self, id: HandlerId) -> Result<bool, EventError> {
        let mut handlers = self
            .handlers
            .write()
            .map_err(|e| EventError::LockError(format!("Failed to lock delegated handlers: {e}")))?;
        Ok(Self::remove_entry(&mut handlers, id))
    }

    /// Remove all handlers for an event type
    pub fn clear(&self, event_type: EventType) -> Result<(), EventError> {
        let mut handlers = self
            .handlers
            .write()
            .map_err(|e| EventError::LockError(format!("Failed to lock delegated handlers: {e}")))?;
        handlers.remove(&event_type);
        Ok(())
    }

    /// Number of handlers currently registered for an event type
    pub fn handler_count(&self, event_type: EventType) -> usize {
        self.handlers
            .read()
            .map(|handlers| handlers.get(&event_type).map_or(0, Vec::len))
            .unwrap_or_default()
    }

    /// Run the handlers registered for the event's type in priority order
    pub fn handle_event(&self, event: &mut Event) -> EventResult {
        let snapshot = match self.handlers.read() {
            Ok(handlers) => match handlers.get(&event.event_type()) {
                Some(entries) => entries.clone(),
                None => return EventResult::unhandled(),
            },
            Err(e) => {
                log::warn!("delegated handlers unavailable: {e}");
                return EventResult::unhandled();
            }
        };

        let mut result = EventResult::unhandled();
        for entry in snapshot {
            if !entry.accepts(event.phase()) {
                continue;
            }
            // Claim a once handler before running it so it can only fire once
            if entry.once && !self.claim(entry.id) {
                continue;
            }

            result.merge((entry.handler)(event));

            if event.is_immediate_propagation_stopped() {
                break;
            }
        }

        result
    }

    fn claim(&self, id: HandlerId) -> bool {
        match self.handlers.write() {
            Ok(mut handlers) => Self::remove_entry(&mut handlers, id),
            Err(e) => {
                log::warn!("failed to remove once handler: {e}");
                false
            }
        }
    }

    fn remove_entry(handlers: &mut HashMap<EventType, Vec<HandlerEntry>>, id: HandlerId) -> bool {
        for entries in handlers.values_mut() {
            if let Some(index) = entries.iter().position(|entry| entry.id == id) {
                entries.remove(index);
                return true;
            }
        }
        false
    }
}
