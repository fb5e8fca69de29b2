//! The mutable event record carried through a dispatch

use std::time::Instant;

use crate::events::types::{EventPhase, EventType, KeyEvent, MouseEvent};
use crate::layout::{NodeId, Point, Size};

/// Input data attached to an event
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    /// No payload (system ticks, semantic actions)
    None,
    Mouse(MouseEvent),
    Key(KeyEvent),
    /// New terminal size
    Resize(Size),
    /// Free-form data for custom and component events
    Custom(String),
}

/// An event travelling through the propagation path
///
/// A fresh `Event` is created per input and is mutated only by its own
/// dispatch. Handlers observe the current phase and `current_target`, and
/// cancel by flipping the propagation flags.
#[derive(Debug, Clone)]
pub struct Event {
    event_type: EventType,
    phase: EventPhase,
    timestamp: Instant,
    target: Option<NodeId>,
    current_target: Option<NodeId>,
    local: Point,
    payload: EventPayload,
    default_prevented: bool,
    propagation_stopped: bool,
    immediate_propagation_stopped: bool,
}

impl Event {
    /// Create a new event
    pub fn new(event_type: EventType, payload: EventPayload) -> Self {
        Self {
            event_type,
            phase: EventPhase::None,
            timestamp: Instant::now(),
            target: None,
            current_target: None,
            local: Point::zero(),
            payload,
            default_prevented: false,
            propagation_stopped: false,
            immediate_propagation_stopped: false,
        }
    }

    /// Event for a raw mouse input; the type follows the mouse action
    pub fn mouse(mouse: MouseEvent) -> Self {
        Self::new(mouse.action.event_type(), EventPayload::Mouse(mouse))
    }

    /// Event for a raw key input; the type follows the key action
    pub fn key(key: KeyEvent) -> Self {
        Self::new(key.action.event_type(), EventPayload::Key(key))
    }

    /// Terminal resize notification
    pub fn resize(width: i32, height: i32) -> Self {
        Self::new(EventType::RESIZE, EventPayload::Resize(Size::new(width, height)))
    }

    /// Event without payload
    pub fn signal(event_type: EventType) -> Self {
        Self::new(event_type, EventPayload::None)
    }

    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    /// Rewrite the event kind (used by transforming filters)
    pub fn set_event_type(&mut self, event_type: EventType) {
        self.event_type = event_type;
    }

    pub fn phase(&self) -> EventPhase {
        self.phase
    }

    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }

    /// The node selected by hit testing
    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    /// The node currently receiving delivery
    pub fn current_target(&self) -> Option<NodeId> {
        self.current_target
    }

    /// Pointer position in the current target's coordinate space
    pub fn local_position(&self) -> Point {
        self.local
    }

    pub fn payload(&self) -> &EventPayload {
        &self.payload
    }

    pub fn payload_mut(&mut self) -> &mut EventPayload {
        &mut self.payload
    }

    pub fn mouse_event(&self) -> Option<&MouseEvent> {
        match &self.payload {
            EventPayload::Mouse(mouse) => Some(mouse),
            _ => None,
        }
    }

    pub fn key_event(&self) -> Option<&KeyEvent> {
        match &self.payload {
            EventPayload::Key(key) => Some(key),
            _ => None,
        }
    }

    /// Whether this event carries a screen position to hit-test
    pub fn is_positional(&self) -> bool {
        matches!(self.payload, EventPayload::Mouse(_))
    }

    /// Prevent the default action
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Stop delivery to further nodes; remaining handlers on the current node still run
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Stop delivery immediately, including remaining handlers on the current node
    pub fn stop_immediate_propagation(&mut self) {
        self.immediate_propagation_stopped = true;
        self.propagation_stopped = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    pub fn is_immediate_propagation_stopped(&self) -> bool {
        self.immediate_propagation_stopped
    }

    /// Clear all dispatch state so the record can carry a new input
    pub fn reset(&mut self, event_type: EventType, payload: EventPayload) {
        *self = Self::new(event_type, payload);
    }

    pub(crate) fn begin(&mut self, target: NodeId) {
        self.target = Some(target);
        self.phase = EventPhase::None;
        self.current_target = None;
    }

    pub(crate) fn enter(&mut self, phase: EventPhase, node: NodeId, local: Point) {
        self.phase = phase;
        self.current_target = Some(node);
        self.local = local;
    }

    pub(crate) fn finish(&mut self) {
        self.phase = EventPhase::None;
        self.current_target = None;
    }

    #[cfg(test)]
    pub(crate) fn set_phase(&mut self, phase: EventPhase) {
        self.phase = phase;
    }
}
