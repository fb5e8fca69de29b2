// Component capabilities reachable by the event engine

use std::fmt;
use std::sync::Arc;

use crate::events::delegation::EventDelegator;
use crate::events::types::{KeyEvent, MouseEvent};

/// Capability: the component reacts to mouse input
pub trait MouseHandler: Send + Sync {
    /// Handle a mouse event whose coordinates are local to the component's node.
    /// Returns `true` when the event was consumed.
    fn handle_mouse(&self, event: &MouseEvent) -> bool;
}

impl<F> MouseHandler for F
where
    F: Fn(&MouseEvent) -> bool + Send + Sync,
{
    fn handle_mouse(&self, event: &MouseEvent) -> bool {
        self(event)
    }
}

/// Capability: the component reacts to key input
pub trait KeyHandler: Send + Sync {
    /// Returns `true` when the key was consumed
    fn handle_key(&self, event: &KeyEvent) -> bool;
}

impl<F> KeyHandler for F
where
    F: Fn(&KeyEvent) -> bool + Send + Sync,
{
    fn handle_key(&self, event: &KeyEvent) -> bool {
        self(event)
    }
}

/// Capability table for a component bound to a layout node
///
/// The table is resolved once when the component is bound, so delivery never
/// has to rediscover what a component can do.
#[derive(Clone, Default)]
pub struct Component {
    name: String,
    mouse: Option<Arc<dyn MouseHandler>>,
    key: Option<Arc<dyn KeyHandler>>,
    delegator: Option<Arc<EventDelegator>>,
    focusable: bool,
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("name", &self.name)
            .field("mouse", &self.mouse.is_some())
            .field("key", &self.key.is_some())
            .field("delegator", &self.delegator.is_some())
            .field("focusable", &self.focusable)
            .finish()
    }
}

impl Component {
    /// Create a component with no capabilities
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Attach a mouse handler
    pub fn with_mouse(mut self, handler: impl MouseHandler + 'static) -> Self {
        self.mouse = Some(Arc::new(handler));
        self
    }

    /// Attach a shared mouse handler (for widgets that implement several capabilities)
    pub fn with_mouse_handler(mut self, handler: Arc<dyn MouseHandler>) -> Self {
        self.mouse = Some(handler);
        self
    }

    /// Attach a key handler
    pub fn with_key(mut self, handler: impl KeyHandler + 'static) -> Self {
        self.key = Some(Arc::new(handler));
        self
    }

    pub fn with_key_handler(mut self, handler: Arc<dyn KeyHandler>) -> Self {
        self.key = Some(handler);
        self
    }

    /// Attach a delegator; its handlers are tried before the direct capabilities
    pub fn with_delegator(mut self, delegator: Arc<EventDelegator>) -> Self {
        self.delegator = Some(delegator);
        self
    }

    /// Advertise the component as a focus candidate
    pub fn focusable(mut self, focusable: bool) -> Self {
        self.focusable = focusable;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_focusable(&self) -> bool {
        self.focusable
    }

    pub fn mouse_handler(&self) -> Option<&Arc<dyn MouseHandler>> {
        self.mouse.as_ref()
    }

    pub fn key_handler(&self) -> Option<&Arc<dyn KeyHandler>> {
        self.key.as_ref()
    }

    pub fn delegator(&self) -> Option<&Arc<EventDelegator>> {
        self.delegator.as_ref()
    }
}
