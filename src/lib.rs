// Core module of the Orbit terminal event engine
pub mod blink;
pub mod component;
pub mod config;
pub mod engine;
pub mod events;
pub mod layout;

/// Version of the Orbit event engine
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export of common types for convenience
pub mod prelude {
    pub use crate::blink::CursorBlink;
    pub use crate::component::{Component, KeyHandler, MouseHandler};
    pub use crate::config::{DispatcherConfig, EngineConfig, FilterConfig};
    pub use crate::engine::EventEngine;
    pub use crate::events::filter::{CancellationToken, Filter, FilterChain, FilterContext};
    pub use crate::events::{
        DispatchState, Dispatcher, Event, EventDelegator, EventError, EventPhase, EventResult,
        EventType, FocusChange, Key, KeyAction, KeyEvent, Modifiers, MouseAction, MouseButton,
        MouseEvent, Priority,
    };
    pub use crate::layout::{LayoutBox, LayoutTree, NodeId, Point, Rect, Size};
}

/// Errors that can occur in the Orbit event engine
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Event error: {0}")]
    Event(#[from] events::EventError),
}

/// Load an engine from a JSON configuration document
pub fn init(config_json: &str) -> Result<engine::EventEngine, Error> {
    let config = config::EngineConfig::from_json(config_json)?;
    let engine = engine::EventEngine::from_config(&config)?;
    log::debug!("event engine {VERSION} initialized with {} filters", engine.filters().len());
    Ok(engine)
}
