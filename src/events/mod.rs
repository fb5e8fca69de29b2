//! Event propagation engine for Orbit terminal UIs
//!
//! The event system provides:
//! - Typed event kinds and a mutable event record with cancellation flags
//! - Hit testing over paint-ordered boxes or the node tree
//! - A dispatcher running capture → target → bubble along the node path
//! - Per-component delegation with priorities, phase filters and once handlers
//! - A filter chain that intercepts events before they are routed

pub mod delegation;
pub mod dispatcher;
pub mod event;
pub mod filter;
pub mod hit_testing;
pub mod path;
pub mod result;
pub mod types;

pub use delegation::{DelegatedHandler, EventDelegator, HandlerId, Priority};
pub use dispatcher::{DispatchState, Dispatcher};
pub use event::{Event, EventPayload};
pub use filter::{Filter, FilterChain, FilterContext, FilterId};
pub use hit_testing::{hit_test, hit_test_tree, HitTestResult, HitTester};
pub use path::build_path;
pub use result::{EventResult, FocusChange};
pub use types::{
    EventPhase, EventType, Key, KeyAction, KeyEvent, Modifiers, MouseAction, MouseButton,
    MouseEvent,
};

use crate::layout::NodeId;

/// Errors raised by registration, tree construction and configuration
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// A registry lock was poisoned by a panicking handler
    #[error("Failed to access event registry: {0}")]
    LockError(String),

    /// The node is not part of the layout tree
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// A configuration value was rejected
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configuration document could not be parsed
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
