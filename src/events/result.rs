//! Outcome of routing one event

use serde::{Deserialize, Serialize};

use crate::layout::NodeId;

/// Focus movement requested by a dispatch
///
/// The engine never moves focus itself; the external focus manager applies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FocusChange {
    #[default]
    None,
    /// Move to the next focusable node
    Next,
    /// Move to the previous focusable node
    Prev,
    /// Move to the node named in [`EventResult::focus_target`]
    Specific,
}

/// Aggregated result of a dispatch, returned by value to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EventResult {
    /// Some handler consumed the event
    pub handled: bool,
    /// A repaint is needed
    pub updated: bool,
    pub focus_change: FocusChange,
    /// Node to focus, set when a primary press hit a focusable component
    pub focus_target: Option<NodeId>,
}

impl EventResult {
    /// Nothing handled the event
    pub fn unhandled() -> Self {
        Self::default()
    }

    /// Handled, with a repaint
    pub fn handled() -> Self {
        Self {
            handled: true,
            updated: true,
            ..Self::default()
        }
    }

    /// Handled, no repaint needed
    pub fn consumed() -> Self {
        Self {
            handled: true,
            ..Self::default()
        }
    }

    /// Handled focus movement request
    pub fn focus(change: FocusChange) -> Self {
        Self {
            handled: true,
            focus_change: change,
            ..Self::default()
        }
    }

    /// Request to focus a specific node
    ///
    /// Carries no `handled` flag of its own; it is merged next to the result of
    /// the delivery that earned the request.
    pub fn focus_node(node: NodeId) -> Self {
        Self {
            focus_change: FocusChange::Specific,
            focus_target: Some(node),
            ..Self::default()
        }
    }

    /// Fold another result into this one: flags are OR-ed, focus requests are last-write
    pub fn merge(&mut self, other: EventResult) {
        self.handled |= other.handled;
        self.updated |= other.updated;
        if other.focus_change != FocusChange::None {
            self.focus_change = other.focus_change;
        }
        if other.focus_target.is_some() {
            self.focus_target = other.focus_target;
        }
    }
}
