//! Per-call context handed to every filter

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Cloneable cancellation signal shared with the owner of the event loop
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the signal; every clone observes it
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Context passed along with each event through the filter chain
///
/// Carries the cancellation signal and deadline consulted by the
/// context-cancellation filter, plus free-form attributes that permission
/// predicates can inspect.
#[derive(Debug, Clone, Default)]
pub struct FilterContext {
    token: Option<CancellationToken>,
    deadline: Option<Instant>,
    attributes: HashMap<String, String>,
}

impl FilterContext {
    /// A context that is never cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a cancellation token
    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Treat the context as cancelled once `deadline` has passed
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Attach an attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Whether the token fired or the deadline passed
    pub fn is_cancelled(&self) -> bool {
        self.token.as_ref().is_some_and(CancellationToken::is_cancelled)
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}
