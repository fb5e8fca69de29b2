//! Engine configuration
//!
//! Configuration is plain serde data so it can be embedded in an application's
//! own settings file or loaded on its own from JSON:
//!
//! ```
//! use orbit_tui_events::config::EngineConfig;
//!
//! let config = EngineConfig::from_json(r#"{
//!     "dispatcher": { "focus_on_press": false },
//!     "filters": { "metrics": true, "rate_limit": { "interval_ms": 100, "max_count": 2 } }
//! }"#).unwrap();
//! assert!(!config.dispatcher.focus_on_press);
//! assert!(config.dispatcher.tab_navigation);
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::events::filter::{
    ContextFilter, FilterChain, LoggingFilter, MetricsFilter, RateLimitFilter,
};
use crate::events::{EventError, EventType};

/// Dispatcher behaviour switches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Primary presses handled by focusable components request focus for them
    pub focus_on_press: bool,
    /// Tab and Shift+Tab request focus movement
    pub tab_navigation: bool,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            focus_on_press: true,
            tab_navigation: true,
        }
    }
}

/// Logging filter settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `log` level used for each line
    #[serde(default = "LoggingConfig::default_level")]
    pub level: log::Level,
    /// Numeric event type ids to log; all types when absent
    #[serde(default)]
    pub types: Option<Vec<EventType>>,
}

impl LoggingConfig {
    fn default_level() -> log::Level {
        log::Level::Debug
    }
}

/// Rate limit settings applied to every event type independently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub interval_ms: u64,
    pub max_count: u32,
}

/// Which filters to install and how
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Install the context-cancellation filter
    pub block_after_cancel: bool,
    pub rate_limit: Option<RateLimitConfig>,
    pub logging: Option<LoggingConfig>,
    /// Install a metrics filter
    pub metrics: bool,
}

impl FilterConfig {
    /// Check values that would make a filter useless
    pub fn validate(&self) -> Result<(), EventError> {
        if let Some(rate_limit) = &self.rate_limit {
            if rate_limit.interval_ms == 0 {
                return Err(EventError::InvalidConfig(
                    "rate_limit.interval_ms must be greater than zero".to_string(),
                ));
            }
            if rate_limit.max_count == 0 {
                return Err(EventError::InvalidConfig(
                    "rate_limit.max_count must be greater than zero".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Assemble a chain in the order context → rate limit → logging → metrics
    ///
    /// Returns the metrics filter as well so the caller can read its counters.
    pub fn build_chain(&self) -> Result<(FilterChain, Option<Arc<MetricsFilter>>), EventError> {
        self.validate()?;
        let chain = FilterChain::new();

        if self.block_after_cancel {
            chain.add(ContextFilter)?;
        }
        if let Some(rate_limit) = &self.rate_limit {
            chain.add(RateLimitFilter::new(
                Duration::from_millis(rate_limit.interval_ms),
                rate_limit.max_count,
            ))?;
        }
        if let Some(logging) = &self.logging {
            let filter = LoggingFilter::to_log(logging.level);
            let filter = match &logging.types {
                Some(types) => filter.only(types.iter().copied()),
                None => filter,
            };
            chain.add(filter)?;
        }

        let metrics = if self.metrics {
            let metrics = Arc::new(MetricsFilter::new());
            chain.add_shared(metrics.clone())?;
            Some(metrics)
        } else {
            None
        };

        Ok((chain, metrics))
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub dispatcher: DispatcherConfig,
    pub filters: FilterConfig,
}

impl EngineConfig {
    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self, EventError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.filters.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, EventError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
