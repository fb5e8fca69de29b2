//! Logging filter

use std::collections::HashSet;
use std::fmt;
use std::io::Write;
use std::sync::Mutex;

use super::{Filter, FilterContext};
use crate::events::event::Event;
use crate::events::types::EventType;

/// Where the logging filter writes its lines
pub enum LogSink {
    /// Any writer, one line per event
    Writer(Mutex<Box<dyn Write + Send>>),
    /// The `log` facade at the given level
    Log(log::Level),
}

impl fmt::Debug for LogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogSink::Writer(_) => f.write_str("Writer"),
            LogSink::Log(level) => write!(f, "Log({level})"),
        }
    }
}

/// Records `type/phase/target` of each event and always proceeds
#[derive(Debug)]
pub struct LoggingFilter {
    sink: LogSink,
    types: Option<HashSet<EventType>>,
}

impl LoggingFilter {
    /// Log every event to a writer
    pub fn to_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            sink: LogSink::Writer(Mutex::new(Box::new(writer))),
            types: None,
        }
    }

    /// Log every event through the `log` facade
    pub fn to_log(level: log::Level) -> Self {
        Self {
            sink: LogSink::Log(level),
            types: None,
        }
    }

    /// Only log events of the given types
    pub fn only(mut self, types: impl IntoIterator<Item = EventType>) -> Self {
        self.types = Some(types.into_iter().collect());
        self
    }

    fn wants(&self, event_type: EventType) -> bool {
        self.types.as_ref().is_none_or(|types| types.contains(&event_type))
    }

    fn format_line(event: &Event) -> String {
        let target = event
            .target()
            .map_or_else(|| "-".to_string(), |node| node.to_string());
        format!(
            "event type={} phase={} target={}",
            event.event_type(),
            event.phase(),
            target
        )
    }
}

impl Filter for LoggingFilter {
    fn apply(&self, _ctx: &FilterContext, event: Event) -> (Event, bool) {
        if !self.wants(event.event_type()) {
            return (event, true);
        }

        let line = Self::format_line(&event);
        match &self.sink {
            LogSink::Writer(writer) => match writer.lock() {
                Ok(mut writer) => {
                    if let Err(e) = writeln!(writer, "{line}") {
                        log::warn!("event log sink failed: {e}");
                    }
                }
                Err(e) => log::warn!("event log sink unavailable: {e}"),
            },
            LogSink::Log(level) => log::log!(*level, "{line}"),
        }

        (event, true)
    }
}
