//! Event delivery boundary
//!
//! The engine produces [`ThresholdEvent`] records and hands them to a
//! sink; delivery, queuing, and de-duplication belong to the host event
//! system.

use crate::domain::{Severity, ThresholdEvent};
use crate::error::Result;

/// Consumer of produced threshold events
pub trait EventSink: Send + Sync {
    /// Accept one event for delivery
    fn submit(&self, event: &ThresholdEvent) -> Result<()>;

    /// Sink name for identification
    fn name(&self) -> &str;
}

/// Sink that records events through the `log` facade
///
/// Useful as a default during bring-up and in collectors that forward
/// their log stream anyway.
#[derive(Debug, Default)]
pub struct LogSink;

impl LogSink {
    /// Create a log sink
    pub fn new() -> Self {
        Self
    }

    fn level(severity: Severity) -> log::Level {
        match severity {
            Severity::Debug => log::Level::Debug,
            Severity::Clear | Severity::Info => log::Level::Info,
            Severity::Warning => log::Level::Warn,
            Severity::Error | Severity::Critical => log::Level::Error,
        }
    }
}

impl EventSink for LogSink {
    fn submit(&self, event: &ThresholdEvent) -> Result<()> {
        log::log!(Self::level(event.severity), "{}", event);
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}

/// Fans each event out to every registered sink
///
/// A failing sink is logged and skipped; one broken channel never stops
/// the others from seeing the event.
#[derive(Default)]
pub struct SinkSet {
    sinks: Vec<Box<dyn EventSink>>,
}

impl SinkSet {
    /// Create an empty sink set
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sink
    pub fn add(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    /// Number of registered sinks
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Whether no sinks are registered
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Submit one event to every sink
    pub fn submit_all(&self, event: &ThresholdEvent) {
        for sink in &self.sinks {
            if let Err(err) = sink.submit(event) {
                log::warn!("Sink '{}' failed to accept event: {}", sink.name(), err);
            }
        }
    }
}
