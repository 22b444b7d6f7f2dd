//! The progress-event sink (§9 re-architecture note: replaces
//! callback-style progress events with a single `emit(event, payload)`
//! interface the host chooses how to forward).

use serde_json::Value;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventLevel {
    Debug,
    Warn,
}

pub trait EventSink: Send + Sync {
    fn emit(&self, level: EventLevel, event: &str, payload: Value);
}

/// Forwards to a `tracing` span event, matching the reference gateway's
/// logging idiom. This is the sink engines use outside tests.
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, level: EventLevel, event: &str, payload: Value) {
        match level {
            EventLevel::Debug => tracing::debug!(event, %payload),
            EventLevel::Warn => tracing::warn!(event, %payload),
        }
    }
}

/// Records every emitted event for assertions in engine tests (§8 S7).
#[derive(Default, Clone)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<(EventLevel, String, Value)>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(EventLevel, String, Value)> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, level: EventLevel, event: &str, payload: Value) {
        self.events.lock().unwrap().push((level, event.to_string(), payload));
    }
}
