//! Event sink boundary.

use cart_commerce::event::CartEvent;
use std::sync::{Mutex, PoisonError};

/// Fire-and-forget sink for domain events.
///
/// No return value and no core-side retry: the engine emits only after the
/// line and audit writes succeed, and whatever the sink does with the event
/// is its own business.
pub trait EventSink: Send + Sync {
    /// Deliver one event.
    fn emit(&self, event: CartEvent);
}

/// Sink that drops every event.
#[derive(Debug, Default)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn emit(&self, _event: CartEvent) {}
}

/// Sink that records events in order, for tests and local inspection.
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<CartEvent>>,
}

impl RecordingEventSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    pub fn events(&self) -> Vec<CartEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, event: CartEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}
