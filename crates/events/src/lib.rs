#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for async communication in stagehand
//!
//! All output goes through events - no direct logging or printing is
//! allowed outside the CLI. Two channels exist:
//!
//! - the application event channel (`channel`), carrying observability
//!   events consumed by the CLI renderer/logger, and
//! - the session event channel (`session_channel`), the message-passing
//!   boundary between the platform session broker and the orchestrator.
//!   The orchestrator is the sole consumer of session events.

pub mod meta;
pub use meta::{EventLevel, EventMeta, EventSource};

pub mod events;
pub use events::{AppEvent, GeneralEvent, InstallEvent, SessionEvent, StoreEvent};

use tokio::sync::mpsc::UnboundedSender;

/// An application event paired with emission metadata.
#[derive(Debug, Clone)]
pub struct EventMessage {
    pub event: AppEvent,
    pub meta: EventMeta,
}

/// Type alias for the application event sender
pub type EventSender = UnboundedSender<EventMessage>;

/// Type alias for the application event receiver
pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<EventMessage>;

/// Create a new application event channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// Type alias for the session event sender (platform broker side)
pub type SessionEventSender = UnboundedSender<SessionEvent>;

/// Type alias for the session event receiver (orchestrator side)
pub type SessionEventReceiver = tokio::sync::mpsc::UnboundedReceiver<SessionEvent>;

/// Create the session event channel connecting the platform broker to
/// the orchestrator.
#[must_use]
pub fn session_channel() -> (SessionEventSender, SessionEventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// The unified trait for emitting application events
///
/// Provides a single, consistent API for emitting events regardless of
/// whether you have a raw `EventSender` or a struct that contains one.
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Emit an event through this emitter
    fn emit(&self, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            let meta = EventMeta::new(event.default_level(), event.event_source());
            // Ignore send errors - if the receiver is dropped, we just continue
            let _ = sender.send(EventMessage { event, meta });
        }
    }

    /// Emit a debug log event
    fn emit_debug(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::debug(message)));
    }

    /// Emit a warning event
    fn emit_warning(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning(message)));
    }

    /// Emit an error event
    fn emit_error(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::error(message)));
    }

    /// Emit an operation started event
    fn emit_operation_started(&self, operation: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::OperationStarted {
            operation: operation.into(),
        }));
    }

    /// Emit an operation completed event
    fn emit_operation_completed(&self, operation: impl Into<String>, success: bool) {
        self.emit(AppEvent::General(GeneralEvent::OperationCompleted {
            operation: operation.into(),
            success,
        }));
    }
}

/// Implementation of `EventEmitter` for the raw `EventSender`
impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}
