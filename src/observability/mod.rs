//! Observability subsystem
//!
//! Structured JSON-line logging of registry and record lifecycle events.
//! Logging is read-only: it never changes the outcome of an operation.
//!
//! ```ignore
//! use dataobject::observability::{log_event, Event, Logger, Severity};
//!
//! Logger::set_threshold(Some(Severity::Info));
//! log_event(Event::SchemaRegistered, &[("schema", "Product")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Logs an event at its own severity.
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
