//! Observable events
//!
//! Events are explicit and typed; every log line names one of these.

use std::fmt;

use super::logger::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Schema registry
    /// Schema committed to the registry
    SchemaRegistered,
    /// Earlier registration of the same (module, name) replaced
    SchemaReplaced,
    /// Schema definition failed a structural check
    SchemaRejected,

    // Restriction engine
    /// New restriction added to an intern table
    RestrictionInterned,

    // Records
    /// Construction data rejected
    RecordRejected,
    /// Assignment or re-initialisation rejected, prior state kept
    RecordRollback,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::SchemaRegistered => "SCHEMA_REGISTERED",
            Event::SchemaReplaced => "SCHEMA_REPLACED",
            Event::SchemaRejected => "SCHEMA_REJECTED",
            Event::RestrictionInterned => "RESTRICTION_INTERNED",
            Event::RecordRejected => "RECORD_REJECTED",
            Event::RecordRollback => "RECORD_ROLLBACK",
        }
    }

    /// Severity this event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::RestrictionInterned => Severity::Trace,
            Event::SchemaRegistered | Event::SchemaReplaced => Severity::Info,
            Event::RecordRejected | Event::RecordRollback => Severity::Warn,
            Event::SchemaRejected => Severity::Error,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
