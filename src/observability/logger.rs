//! Structured JSON-line logger
//!
//! One line per event: `event` first, then `severity`, then the fields sorted
//! by key. Nothing is written until a threshold is set, so a library host
//! opts in explicitly (see `RegistryConfig::log_threshold`).

use std::fmt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Interning and other internal detail
    Trace = 0,
    /// Schema registered or replaced
    Info = 1,
    /// Rejected data, rolled back mutations
    Warn = 2,
    /// Rejected schema definitions
    Error = 3,
    Fatal = 4,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }

    fn from_u8(level: u8) -> Option<Severity> {
        match level {
            0 => Some(Severity::Trace),
            1 => Some(Severity::Info),
            2 => Some(Severity::Warn),
            3 => Some(Severity::Error),
            4 => Some(Severity::Fatal),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

const LOGGING_OFF: u8 = u8::MAX;

static THRESHOLD: AtomicU8 = AtomicU8::new(LOGGING_OFF);

/// JSON-line logger writing to stdout (stderr for ERROR and FATAL)
pub struct Logger;

impl Logger {
    /// Sets the minimum severity written; `None` silences the logger.
    pub fn set_threshold(threshold: Option<Severity>) {
        let level = threshold.map_or(LOGGING_OFF, |s| s as u8);
        THRESHOLD.store(level, Ordering::Relaxed);
    }

    pub fn threshold() -> Option<Severity> {
        Severity::from_u8(THRESHOLD.load(Ordering::Relaxed))
    }

    pub fn enabled(severity: Severity) -> bool {
        Self::threshold().is_some_and(|min| severity >= min)
    }

    /// Logs an event; fields are written sorted by key.
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        if !Self::enabled(severity) {
            return;
        }
        if severity >= Severity::Error {
            Self::write_line(severity, event, fields, &mut io::stderr());
        } else {
            Self::write_line(severity, event, fields, &mut io::stdout());
        }
    }

    fn write_line<W: Write>(severity: Severity, event: &str, fields: &[(&str, &str)], writer: &mut W) {
        let line = Self::format_line(severity, event, fields);
        // Logging never fails the caller
        let _ = writer.write_all(line.as_bytes());
        let _ = writer.flush();
    }

    fn format_line(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
        let mut sorted: Vec<&(&str, &str)> = fields.iter().collect();
        sorted.sort_by_key(|(key, _)| *key);

        let mut line = String::with_capacity(128);
        line.push_str("{\"event\":");
        push_json_str(&mut line, event);
        line.push_str(",\"severity\":\"");
        line.push_str(severity.as_str());
        line.push('"');
        for (key, value) in sorted {
            line.push(',');
            push_json_str(&mut line, key);
            line.push(':');
            push_json_str(&mut line, value);
        }
        line.push_str("}\n");
        line
    }

    pub fn trace(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Trace, event, fields);
    }

    pub fn info(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Info, event, fields);
    }

    pub fn warn(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Warn, event, fields);
    }

    pub fn error(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Error, event, fields);
    }
}

fn push_json_str(out: &mut String, s: &str) {
    match serde_json::to_string(s) {
        Ok(quoted) => out.push_str(&quoted),
        Err(_) => out.push_str("\"\""),
    }
}

/// Renders a log line without the threshold check
#[cfg(test)]
pub fn capture_log(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
    let mut buffer = Vec::new();
    Logger::write_line(severity, event, fields, &mut buffer);
    String::from_utf8(buffer).unwrap()
}
