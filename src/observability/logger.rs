//! Structured JSON logger
//!
//! - One log line = one event
//! - Deterministic key ordering
//! - Synchronous, written to stderr so stdout stays free for results

use std::env;
use std::fmt;
use std::io::{self, Write};

use chrono::Utc;
use serde_json::{Map, Value};

/// Environment variable that enables TRACE output
pub const TRACE_ENV: &str = "AAEW_COUCH_TRACE";

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Page-level detail
    Trace = 0,
    /// Normal operations
    Info = 1,
    /// Recoverable issues
    Warn = 2,
    /// Operation failures
    Error = 3,
}

impl Severity {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A structured logger that outputs JSON lines
pub struct Logger;

impl Logger {
    /// Log an event with the given severity and fields
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        if severity == Severity::Trace && env::var_os(TRACE_ENV).is_none() {
            return;
        }
        Self::log_to_writer(severity, event, fields, &mut io::stderr());
    }

    fn log_to_writer<W: Write>(
        severity: Severity,
        event: &str,
        fields: &[(&str, &str)],
        writer: &mut W,
    ) {
        let line = Self::render(&Utc::now().to_rfc3339(), severity, event, fields);
        // Logging must never fail the caller
        let _ = writer.write_all(line.as_bytes());
        let _ = writer.flush();
    }

    /// Render one log line. Keys come out sorted and fields cannot override
    /// the keys set here.
    fn render(ts: &str, severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
        let mut record = Map::new();
        for (key, value) in fields {
            record.insert((*key).to_string(), Value::String((*value).to_string()));
        }
        record.insert("event".to_string(), Value::String(event.to_string()));
        record.insert(
            "severity".to_string(),
            Value::String(severity.as_str().to_string()),
        );
        record.insert("ts".to_string(), Value::String(ts.to_string()));

        let mut line = Value::Object(record).to_string();
        line.push('\n');
        line
    }

    /// Log at TRACE level
    pub fn trace(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Trace, event, fields);
    }

    /// Log at INFO level
    pub fn info(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Info, event, fields);
    }

    /// Log at WARN level
    pub fn warn(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Warn, event, fields);
    }

    /// Log at ERROR level
    pub fn error(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Error, event, fields);
    }
}

/// Render a log line with a fixed timestamp for testing
#[cfg(test)]
pub fn capture_log(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
    Logger::render("1970-01-01T00:00:00+00:00", severity, event, fields)
}
