//! Observability for aaew_couch
//!
//! Structured JSON log lines on stderr. Logging is read-only: it never
//! changes query behavior and never fails the caller.
//!
//! ```ignore
//! use aaew_couch::observability::Logger;
//!
//! Logger::warn("VIEW_WINDOW_SHRUNK", &[("window_size", "128")]);
//! ```

mod logger;

pub use logger::{Logger, Severity, TRACE_ENV};
