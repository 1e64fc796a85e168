//! CLI module for aaew-couch
//!
//! Thin front end over the library for scripts:
//! - views / count / dump: stored and ad-hoc views
//! - public-docs: documents passing the publication filter
//! - collections / projects / users: discovery

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command, ConnectionArgs};
pub use commands::{run, run_command};
pub use config::{Config, Settings};
pub use errors::{CliError, CliErrorCode, CliResult};
