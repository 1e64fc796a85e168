//! aaew-couch CLI entry point
//!
//! All logic lives in the CLI module; this only reports the error and sets
//! the exit code.

use aaew_couch::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
