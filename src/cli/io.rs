//! JSON lines output
//!
//! One JSON value per line on stdout. Logs go to stderr.

use std::io::{self, Write};

use serde_json::Value;

use super::errors::CliResult;

/// Write one JSON value as a line
pub fn write_json<W: Write>(out: &mut W, value: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Write every value of `values`, stopping at the first error
pub fn write_stream<I, E>(values: I) -> CliResult<u64>
where
    I: IntoIterator<Item = Result<Value, E>>,
    super::errors::CliError: From<E>,
{
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut written = 0;
    for value in values {
        write_json(&mut out, &value?)?;
        written += 1;
    }
    out.flush()?;
    Ok(written)
}

/// Write a single value to stdout
pub fn write_response(value: Value) -> CliResult<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_json(&mut out, &value)?;
    out.flush()?;
    Ok(())
}

/// Write raw text to stdout
pub fn write_raw(text: &str) -> CliResult<()> {
    let mut stdout = io::stdout();
    writeln!(stdout, "{}", text)?;
    stdout.flush()?;
    Ok(())
}
