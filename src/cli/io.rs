//! Line-oriented I/O for the CLI
//!
//! - Input: one question per line, UTF-8
//! - Output: one JSON object per line

use std::io::{BufRead, Write};

use serde::Serialize;
use serde_json::json;

use super::errors::{CliError, CliResult};

/// Non-blank input lines, trimmed
pub fn read_questions<R: BufRead>(input: R) -> impl Iterator<Item = CliResult<String>> {
    input.lines().filter_map(|line| match line {
        Ok(line) if line.trim().is_empty() => None,
        Ok(line) => Some(Ok(line.trim().to_string())),
        Err(e) => Some(Err(CliError::from(e))),
    })
}

/// Writes `{"status":"ok","data":...}` as one line
pub fn write_response<W: Write, T: Serialize>(out: &mut W, data: &T) -> CliResult<()> {
    let response = json!({
        "status": "ok",
        "data": data,
    });
    serde_json::to_writer(&mut *out, &response)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

/// Writes `{"status":"error","code":...,"message":...}` as one line
pub fn write_error<W: Write>(out: &mut W, code: &str, message: &str) -> CliResult<()> {
    let response = json!({
        "status": "error",
        "code": code,
        "message": message,
    });
    serde_json::to_writer(&mut *out, &response)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

/// Writes preformatted text as-is
pub fn write_text<W: Write>(out: &mut W, text: &str) -> CliResult<()> {
    write!(out, "{}", text)?;
    out.flush()?;
    Ok(())
}
