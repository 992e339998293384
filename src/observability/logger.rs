//! Structured JSON logger
//!
//! One line per event: `event` first, then `severity`, then the fields sorted
//! by key. Every line goes to stderr; stdout belongs to command output.
//! Lines below the process-wide minimum severity are dropped.

use std::fmt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU8, Ordering};

static MIN_SEVERITY: AtomicU8 = AtomicU8::new(Severity::Info as u8);

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Trace = 0,
    Info = 1,
    Warn = 2,
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

    /// Parses a level name, case-insensitive
    pub fn parse(name: &str) -> Option<Severity> {
        match name.to_ascii_uppercase().as_str() {
            "TRACE" => Some(Severity::Trace),
            "INFO" => Some(Severity::Info),
            "WARN" => Some(Severity::Warn),
            "ERROR" => Some(Severity::Error),
            "FATAL" => Some(Severity::Fatal),
            _ => None,
        }
    }

    fn from_u8(value: u8) -> Severity {
        match value {
            0 => Severity::Trace,
            1 => Severity::Info,
            2 => Severity::Warn,
            3 => Severity::Error,
            _ => Severity::Fatal,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Process-wide structured logger
pub struct Logger;

impl Logger {
    /// Sets the lowest severity that is written
    pub fn set_min_severity(severity: Severity) {
        MIN_SEVERITY.store(severity as u8, Ordering::Relaxed);
    }

    pub fn min_severity() -> Severity {
        Severity::from_u8(MIN_SEVERITY.load(Ordering::Relaxed))
    }

    /// Writes one event line to stderr
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        if severity < Self::min_severity() {
            return;
        }
        let line = Self::render(severity, event, fields);
        let _ = io::stderr().lock().write_all(line.as_bytes());
    }

    /// Renders one event line, newline included
    pub fn render(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
        let mut sorted: Vec<&(&str, &str)> = fields.iter().collect();
        sorted.sort_by_key(|(key, _)| *key);

        let mut line = String::with_capacity(128);
        line.push_str("{\"event\":");
        push_json_string(&mut line, event);
        line.push_str(",\"severity\":\"");
        line.push_str(severity.as_str());
        line.push('"');
        for (key, value) in sorted {
            line.push(',');
            push_json_string(&mut line, key);
            line.push(':');
            push_json_string(&mut line, value);
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

    pub fn fatal(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Fatal, event, fields);
    }
}

fn push_json_string(out: &mut String, value: &str) {
    match serde_json::to_string(value) {
        Ok(quoted) => out.push_str(&quoted),
        Err(_) => out.push_str("\"\""),
    }
}
