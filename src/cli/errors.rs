//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero status.

use std::fmt;
use std::io;

use crate::dataset::DatasetError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file unreadable or invalid
    ConfigError,
    /// stdin/stdout failure
    IoError,
    /// Dataset dump unreadable or malformed
    DatasetError,
    /// HTTP front-end could not start or stopped with an error
    ServeFailed,
}

impl CliErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "VQ_CLI_CONFIG_ERROR",
            Self::IoError => "VQ_CLI_IO_ERROR",
            Self::DatasetError => "VQ_CLI_DATASET_ERROR",
            Self::ServeFailed => "VQ_CLI_SERVE_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn serve_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ServeFailed, msg)
    }

    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<DatasetError> for CliError {
    fn from(e: DatasetError) -> Self {
        Self::new(CliErrorCode::DatasetError, e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
