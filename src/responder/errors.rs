//! # Execution Errors
//!
//! Failures reported by the statement execution collaborator. None of them
//! reach the person asking: the responder degrades every one to the sentinel.

use thiserror::Error;

/// Result type for plan execution
pub type ExecutionResult<T> = Result<T, ExecutionError>;

/// Plan execution errors
#[derive(Debug, Clone, Error)]
pub enum ExecutionError {
    #[error("Connection unavailable: {0}")]
    Unavailable(String),

    #[error("Statement timed out after {0} ms")]
    Timeout(u64),

    #[error("Statement rejected: {0}")]
    Rejected(String),

    /// The `value` column held something other than an integer or text
    #[error("Unexpected value type: {0}")]
    UnexpectedType(String),
}

impl ExecutionError {
    /// Short machine name used in log lines
    pub fn kind(&self) -> &'static str {
        match self {
            ExecutionError::Unavailable(_) => "unavailable",
            ExecutionError::Timeout(_) => "timeout",
            ExecutionError::Rejected(_) => "rejected",
            ExecutionError::UnexpectedType(_) => "unexpected_type",
        }
    }
}
