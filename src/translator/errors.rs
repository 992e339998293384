//! Signal extraction diagnostics
//!
//! Error codes:
//! - VQ_SIGNAL_MALFORMED_NUMBER
//! - VQ_SIGNAL_MALFORMED_TIME
//! - VQ_SIGNAL_MALFORMED_DATE
//!
//! None of these abort a translation. The affected signal is recorded as
//! absent and matching continues against rules that do not require it.

use std::fmt;

/// Extraction error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalErrorCode {
    /// Threshold digits found but not representable as an integer
    MalformedNumber,
    /// Hour or minute outside its range
    MalformedTime,
    /// Day/month/year triple that is not a calendar date
    MalformedDate,
}

impl SignalErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SignalErrorCode::MalformedNumber => "VQ_SIGNAL_MALFORMED_NUMBER",
            SignalErrorCode::MalformedTime => "VQ_SIGNAL_MALFORMED_TIME",
            SignalErrorCode::MalformedDate => "VQ_SIGNAL_MALFORMED_DATE",
        }
    }
}

impl fmt::Display for SignalErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A signal that was present in the text but could not be typed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalError {
    code: SignalErrorCode,
    signal: &'static str,
    message: String,
}

impl SignalError {
    /// Digits after a threshold trigger overflowed
    pub fn malformed_number(digits: impl Into<String>) -> Self {
        Self {
            code: SignalErrorCode::MalformedNumber,
            signal: "threshold",
            message: format!("'{}' is not a valid integer", digits.into()),
        }
    }

    /// Hour/minute pair out of range
    pub fn malformed_time(hour: u32, minute: u32) -> Self {
        Self {
            code: SignalErrorCode::MalformedTime,
            signal: "time_range",
            message: format!("{:02}:{:02} is not a time of day", hour, minute),
        }
    }

    /// Impossible calendar date
    pub fn malformed_date(signal: &'static str, year: i32, month: u32, day: u32) -> Self {
        Self {
            code: SignalErrorCode::MalformedDate,
            signal,
            message: format!("{:04}-{:02}-{:02} is not a calendar date", year, month, day),
        }
    }

    pub fn code(&self) -> SignalErrorCode {
        self.code
    }

    /// Name of the signal that was dropped
    pub fn signal(&self) -> &'static str {
        self.signal
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for SignalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.code, self.signal, self.message)
    }
}

impl std::error::Error for SignalError {}

/// Result type for extractors
pub type SignalResult<T> = Result<T, SignalError>;
