//! Error types for the time primitives.

use thiserror::Error;

/// Errors raised by time construction and timecode parsing.
///
/// These indicate a caller defect (a zero rate, mixed-rate ranges) or a
/// malformed timecode string, never a recoverable editing condition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid rate: {0}")]
    InvalidRate(String),

    #[error("Start and duration must have the same rate ({start} != {duration})")]
    RateMismatch { start: String, duration: String },

    #[error("Invalid timecode '{timecode}': {reason}")]
    InvalidTimecode { timecode: String, reason: String },
}

/// Result type alias for time operations.
pub type Result<T> = std::result::Result<T, CoreError>;
