//! Error types for interchange adapters.

use splice_core::CoreError;
use thiserror::Error;

/// Errors from reading or writing external timeline formats.
#[derive(Error, Debug)]
pub enum InterchangeError {
    #[error("invalid OpenTimelineIO document: {0}")]
    InvalidOtio(String),

    #[error("{0} import not yet implemented")]
    NotImplemented(&'static str),

    #[error("unknown interchange format: {0}")]
    UnknownFormat(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Time(#[from] CoreError),
}

pub type Result<T> = std::result::Result<T, InterchangeError>;
