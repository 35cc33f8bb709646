//! Error types for the timeline engine.

use thiserror::Error;

use crate::validation::ValidationErrors;

/// Why an edit could not be applied. The timeline is left unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("track not found: {0}")]
    TrackNotFound(String),

    #[error("clip not found: {0}")]
    ClipNotFound(String),

    #[error("media source not found: {0}")]
    SourceNotFound(String),

    #[error("split time {at} is not strictly inside clip {clip_id}")]
    SplitOutOfRange { clip_id: String, at: String },

    #[error("trim of clip {clip_id} would leave a non-positive duration")]
    NonPositiveTrim { clip_id: String },

    #[error("trim of clip {clip_id} reaches before the start of its source media")]
    TrimBeyondSource { clip_id: String },

    #[error("clips {from} and {to} are not adjacent on their track")]
    NotAdjacent { from: String, to: String },

    #[error("gap of {gap} between clips exceeds the transition duration {duration}")]
    GapTooWide { gap: String, duration: String },

    #[error("transition duration must be positive, got {0}")]
    InvalidDuration(String),
}

/// Errors from loading, validating and saving timeline documents.
#[derive(Error, Debug)]
pub enum TimelineError {
    #[error(transparent)]
    Edit(#[from] EditError),

    #[error(transparent)]
    Invalid(#[from] ValidationErrors),

    #[error("unsupported schema version {found} (this build reads up to {supported})")]
    UnsupportedVersion { found: String, supported: String },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TimelineError>;

/// Result of a single edit.
pub type EditResult<T> = std::result::Result<T, EditError>;
