//! Splice Interchange - exchange timelines with other editors
//!
//! - OpenTimelineIO JSON: import and export
//! - CMX3600 EDL: export only
//! - Final Cut Pro XML 1.10: export only

pub mod edl;
pub mod error;
pub mod fcpxml;
pub mod otio;

pub use edl::{from_edl, to_edl};
pub use error::{InterchangeError, Result};
pub use fcpxml::{from_fcpxml, to_fcpxml};
pub use otio::{from_otio, from_otio_str, to_otio, to_otio_string};

use splice_timeline::TimelineSchema;
use std::fmt;
use std::str::FromStr;

/// A supported external format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterchangeFormat {
    Otio,
    Edl,
    Fcpxml,
}

impl InterchangeFormat {
    pub const ALL: [Self; 3] = [Self::Otio, Self::Edl, Self::Fcpxml];

    /// Conventional file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Otio => "otio",
            Self::Edl => "edl",
            Self::Fcpxml => "fcpxml",
        }
    }

    /// Format for a file extension (case-insensitive, dot optional).
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        Self::ALL.into_iter().find(|f| f.extension() == ext)
    }

    /// Whether `import` can read this format.
    pub fn supports_import(self) -> bool {
        matches!(self, Self::Otio)
    }
}

impl fmt::Display for InterchangeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for InterchangeFormat {
    type Err = InterchangeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_extension(s).ok_or_else(|| InterchangeError::UnknownFormat(s.to_string()))
    }
}

/// Render a document in `format`.
pub fn export(schema: &TimelineSchema, format: InterchangeFormat) -> Result<String> {
    match format {
        InterchangeFormat::Otio => to_otio_string(schema),
        InterchangeFormat::Edl => Ok(to_edl(schema)),
        InterchangeFormat::Fcpxml => Ok(to_fcpxml(schema)),
    }
}

/// Read a document from text in `format`.
pub fn import(text: &str, format: InterchangeFormat) -> Result<TimelineSchema> {
    match format {
        InterchangeFormat::Otio => from_otio_str(text),
        InterchangeFormat::Edl => from_edl(text),
        InterchangeFormat::Fcpxml => from_fcpxml(text),
    }
}
