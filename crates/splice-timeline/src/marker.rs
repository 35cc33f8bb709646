//! Markers on clips and timelines.

use serde::{Deserialize, Serialize};
use splice_core::RationalTime;

use crate::ids::new_id;

/// A named point (or span) of interest.
///
/// On a clip, `time` is relative to the clip's timeline start; on a timeline
/// it is absolute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub id: String,
    pub name: String,
    pub time: RationalTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<RationalTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl Marker {
    /// Create a point marker.
    pub fn new(name: impl Into<String>, time: RationalTime) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            time,
            duration: None,
            color: None,
            comment: None,
            completed: None,
        }
    }
}
