//! Clip types for the timeline.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use splice_core::{RationalTime, TimeRange};

use crate::effect::Effect;
use crate::ids::{new_id, now_timestamp};
use crate::marker::Marker;

/// Playback state of a clip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipState {
    #[default]
    Active,
    Muted,
    Disabled,
    Pending,
}

/// 2D placement of a clip's picture.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub rotation: f64,
    pub anchor_x: f64,
    pub anchor_y: f64,
}

/// Edge insets, in pixels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Crop {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

/// Open key/value property bag of a clip.
///
/// Well-known keys get typed fields; anything else lands in `extra` and is
/// written back untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_reversed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<Crop>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A clip on the timeline: a region of one media source placed at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clip {
    /// Unique clip ID
    pub id: String,
    /// Clip name (displayed in UI)
    pub name: String,
    /// ID of the `MediaSource` this clip plays
    pub source_id: String,
    /// Region of the source media used
    pub source_range: TimeRange,
    /// Placement on the timeline
    pub timeline_range: TimeRange,
    pub state: ClipState,
    pub effects: Vec<Effect>,
    /// Markers, timed relative to the clip start
    pub markers: Vec<Marker>,
    #[serde(default)]
    pub properties: ClipProperties,
    pub created_at: String,
    pub updated_at: String,
}

impl Clip {
    /// Create a new active clip with no effects or markers.
    pub fn new(
        name: impl Into<String>,
        source_id: impl Into<String>,
        source_range: TimeRange,
        timeline_range: TimeRange,
    ) -> Self {
        let now = now_timestamp();
        Self {
            id: new_id(),
            name: name.into(),
            source_id: source_id.into(),
            source_range,
            timeline_range,
            state: ClipState::Active,
            effects: Vec::new(),
            markers: Vec::new(),
            properties: ClipProperties::default(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Timeline start time.
    #[inline]
    pub fn start(&self) -> RationalTime {
        self.timeline_range.start
    }

    /// Timeline end time (exclusive).
    #[inline]
    pub fn end(&self) -> RationalTime {
        self.timeline_range.end()
    }

    /// Duration on the timeline.
    #[inline]
    pub fn duration(&self) -> RationalTime {
        self.timeline_range.duration
    }

    /// Check if two clips occupy overlapping timeline time.
    pub fn overlaps(&self, other: &Clip) -> bool {
        self.timeline_range.overlaps(other.timeline_range)
    }

    /// Refresh `updated_at`.
    pub fn touch(&mut self) {
        self.updated_at = now_timestamp();
    }

    /// Copy of this clip under a fresh id with fresh timestamps.
    pub fn with_new_identity(&self) -> Self {
        let now = now_timestamp();
        Self {
            id: new_id(),
            created_at: now.clone(),
            updated_at: now,
            ..self.clone()
        }
    }
}
