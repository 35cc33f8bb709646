//! Timeline and schema envelope types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use splice_core::{FrameRate, RationalTime};
use std::sync::Arc;

use crate::clip::Clip;
use crate::ids::{new_id, now_timestamp};
use crate::marker::Marker;
use crate::source::MediaSource;
use crate::track::Track;
use crate::transition::Transition;

/// Schema version written by this crate.
pub const CURRENT_SCHEMA_VERSION: &str = "1.0.0";

/// Interlacing order of the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldOrder {
    Progressive,
    Upper,
    Lower,
}

/// Output format settings of a timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineMetadata {
    /// Timeline frame rate; always positive
    pub frame_rate: FrameRate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pixel_aspect_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_order: Option<FieldOrder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_space: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<RationalTime>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TimelineMetadata {
    /// Metadata carrying only a frame rate.
    pub fn with_frame_rate(frame_rate: FrameRate) -> Self {
        Self {
            frame_rate,
            sample_rate: None,
            width: None,
            height: None,
            pixel_aspect_ratio: None,
            field_order: None,
            color_space: None,
            start_time: None,
            extra: Map::new(),
        }
    }
}

/// A timeline: tracks of clips plus transitions and markers.
///
/// Tracks sit behind `Arc`, so cloning a timeline is cheap and an edit only
/// copies the tracks it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub id: String,
    pub name: String,
    pub tracks: Vec<Arc<Track>>,
    pub transitions: Vec<Transition>,
    /// Markers at absolute timeline times
    pub markers: Vec<Marker>,
    pub metadata: TimelineMetadata,
    pub created_at: String,
    pub updated_at: String,
}

impl Timeline {
    /// Create an empty timeline.
    pub fn new(name: impl Into<String>, frame_rate: FrameRate) -> Self {
        let now = now_timestamp();
        Self {
            id: new_id(),
            name: name.into(),
            tracks: Vec::new(),
            transitions: Vec::new(),
            markers: Vec::new(),
            metadata: TimelineMetadata::with_frame_rate(frame_rate),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// The timeline frame rate.
    #[inline]
    pub fn frame_rate(&self) -> FrameRate {
        self.metadata.frame_rate
    }

    /// Latest clip end over all tracks, at the timeline rate.
    pub fn duration(&self) -> RationalTime {
        let rate = self.frame_rate();
        self.tracks
            .iter()
            .filter_map(|t| t.end_time())
            .max_by(|a, b| a.compare(*b))
            .map(|end| end.rescaled_to(rate))
            .unwrap_or(RationalTime::zero(rate))
    }

    /// Find a track by ID.
    pub fn find_track(&self, id: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id).map(Arc::as_ref)
    }

    /// Find a track mutably by ID, unsharing it from other timelines.
    pub fn track_mut(&mut self, id: &str) -> Option<&mut Track> {
        self.tracks
            .iter_mut()
            .find(|t| t.id == id)
            .map(Arc::make_mut)
    }

    /// Find a clip on any track. Returns the owning track and the clip.
    pub fn find_clip(&self, clip_id: &str) -> Option<(&Track, &Clip)> {
        self.tracks.iter().find_map(|track| {
            track
                .find_clip(clip_id)
                .map(|(_, clip)| (track.as_ref(), clip))
        })
    }

    /// Every clip ID, track by track.
    pub fn all_clip_ids(&self) -> Vec<String> {
        self.clips().map(|c| c.id.clone()).collect()
    }

    /// Iterate over every clip, track by track.
    pub fn clips(&self) -> impl Iterator<Item = &Clip> {
        self.tracks.iter().flat_map(|t| t.clips.iter())
    }

    /// Add a track, keeping tracks sorted by `index`.
    pub fn add_track(&mut self, track: Track) {
        let position = self
            .tracks
            .iter()
            .position(|t| t.index > track.index)
            .unwrap_or(self.tracks.len());
        self.tracks.insert(position, Arc::new(track));
    }

    /// Remove a track by ID. Returns the removed track.
    pub fn remove_track(&mut self, id: &str) -> Option<Arc<Track>> {
        let position = self.tracks.iter().position(|t| t.id == id)?;
        Some(self.tracks.remove(position))
    }

    /// Refresh `updated_at`.
    pub fn touch(&mut self) {
        self.updated_at = now_timestamp();
    }
}

/// The persisted document: a timeline plus the media it references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineSchema {
    pub version: String,
    pub timeline: Timeline,
    pub sources: Vec<MediaSource>,
    /// Opaque state owned by the agent layer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_state: Option<Value>,
}

impl TimelineSchema {
    /// A document holding an empty timeline and no sources.
    pub fn empty(name: impl Into<String>, frame_rate: FrameRate) -> Self {
        Self {
            version: CURRENT_SCHEMA_VERSION.to_string(),
            timeline: Timeline::new(name, frame_rate),
            sources: Vec::new(),
            agent_state: None,
        }
    }

    /// Find a source by ID.
    pub fn find_source(&self, id: &str) -> Option<&MediaSource> {
        self.sources.iter().find(|s| s.id == id)
    }

    /// Append a media source.
    pub fn add_source(&mut self, source: MediaSource) {
        self.sources.push(source);
    }

    /// Clip IDs whose `source_id` does not resolve to a source.
    pub fn dangling_clip_ids(&self) -> Vec<String> {
        self.timeline
            .clips()
            .filter(|c| self.find_source(&c.source_id).is_none())
            .map(|c| c.id.clone())
            .collect()
    }

    /// Total duration of the timeline, at the timeline rate.
    pub fn duration(&self) -> RationalTime {
        self.timeline.duration()
    }
}
