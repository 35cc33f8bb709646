//! Track types for the timeline.

use serde::{Deserialize, Serialize};
use splice_core::RationalTime;
use std::cmp::Ordering;

use crate::clip::Clip;
use crate::ids::new_id;

/// Kind of track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Video,
    Audio,
    Subtitle,
    Data,
}

impl TrackKind {
    /// The JSON name, e.g. `video`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Subtitle => "subtitle",
            Self::Data => "data",
        }
    }
}

/// An empty stretch of a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gap {
    pub start: RationalTime,
    /// `None` when the gap runs past the last clip.
    pub end: Option<RationalTime>,
}

/// A track holding clips ordered by start time.
///
/// Clips may overlap; ordering is kept by the ordered insert operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Unique track ID
    pub id: String,
    /// Track name
    pub name: String,
    /// Track kind
    pub kind: TrackKind,
    /// Display and processing order
    pub index: i64,
    /// Clips in this track
    pub clips: Vec<Clip>,
    pub enabled: bool,
    /// Is track locked (paste skips it)
    pub locked: bool,
    pub solo: bool,
    pub muted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pan: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Track {
    /// Create an empty, enabled, unlocked track.
    pub fn new(name: impl Into<String>, kind: TrackKind, index: i64) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            kind,
            index,
            clips: Vec::new(),
            enabled: true,
            locked: false,
            solo: false,
            muted: false,
            volume: None,
            pan: None,
            color: None,
        }
    }

    /// Create a new video track.
    pub fn new_video(name: impl Into<String>, index: i64) -> Self {
        Self::new(name, TrackKind::Video, index)
    }

    /// Create a new audio track.
    pub fn new_audio(name: impl Into<String>, index: i64) -> Self {
        Self::new(name, TrackKind::Audio, index)
    }

    /// Number of clips in this track.
    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    /// Find a clip by ID. Returns (index, &Clip).
    pub fn find_clip(&self, id: &str) -> Option<(usize, &Clip)> {
        self.clips.iter().enumerate().find(|(_, c)| c.id == id)
    }

    /// Find a clip mutably by ID.
    pub fn find_clip_mut(&mut self, id: &str) -> Option<&mut Clip> {
        self.clips.iter_mut().find(|c| c.id == id)
    }

    /// Index of a clip in this track.
    pub fn clip_position(&self, id: &str) -> Option<usize> {
        self.clips.iter().position(|c| c.id == id)
    }

    /// Check if this track holds a clip.
    pub fn contains_clip(&self, id: &str) -> bool {
        self.clips.iter().any(|c| c.id == id)
    }

    /// Insert before the first clip that starts later than `clip`.
    ///
    /// Clips with equal start keep insertion order. Returns the index used.
    pub fn insert_clip_ordered(&mut self, clip: Clip) -> usize {
        let start = clip.start();
        let index = self
            .clips
            .iter()
            .position(|c| c.start().compare(start) == Ordering::Greater)
            .unwrap_or(self.clips.len());
        self.clips.insert(index, clip);
        index
    }

    /// Add a clip to the end of the track.
    pub fn append_clip(&mut self, clip: Clip) {
        self.clips.push(clip);
    }

    /// Remove a clip by ID. Returns the removed clip.
    pub fn remove_clip(&mut self, id: &str) -> Option<Clip> {
        let index = self.clip_position(id)?;
        Some(self.clips.remove(index))
    }

    /// The first clip covering `time`.
    pub fn clip_at_time(&self, time: RationalTime) -> Option<&Clip> {
        self.clips.iter().find(|c| c.timeline_range.contains(time))
    }

    /// The empty stretch around `time`, or `None` if a clip covers it.
    pub fn gap_at_time(&self, time: RationalTime) -> Option<Gap> {
        if self.clip_at_time(time).is_some() {
            return None;
        }
        let start = self
            .clips
            .iter()
            .map(Clip::end)
            .filter(|end| end.compare(time) != Ordering::Greater)
            .max_by(|a, b| a.compare(*b))
            .unwrap_or(RationalTime::zero(time.rate));
        let end = self
            .clips
            .iter()
            .map(Clip::start)
            .filter(|s| s.compare(time) == Ordering::Greater)
            .min_by(|a, b| a.compare(*b));
        Some(Gap { start, end })
    }

    /// Latest clip end on this track.
    pub fn end_time(&self) -> Option<RationalTime> {
        self.clips.iter().map(Clip::end).max_by(|a, b| a.compare(*b))
    }
}
