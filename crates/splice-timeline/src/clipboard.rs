//! Copy, cut and paste of clips.
//!
//! Pasted clips keep their position relative to the playhead at copy time:
//! each is shifted by `paste_time - cut_time`.

use num_rational::Rational64;
use splice_core::RationalTime;
use tracing::warn;

use crate::clip::Clip;
use crate::edit::{apply, Edit};
use crate::error::EditResult;
use crate::timeline::Timeline;
use crate::track::TrackKind;

/// A copied clip with the track it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipboardEntry {
    pub clip: Clip,
    pub track_id: String,
    pub track_kind: TrackKind,
}

/// What the clipboard holds.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipboardData {
    pub entries: Vec<ClipboardEntry>,
    pub source_timeline_id: String,
    /// Playhead time when the copy was taken
    pub cut_time: RationalTime,
}

/// A clip placed by `paste`, ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct PastedClip {
    pub track_id: String,
    pub clip: Clip,
}

/// A clipboard entry `paste` could not place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub original_clip_id: String,
    pub track_kind: TrackKind,
}

/// Result of a paste.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PasteOutcome {
    pub placed: Vec<PastedClip>,
    /// Entries with no unlocked track of their kind
    pub skipped: Vec<SkippedEntry>,
}

impl PasteOutcome {
    /// The edit inserting every placed clip.
    pub fn to_edit(&self) -> Edit {
        Edit::Batch(
            self.placed
                .iter()
                .map(|p| Edit::InsertClip {
                    track_id: p.track_id.clone(),
                    clip: p.clip.clone(),
                })
                .collect(),
        )
    }

    /// Insert the placed clips into `timeline`.
    pub fn apply_to(&self, timeline: &Timeline) -> EditResult<Timeline> {
        apply(timeline, &self.to_edit())
    }

    /// IDs of the newly created clips.
    pub fn placed_ids(&self) -> Vec<String> {
        self.placed.iter().map(|p| p.clip.id.clone()).collect()
    }
}

/// Single-slot clipboard.
#[derive(Debug, Clone, Default)]
pub struct ClipboardManager {
    data: Option<ClipboardData>,
}

impl ClipboardManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy the given clips. Returns how many were found.
    ///
    /// An empty ID list leaves the clipboard as it was.
    pub fn copy(&mut self, timeline: &Timeline, clip_ids: &[String], current_time: RationalTime) -> usize {
        if clip_ids.is_empty() {
            return 0;
        }
        let mut entries = Vec::new();
        for track in &timeline.tracks {
            for clip in track.clips.iter().filter(|c| clip_ids.contains(&c.id)) {
                entries.push(ClipboardEntry {
                    clip: clip.clone(),
                    track_id: track.id.clone(),
                    track_kind: track.kind,
                });
            }
        }
        let count = entries.len();
        self.data = Some(ClipboardData {
            entries,
            source_timeline_id: timeline.id.clone(),
            cut_time: current_time,
        });
        count
    }

    /// Copy the given clips, then remove them from the timeline.
    pub fn cut(&mut self, timeline: &Timeline, clip_ids: &[String], current_time: RationalTime) -> EditResult<Timeline> {
        self.copy(timeline, clip_ids, current_time);
        apply(
            timeline,
            &Edit::RemoveClips {
                clip_ids: clip_ids.to_vec(),
            },
        )
    }

    /// Place the clipboard contents relative to `current_time`.
    ///
    /// Each entry goes to the first unlocked track of its kind, under a new
    /// id, with its start shifted by `current_time - cut_time` and clamped
    /// at zero. Entries without such a track are reported as skipped.
    pub fn paste(&self, timeline: &Timeline, current_time: RationalTime) -> PasteOutcome {
        let mut outcome = PasteOutcome::default();
        let Some(data) = &self.data else {
            return outcome;
        };
        let offset = current_time.seconds() - data.cut_time.seconds();
        let zero = Rational64::from_integer(0);

        for entry in &data.entries {
            let target = timeline
                .tracks
                .iter()
                .find(|t| t.kind == entry.track_kind && !t.locked);
            let Some(track) = target else {
                warn!(
                    clip = %entry.clip.id,
                    kind = entry.track_kind.as_str(),
                    "no unlocked track for pasted clip"
                );
                outcome.skipped.push(SkippedEntry {
                    original_clip_id: entry.clip.id.clone(),
                    track_kind: entry.track_kind,
                });
                continue;
            };

            let mut clip = entry.clip.with_new_identity();
            let start = (clip.start().seconds() + offset).max(zero);
            clip.timeline_range.start = RationalTime::from_seconds(start, clip.timeline_range.rate());
            outcome.placed.push(PastedClip {
                track_id: track.id.clone(),
                clip,
            });
        }
        outcome
    }

    pub fn has_contents(&self) -> bool {
        self.data.as_ref().is_some_and(|d| !d.entries.is_empty())
    }

    pub fn contents(&self) -> Option<&ClipboardData> {
        self.data.as_ref()
    }

    pub fn clear(&mut self) {
        self.data = None;
    }
}
