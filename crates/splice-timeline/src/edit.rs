//! Edit operations on the timeline.
//!
//! Every edit is a pure reducer: `apply` takes a timeline and an `Edit` and
//! returns a new timeline or the reason the edit was rejected. Tracks are
//! shared between the input and the result except for those the edit
//! touches, so the input is never observed to change.
//!
//! The free functions at the bottom (`split_clip`, `trim_clip`, ...) keep the
//! no-op contract hosts expect: a rejected edit hands back the input.

use num_rational::Rational64;
use serde::{Deserialize, Serialize};
use splice_core::{RationalTime, TimeRange};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::debug;

use crate::clip::{Clip, ClipProperties, ClipState};
use crate::effect::Effect;
use crate::error::{EditError, EditResult};
use crate::ids::new_id;
use crate::marker::Marker;
use crate::timeline::Timeline;
use crate::track::Track;
use crate::transition::{Transition, TransitionType};

// ── Edit types ──────────────────────────────────────────────────

/// Which edge of a clip a trim moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrimSide {
    /// Move the in point; the end stays fixed and the source start follows.
    Start,
    /// Move the out point; the start stays fixed.
    End,
}

/// Field changes for a clip. `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClipUpdate {
    pub name: Option<String>,
    pub state: Option<ClipState>,
    pub properties: Option<ClipProperties>,
    pub effects: Option<Vec<Effect>>,
    pub markers: Option<Vec<Marker>>,
}

/// Field changes for a track. `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackUpdate {
    pub name: Option<String>,
    pub enabled: Option<bool>,
    pub locked: Option<bool>,
    pub solo: Option<bool>,
    pub muted: Option<bool>,
    pub volume: Option<f64>,
    pub pan: Option<f64>,
    pub color: Option<String>,
}

/// An edit to a timeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    /// Cut a clip in two at a timeline time strictly inside it.
    SplitClip {
        track_id: String,
        clip_id: String,
        at: RationalTime,
    },
    /// Move one edge of a clip to a new timeline time.
    TrimClip {
        track_id: String,
        clip_id: String,
        side: TrimSide,
        to: RationalTime,
    },
    /// Move a clip to a new start, possibly on another track.
    MoveClip {
        from_track_id: String,
        to_track_id: String,
        clip_id: String,
        start: RationalTime,
    },
    /// Insert a clip keeping the track ordered by start.
    InsertClip { track_id: String, clip: Clip },
    /// Append a clip to the end of a track's clip list.
    AddClip { track_id: String, clip: Clip },
    /// Remove a clip from a track.
    RemoveClip { track_id: String, clip_id: String },
    /// Remove clips from whichever tracks hold them.
    RemoveClips { clip_ids: Vec<String> },
    /// Copy clips to just after themselves under new ids.
    DuplicateClips { clip_ids: Vec<String> },
    UpdateClip {
        track_id: String,
        clip_id: String,
        update: ClipUpdate,
    },
    /// Overlap two adjacent clips and record a transition between them.
    AddTransition {
        track_id: String,
        from_clip_id: String,
        to_clip_id: String,
        transition_type: TransitionType,
        duration: RationalTime,
    },
    AddTrack { track: Track },
    RemoveTrack { track_id: String },
    UpdateTrack {
        track_id: String,
        update: TrackUpdate,
    },
    /// Edits applied in order; if any fails, none apply.
    Batch(Vec<Edit>),
}

impl Edit {
    /// Human-readable label, used for history entries.
    pub fn description(&self) -> String {
        match self {
            Self::SplitClip { .. } => "Split clip".into(),
            Self::TrimClip { side, .. } => match side {
                TrimSide::Start => "Trim clip start".into(),
                TrimSide::End => "Trim clip end".into(),
            },
            Self::MoveClip { .. } => "Move clip".into(),
            Self::InsertClip { .. } => "Insert clip".into(),
            Self::AddClip { .. } => "Add clip".into(),
            Self::RemoveClip { .. } => "Remove clip".into(),
            Self::RemoveClips { clip_ids } => format!("Delete {} clip(s)", clip_ids.len()),
            Self::DuplicateClips { clip_ids } => format!("Duplicate {} clip(s)", clip_ids.len()),
            Self::UpdateClip { .. } => "Update clip".into(),
            Self::AddTransition {
                transition_type, ..
            } => format!("Add {transition_type} transition"),
            Self::AddTrack { track } => format!("Add track {}", track.name),
            Self::RemoveTrack { .. } => "Remove track".into(),
            Self::UpdateTrack { .. } => "Update track".into(),
            Self::Batch(edits) => format!("{} edits", edits.len()),
        }
    }
}

// ── Reducer ─────────────────────────────────────────────────────

/// Apply an edit, returning the edited timeline.
///
/// The input is untouched. On success `updated_at` is refreshed.
pub fn apply(timeline: &Timeline, edit: &Edit) -> EditResult<Timeline> {
    let mut next = timeline.clone();
    apply_in_place(&mut next, edit)?;
    next.touch();
    Ok(next)
}

/// Mutates a private working copy; callers discard it on error.
fn apply_in_place(timeline: &mut Timeline, edit: &Edit) -> EditResult<()> {
    match edit {
        Edit::SplitClip {
            track_id,
            clip_id,
            at,
        } => split(timeline, track_id, clip_id, *at),
        Edit::TrimClip {
            track_id,
            clip_id,
            side,
            to,
        } => trim(timeline, track_id, clip_id, *side, *to),
        Edit::MoveClip {
            from_track_id,
            to_track_id,
            clip_id,
            start,
        } => move_between(timeline, from_track_id, to_track_id, clip_id, *start),
        Edit::InsertClip { track_id, clip } => {
            track_mut(timeline, track_id)?.insert_clip_ordered(clip.clone());
            Ok(())
        }
        Edit::AddClip { track_id, clip } => {
            track_mut(timeline, track_id)?.append_clip(clip.clone());
            Ok(())
        }
        Edit::RemoveClip { track_id, clip_id } => {
            track_mut(timeline, track_id)?
                .remove_clip(clip_id)
                .ok_or_else(|| EditError::ClipNotFound(clip_id.clone()))?;
            drop_transitions(timeline, std::slice::from_ref(clip_id));
            Ok(())
        }
        Edit::RemoveClips { clip_ids } => remove_many(timeline, clip_ids),
        Edit::DuplicateClips { clip_ids } => duplicate(timeline, clip_ids),
        Edit::UpdateClip {
            track_id,
            clip_id,
            update,
        } => {
            let clip = track_mut(timeline, track_id)?
                .find_clip_mut(clip_id)
                .ok_or_else(|| EditError::ClipNotFound(clip_id.clone()))?;
            update_clip(clip, update);
            Ok(())
        }
        Edit::AddTransition {
            track_id,
            from_clip_id,
            to_clip_id,
            transition_type,
            duration,
        } => transition(
            timeline,
            track_id,
            from_clip_id,
            to_clip_id,
            *transition_type,
            *duration,
        ),
        Edit::AddTrack { track } => {
            timeline.add_track(track.clone());
            Ok(())
        }
        Edit::RemoveTrack { track_id } => {
            let removed = timeline
                .remove_track(track_id)
                .ok_or_else(|| EditError::TrackNotFound(track_id.clone()))?;
            let ids: Vec<String> = removed.clips.iter().map(|c| c.id.clone()).collect();
            drop_transitions(timeline, &ids);
            Ok(())
        }
        Edit::UpdateTrack { track_id, update } => {
            update_track(track_mut(timeline, track_id)?, update);
            Ok(())
        }
        Edit::Batch(edits) => edits
            .iter()
            .try_for_each(|edit| apply_in_place(timeline, edit)),
    }
}

fn split(
    timeline: &mut Timeline,
    track_id: &str,
    clip_id: &str,
    at: RationalTime,
) -> EditResult<()> {
    let track = track_mut(timeline, track_id)?;
    let index = clip_index(track, clip_id)?;
    let original = &track.clips[index];
    let range = original.timeline_range;
    let rate = range.rate();
    let at = at.rescaled_to(rate);

    if at.value <= range.start.value || at.value >= range.end().value {
        return Err(EditError::SplitOutOfRange {
            clip_id: clip_id.to_string(),
            at: at.to_string(),
        });
    }

    let offset = at.value - range.start.value;
    let ratio = Rational64::new(offset, range.duration.value);
    let source = original.source_range;
    let first_source = (Rational64::from_integer(source.duration.value) * ratio)
        .round()
        .to_integer();

    // Markers at or after the cut belong to the second half.
    let cut = RationalTime::with_rate(offset, rate);
    let (before, after): (Vec<Marker>, Vec<Marker>) = original
        .markers
        .iter()
        .cloned()
        .partition(|m| m.time.compare(cut) == Ordering::Less);

    let mut first = original.with_new_identity();
    first.timeline_range = TimeRange::at_rate(range.start.value, offset, rate);
    first.source_range = TimeRange::at_rate(source.start.value, first_source, source.rate());
    first.markers = before;

    let mut second = original.with_new_identity();
    second.timeline_range = TimeRange::at_rate(at.value, range.duration.value - offset, rate);
    second.source_range = TimeRange::at_rate(
        source.start.value + first_source,
        source.duration.value - first_source,
        source.rate(),
    );
    second.markers = after
        .into_iter()
        .map(|mut m| {
            m.time = m.time - cut;
            m
        })
        .collect();

    let (first_id, second_id) = (first.id.clone(), second.id.clone());
    track.clips[index] = first;
    track.clips.insert(index + 1, second);

    // Transitions out of the clip now leave from its second half.
    for t in &mut timeline.transitions {
        if t.from_clip_id == clip_id {
            t.from_clip_id = second_id.clone();
        }
        if t.to_clip_id == clip_id {
            t.to_clip_id = first_id.clone();
        }
    }
    Ok(())
}

fn trim(
    timeline: &mut Timeline,
    track_id: &str,
    clip_id: &str,
    side: TrimSide,
    to: RationalTime,
) -> EditResult<()> {
    let clip = track_mut(timeline, track_id)?
        .find_clip_mut(clip_id)
        .ok_or_else(|| EditError::ClipNotFound(clip_id.to_string()))?;
    let range = clip.timeline_range;
    let rate = range.rate();
    let to = to.rescaled_to(rate);

    let (start, end) = match side {
        TrimSide::Start => (to.value, range.end().value),
        TrimSide::End => (range.start.value, to.value),
    };
    if end <= start {
        return Err(EditError::NonPositiveTrim {
            clip_id: clip_id.to_string(),
        });
    }

    // Each source edge moves by its timeline edge's delta, converted to the
    // source rate. Rounding is symmetric, so trimming back restores it.
    let source = clip.source_range;
    let source_start =
        source.start + RationalTime::with_rate(start - range.start.value, rate);
    let source_end = source.end() + RationalTime::with_rate(end - range.end().value, rate);

    if source_start.is_negative() {
        return Err(EditError::TrimBeyondSource {
            clip_id: clip_id.to_string(),
        });
    }
    if source_end.value <= source_start.value {
        return Err(EditError::NonPositiveTrim {
            clip_id: clip_id.to_string(),
        });
    }

    clip.timeline_range = TimeRange::at_rate(start, end - start, rate);
    clip.source_range = TimeRange::from_start_end(source_start, source_end);
    clip.touch();
    Ok(())
}

fn move_between(
    timeline: &mut Timeline,
    from_track_id: &str,
    to_track_id: &str,
    clip_id: &str,
    start: RationalTime,
) -> EditResult<()> {
    if timeline.find_track(to_track_id).is_none() {
        return Err(EditError::TrackNotFound(to_track_id.to_string()));
    }
    let mut clip = track_mut(timeline, from_track_id)?
        .remove_clip(clip_id)
        .ok_or_else(|| EditError::ClipNotFound(clip_id.to_string()))?;
    clip.timeline_range.start = start.rescaled_to(clip.timeline_range.rate());
    clip.touch();
    track_mut(timeline, to_track_id)?.insert_clip_ordered(clip);
    Ok(())
}

fn remove_many(timeline: &mut Timeline, clip_ids: &[String]) -> EditResult<()> {
    let mut removed = Vec::new();
    for track in &mut timeline.tracks {
        if !track.clips.iter().any(|c| clip_ids.contains(&c.id)) {
            continue;
        }
        Arc::make_mut(track).clips.retain(|c| {
            let keep = !clip_ids.contains(&c.id);
            if !keep {
                removed.push(c.id.clone());
            }
            keep
        });
    }
    if removed.is_empty() {
        return Err(EditError::ClipNotFound(clip_ids.join(", ")));
    }
    drop_transitions(timeline, &removed);
    Ok(())
}

fn duplicate(timeline: &mut Timeline, clip_ids: &[String]) -> EditResult<()> {
    let mut created = 0;
    for track in &mut timeline.tracks {
        let copies: Vec<Clip> = track
            .clips
            .iter()
            .filter(|c| clip_ids.contains(&c.id))
            .map(|c| {
                let mut copy = c.with_new_identity();
                copy.timeline_range.start = c.end();
                copy
            })
            .collect();
        if copies.is_empty() {
            continue;
        }
        created += copies.len();
        let track = Arc::make_mut(track);
        for copy in copies {
            track.insert_clip_ordered(copy);
        }
    }
    if created == 0 {
        return Err(EditError::ClipNotFound(clip_ids.join(", ")));
    }
    Ok(())
}

fn transition(
    timeline: &mut Timeline,
    track_id: &str,
    from_clip_id: &str,
    to_clip_id: &str,
    transition_type: TransitionType,
    duration: RationalTime,
) -> EditResult<()> {
    if duration.value <= 0 {
        return Err(EditError::InvalidDuration(duration.to_string()));
    }
    let track = track_mut(timeline, track_id)?;
    let a = clip_index(track, from_clip_id)?;
    let b = clip_index(track, to_clip_id)?;
    if a.abs_diff(b) != 1 {
        return Err(EditError::NotAdjacent {
            from: from_clip_id.to_string(),
            to: to_clip_id.to_string(),
        });
    }

    let (outgoing, incoming) = (&track.clips[a], &track.clips[b]);
    let gap = incoming.start().seconds() - outgoing.end().seconds();
    let limit = duration.seconds();
    if gap > limit || -gap > limit {
        return Err(EditError::GapTooWide {
            gap: (incoming.start() - outgoing.end()).to_string(),
            duration: duration.to_string(),
        });
    }
    let name = format!(
        "{} ({} → {})",
        transition_type, outgoing.name, incoming.name
    );

    let half = limit / 2;
    let outgoing = &mut track.clips[a];
    let extend = RationalTime::from_seconds(half, outgoing.timeline_range.rate());
    outgoing.timeline_range.duration.value += extend.value;
    outgoing.touch();

    let incoming = &mut track.clips[b];
    let pull = RationalTime::from_seconds(half, incoming.timeline_range.rate());
    incoming.timeline_range.start.value -= pull.value;
    incoming.touch();

    let parameters = transition_type.default_parameters();
    timeline.transitions.push(Transition {
        id: new_id(),
        name,
        transition_type,
        duration,
        from_clip_id: from_clip_id.to_string(),
        to_clip_id: to_clip_id.to_string(),
        parameters: (!parameters.is_empty()).then_some(parameters),
    });
    Ok(())
}

fn update_clip(clip: &mut Clip, update: &ClipUpdate) {
    if let Some(name) = &update.name {
        clip.name = name.clone();
    }
    if let Some(state) = update.state {
        clip.state = state;
    }
    if let Some(properties) = &update.properties {
        clip.properties = properties.clone();
    }
    if let Some(effects) = &update.effects {
        clip.effects = effects.clone();
    }
    if let Some(markers) = &update.markers {
        clip.markers = markers.clone();
    }
    clip.touch();
}

fn update_track(track: &mut Track, update: &TrackUpdate) {
    if let Some(name) = &update.name {
        track.name = name.clone();
    }
    if let Some(enabled) = update.enabled {
        track.enabled = enabled;
    }
    if let Some(locked) = update.locked {
        track.locked = locked;
    }
    if let Some(solo) = update.solo {
        track.solo = solo;
    }
    if let Some(muted) = update.muted {
        track.muted = muted;
    }
    if update.volume.is_some() {
        track.volume = update.volume;
    }
    if update.pan.is_some() {
        track.pan = update.pan;
    }
    if let Some(color) = &update.color {
        track.color = Some(color.clone());
    }
}

// ── Helpers ─────────────────────────────────────────────────────

fn track_mut<'a>(timeline: &'a mut Timeline, track_id: &str) -> EditResult<&'a mut Track> {
    timeline
        .track_mut(track_id)
        .ok_or_else(|| EditError::TrackNotFound(track_id.to_string()))
}

fn clip_index(track: &Track, clip_id: &str) -> EditResult<usize> {
    track
        .clip_position(clip_id)
        .ok_or_else(|| EditError::ClipNotFound(clip_id.to_string()))
}

/// Transitions may only reference clips that exist.
fn drop_transitions(timeline: &mut Timeline, clip_ids: &[String]) {
    timeline
        .transitions
        .retain(|t| !clip_ids.iter().any(|id| t.touches(id)));
}

// ── No-op façade ────────────────────────────────────────────────

fn apply_or_keep(timeline: &Timeline, edit: Edit) -> Timeline {
    match apply(timeline, &edit) {
        Ok(next) => next,
        Err(err) => {
            debug!(%err, edit = %edit.description(), "edit rejected, timeline unchanged");
            timeline.clone()
        }
    }
}

/// Split a clip at `at`; unchanged if `at` is not strictly inside it.
pub fn split_clip(timeline: &Timeline, track_id: &str, clip_id: &str, at: RationalTime) -> Timeline {
    apply_or_keep(
        timeline,
        Edit::SplitClip {
            track_id: track_id.into(),
            clip_id: clip_id.into(),
            at,
        },
    )
}

/// Move one edge of a clip to `to`.
pub fn trim_clip(
    timeline: &Timeline,
    track_id: &str,
    clip_id: &str,
    side: TrimSide,
    to: RationalTime,
) -> Timeline {
    apply_or_keep(
        timeline,
        Edit::TrimClip {
            track_id: track_id.into(),
            clip_id: clip_id.into(),
            side,
            to,
        },
    )
}

/// Move a clip to a new start on `to_track_id`.
pub fn move_clip(
    timeline: &Timeline,
    from_track_id: &str,
    to_track_id: &str,
    clip_id: &str,
    start: RationalTime,
) -> Timeline {
    apply_or_keep(
        timeline,
        Edit::MoveClip {
            from_track_id: from_track_id.into(),
            to_track_id: to_track_id.into(),
            clip_id: clip_id.into(),
            start,
        },
    )
}

pub fn insert_clip(timeline: &Timeline, track_id: &str, clip: Clip) -> Timeline {
    apply_or_keep(
        timeline,
        Edit::InsertClip {
            track_id: track_id.into(),
            clip,
        },
    )
}

pub fn add_clip(timeline: &Timeline, track_id: &str, clip: Clip) -> Timeline {
    apply_or_keep(
        timeline,
        Edit::AddClip {
            track_id: track_id.into(),
            clip,
        },
    )
}

pub fn remove_clip(timeline: &Timeline, track_id: &str, clip_id: &str) -> Timeline {
    apply_or_keep(
        timeline,
        Edit::RemoveClip {
            track_id: track_id.into(),
            clip_id: clip_id.into(),
        },
    )
}

/// Remove a clip from whichever track holds it.
pub fn delete_clip(timeline: &Timeline, clip_id: &str) -> Timeline {
    apply_or_keep(
        timeline,
        Edit::RemoveClips {
            clip_ids: vec![clip_id.to_string()],
        },
    )
}

pub fn duplicate_clips(timeline: &Timeline, clip_ids: &[String]) -> Timeline {
    apply_or_keep(
        timeline,
        Edit::DuplicateClips {
            clip_ids: clip_ids.to_vec(),
        },
    )
}

pub fn add_transition(
    timeline: &Timeline,
    track_id: &str,
    from_clip_id: &str,
    to_clip_id: &str,
    transition_type: TransitionType,
    duration: RationalTime,
) -> Timeline {
    apply_or_keep(
        timeline,
        Edit::AddTransition {
            track_id: track_id.into(),
            from_clip_id: from_clip_id.into(),
            to_clip_id: to_clip_id.into(),
            transition_type,
            duration,
        },
    )
}

// ── Tests ───────────────────────────────────────────────────────
