//! End-to-end editing scenarios across the core, timeline and interchange
//! crates.

use serde_json::json;
use splice_core::{FrameRate, Rational64, RationalTime, TimeRange};
use splice_interchange::from_otio;
use splice_timeline::edit::{split_clip, trim_clip};
use splice_timeline::{
    Clip, ClipboardManager, HistoryConfig, SnapKind, SnappingEngine, Timeline, TimelineHistory,
    Track, TrimSide,
};

// ── Helpers ────────────────────────────────────────────────────

fn frames(n: i64) -> RationalTime {
    RationalTime::with_rate(n, FrameRate::FPS_30)
}

fn secs(n: i64) -> RationalTime {
    frames(n * 30)
}

/// A 30 fps timeline with one video track holding one clip.
fn single_clip(start: i64, duration: i64) -> (Timeline, String, String) {
    let mut timeline = Timeline::new("Scenario", FrameRate::FPS_30);
    let mut track = Track::new_video("V1", 0);
    track.append_clip(Clip::new(
        "shot",
        "src-1",
        TimeRange::at_rate(0, duration, FrameRate::FPS_30),
        TimeRange::at_rate(start, duration, FrameRate::FPS_30),
    ));
    let track_id = track.id.clone();
    let clip_id = track.clips[0].id.clone();
    timeline.add_track(track);
    (timeline, track_id, clip_id)
}

// ── Scenarios ──────────────────────────────────────────────────

#[test]
fn split_in_the_middle() {
    let (timeline, track_id, clip_id) = single_clip(0, 150);
    let split = split_clip(&timeline, &track_id, &clip_id, frames(75));

    let clips = &split.tracks[0].clips;
    assert_eq!(clips.len(), 2);
    assert_eq!(clips[0].timeline_range, TimeRange::at_rate(0, 75, FrameRate::FPS_30));
    assert_eq!(clips[1].timeline_range, TimeRange::at_rate(75, 75, FrameRate::FPS_30));
    assert_eq!(clips[0].end(), clips[1].start());
    assert_eq!(clips[0].source_range, TimeRange::at_rate(0, 75, FrameRate::FPS_30));
    assert_eq!(clips[1].source_range, TimeRange::at_rate(75, 75, FrameRate::FPS_30));

    // The original value is untouched.
    assert_eq!(timeline.tracks[0].clip_count(), 1);
}

#[test]
fn trim_start_forward() {
    let (timeline, track_id, clip_id) = single_clip(0, 150);
    let trimmed = trim_clip(&timeline, &track_id, &clip_id, TrimSide::Start, frames(30));

    let clip = &trimmed.tracks[0].clips[0];
    assert_eq!(clip.timeline_range, TimeRange::at_rate(30, 120, FrameRate::FPS_30));
    assert_eq!(clip.source_range.start, frames(30));
    assert_eq!(clip.source_range.duration, frames(120));
}

#[test]
fn undo_redo_walk() {
    let a = Timeline::new("A", FrameRate::FPS_24);
    let b = Timeline::new("B", FrameRate::FPS_24);
    let c = Timeline::new("C", FrameRate::FPS_24);

    let mut history = TimelineHistory::new(&HistoryConfig::default());
    history.push_state(&a, "open");
    history.push_state(&b, "edit b");
    history.push_state(&c, "edit c");

    let current = history.undo(&c);
    assert_eq!(current.name, "B");
    let current = history.undo(&current);
    assert_eq!(current.name, "A");
    assert!(!history.can_undo());

    let current = history.redo(&current);
    assert_eq!(current.name, "B");
    let current = history.redo(&current);
    assert_eq!(current, c);
    assert!(!history.can_redo());
}

#[test]
fn drag_snaps_to_clip_boundary() {
    let (timeline, _, clip_id) = single_clip(0, 300);
    let engine = SnappingEngine::default();
    let points = SnappingEngine::timeline_snap_points(&timeline, None, &[]);

    let proposed = RationalTime::with_rate(10_030, FrameRate::MILLISECONDS);
    let snap = engine.snap_clip_trim(proposed, &points);
    assert_eq!(snap.time.seconds(), Rational64::from_integer(10));
    let guide = snap.guide.expect("boundary within threshold");
    assert_eq!(guide.source.kind, SnapKind::ClipEnd);
    assert_eq!(guide.source.clip_id.as_deref(), Some(clip_id.as_str()));

    let far = RationalTime::with_rate(10_200, FrameRate::MILLISECONDS);
    let snap = engine.snap_clip_trim(far, &points);
    assert_eq!(snap.time, far);
    assert!(snap.guide.is_none());
}

#[test]
fn paste_follows_playhead() {
    let (timeline, _, clip_id) = single_clip(60, 60);
    let mut clipboard = ClipboardManager::new();
    clipboard.copy(&timeline, &[clip_id.clone()], secs(5));

    let outcome = clipboard.paste(&timeline, secs(8));
    let pasted = &outcome.placed[0].clip;
    let original = timeline.find_clip(&clip_id).unwrap().1;
    assert_eq!(pasted.start(), original.start() + secs(3));
    assert_eq!(pasted.duration(), secs(2));

    let with_paste = outcome.apply_to(&timeline).unwrap();
    assert_eq!(with_paste.tracks[0].clip_count(), 2);
}

#[test]
fn otio_gap_then_clip() {
    let doc = json!({
        "OTIO_SCHEMA": "Timeline.1",
        "name": "Imported",
        "tracks": [{
            "OTIO_SCHEMA": "Track.1",
            "name": "V1",
            "kind": "Video",
            "children": [
                {
                    "OTIO_SCHEMA": "Gap.1",
                    "source_range": {
                        "start_time": { "value": 0, "rate": 24 },
                        "duration": { "value": 24, "rate": 24 }
                    }
                },
                {
                    "OTIO_SCHEMA": "Clip.1",
                    "name": "two seconds",
                    "source_range": {
                        "start_time": { "value": 0, "rate": 24 },
                        "duration": { "value": 48, "rate": 24 }
                    },
                    "media_reference": {
                        "OTIO_SCHEMA": "ExternalReference.1",
                        "target_url": "file:///media/two.mov"
                    }
                }
            ]
        }]
    });

    let schema = from_otio(&doc).unwrap();
    let track = &schema.timeline.tracks[0];
    assert_eq!(track.clip_count(), 1);
    assert_eq!(track.clips[0].start().seconds(), Rational64::from_integer(1));
    assert_eq!(schema.sources[0].path, "file:///media/two.mov");
}
