//! CMX3600-style EDL export.

use splice_core::{format_timecode, FrameRate, RationalTime};
use splice_timeline::{TimelineSchema, TrackKind};

use crate::error::{InterchangeError, Result};

/// EDL import is not supported.
pub fn from_edl(_edl: &str) -> Result<TimelineSchema> {
    Err(InterchangeError::NotImplemented("EDL"))
}

/// Render a cut list: one event per clip, video tracks first, then audio.
///
/// Timecodes are non-drop at the timeline's rate rounded to whole frames
/// per second. Subtitle and data tracks are not listed.
pub fn to_edl(schema: &TimelineSchema) -> String {
    let timeline = &schema.timeline;
    let edl_rate = FrameRate::from_integer(timeline.frame_rate().nominal_fps()).unwrap_or_default();
    let tc = |time: RationalTime| format_timecode(time.rescaled_to(edl_rate), false);

    let mut lines = vec![
        format!("TITLE: {}", timeline.name),
        String::new(),
        "FCM: NON-DROP FRAME".to_string(),
        String::new(),
    ];

    let tracks = timeline
        .tracks
        .iter()
        .filter(|t| t.kind == TrackKind::Video)
        .chain(timeline.tracks.iter().filter(|t| t.kind == TrackKind::Audio));

    let mut event = 1;
    for track in tracks {
        let channel = if track.kind == TrackKind::Audio { "AA" } else { "V" };
        for clip in &track.clips {
            let reel = schema
                .find_source(&clip.source_id)
                .map_or("UNKNOWN", |s| s.name.as_str());
            lines.push(format!(
                "{:03}  {:<8} {}     C        {} {} {} {}",
                event,
                reel,
                channel,
                tc(clip.source_range.start),
                tc(clip.source_range.end()),
                tc(clip.start()),
                tc(clip.end()),
            ));
            lines.push(format!("* FROM CLIP NAME: {}", clip.name));
            lines.push(String::new());
            event += 1;
        }
    }

    lines.join("\n")
}
