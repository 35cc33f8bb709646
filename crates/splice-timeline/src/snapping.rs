//! Snapping engine for interactive drag and trim.
//!
//! Distances are compared in exact seconds. The threshold is a time, not a
//! pixel distance, so its on-screen reach grows with zoom.

use num_rational::Rational64;
use serde::{Deserialize, Serialize};
use splice_core::{FrameRate, RationalTime};
use std::cmp::Ordering;

use crate::timeline::Timeline;
use crate::track::Track;

/// Kind of snap point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SnapKind {
    ClipStart,
    ClipEnd,
    Playhead,
    Marker,
}

/// A time that dragged edges can lock onto.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapPoint {
    pub time: RationalTime,
    pub kind: SnapKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clip_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_id: Option<String>,
}

/// Outcome of snapping one time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapResult {
    /// The snapped time, or the input time if nothing was in reach
    pub snapped_time: RationalTime,
    pub point: Option<SnapPoint>,
    /// Input minus snapped time, in seconds
    pub offset: Rational64,
}

impl SnapResult {
    fn unsnapped(time: RationalTime) -> Self {
        Self {
            snapped_time: time,
            point: None,
            offset: Rational64::from_integer(0),
        }
    }

    pub fn snapped(&self) -> bool {
        self.point.is_some()
    }
}

/// A vertical guide line drawn at a snapped time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapGuide {
    pub time: RationalTime,
    pub source: SnapPoint,
}

/// Adjusted start of a dragged clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveSnap {
    pub start_time: RationalTime,
    pub guides: Vec<SnapGuide>,
}

/// Adjusted time of a trimmed edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimSnap {
    pub time: RationalTime,
    pub guide: Option<SnapGuide>,
}

/// Snapping settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapConfig {
    pub enabled: bool,
    /// Maximum distance that still snaps
    pub threshold: RationalTime,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: RationalTime::with_rate(50, FrameRate::MILLISECONDS),
        }
    }
}

/// Engine for computing snap targets.
#[derive(Debug, Clone, Default)]
pub struct SnappingEngine {
    pub config: SnapConfig,
}

impl SnappingEngine {
    pub fn new(config: SnapConfig) -> Self {
        Self { config }
    }

    /// Candidate points from a set of tracks.
    ///
    /// Yields the playhead (unless negative), every clip start and end, and
    /// every clip marker at its absolute time. Clips in `exclude_clip_ids`
    /// contribute nothing.
    pub fn collect_snap_points<'a>(
        tracks: impl IntoIterator<Item = &'a Track>,
        playhead: Option<RationalTime>,
        exclude_clip_ids: &[String],
    ) -> Vec<SnapPoint> {
        let mut points = Vec::new();

        if let Some(time) = playhead.filter(|t| !t.is_negative()) {
            points.push(SnapPoint {
                time,
                kind: SnapKind::Playhead,
                clip_id: None,
                track_id: None,
            });
        }

        for track in tracks {
            for clip in track
                .clips
                .iter()
                .filter(|c| !exclude_clip_ids.contains(&c.id))
            {
                let point = |time, kind| SnapPoint {
                    time,
                    kind,
                    clip_id: Some(clip.id.clone()),
                    track_id: Some(track.id.clone()),
                };
                points.push(point(clip.start(), SnapKind::ClipStart));
                points.push(point(clip.end(), SnapKind::ClipEnd));
                for marker in &clip.markers {
                    points.push(point(clip.start() + marker.time, SnapKind::Marker));
                }
            }
        }

        points
    }

    /// Candidate points from a whole timeline, timeline markers included.
    pub fn timeline_snap_points(
        timeline: &Timeline,
        playhead: Option<RationalTime>,
        exclude_clip_ids: &[String],
    ) -> Vec<SnapPoint> {
        let mut points = Self::collect_snap_points(
            timeline.tracks.iter().map(|t| t.as_ref()),
            playhead,
            exclude_clip_ids,
        );
        points.extend(timeline.markers.iter().map(|m| SnapPoint {
            time: m.time,
            kind: SnapKind::Marker,
            clip_id: None,
            track_id: None,
        }));
        points
    }

    /// Snap `time` to the nearest point within the threshold.
    pub fn find_snap(&self, time: RationalTime, points: &[SnapPoint]) -> SnapResult {
        if !self.config.enabled {
            return SnapResult::unsnapped(time);
        }
        find_snap_point(time, points, self.config.threshold)
    }

    /// Snap a dragged clip spanning `start..end`.
    ///
    /// Both edges are tried; the one needing the smaller correction wins,
    /// and the start edge wins ties. The new start is always at `start.rate`.
    pub fn snap_clip_move(
        &self,
        start: RationalTime,
        end: RationalTime,
        points: &[SnapPoint],
    ) -> MoveSnap {
        let by_start = self.find_snap(start, points);
        let by_end = self.find_snap(end, points);

        let pick_start = match (&by_start.point, &by_end.point) {
            (Some(_), Some(_)) => abs(by_start.offset) <= abs(by_end.offset),
            (Some(_), None) => true,
            _ => false,
        };

        if pick_start {
            MoveSnap {
                start_time: by_start.snapped_time.rescaled_to(start.rate),
                guides: guide(&by_start).into_iter().collect(),
            }
        } else if by_end.snapped() {
            let shifted = start.seconds() - by_end.offset;
            MoveSnap {
                start_time: RationalTime::from_seconds(shifted, start.rate),
                guides: guide(&by_end).into_iter().collect(),
            }
        } else {
            MoveSnap {
                start_time: start,
                guides: Vec::new(),
            }
        }
    }

    /// Snap a single trimmed edge.
    pub fn snap_clip_trim(&self, time: RationalTime, points: &[SnapPoint]) -> TrimSnap {
        let result = self.find_snap(time, points);
        TrimSnap {
            time: result.snapped_time,
            guide: guide(&result),
        }
    }
}

/// Nearest point to `time` no farther than `threshold`.
///
/// The first of equally near points wins. With nothing in reach `time` is
/// returned unchanged.
pub fn find_snap_point(
    time: RationalTime,
    points: &[SnapPoint],
    threshold: RationalTime,
) -> SnapResult {
    let limit = threshold.seconds();
    let at = time.seconds();

    let mut best: Option<(&SnapPoint, Rational64)> = None;
    for point in points {
        let distance = abs(at - point.time.seconds());
        if distance > limit {
            continue;
        }
        if best.map_or(true, |(_, d)| distance.cmp(&d) == Ordering::Less) {
            best = Some((point, distance));
        }
    }

    match best {
        Some((point, _)) => SnapResult {
            snapped_time: point.time,
            point: Some(point.clone()),
            offset: at - point.time.seconds(),
        },
        None => SnapResult::unsnapped(time),
    }
}

fn guide(result: &SnapResult) -> Option<SnapGuide> {
    result.point.as_ref().map(|p| SnapGuide {
        time: result.snapped_time,
        source: p.clone(),
    })
}

fn abs(value: Rational64) -> Rational64 {
    if value < Rational64::from_integer(0) {
        -value
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::Clip;
    use crate::marker::Marker;
    use splice_core::TimeRange;

    fn ms(value: i64) -> RationalTime {
        RationalTime::with_rate(value, FrameRate::MILLISECONDS)
    }

    fn track_with_clip(start_frames: i64, duration_frames: i64) -> Track {
        let mut track = Track::new_video("V1", 0);
        let rate = FrameRate::FPS_30;
        let mut clip = Clip::new(
            "c",
            "src",
            TimeRange::at_rate(0, duration_frames, rate),
            TimeRange::at_rate(start_frames, duration_frames, rate),
        );
        clip.markers.push(Marker::new("beat", RationalTime::with_rate(15, rate)));
        track.append_clip(clip);
        track
    }

    #[test]
    fn test_collect_points() {
        let track = track_with_clip(300, 60);
        let points = SnappingEngine::collect_snap_points([&track], Some(ms(0)), &[]);
        let kinds: Vec<_> = points.iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            [SnapKind::Playhead, SnapKind::ClipStart, SnapKind::ClipEnd, SnapKind::Marker]
        );
        // Marker at 15 frames into a clip starting at 10s.
        assert_eq!(points[3].time.seconds(), Rational64::new(21, 2));

        let excluded = SnappingEngine::collect_snap_points(
            [&track],
            Some(ms(-1)),
            &[track.clips[0].id.clone()],
        );
        assert!(excluded.is_empty());
    }

    #[test]
    fn test_snaps_to_boundary_within_threshold() {
        let track = track_with_clip(0, 300); // ends at 10s
        let points = SnappingEngine::collect_snap_points([&track], None, &[]);
        let engine = SnappingEngine::default();

        let trim = engine.snap_clip_trim(ms(10_030), &points);
        assert_eq!(trim.time.seconds(), Rational64::from_integer(10));
        assert_eq!(trim.guide.unwrap().source.kind, SnapKind::ClipEnd);

        let far = engine.snap_clip_trim(ms(10_060), &points);
        assert_eq!(far.time, ms(10_060));
        assert!(far.guide.is_none());
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let points = vec![SnapPoint {
            time: ms(1_000),
            kind: SnapKind::Playhead,
            clip_id: None,
            track_id: None,
        }];
        let result = find_snap_point(ms(1_050), &points, ms(50));
        assert!(result.snapped());
        assert_eq!(result.offset, Rational64::new(1, 20));
    }

    #[test]
    fn test_move_prefers_smaller_offset() {
        let points = vec![
            SnapPoint {
                time: ms(1_000),
                kind: SnapKind::ClipEnd,
                clip_id: None,
                track_id: None,
            },
            SnapPoint {
                time: ms(3_000),
                kind: SnapKind::ClipStart,
                clip_id: None,
                track_id: None,
            },
        ];
        let engine = SnappingEngine::default();

        // Start is 40ms off, end only 10ms: the end edge wins.
        let snap = engine.snap_clip_move(ms(1_040), ms(3_010), &points);
        assert_eq!(snap.start_time, ms(1_030));
        assert_eq!(snap.guides.len(), 1);
        assert_eq!(snap.guides[0].time, ms(3_000));

        // Equal offsets: the start edge wins.
        let snap = engine.snap_clip_move(ms(1_020), ms(3_020), &points);
        assert_eq!(snap.start_time, ms(1_000));
        assert_eq!(snap.guides[0].source.kind, SnapKind::ClipEnd);
    }

    #[test]
    fn test_move_keeps_dragged_clip_rate() {
        let frames = |n| RationalTime::with_rate(n, FrameRate::FPS_30);
        let points = vec![
            SnapPoint {
                time: ms(2_000),
                kind: SnapKind::Playhead,
                clip_id: None,
                track_id: None,
            },
            SnapPoint {
                time: ms(9_000),
                kind: SnapKind::Marker,
                clip_id: None,
                track_id: None,
            },
        ];
        let engine = SnappingEngine::default();

        let by_start = engine.snap_clip_move(frames(61), frames(121), &points);
        assert_eq!(by_start.start_time, frames(60));
        assert_eq!(by_start.guides[0].source.kind, SnapKind::Playhead);

        let by_end = engine.snap_clip_move(frames(149), frames(269), &points);
        assert_eq!(by_end.start_time, frames(150));
        assert_eq!(by_end.guides[0].source.kind, SnapKind::Marker);
    }

    #[test]
    fn test_disabled_engine_never_snaps() {
        let track = track_with_clip(0, 30);
        let points = SnappingEngine::collect_snap_points([&track], None, &[]);
        let engine = SnappingEngine::new(SnapConfig {
            enabled: false,
            ..Default::default()
        });
        let snap = engine.snap_clip_move(ms(5), ms(990), &points);
        assert_eq!(snap.start_time, ms(5));
        assert!(snap.guides.is_empty());
    }

    #[test]
    fn test_timeline_markers_are_points() {
        let mut timeline = Timeline::new("T", FrameRate::FPS_24);
        timeline.markers.push(Marker::new("chapter", RationalTime::with_rate(48, FrameRate::FPS_24)));
        let points = SnappingEngine::timeline_snap_points(&timeline, None, &[]);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].kind, SnapKind::Marker);
    }
}
