//! Property tests for resampling, snapping and undo history.

use proptest::prelude::*;
use splice_core::{FrameRate, RationalTime, TimeRange};
use splice_timeline::{Clip, HistoryConfig, SnappingEngine, Timeline, TimelineHistory, Track};

const RATES: [FrameRate; 6] = [
    FrameRate::FPS_23_976,
    FrameRate::FPS_24,
    FrameRate::FPS_25,
    FrameRate::FPS_29_97,
    FrameRate::FPS_60,
    FrameRate::MILLISECONDS,
];

fn rate() -> impl Strategy<Value = FrameRate> {
    prop::sample::select(RATES.to_vec())
}

proptest! {
    #[test]
    fn resampling_preserves_seconds(value in -1_000_000i64..1_000_000, from in rate(), to in rate()) {
        let time = RationalTime::with_rate(value, from);
        let resampled = time.rescaled_to(to);
        let frame = 1.0 / to.to_fps_f64();
        prop_assert!((resampled.seconds_f64() - time.seconds_f64()).abs() <= frame / 2.0 + 1e-9);
    }

    #[test]
    fn snapping_is_exact_within_threshold(boundary in 0i64..10_000, delta_ms in -200i64..200) {
        let mut timeline = Timeline::new("S", FrameRate::FPS_24);
        let mut track = Track::new_video("V1", 0);
        let range = TimeRange::at_rate(boundary, 48, FrameRate::FPS_24);
        track.append_clip(Clip::new("c", "s", range, range));
        timeline.add_track(track);

        let engine = SnappingEngine::default();
        let points = SnappingEngine::timeline_snap_points(&timeline, None, &[]);
        let start = RationalTime::with_rate(boundary, FrameRate::FPS_24);
        let proposed = start.rescaled_to(FrameRate::MILLISECONDS)
            + RationalTime::with_rate(delta_ms, FrameRate::MILLISECONDS);
        let snap = engine.snap_clip_trim(proposed, &points);

        // Clip edges are two seconds apart, so at most one is in reach.
        let threshold = engine.config.threshold.seconds();
        let diff = proposed.seconds() - start.seconds();
        if diff <= threshold && diff >= -threshold {
            prop_assert_eq!(snap.time, start);
            prop_assert!(snap.guide.is_some());
        } else {
            prop_assert_eq!(snap.time, proposed);
            prop_assert!(snap.guide.is_none());
        }
    }

    #[test]
    fn undo_stops_at_baseline_and_redo_restores(count in 1usize..20) {
        let mut history = TimelineHistory::new(&HistoryConfig::default());
        let states: Vec<Timeline> = (0..count)
            .map(|i| Timeline::new(format!("state {i}"), FrameRate::FPS_25))
            .collect();
        for state in &states {
            history.push_state(state, "edit");
        }
        prop_assert_eq!(history.can_undo(), count > 1);

        let mut current = states[count - 1].clone();
        let mut undone = 0;
        while history.can_undo() {
            let before = current.clone();
            current = history.undo(&current);
            undone += 1;
            let redone = history.redo(&current);
            prop_assert_eq!(&redone, &before);
            current = history.undo(&redone);
        }
        prop_assert_eq!(undone, count - 1);
        prop_assert_eq!(&current, &states[0]);
    }
}
