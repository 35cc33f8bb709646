//! Snapshot-based undo/redo history.
//!
//! The undo stack holds timeline snapshots whose top is the current value;
//! the bottom entry is the baseline and can never be undone past. Snapshots
//! are cheap because timelines share unchanged tracks.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::ids::now_timestamp;
use crate::timeline::Timeline;

/// History settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryConfig {
    /// Maximum snapshots kept on the undo stack
    pub max_history: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_history: 50 }
    }
}

/// A timeline value with the action that produced it.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub timeline: Timeline,
    pub description: String,
    pub timestamp: String,
}

impl Snapshot {
    fn new(timeline: &Timeline, description: impl Into<String>) -> Self {
        Self {
            timeline: timeline.clone(),
            description: description.into(),
            timestamp: now_timestamp(),
        }
    }
}

/// Linear undo/redo history over timeline snapshots.
#[derive(Debug)]
pub struct TimelineHistory {
    /// Oldest first; the back is the current value.
    undo: VecDeque<Snapshot>,
    /// Most recently undone last.
    redo: Vec<Snapshot>,
    max_history: usize,
}

impl TimelineHistory {
    /// Create an empty history.
    pub fn new(config: &HistoryConfig) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            max_history: config.max_history.max(1),
        }
    }

    /// Record a timeline value. Clears the redo stack.
    ///
    /// When the stack is full the oldest snapshot is evicted and the next
    /// one becomes the baseline.
    pub fn push_state(&mut self, timeline: &Timeline, description: impl Into<String>) {
        self.redo.clear();
        self.undo.push_back(Snapshot::new(timeline, description));
        while self.undo.len() > self.max_history {
            self.undo.pop_front();
        }
    }

    /// True when there is a snapshot below the current one.
    pub fn can_undo(&self) -> bool {
        self.undo.len() > 1
    }

    /// Check if redo is available.
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Step back one snapshot. Returns `current` unchanged if there is
    /// nothing to undo.
    pub fn undo(&mut self, current: &Timeline) -> Timeline {
        if !self.can_undo() {
            return current.clone();
        }
        let description = self
            .undo
            .pop_back()
            .map(|s| s.description)
            .unwrap_or_default();
        self.redo.push(Snapshot::new(current, description));
        self.undo
            .back()
            .map(|s| s.timeline.clone())
            .unwrap_or_else(|| current.clone())
    }

    /// Re-apply the most recently undone snapshot. Returns `current`
    /// unchanged if there is nothing to redo.
    pub fn redo(&mut self, current: &Timeline) -> Timeline {
        match self.redo.pop() {
            Some(snapshot) => {
                let timeline = snapshot.timeline.clone();
                self.undo.push_back(snapshot);
                timeline
            }
            None => current.clone(),
        }
    }

    /// Label of the action `undo` would revert.
    pub fn undo_description(&self) -> Option<&str> {
        if !self.can_undo() {
            return None;
        }
        self.undo.back().map(|s| s.description.as_str())
    }

    /// Label of the action `redo` would re-apply.
    pub fn redo_description(&self) -> Option<&str> {
        self.redo.last().map(|s| s.description.as_str())
    }

    /// Clear all history.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    /// Number of snapshots on the undo stack, baseline included.
    pub fn undo_count(&self) -> usize {
        self.undo.len()
    }

    /// Number of redo steps available.
    pub fn redo_count(&self) -> usize {
        self.redo.len()
    }
}

impl Default for TimelineHistory {
    fn default() -> Self {
        Self::new(&HistoryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use splice_core::FrameRate;

    fn named(name: &str) -> Timeline {
        Timeline::new(name, FrameRate::FPS_24)
    }

    #[test]
    fn test_undo_redo_walk() {
        let (a, b, c) = (named("A"), named("B"), named("C"));
        let mut history = TimelineHistory::default();
        history.push_state(&a, "open");
        history.push_state(&b, "edit 1");
        history.push_state(&c, "edit 2");

        let current = history.undo(&c);
        assert_eq!(current.name, "B");
        let current = history.undo(&current);
        assert_eq!(current.name, "A");
        assert!(!history.can_undo());
        assert_eq!(history.undo(&current).name, "A");

        let current = history.redo(&current);
        assert_eq!(current.name, "B");
        let current = history.redo(&current);
        assert_eq!(current, c);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_new_action_clears_redo() {
        let mut history = TimelineHistory::default();
        history.push_state(&named("A"), "open");
        history.push_state(&named("B"), "edit");
        let current = history.undo(&named("B"));
        assert!(history.can_redo());

        history.push_state(&current, "other edit");
        assert!(!history.can_redo());
        assert_eq!(history.redo(&current), current);
    }

    #[test]
    fn test_max_history_evicts_oldest() {
        let mut history = TimelineHistory::new(&HistoryConfig { max_history: 3 });
        for i in 0..5 {
            history.push_state(&named(&format!("T{i}")), format!("edit {i}"));
        }
        assert_eq!(history.undo_count(), 3);

        let mut current = named("T4");
        while history.can_undo() {
            current = history.undo(&current);
        }
        assert_eq!(current.name, "T2");
    }

    #[test]
    fn test_descriptions() {
        let mut history = TimelineHistory::default();
        history.push_state(&named("A"), "open");
        assert_eq!(history.undo_description(), None);
        history.push_state(&named("B"), "Split clip");
        assert_eq!(history.undo_description(), Some("Split clip"));

        let current = history.undo(&named("B"));
        assert_eq!(history.redo_description(), Some("Split clip"));
        assert_eq!(history.undo_description(), None);
        history.redo(&current);
        assert_eq!(history.undo_description(), Some("Split clip"));
    }

    proptest! {
        #[test]
        fn undo_reaches_baseline_and_redo_restores(n in 1usize..50, back in 0usize..50) {
            let states: Vec<Timeline> = (0..n).map(|i| named(&format!("T{i}"))).collect();
            let mut history = TimelineHistory::default();
            for (i, state) in states.iter().enumerate() {
                history.push_state(state, format!("edit {i}"));
            }
            prop_assert_eq!(history.can_undo(), n > 1);

            let steps = back.min(n - 1);
            let mut current = states[n - 1].clone();
            for _ in 0..steps {
                let before = current.clone();
                current = history.undo(&current);
                let redone = history.redo(&current);
                prop_assert_eq!(&redone, &before);
                current = history.undo(&redone);
            }
            prop_assert_eq!(&current, &states[n - 1 - steps]);
            prop_assert_eq!(history.can_undo(), n - 1 - steps > 0);
        }
    }
}
