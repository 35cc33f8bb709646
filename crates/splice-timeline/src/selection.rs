//! Clip and track selection state.

use serde::{Deserialize, Serialize};

use crate::timeline::Timeline;

/// Selected clip and track IDs, in selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionManager {
    clip_ids: Vec<String>,
    track_ids: Vec<String>,
    last_selected_clip_id: Option<String>,
    last_selected_track_id: Option<String>,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a clip.
    ///
    /// Without `add_to_selection` the clip becomes the only selected clip;
    /// with it the clip's membership is toggled.
    pub fn select_clip(&mut self, clip_id: &str, add_to_selection: bool) {
        if add_to_selection {
            if let Some(pos) = self.clip_ids.iter().position(|id| id == clip_id) {
                self.clip_ids.remove(pos);
            } else {
                self.clip_ids.push(clip_id.to_string());
            }
        } else {
            self.clip_ids = vec![clip_id.to_string()];
        }
        self.last_selected_clip_id = Some(clip_id.to_string());
    }

    /// Set the clip selection (`replace`) or add to it.
    pub fn select_clips(&mut self, clip_ids: &[String], replace: bool) {
        if replace {
            self.clip_ids.clear();
        }
        for id in clip_ids {
            if !self.clip_ids.contains(id) {
                self.clip_ids.push(id.clone());
            }
        }
        if let Some(last) = clip_ids.last() {
            self.last_selected_clip_id = Some(last.clone());
        }
    }

    /// Select every clip on every track.
    pub fn select_all_clips(&mut self, timeline: &Timeline) {
        self.clip_ids = timeline.all_clip_ids();
        self.last_selected_clip_id = self.clip_ids.last().cloned();
    }

    /// Extend the selection from the last selected clip to `clip_id`.
    ///
    /// Only works within one track; otherwise behaves like a plain
    /// additive select.
    pub fn select_clip_range(&mut self, timeline: &Timeline, clip_id: &str) {
        let anchor = self.last_selected_clip_id.clone();
        let range = anchor.as_deref().and_then(|anchor| {
            timeline.tracks.iter().find_map(|track| {
                let a = track.clip_position(anchor)?;
                let b = track.clip_position(clip_id)?;
                let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
                Some(
                    track.clips[lo..=hi]
                        .iter()
                        .map(|c| c.id.clone())
                        .collect::<Vec<_>>(),
                )
            })
        });

        match range {
            Some(ids) => {
                self.select_clips(&ids, false);
                self.last_selected_clip_id = Some(clip_id.to_string());
            }
            None if !self.is_clip_selected(clip_id) => self.select_clip(clip_id, true),
            None => self.last_selected_clip_id = Some(clip_id.to_string()),
        }
    }

    /// Select a track, replacing or toggling like `select_clip`.
    pub fn select_track(&mut self, track_id: &str, add_to_selection: bool) {
        if add_to_selection {
            if let Some(pos) = self.track_ids.iter().position(|id| id == track_id) {
                self.track_ids.remove(pos);
            } else {
                self.track_ids.push(track_id.to_string());
            }
        } else {
            self.track_ids = vec![track_id.to_string()];
        }
        self.last_selected_track_id = Some(track_id.to_string());
    }

    pub fn clear_clip_selection(&mut self) {
        self.clip_ids.clear();
        self.last_selected_clip_id = None;
    }

    pub fn clear_track_selection(&mut self) {
        self.track_ids.clear();
        self.last_selected_track_id = None;
    }

    pub fn clear_all(&mut self) {
        self.clear_clip_selection();
        self.clear_track_selection();
    }

    pub fn is_clip_selected(&self, clip_id: &str) -> bool {
        self.clip_ids.iter().any(|id| id == clip_id)
    }

    pub fn is_track_selected(&self, track_id: &str) -> bool {
        self.track_ids.iter().any(|id| id == track_id)
    }

    pub fn selected_clip_ids(&self) -> &[String] {
        &self.clip_ids
    }

    pub fn selected_track_ids(&self) -> &[String] {
        &self.track_ids
    }

    pub fn last_selected_clip_id(&self) -> Option<&str> {
        self.last_selected_clip_id.as_deref()
    }

    pub fn last_selected_track_id(&self) -> Option<&str> {
        self.last_selected_track_id.as_deref()
    }

    /// Forget IDs that no longer resolve in `timeline`.
    pub fn prune(&mut self, timeline: &Timeline) {
        self.clip_ids.retain(|id| timeline.find_clip(id).is_some());
        self.track_ids.retain(|id| timeline.find_track(id).is_some());
        if let Some(id) = &self.last_selected_clip_id {
            if timeline.find_clip(id).is_none() {
                self.last_selected_clip_id = None;
            }
        }
        if let Some(id) = &self.last_selected_track_id {
            if timeline.find_track(id).is_none() {
                self.last_selected_track_id = None;
            }
        }
    }
}
