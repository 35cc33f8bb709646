//! An editing session over one document.
//!
//! `EditSession` owns the current `TimelineSchema` together with the
//! history, selection, clipboard and snapping state a host needs. Every
//! successful change goes through `commit`, which records a history
//! snapshot and notifies the host.

use serde::{Deserialize, Serialize};
use splice_core::RationalTime;
use std::collections::HashSet;
use tracing::{debug, info};

use crate::clipboard::{ClipboardManager, PasteOutcome};
use crate::edit::{apply, Edit};
use crate::error::{EditError, EditResult};
use crate::history::{HistoryConfig, TimelineHistory};
use crate::selection::SelectionManager;
use crate::snapping::{MoveSnap, SnapConfig, SnappingEngine, TrimSnap};
use crate::source::MediaSource;
use crate::timeline::{Timeline, TimelineSchema};

/// Session settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub snapping: SnapConfig,
}

type UpdateCallback = Box<dyn FnMut(&TimelineSchema) + Send>;

/// Document plus editing state.
pub struct EditSession {
    schema: TimelineSchema,
    history: TimelineHistory,
    selection: SelectionManager,
    clipboard: ClipboardManager,
    snapping: SnappingEngine,
    playhead: RationalTime,
    on_update: Option<UpdateCallback>,
}

impl EditSession {
    /// Open a session. The loaded timeline becomes the history baseline.
    pub fn new(schema: TimelineSchema, config: SessionConfig) -> Self {
        let mut history = TimelineHistory::new(&config.history);
        history.push_state(&schema.timeline, "Open timeline");
        let playhead = RationalTime::zero(schema.timeline.frame_rate());
        info!(
            timeline = %schema.timeline.id,
            tracks = schema.timeline.tracks.len(),
            "opened edit session"
        );
        Self {
            schema,
            history,
            selection: SelectionManager::new(),
            clipboard: ClipboardManager::new(),
            snapping: SnappingEngine::new(config.snapping),
            playhead,
            on_update: None,
        }
    }

    /// Call `callback` with the document after every change.
    pub fn with_update_callback(
        mut self,
        callback: impl FnMut(&TimelineSchema) + Send + 'static,
    ) -> Self {
        self.on_update = Some(Box::new(callback));
        self
    }

    pub fn schema(&self) -> &TimelineSchema {
        &self.schema
    }

    pub fn timeline(&self) -> &Timeline {
        &self.schema.timeline
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionManager {
        &mut self.selection
    }

    pub fn clipboard(&self) -> &ClipboardManager {
        &self.clipboard
    }

    pub fn history(&self) -> &TimelineHistory {
        &self.history
    }

    pub fn snapping(&self) -> &SnappingEngine {
        &self.snapping
    }

    pub fn playhead(&self) -> RationalTime {
        self.playhead
    }

    pub fn set_playhead(&mut self, time: RationalTime) {
        self.playhead = time;
    }

    // ── Editing ─────────────────────────────────────────────────

    /// Apply an edit and record it in history under `description`, or the
    /// edit's own label when `None`.
    ///
    /// Returns the IDs of clips the edit created. Clips inserted or added
    /// must reference a source in the document.
    pub fn apply(&mut self, edit: &Edit, description: Option<&str>) -> EditResult<Vec<String>> {
        self.check_sources(edit)?;
        let before: HashSet<String> = self.schema.timeline.all_clip_ids().into_iter().collect();
        let timeline = apply(&self.schema.timeline, edit)?;
        let created = timeline
            .all_clip_ids()
            .into_iter()
            .filter(|id| !before.contains(id))
            .collect();
        let description = description.map_or_else(|| edit.description(), str::to_owned);
        self.commit(timeline, description);
        Ok(created)
    }

    fn check_sources(&self, edit: &Edit) -> EditResult<()> {
        match edit {
            Edit::InsertClip { clip, .. } | Edit::AddClip { clip, .. } => {
                if self.schema.find_source(&clip.source_id).is_none() {
                    return Err(EditError::SourceNotFound(clip.source_id.clone()));
                }
                Ok(())
            }
            Edit::Batch(edits) => edits.iter().try_for_each(|e| self.check_sources(e)),
            _ => Ok(()),
        }
    }

    /// Revert the last change. Returns false if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        if !self.history.can_undo() {
            return false;
        }
        self.schema.timeline = self.history.undo(&self.schema.timeline);
        debug!("undo");
        self.after_change();
        true
    }

    /// Re-apply the last undone change. Returns false if there was nothing
    /// to redo.
    pub fn redo(&mut self) -> bool {
        if !self.history.can_redo() {
            return false;
        }
        self.schema.timeline = self.history.redo(&self.schema.timeline);
        debug!("redo");
        self.after_change();
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Replace the timeline wholesale, as one undoable step.
    pub fn set_timeline(&mut self, timeline: Timeline, description: impl Into<String>) {
        self.commit(timeline, description);
    }

    /// Register a media source. Sources are not part of undo history.
    pub fn add_source(&mut self, source: MediaSource) {
        self.schema.add_source(source);
        self.notify();
    }

    // ── Selection-driven actions ────────────────────────────────

    /// Copy the selected clips at the playhead. Returns how many were copied.
    pub fn copy_selected(&mut self) -> usize {
        let ids = self.selection.selected_clip_ids().to_vec();
        self.clipboard.copy(&self.schema.timeline, &ids, self.playhead)
    }

    /// Copy the selected clips, then remove them.
    pub fn cut_selected(&mut self) -> EditResult<usize> {
        let ids = self.selection.selected_clip_ids().to_vec();
        if ids.is_empty() {
            return Ok(0);
        }
        let timeline = self.clipboard.cut(&self.schema.timeline, &ids, self.playhead)?;
        let count = self
            .clipboard
            .contents()
            .map_or(0, |data| data.entries.len());
        self.commit(timeline, format!("Cut {count} clip(s)"));
        Ok(count)
    }

    /// Paste at the playhead and select the pasted clips.
    pub fn paste(&mut self) -> EditResult<PasteOutcome> {
        let outcome = self.clipboard.paste(&self.schema.timeline, self.playhead);
        if outcome.placed.is_empty() {
            return Ok(outcome);
        }
        let timeline = outcome.apply_to(&self.schema.timeline)?;
        self.commit(timeline, format!("Paste {} clip(s)", outcome.placed.len()));
        self.selection.select_clips(&outcome.placed_ids(), true);
        Ok(outcome)
    }

    /// Duplicate the selected clips and select the copies.
    pub fn duplicate_selected(&mut self) -> EditResult<Vec<String>> {
        let clip_ids = self.selection.selected_clip_ids().to_vec();
        if clip_ids.is_empty() {
            return Ok(Vec::new());
        }
        let created = self.apply(&Edit::DuplicateClips { clip_ids }, None)?;
        self.selection.select_clips(&created, true);
        Ok(created)
    }

    /// Delete the selected clips. Returns how many were selected.
    pub fn delete_selected(&mut self) -> EditResult<usize> {
        let clip_ids = self.selection.selected_clip_ids().to_vec();
        if clip_ids.is_empty() {
            return Ok(0);
        }
        let count = clip_ids.len();
        self.apply(&Edit::RemoveClips { clip_ids }, None)?;
        Ok(count)
    }

    // ── Snapping ────────────────────────────────────────────────

    /// Snap a clip being dragged to `proposed_start`.
    ///
    /// The clip's own edges are not snap targets.
    pub fn snap_move(&self, clip_id: &str, proposed_start: RationalTime) -> Option<MoveSnap> {
        let (_, clip) = self.schema.timeline.find_clip(clip_id)?;
        let end = proposed_start + clip.duration();
        let points = SnappingEngine::timeline_snap_points(
            &self.schema.timeline,
            Some(self.playhead),
            &[clip_id.to_string()],
        );
        Some(self.snapping.snap_clip_move(proposed_start, end, &points))
    }

    /// Snap an edge of `clip_id` being trimmed to `proposed`.
    pub fn snap_trim(&self, clip_id: &str, proposed: RationalTime) -> TrimSnap {
        let points = SnappingEngine::timeline_snap_points(
            &self.schema.timeline,
            Some(self.playhead),
            &[clip_id.to_string()],
        );
        self.snapping.snap_clip_trim(proposed, &points)
    }

    // ── Internals ───────────────────────────────────────────────

    fn commit(&mut self, timeline: Timeline, description: impl Into<String>) {
        let description = description.into();
        self.schema.timeline = timeline;
        self.history.push_state(&self.schema.timeline, description.as_str());
        info!(action = %description, "timeline edited");
        self.after_change();
    }

    fn after_change(&mut self) {
        self.selection.prune(&self.schema.timeline);
        self.notify();
    }

    fn notify(&mut self) {
        if let Some(callback) = self.on_update.as_mut() {
            callback(&self.schema);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::Clip;
    use crate::source::SourceType;
    use crate::track::Track;
    use splice_core::{FrameRate, TimeRange};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn frames(n: i64) -> RationalTime {
        RationalTime::with_rate(n, FrameRate::FPS_30)
    }

    fn session() -> (EditSession, String, String) {
        let mut schema = TimelineSchema::empty("Edit", FrameRate::FPS_30);
        let source = MediaSource::new("a.mov", "/media/a.mov", SourceType::File, None);
        let source_id = source.id.clone();
        schema.add_source(source);

        let mut track = Track::new_video("V1", 0);
        track.append_clip(Clip::new(
            "a",
            source_id.clone(),
            TimeRange::at_rate(0, 150, FrameRate::FPS_30),
            TimeRange::at_rate(0, 150, FrameRate::FPS_30),
        ));
        let track_id = track.id.clone();
        let clip_id = track.clips[0].id.clone();
        schema.timeline.add_track(track);
        (EditSession::new(schema, SessionConfig::default()), track_id, clip_id)
    }

    #[test]
    fn test_apply_records_history_and_reports_new_clips() {
        let (mut session, track_id, clip_id) = session();
        assert!(!session.can_undo());

        let created = session
            .apply(&Edit::SplitClip {
                track_id,
                clip_id: clip_id.clone(),
                at: frames(75),
            }, None)
            .unwrap();
        // Both halves are new clips.
        assert_eq!(created.len(), 2);
        assert!(!created.contains(&clip_id));
        assert_eq!(session.timeline().tracks[0].clip_count(), 2);
        assert_eq!(session.history().undo_description(), Some("Split clip"));

        assert!(session.undo());
        assert_eq!(session.timeline().tracks[0].clip_count(), 1);
        assert!(!session.undo());
        assert!(session.redo());
        assert_eq!(session.timeline().tracks[0].clip_count(), 2);
        assert!(!session.redo());
    }

    #[test]
    fn test_failed_edit_changes_nothing() {
        let (mut session, track_id, clip_id) = session();
        let before = session.timeline().clone();
        let err = session
            .apply(&Edit::SplitClip {
                track_id,
                clip_id,
                at: frames(150),
            }, None)
            .unwrap_err();
        assert!(matches!(err, EditError::SplitOutOfRange { .. }));
        assert_eq!(session.timeline(), &before);
        assert!(!session.can_undo());
    }

    #[test]
    fn test_insert_requires_known_source() {
        let (mut session, track_id, _) = session();
        let range = TimeRange::at_rate(200, 30, FrameRate::FPS_30);
        let orphan = Clip::new("orphan", "missing", range, range);
        let err = session
            .apply(&Edit::Batch(vec![Edit::InsertClip {
                track_id,
                clip: orphan,
            }]), None)
            .unwrap_err();
        assert_eq!(err, EditError::SourceNotFound("missing".into()));
    }

    #[test]
    fn test_copy_paste_selects_pasted() {
        let (mut session, _, clip_id) = session();
        session.selection_mut().select_clip(&clip_id, false);
        assert_eq!(session.copy_selected(), 1);

        session.set_playhead(frames(150));
        let outcome = session.paste().unwrap();
        assert_eq!(outcome.placed.len(), 1);
        let pasted_id = &outcome.placed[0].clip.id;
        assert_eq!(session.selection().selected_clip_ids(), [pasted_id.clone()]);
        let (_, pasted) = session.timeline().find_clip(pasted_id).unwrap();
        assert_eq!(pasted.start(), frames(150));
        assert_eq!(session.history().undo_description(), Some("Paste 1 clip(s)"));
    }

    #[test]
    fn test_cut_duplicate_delete() {
        let (mut session, _, clip_id) = session();
        assert_eq!(session.cut_selected().unwrap(), 0);

        session.selection_mut().select_clip(&clip_id, false);
        let copies = session.duplicate_selected().unwrap();
        assert_eq!(copies.len(), 1);
        assert_eq!(session.selection().selected_clip_ids(), copies.as_slice());

        assert_eq!(session.delete_selected().unwrap(), 1);
        assert!(session.selection().selected_clip_ids().is_empty());
        assert_eq!(session.timeline().all_clip_ids(), [clip_id.clone()]);

        session.selection_mut().select_clip(&clip_id, false);
        assert_eq!(session.cut_selected().unwrap(), 1);
        assert!(session.timeline().all_clip_ids().is_empty());
        assert!(session.clipboard().has_contents());
    }

    #[test]
    fn test_update_callback_fires_per_change() {
        let (session, track_id, clip_id) = session();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut session = session.with_update_callback(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        session
            .apply(&Edit::SplitClip {
                track_id,
                clip_id,
                at: frames(30),
            }, Some("Razor"))
            .unwrap();
        assert_eq!(session.history().undo_description(), Some("Razor"));
        session.undo();
        session.add_source(MediaSource::new("b.wav", "/media/b.wav", SourceType::File, None));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(session.schema().sources.len(), 2);
    }

    #[test]
    fn test_snap_move_ignores_own_edges() {
        let (mut session, track_id, _) = session();
        let range = TimeRange::at_rate(300, 30, FrameRate::FPS_30);
        let source_id = session.schema().sources[0].id.clone();
        let created = session
            .apply(&Edit::InsertClip {
                track_id,
                clip: Clip::new("b", source_id, range, range),
            }, None)
            .unwrap();
        session.set_playhead(frames(1000));

        // One frame past the end of the first clip snaps back onto it.
        let snap = session.snap_move(&created[0], frames(151)).unwrap();
        assert_eq!(snap.start_time, frames(150));
        assert_eq!(snap.guides.len(), 1);

        // Its own current position is not a target.
        let snap = session.snap_move(&created[0], frames(301)).unwrap();
        assert_eq!(snap.start_time, frames(301));
        assert!(session.snap_move("missing", frames(0)).is_none());

        let trim = session.snap_trim(&created[0], frames(149));
        assert_eq!(trim.time, frames(150));
    }
}
