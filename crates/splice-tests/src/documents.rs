//! Whole-document workflows: edit in a session, persist, reload, convert.

use splice_core::{FrameRate, RationalTime, TimeRange};
use splice_interchange::{export, import, InterchangeFormat};
use splice_timeline::{
    validate_timeline_schema, Clip, Edit, EditSession, MediaSource, SchemaFile, SessionConfig,
    SourceType, TimelineSchema, Track, TransitionType,
};

fn frames(n: i64) -> RationalTime {
    RationalTime::with_rate(n, FrameRate::FPS_25)
}

fn open_session() -> (EditSession, String, String) {
    let mut schema = TimelineSchema::empty("Documentary", FrameRate::FPS_25);
    let source = MediaSource::new("interview.mov", "/media/interview.mov", SourceType::File, None);
    let source_id = source.id.clone();
    schema.add_source(source);
    let track = Track::new_video("V1", 0);
    let track_id = track.id.clone();
    schema.timeline.add_track(track);
    (EditSession::new(schema, SessionConfig::default()), track_id, source_id)
}

#[test]
fn edit_save_reload_export() {
    let (mut session, track_id, source_id) = open_session();
    let range = TimeRange::at_rate(0, 250, FrameRate::FPS_25);
    let created = session
        .apply(
            &Edit::AddClip {
                track_id: track_id.clone(),
                clip: Clip::new("interview", source_id, range, range),
            },
            Some("Add interview"),
        )
        .unwrap();
    let clip_id = created[0].clone();

    let halves = session
        .apply(
            &Edit::SplitClip {
                track_id: track_id.clone(),
                clip_id: clip_id.clone(),
                at: frames(100),
            },
            None,
        )
        .unwrap();
    session
        .apply(
            &Edit::AddTransition {
                track_id,
                from_clip_id: halves[0].clone(),
                to_clip_id: halves[1].clone(),
                transition_type: TransitionType::CrossDissolve,
                duration: frames(10),
            },
            None,
        )
        .unwrap();
    assert_eq!(session.timeline().transitions.len(), 1);

    let path = std::env::temp_dir().join(format!("splice-doc-{}.json", std::process::id()));
    SchemaFile::new(session.schema().clone()).save_to_file(&path).unwrap();
    let loaded = SchemaFile::load_from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert!(loaded.dropped.is_empty());
    assert_eq!(&loaded.schema, session.schema());

    let edl = export(&loaded.schema, InterchangeFormat::Edl).unwrap();
    assert_eq!(edl.matches("* FROM CLIP NAME: interview").count(), 2);

    let xml = export(&loaded.schema, InterchangeFormat::Fcpxml).unwrap();
    assert_eq!(xml.matches("<asset-clip ").count(), 2);

    let otio = export(&loaded.schema, InterchangeFormat::Otio).unwrap();
    let reimported = import(&otio, InterchangeFormat::Otio).unwrap();
    assert_eq!(reimported.timeline.clips().count(), 2);
    assert!(validate_timeline_schema(&serde_json::to_value(&reimported).unwrap()).is_ok());
}

#[test]
fn undo_whole_session_back_to_open() {
    let (mut session, track_id, source_id) = open_session();
    let opened = session.timeline().clone();
    for i in 0..5 {
        let range = TimeRange::at_rate(i * 50, 50, FrameRate::FPS_25);
        session
            .apply(
                &Edit::InsertClip {
                    track_id: track_id.clone(),
                    clip: Clip::new(format!("c{i}"), source_id.clone(), range, range),
                },
                None,
            )
            .unwrap();
    }
    let timeline = session.timeline().clone();
    session.selection_mut().select_all_clips(&timeline);
    session.delete_selected().unwrap();
    assert_eq!(session.timeline().clips().count(), 0);

    while session.undo() {}
    assert_eq!(session.timeline(), &opened);
    assert!(session.selection().selected_clip_ids().is_empty());

    while session.redo() {}
    assert_eq!(session.timeline().clips().count(), 0);
}

#[test]
fn malformed_clips_are_reported_not_fatal() {
    let (session, track_id, source_id) = open_session();
    let mut schema = session.schema().clone();
    let range = TimeRange::at_rate(0, 25, FrameRate::FPS_25);
    schema
        .timeline
        .track_mut(&track_id)
        .unwrap()
        .append_clip(Clip::new("keep", source_id, range, range));

    let mut value = serde_json::to_value(&schema).unwrap();
    let clips = value["timeline"]["tracks"][0]["clips"].as_array_mut().unwrap();
    clips.push(serde_json::json!({ "id": "broken", "name": "no ranges" }));

    let file = SchemaFile::from_json(&serde_json::to_vec(&value).unwrap()).unwrap();
    assert_eq!(file.schema.timeline.clips().count(), 1);
    assert_eq!(file.dropped.len(), 1);
    assert_eq!(file.dropped[0].path, "$.timeline.tracks[0].clips[1].sourceId");
}
