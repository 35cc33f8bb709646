//! OpenTimelineIO JSON import and export.
//!
//! Covers the editorial subset: a `Timeline.1` (optionally inside a
//! `SerializableCollection.1`) whose tracks hold `Clip.1` and `Gap.1`
//! items. Other items, such as transitions and nested stacks, are skipped
//! on import.
//!
//! OTIO has no per-timeline rate, so import takes the rate of the first
//! clip's source range and assumes it for the whole timeline.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use splice_core::{FrameRate, RationalTime, TimeRange};
use splice_timeline::{
    Clip, Effect, EffectType, Marker, MediaMetadata, MediaSource, SourceType, Timeline,
    TimelineSchema, Track, TrackKind, CURRENT_SCHEMA_VERSION,
};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::error::{InterchangeError, Result};

/// Rate assumed when a document has no clips to take one from.
const DEFAULT_FPS: f64 = 24.0;

// ── Document model ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OtioTime {
    #[serde(rename = "OTIO_SCHEMA", default)]
    schema: String,
    value: f64,
    rate: f64,
}

impl OtioTime {
    fn from_time(time: RationalTime) -> Self {
        Self {
            schema: "RationalTime.1".into(),
            value: time.value as f64,
            rate: time.rate.to_fps_f64(),
        }
    }

    fn to_time(&self) -> Result<RationalTime> {
        let rate = FrameRate::from_f64(self.rate)?;
        Ok(RationalTime::with_rate(self.value.round() as i64, rate))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OtioRange {
    #[serde(rename = "OTIO_SCHEMA", default)]
    schema: String,
    start_time: OtioTime,
    duration: OtioTime,
}

impl OtioRange {
    fn new(start: RationalTime, duration: RationalTime) -> Self {
        Self {
            schema: "TimeRange.1".into(),
            start_time: OtioTime::from_time(start),
            duration: OtioTime::from_time(duration),
        }
    }

    /// The range at the duration's rate.
    fn to_range(&self) -> Result<TimeRange> {
        let duration = self.duration.to_time()?;
        let start = self.start_time.to_time()?.rescaled_to(duration.rate);
        Ok(TimeRange::new(start, duration)?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "OTIO_SCHEMA")]
enum OtioItem {
    #[serde(rename = "Clip.1", alias = "Clip.2")]
    Clip(OtioClip),
    #[serde(rename = "Gap.1")]
    Gap(OtioGap),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OtioClip {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_range: Option<OtioRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    media_reference: Option<OtioMediaReference>,
    #[serde(default)]
    effects: Vec<OtioEffect>,
    #[serde(default)]
    markers: Vec<OtioMarker>,
    #[serde(default)]
    metadata: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OtioGap {
    #[serde(default)]
    name: Option<String>,
    source_range: OtioRange,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OtioMediaReference {
    #[serde(rename = "OTIO_SCHEMA", default)]
    schema: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    available_range: Option<OtioRange>,
    #[serde(default)]
    metadata: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OtioEffect {
    #[serde(rename = "OTIO_SCHEMA", default)]
    schema: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    effect_name: Option<String>,
    #[serde(default)]
    metadata: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OtioMarker {
    #[serde(rename = "OTIO_SCHEMA", default)]
    schema: String,
    #[serde(default)]
    name: Option<String>,
    marked_range: OtioRange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OtioTrack {
    #[serde(rename = "OTIO_SCHEMA", default)]
    schema: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    kind: String,
    #[serde(default)]
    children: Vec<OtioItem>,
    #[serde(default)]
    metadata: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OtioStack {
    #[serde(rename = "OTIO_SCHEMA", default)]
    schema: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    children: Vec<OtioTrack>,
}

/// Older writers store tracks as a bare list, newer ones as a `Stack.1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum OtioTracks {
    List(Vec<OtioTrack>),
    Stack(OtioStack),
}

impl OtioTracks {
    fn tracks(&self) -> &[OtioTrack] {
        match self {
            Self::List(tracks) => tracks,
            Self::Stack(stack) => &stack.children,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OtioTimeline {
    #[serde(rename = "OTIO_SCHEMA", default)]
    schema: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    global_start_time: Option<OtioTime>,
    tracks: OtioTracks,
    #[serde(default)]
    metadata: Map<String, Value>,
}

// ── Import ──────────────────────────────────────────────────────

/// Parse OTIO JSON text into a document.
pub fn from_otio_str(text: &str) -> Result<TimelineSchema> {
    let value: Value = serde_json::from_str(text)?;
    from_otio(&value)
}

/// Convert an OTIO `Timeline.1` or `SerializableCollection.1` value.
///
/// Each track is walked with a time cursor: a clip is placed at the cursor
/// and advances it by its source duration, a gap only advances it. Clips
/// sharing a `target_url` share one media source; clips without one get a
/// generated source of their own.
pub fn from_otio(value: &Value) -> Result<TimelineSchema> {
    let otio: OtioTimeline = serde_json::from_value(find_timeline(value)?.clone())
        .map_err(|e| InterchangeError::InvalidOtio(e.to_string()))?;
    let tracks = otio.tracks.tracks();
    let rate = detect_frame_rate(tracks, &otio.metadata)?;

    let name = otio.name.clone().unwrap_or_else(|| "Untitled Timeline".into());
    let mut timeline = Timeline::new(name, rate);
    let mut importer = Importer::new(rate);
    for (index, track) in tracks.iter().enumerate() {
        timeline.add_track(importer.track(track, index)?);
    }
    timeline.metadata.start_time = otio
        .global_start_time
        .as_ref()
        .map(OtioTime::to_time)
        .transpose()?;

    debug!(
        tracks = timeline.tracks.len(),
        sources = importer.sources.len(),
        %rate,
        "imported OTIO timeline"
    );
    Ok(TimelineSchema {
        version: CURRENT_SCHEMA_VERSION.to_string(),
        timeline,
        sources: importer.sources,
        agent_state: None,
    })
}

fn find_timeline(value: &Value) -> Result<&Value> {
    let is_a = |v: &Value, prefix: &str| {
        v.get("OTIO_SCHEMA")
            .and_then(Value::as_str)
            .is_some_and(|s| s.starts_with(prefix))
    };
    if is_a(value, "Timeline.") {
        return Ok(value);
    }
    if is_a(value, "SerializableCollection.") {
        return value
            .get("children")
            .and_then(Value::as_array)
            .and_then(|children| children.iter().find(|&c| is_a(c, "Timeline.")))
            .ok_or_else(|| InterchangeError::InvalidOtio("collection holds no timeline".into()));
    }
    Err(InterchangeError::InvalidOtio(
        "expected Timeline or SerializableCollection".into(),
    ))
}

/// Rate of the first clip's source range, else the `frame_rate` metadata
/// this module writes, else 24.
fn detect_frame_rate(tracks: &[OtioTrack], metadata: &Map<String, Value>) -> Result<FrameRate> {
    let from_clip = tracks
        .iter()
        .flat_map(|t| &t.children)
        .find_map(|item| match item {
            OtioItem::Clip(clip) => clip.source_range.as_ref().map(|r| r.duration.rate),
            _ => None,
        });
    let fps = from_clip
        .or_else(|| metadata.get("frame_rate").and_then(Value::as_f64))
        .unwrap_or(DEFAULT_FPS);
    Ok(FrameRate::from_f64(fps)?)
}

fn track_kind(kind: &str) -> TrackKind {
    match kind.to_ascii_lowercase().as_str() {
        "audio" => TrackKind::Audio,
        "subtitle" => TrackKind::Subtitle,
        "data" => TrackKind::Data,
        _ => TrackKind::Video,
    }
}

struct Importer {
    rate: FrameRate,
    sources: Vec<MediaSource>,
    /// `target_url` to index in `sources`
    by_url: HashMap<String, usize>,
}

impl Importer {
    fn new(rate: FrameRate) -> Self {
        Self {
            rate,
            sources: Vec::new(),
            by_url: HashMap::new(),
        }
    }

    fn track(&mut self, otio: &OtioTrack, index: usize) -> Result<Track> {
        let name = otio
            .name
            .clone()
            .unwrap_or_else(|| format!("Track {}", index + 1));
        let mut track = Track::new(name, track_kind(&otio.kind), index as i64);
        let mut cursor = RationalTime::zero(self.rate);

        for item in &otio.children {
            match item {
                OtioItem::Clip(clip) => {
                    let Some(range) = &clip.source_range else {
                        warn!(
                            clip = clip.name.as_deref().unwrap_or_default(),
                            "skipping OTIO clip without a source range"
                        );
                        continue;
                    };
                    let source_range = range.to_range()?;
                    let timeline_range =
                        TimeRange::new(cursor, source_range.duration.rescaled_to(self.rate))?;
                    let clip = self.clip(clip, source_range, timeline_range)?;
                    cursor = clip.end();
                    track.append_clip(clip);
                }
                OtioItem::Gap(gap) => {
                    cursor = cursor + gap.source_range.duration.to_time()?;
                }
                OtioItem::Other => debug!(track = index, "skipping unsupported OTIO item"),
            }
        }
        Ok(track)
    }

    fn clip(
        &mut self,
        otio: &OtioClip,
        source_range: TimeRange,
        timeline_range: TimeRange,
    ) -> Result<Clip> {
        let name = otio.name.clone().unwrap_or_else(|| "Untitled Clip".into());
        let source_id = self.source_for(otio.media_reference.as_ref(), &name)?;
        let mut clip = Clip::new(name, source_id, source_range, timeline_range);

        clip.effects = otio
            .effects
            .iter()
            .map(|e| {
                let name = e
                    .name
                    .clone()
                    .or_else(|| e.effect_name.clone())
                    .unwrap_or_else(|| "Unknown Effect".into());
                Effect::new(name, EffectType::Filter)
            })
            .collect();
        clip.markers = otio.markers.iter().map(marker).collect::<Result<_>>()?;
        Ok(clip)
    }

    fn source_for(
        &mut self,
        reference: Option<&OtioMediaReference>,
        clip_name: &str,
    ) -> Result<String> {
        let url = reference
            .and_then(|r| r.target_url.as_deref())
            .filter(|u| !u.is_empty());
        if let Some(&index) = url.and_then(|u| self.by_url.get(u)) {
            return Ok(self.sources[index].id.clone());
        }

        let metadata = match reference.and_then(|r| r.available_range.as_ref()) {
            Some(range) => Some(MediaMetadata {
                duration: Some(range.duration.to_time()?),
                ..Default::default()
            }),
            None => None,
        };
        let source = match url {
            Some(url) => {
                let name = reference
                    .and_then(|r| r.name.clone())
                    .unwrap_or_else(|| clip_name.to_string());
                self.by_url.insert(url.to_string(), self.sources.len());
                MediaSource::new(name, url, SourceType::File, metadata)
            }
            None => {
                warn!(clip = clip_name, "OTIO clip has no media reference; generating a source");
                MediaSource::new(
                    clip_name,
                    format!("generated://{clip_name}"),
                    SourceType::Generated,
                    metadata,
                )
            }
        };
        let id = source.id.clone();
        self.sources.push(source);
        Ok(id)
    }
}

fn marker(otio: &OtioMarker) -> Result<Marker> {
    let range = &otio.marked_range;
    let name = otio.name.clone().unwrap_or_else(|| "Marker".into());
    let mut marker = Marker::new(name, range.start_time.to_time()?);
    marker.duration = Some(range.duration.to_time()?);
    marker.color = otio.color.clone();
    marker.comment = otio.comment.clone();
    Ok(marker)
}

// ── Export ──────────────────────────────────────────────────────

/// Serialize a document as pretty-printed OTIO JSON.
pub fn to_otio_string(schema: &TimelineSchema) -> Result<String> {
    Ok(serde_json::to_string_pretty(&to_otio(schema)?)?)
}

/// Convert a document to an OTIO `Timeline.1` value.
///
/// Tracks go into a `Stack.1`; holes before a clip become `Gap.1` items.
pub fn to_otio(schema: &TimelineSchema) -> Result<Value> {
    let timeline = &schema.timeline;
    let mut metadata = Map::new();
    metadata.insert("frame_rate".into(), json!(timeline.frame_rate().to_fps_f64()));

    let otio = OtioTimeline {
        schema: "Timeline.1".into(),
        name: Some(timeline.name.clone()),
        global_start_time: timeline.metadata.start_time.map(OtioTime::from_time),
        tracks: OtioTracks::Stack(OtioStack {
            schema: "Stack.1".into(),
            name: Some("tracks".into()),
            children: timeline
                .tracks
                .iter()
                .map(|track| export_track(track, schema))
                .collect(),
        }),
        metadata,
    };
    Ok(serde_json::to_value(otio)?)
}

fn otio_kind(kind: TrackKind) -> &'static str {
    match kind {
        TrackKind::Video => "Video",
        TrackKind::Audio => "Audio",
        TrackKind::Subtitle => "subtitle",
        TrackKind::Data => "data",
    }
}

/// OTIO tracks are strictly sequential, so a clip overlapping its
/// predecessor comes back starting where the predecessor ends.
fn export_track(track: &Track, schema: &TimelineSchema) -> OtioTrack {
    let mut children = Vec::with_capacity(track.clips.len());
    let mut cursor = RationalTime::zero(schema.timeline.frame_rate());

    for clip in &track.clips {
        let start = clip.start();
        if start.compare(cursor).is_lt() {
            warn!(clip = %clip.id, track = %track.id, "overlapping clip cannot keep its position in OTIO");
        } else if start.compare(cursor).is_gt() {
            let hole = start - cursor;
            children.push(OtioItem::Gap(OtioGap {
                name: None,
                source_range: OtioRange::new(RationalTime::zero(hole.rate), hole),
            }));
        }
        children.push(OtioItem::Clip(export_clip(clip, schema)));
        if clip.end().compare(cursor).is_gt() {
            cursor = clip.end();
        }
    }

    OtioTrack {
        schema: "Track.1".into(),
        name: Some(track.name.clone()),
        kind: otio_kind(track.kind).into(),
        children,
        metadata: Map::new(),
    }
}

fn export_clip(clip: &Clip, schema: &TimelineSchema) -> OtioClip {
    let media_reference = match schema.find_source(&clip.source_id) {
        Some(source) => {
            let available_range = source
                .duration()
                .map(|d| OtioRange::new(RationalTime::zero(d.rate), d));
            let (kind, target_url) = match source.source_type {
                SourceType::Generated => ("GeneratorReference.1", None),
                _ => ("ExternalReference.1", Some(source.path.clone())),
            };
            OtioMediaReference {
                schema: kind.into(),
                name: Some(source.name.clone()),
                target_url,
                available_range,
                metadata: Map::new(),
            }
        }
        None => OtioMediaReference {
            schema: "MissingReference.1".into(),
            name: None,
            target_url: None,
            available_range: None,
            metadata: Map::new(),
        },
    };

    OtioClip {
        name: Some(clip.name.clone()),
        // The played length is the clip's length on the track.
        source_range: Some(OtioRange::new(
            clip.source_range.start,
            clip.duration().rescaled_to(clip.source_range.duration.rate),
        )),
        media_reference: Some(media_reference),
        effects: clip
            .effects
            .iter()
            .map(|e| OtioEffect {
                schema: "Effect.1".into(),
                name: Some(e.name.clone()),
                effect_name: Some(e.name.clone()),
                metadata: Map::new(),
            })
            .collect(),
        markers: clip
            .markers
            .iter()
            .map(|m| OtioMarker {
                schema: "Marker.1".into(),
                name: Some(m.name.clone()),
                marked_range: OtioRange::new(
                    m.time,
                    m.duration
                        .map_or(RationalTime::zero(m.time.rate), |d| d.rescaled_to(m.time.rate)),
                ),
                color: m.color.clone(),
                comment: m.comment.clone(),
            })
            .collect(),
        metadata: Map::new(),
    }
}
