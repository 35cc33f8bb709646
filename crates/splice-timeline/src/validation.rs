//! Structural validation of untrusted TimelineSchema JSON.
//!
//! The document's `version`, `timeline` and `sources` must be well formed,
//! and so must the timeline's own fields; otherwise the whole document is
//! rejected with the list of problems. Malformed nested elements (tracks,
//! clips, effects, parameters, markers, transitions, sources) are dropped
//! and reported in `Validated::dropped` instead.
//!
//! Optional scalar fields with the wrong type are ignored.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use splice_core::{FrameRate, RationalTime, TimeRange};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::clip::{Clip, ClipProperties};
use crate::effect::{Effect, EffectParameter, ParamKeyframe, ParamValue};
use crate::error::Result;
use crate::marker::Marker;
use crate::source::{MediaMetadata, MediaSource};
use crate::timeline::{Timeline, TimelineMetadata, TimelineSchema};
use crate::track::Track;
use crate::transition::Transition;

/// What is wrong with a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    /// Required field absent or null
    Missing,
    /// Present with the wrong JSON type
    WrongType { expected: &'static str },
    /// Right type, unacceptable value
    InvalidValue(String),
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("missing"),
            Self::WrongType { expected } => write!(f, "expected {expected}"),
            Self::InvalidValue(reason) => f.write_str(reason),
        }
    }
}

/// A problem at a JSON path such as `$.timeline.tracks[0].clips[2].sourceRange`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{path}: {kind}")]
pub struct ValidationIssue {
    pub path: String,
    pub kind: IssueKind,
}

/// Why a document was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid timeline schema: {}", join(.0))]
pub struct ValidationErrors(pub Vec<ValidationIssue>);

fn join(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// An accepted document and the nested elements dropped from it.
#[derive(Debug, Clone)]
pub struct Validated {
    pub schema: TimelineSchema,
    pub dropped: Vec<ValidationIssue>,
}

type Check<T> = std::result::Result<T, ValidationIssue>;

/// Largest accepted tick count or index (2^53). Sums and rate conversions
/// of values in this range stay within `i64`.
const MAX_WHOLE: i64 = 1 << 53;

// ── Entry points ────────────────────────────────────────────────

/// Validate an untrusted document.
pub fn validate_timeline_schema(data: &Value) -> std::result::Result<Validated, ValidationErrors> {
    let root = Fields::of(data, "$").map_err(|issue| ValidationErrors(vec![issue]))?;
    let mut errors = Vec::new();
    let mut dropped = Vec::new();

    let version = root.string("version").map_err(|e| errors.push(e)).ok();
    let timeline = root
        .required("timeline")
        .and_then(|v| timeline(v, root.path_of("timeline"), &mut dropped))
        .map_err(|e| errors.push(e))
        .ok();
    let sources = root.array("sources").map_err(|e| errors.push(e)).ok();

    match (version, timeline, sources) {
        (Some(version), Some(timeline), Some(sources)) => {
            let sources = collect(sources, &root.path_of("sources"), &mut dropped, media_source);
            Ok(Validated {
                schema: TimelineSchema {
                    version,
                    timeline,
                    sources,
                    agent_state: root.get("agentState").filter(|v| v.is_object()).cloned(),
                },
                dropped,
            })
        }
        _ => Err(ValidationErrors(errors)),
    }
}

/// Validate a document, failing on anything `validate_timeline_schema`
/// would reject.
pub fn assert_timeline_schema(data: &Value) -> Result<TimelineSchema> {
    Ok(validate_timeline_schema(data)?.schema)
}

/// Check whether a value is an acceptable document.
pub fn is_timeline_schema(data: &Value) -> bool {
    validate_timeline_schema(data).is_ok()
}

/// Validate a single clip object.
pub fn validate_clip(data: &Value) -> Check<Clip> {
    clip(data, "$".to_string(), &mut Vec::new())
}

/// Validate a single track object.
pub fn validate_track(data: &Value) -> Check<Track> {
    track(data, "$".to_string(), &mut Vec::new())
}

// ── Element validators ──────────────────────────────────────────

fn timeline(value: &Value, path: String, dropped: &mut Vec<ValidationIssue>) -> Check<Timeline> {
    let f = Fields::of(value, path)?;
    let id = f.string("id")?;
    let name = f.string("name")?;
    let tracks = f.array("tracks")?;
    let transitions = f.array("transitions")?;
    let markers = f.array("markers")?;
    let metadata = timeline_metadata(f.required("metadata")?, f.path_of("metadata"))?;
    let created_at = f.string("createdAt")?;
    let updated_at = f.string("updatedAt")?;

    Ok(Timeline {
        id,
        name,
        tracks: collect(tracks, &f.path_of("tracks"), dropped, track)
            .into_iter()
            .map(Arc::new)
            .collect(),
        transitions: collect(transitions, &f.path_of("transitions"), dropped, transition),
        markers: collect(markers, &f.path_of("markers"), dropped, marker),
        metadata,
        created_at,
        updated_at,
    })
}

const TIMELINE_METADATA_KEYS: &[&str] = &[
    "frameRate",
    "sampleRate",
    "width",
    "height",
    "pixelAspectRatio",
    "fieldOrder",
    "colorSpace",
    "startTime",
];

fn timeline_metadata(value: &Value, path: String) -> Check<TimelineMetadata> {
    let f = Fields::of(value, path)?;
    let frame_rate = frame_rate(f.required("frameRate")?, f.path_of("frameRate"))?;
    let extra = f
        .map
        .iter()
        .filter(|(k, _)| !TIMELINE_METADATA_KEYS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    Ok(TimelineMetadata {
        frame_rate,
        sample_rate: f.opt_u32("sampleRate"),
        width: f.opt_u32("width"),
        height: f.opt_u32("height"),
        pixel_aspect_ratio: f.opt_f64("pixelAspectRatio"),
        field_order: f.opt_keyword("fieldOrder"),
        color_space: f.opt_string("colorSpace"),
        start_time: f.opt_time("startTime"),
        extra,
    })
}

fn track(value: &Value, path: String, dropped: &mut Vec<ValidationIssue>) -> Check<Track> {
    let f = Fields::of(value, path)?;
    let id = f.string("id")?;
    let name = f.string("name")?;
    let kind = f.keyword("kind", "track kind")?;
    let index = f.integer("index")?;
    let clips = f.array("clips")?;
    let enabled = f.boolean("enabled")?;
    let locked = f.boolean("locked")?;
    let solo = f.boolean("solo")?;
    let muted = f.boolean("muted")?;

    Ok(Track {
        id,
        name,
        kind,
        index,
        clips: collect(clips, &f.path_of("clips"), dropped, clip),
        enabled,
        locked,
        solo,
        muted,
        volume: f.opt_f64("volume"),
        pan: f.opt_f64("pan"),
        color: f.opt_string("color"),
    })
}

fn clip(value: &Value, path: String, dropped: &mut Vec<ValidationIssue>) -> Check<Clip> {
    let f = Fields::of(value, path)?;
    let id = f.string("id")?;
    let name = f.string("name")?;
    let source_id = f.string("sourceId")?;
    let source_range = f.range("sourceRange")?;
    let timeline_range = f.range("timelineRange")?;
    let state = f.keyword("state", "clip state")?;
    let effects = f.array("effects")?;
    let markers = f.array("markers")?;
    let created_at = f.string("createdAt")?;
    let updated_at = f.string("updatedAt")?;

    let properties = match f.get("properties").filter(|v| v.is_object()) {
        Some(raw) => lenient(raw, f.path_of("properties"), dropped, |map| ClipProperties {
            extra: map,
            ..Default::default()
        }),
        None => ClipProperties::default(),
    };

    Ok(Clip {
        id,
        name,
        source_id,
        source_range,
        timeline_range,
        state,
        effects: collect(effects, &f.path_of("effects"), dropped, effect),
        markers: collect(markers, &f.path_of("markers"), dropped, marker),
        properties,
        created_at,
        updated_at,
    })
}

fn effect(value: &Value, path: String, dropped: &mut Vec<ValidationIssue>) -> Check<Effect> {
    let f = Fields::of(value, path)?;
    let id = f.string("id")?;
    let name = f.string("name")?;
    let effect_type = f.keyword("effectType", "effect type")?;
    let enabled = f.boolean("enabled")?;
    let parameters = f.array("parameters")?;

    Ok(Effect {
        id,
        name,
        effect_type,
        enabled,
        parameters: collect(parameters, &f.path_of("parameters"), dropped, parameter),
        time_range: f.get("timeRange").and_then(|v| time_range(v, String::new()).ok()),
    })
}

fn parameter(
    value: &Value,
    path: String,
    dropped: &mut Vec<ValidationIssue>,
) -> Check<EffectParameter> {
    let f = Fields::of(value, path)?;
    let name = f.string("name")?;
    let param_type = f.keyword("type", "parameter type")?;
    let value = param_value(f.required("value")?, f.path_of("value"))?;

    let keyframes = f
        .get("keyframes")
        .and_then(Value::as_array)
        .map(|items| collect(items, &f.path_of("keyframes"), dropped, keyframe));

    Ok(EffectParameter {
        name,
        param_type,
        value,
        min_value: f.opt_f64("minValue"),
        max_value: f.opt_f64("maxValue"),
        enum_values: f
            .get("enumValues")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(|v| v.as_str().map(str::to_owned)).collect()),
        keyframes,
    })
}

fn keyframe(value: &Value, path: String, _: &mut Vec<ValidationIssue>) -> Check<ParamKeyframe> {
    let f = Fields::of(value, path)?;
    Ok(ParamKeyframe {
        time: f.time("time")?,
        value: param_value(f.required("value")?, f.path_of("value"))?,
        interpolation: f.opt_keyword("interpolation").unwrap_or_default(),
    })
}

fn param_value(value: &Value, path: String) -> Check<ParamValue> {
    serde_json::from_value(value.clone()).map_err(|_| ValidationIssue {
        path,
        kind: IssueKind::InvalidValue("unsupported parameter value".into()),
    })
}

fn marker(value: &Value, path: String, _: &mut Vec<ValidationIssue>) -> Check<Marker> {
    let f = Fields::of(value, path)?;
    Ok(Marker {
        id: f.string("id")?,
        name: f.string("name")?,
        time: f.time("time")?,
        duration: f.opt_time("duration"),
        color: f.opt_string("color"),
        comment: f.opt_string("comment"),
        completed: f.opt_bool("completed"),
    })
}

fn transition(
    value: &Value,
    path: String,
    dropped: &mut Vec<ValidationIssue>,
) -> Check<Transition> {
    let f = Fields::of(value, path)?;
    let id = f.string("id")?;
    let name = f.string("name")?;
    let transition_type = f.keyword("transitionType", "transition type")?;
    let duration = f.time("duration")?;
    let from_clip_id = f.string("fromClipId")?;
    let to_clip_id = f.string("toClipId")?;

    Ok(Transition {
        id,
        name,
        transition_type,
        duration,
        from_clip_id,
        to_clip_id,
        parameters: f
            .get("parameters")
            .and_then(Value::as_array)
            .map(|items| collect(items, &f.path_of("parameters"), dropped, parameter)),
    })
}

fn media_source(
    value: &Value,
    path: String,
    dropped: &mut Vec<ValidationIssue>,
) -> Check<MediaSource> {
    let f = Fields::of(value, path)?;
    let id = f.string("id")?;
    let name = f.string("name")?;
    let path = f.string("path")?;
    let source_type = f.keyword("sourceType", "source type")?;
    let created_at = f.string("createdAt")?;
    let updated_at = f.string("updatedAt")?;

    let metadata = f.get("metadata").filter(|v| v.is_object()).map(|raw| {
        lenient(raw, f.path_of("metadata"), dropped, |map| MediaMetadata {
            extra: map,
            ..Default::default()
        })
    });

    Ok(MediaSource {
        id,
        name,
        path,
        source_type,
        metadata,
        created_at,
        updated_at,
    })
}

// ── Primitives ──────────────────────────────────────────────────

fn rational_time(value: &Value, path: String) -> Check<RationalTime> {
    let f = Fields::of(value, path)?;
    let ticks = f.integer("value")?;
    let rate = frame_rate(f.required("rate")?, f.path_of("rate"))?;
    Ok(RationalTime::with_rate(ticks, rate))
}

fn time_range(value: &Value, path: String) -> Check<TimeRange> {
    let f = Fields::of(value, path)?;
    let start = f.time("start")?;
    let duration = f.time("duration")?;
    TimeRange::new(start, duration).map_err(|e| f.invalid(e.to_string()))
}

fn frame_rate(value: &Value, path: String) -> Check<FrameRate> {
    let Some(fps) = value.as_f64() else {
        return Err(ValidationIssue {
            path,
            kind: IssueKind::WrongType { expected: "number" },
        });
    };
    FrameRate::from_f64(fps).map_err(|e| ValidationIssue {
        path,
        kind: IssueKind::InvalidValue(e.to_string()),
    })
}

/// Validate each element of a list, dropping and reporting failures.
fn collect<T>(
    items: &[Value],
    path: &str,
    dropped: &mut Vec<ValidationIssue>,
    parse: fn(&Value, String, &mut Vec<ValidationIssue>) -> Check<T>,
) -> Vec<T> {
    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        match parse(item, format!("{path}[{i}]"), dropped) {
            Ok(value) => out.push(value),
            Err(issue) => dropped.push(issue),
        }
    }
    out
}

/// Deserialize an open property bag, falling back to keeping every key
/// untyped when a well-known key has the wrong type.
fn lenient<T: DeserializeOwned>(
    raw: &Value,
    path: String,
    dropped: &mut Vec<ValidationIssue>,
    fallback: impl FnOnce(Map<String, Value>) -> T,
) -> T {
    match serde_json::from_value(raw.clone()) {
        Ok(value) => value,
        Err(e) => {
            dropped.push(ValidationIssue {
                path,
                kind: IssueKind::InvalidValue(format!("kept untyped: {e}")),
            });
            fallback(raw.as_object().cloned().unwrap_or_default())
        }
    }
}

/// Typed access to one JSON object.
struct Fields<'a> {
    map: &'a Map<String, Value>,
    path: String,
}

impl<'a> Fields<'a> {
    fn of(value: &'a Value, path: impl Into<String>) -> Check<Self> {
        let path = path.into();
        match value.as_object() {
            Some(map) => Ok(Self { map, path }),
            None => Err(ValidationIssue {
                path,
                kind: IssueKind::WrongType { expected: "object" },
            }),
        }
    }

    fn path_of(&self, key: &str) -> String {
        format!("{}.{}", self.path, key)
    }

    fn issue(&self, key: &str, kind: IssueKind) -> ValidationIssue {
        ValidationIssue {
            path: self.path_of(key),
            kind,
        }
    }

    fn invalid(&self, reason: String) -> ValidationIssue {
        ValidationIssue {
            path: self.path.clone(),
            kind: IssueKind::InvalidValue(reason),
        }
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    fn required(&self, key: &str) -> Check<&'a Value> {
        self.get(key).ok_or_else(|| self.issue(key, IssueKind::Missing))
    }

    fn typed<T>(&self, key: &str, expected: &'static str, read: impl Fn(&'a Value) -> Option<T>) -> Check<T> {
        read(self.required(key)?).ok_or_else(|| self.issue(key, IssueKind::WrongType { expected }))
    }

    fn string(&self, key: &str) -> Check<String> {
        self.typed(key, "string", |v| v.as_str().map(str::to_owned))
    }

    fn boolean(&self, key: &str) -> Check<bool> {
        self.typed(key, "boolean", Value::as_bool)
    }

    fn array(&self, key: &str) -> Check<&'a Vec<Value>> {
        self.typed(key, "array", Value::as_array)
    }

    /// A whole number within `±MAX_WHOLE`; `3.0` is accepted, `3.5` is not.
    fn integer(&self, key: &str) -> Check<i64> {
        let value = self.typed(key, "number", Value::as_f64)?;
        if value.fract() != 0.0 {
            return Err(self.issue(key, IssueKind::InvalidValue(format!("{value} is not a whole number"))));
        }
        // Float-to-int casts saturate, so huge values land out of range.
        let whole = self
            .map
            .get(key)
            .and_then(Value::as_i64)
            .unwrap_or(value as i64);
        if (-MAX_WHOLE..=MAX_WHOLE).contains(&whole) {
            Ok(whole)
        } else {
            Err(self.issue(key, IssueKind::InvalidValue(format!("{value} is out of range"))))
        }
    }

    /// A string naming one variant of `T`.
    fn keyword<T: DeserializeOwned>(&self, key: &str, what: &str) -> Check<T> {
        let name = self.string(key)?;
        serde_json::from_value(Value::String(name.clone()))
            .map_err(|_| self.issue(key, IssueKind::InvalidValue(format!("unknown {what} '{name}'"))))
    }

    fn time(&self, key: &str) -> Check<RationalTime> {
        rational_time(self.required(key)?, self.path_of(key))
    }

    fn range(&self, key: &str) -> Check<TimeRange> {
        time_range(self.required(key)?, self.path_of(key))
    }

    fn opt_string(&self, key: &str) -> Option<String> {
        self.get(key).and_then(Value::as_str).map(str::to_owned)
    }

    fn opt_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    fn opt_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    fn opt_u32(&self, key: &str) -> Option<u32> {
        self.get(key)
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
    }

    fn opt_time(&self, key: &str) -> Option<RationalTime> {
        self.get(key).and_then(|v| rational_time(v, String::new()).ok())
    }

    fn opt_keyword<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key)
            .filter(|v| v.is_string())
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}
