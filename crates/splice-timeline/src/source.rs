//! Media sources referenced by clips.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use splice_core::RationalTime;

use crate::ids::{new_id, now_timestamp};

/// Where a source's media comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    File,
    Url,
    Proxy,
    Generated,
}

/// Probed properties of a source. Unknown keys are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<RationalTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_channels: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_sample_rate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_space: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A piece of media that clips play from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaSource {
    pub id: String,
    pub name: String,
    pub path: String,
    pub source_type: SourceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MediaMetadata>,
    pub created_at: String,
    pub updated_at: String,
}

impl MediaSource {
    /// Create a source with a fresh id.
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        source_type: SourceType,
        metadata: Option<MediaMetadata>,
    ) -> Self {
        let now = now_timestamp();
        Self {
            id: new_id(),
            name: name.into(),
            path: path.into(),
            source_type,
            metadata,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Known duration of the media, if probed.
    pub fn duration(&self) -> Option<RationalTime> {
        self.metadata.as_ref().and_then(|m| m.duration)
    }
}
