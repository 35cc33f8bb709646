//! Transitions between adjacent clips.

use serde::{Deserialize, Serialize};
use splice_core::RationalTime;
use std::fmt;

use crate::effect::EffectParameter;

/// Kind of transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionType {
    CrossDissolve,
    Dip,
    Wipe,
    Fade,
    Push,
    Slide,
    Zoom,
}

impl TransitionType {
    /// The JSON name, e.g. `cross-dissolve`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CrossDissolve => "cross-dissolve",
            Self::Dip => "dip",
            Self::Wipe => "wipe",
            Self::Fade => "fade",
            Self::Push => "push",
            Self::Slide => "slide",
            Self::Zoom => "zoom",
        }
    }

    /// Parameters a freshly added transition of this type starts with.
    pub fn default_parameters(self) -> Vec<EffectParameter> {
        match self {
            Self::Dip => vec![EffectParameter::color("dipColor", 0.0, 0.0, 0.0, 1.0)],
            Self::Wipe => vec![EffectParameter::choice(
                "wipeDirection",
                "left",
                &["left", "right", "up", "down"],
            )],
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for TransitionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transition from one clip into the next on the same track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    pub id: String,
    pub name: String,
    pub transition_type: TransitionType,
    pub duration: RationalTime,
    pub from_clip_id: String,
    pub to_clip_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<EffectParameter>>,
}

impl Transition {
    /// Check whether this transition references a clip.
    pub fn touches(&self, clip_id: &str) -> bool {
        self.from_clip_id == clip_id || self.to_clip_id == clip_id
    }
}
