//! Effects and their animatable parameters.

use serde::{Deserialize, Serialize};
use splice_core::{RationalTime, TimeRange};

use crate::ids::new_id;

/// Category of an effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectType {
    Filter,
    Transition,
    Generator,
    Color,
    Audio,
}

/// Declared type of a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Number,
    String,
    Boolean,
    Color,
    Point,
    Enum,
}

/// Keyframe interpolation mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    #[default]
    Linear,
    Bezier,
    Step,
    Hold,
}

/// A parameter value as it appears in the JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Number(f64),
    Text(String),
    Color { r: f64, g: f64, b: f64, a: f64 },
    Point { x: f64, y: f64 },
}

/// A parameter value pinned at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamKeyframe {
    pub time: RationalTime,
    pub value: ParamValue,
    #[serde(default)]
    pub interpolation: Interpolation,
}

/// A named, typed effect parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    pub value: ParamValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyframes: Option<Vec<ParamKeyframe>>,
}

impl EffectParameter {
    /// A numeric parameter without bounds.
    pub fn number(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            param_type: ParamType::Number,
            value: ParamValue::Number(value),
            min_value: None,
            max_value: None,
            enum_values: None,
            keyframes: None,
        }
    }

    /// An enum parameter; `value` should be one of `choices`.
    pub fn choice(name: impl Into<String>, value: &str, choices: &[&str]) -> Self {
        Self {
            name: name.into(),
            param_type: ParamType::Enum,
            value: ParamValue::Text(value.to_string()),
            min_value: None,
            max_value: None,
            enum_values: Some(choices.iter().map(|c| c.to_string()).collect()),
            keyframes: None,
        }
    }

    /// A colour parameter.
    pub fn color(name: impl Into<String>, r: f64, g: f64, b: f64, a: f64) -> Self {
        Self {
            name: name.into(),
            param_type: ParamType::Color,
            value: ParamValue::Color { r, g, b, a },
            min_value: None,
            max_value: None,
            enum_values: None,
            keyframes: None,
        }
    }
}

/// An effect applied to a clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Effect {
    pub id: String,
    pub name: String,
    pub effect_type: EffectType,
    pub enabled: bool,
    pub parameters: Vec<EffectParameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeRange>,
}

impl Effect {
    /// Create an enabled effect with no parameters.
    pub fn new(name: impl Into<String>, effect_type: EffectType) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            effect_type,
            enabled: true,
            parameters: Vec::new(),
            time_range: None,
        }
    }
}
