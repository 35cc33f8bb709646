//! Reading and writing TimelineSchema documents.
//!
//! Documents are JSON with a semver `version` string. Anything read from
//! disk goes through validation before it becomes a `TimelineSchema`.

use serde_json::{json, Value};
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{Result, TimelineError};
use crate::timeline::{TimelineSchema, CURRENT_SCHEMA_VERSION};
use crate::validation::{validate_timeline_schema, ValidationIssue};

/// Highest major schema version this build understands.
const SUPPORTED_MAJOR: u64 = 1;

/// A loaded or about-to-be-saved document.
#[derive(Debug, Clone)]
pub struct SchemaFile {
    pub schema: TimelineSchema,
    /// Nested elements discarded during validation
    pub dropped: Vec<ValidationIssue>,
}

impl SchemaFile {
    pub fn new(schema: TimelineSchema) -> Self {
        Self {
            schema,
            dropped: Vec::new(),
        }
    }

    /// Serialize to pretty-printed JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(&self.schema)
            .map_err(|e| TimelineError::Serialization(format!("failed to serialize timeline: {e}")))
    }

    /// Parse, migrate and validate JSON bytes.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let raw: Value = serde_json::from_slice(data)
            .map_err(|e| TimelineError::Serialization(format!("invalid JSON: {e}")))?;
        let migrated = migrate(raw)?;

        let validated = validate_timeline_schema(&migrated)?;
        if !validated.dropped.is_empty() {
            warn!(
                dropped = validated.dropped.len(),
                "discarded malformed elements while loading timeline"
            );
        }
        Ok(Self {
            schema: validated.schema,
            dropped: validated.dropped,
        })
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let data = self.to_json()?;
        std::fs::write(path, data)?;
        debug!(path = %path.display(), "saved timeline");
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_json(&data)
    }
}

/// Bring older document shapes up to the current envelope.
///
/// A bare timeline object (no envelope) is wrapped with an empty source
/// list. Documents from a newer major version are refused.
fn migrate(data: Value) -> Result<Value> {
    let is_bare_timeline = data.get("timeline").is_none() && data.get("tracks").is_some();
    if is_bare_timeline {
        debug!("wrapping bare timeline in a schema envelope");
        return Ok(json!({
            "version": CURRENT_SCHEMA_VERSION,
            "timeline": data,
            "sources": [],
        }));
    }

    if let Some(version) = data.get("version").and_then(Value::as_str) {
        let major = version
            .split('.')
            .next()
            .and_then(|m| m.trim().parse::<u64>().ok());
        match major {
            Some(major) if major <= SUPPORTED_MAJOR => {}
            _ => {
                return Err(TimelineError::UnsupportedVersion {
                    found: version.to_string(),
                    supported: CURRENT_SCHEMA_VERSION.to_string(),
                })
            }
        }
    }
    Ok(data)
}
