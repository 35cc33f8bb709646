//! Subcommand bodies. Each returns the text to print.

use anyhow::{bail, Context, Result};
use splice_interchange::InterchangeFormat;
use splice_timeline::{SchemaFile, TimelineSchema};
use std::fmt::Write;
use std::path::Path;
use tracing::{debug, info};

fn load(path: &Path) -> Result<SchemaFile> {
    debug!(path = %path.display(), "loading timeline");
    SchemaFile::load_from_file(path).with_context(|| format!("Failed to load {}", path.display()))
}

/// Report dropped elements and clips with missing sources.
pub fn validate(path: &Path) -> Result<String> {
    let file = load(path)?;
    let schema = &file.schema;
    let mut out = String::new();

    for issue in &file.dropped {
        writeln!(out, "dropped {issue}")?;
    }
    let dangling = schema.dangling_clip_ids();
    for clip_id in &dangling {
        writeln!(out, "clip {clip_id} references a missing media source")?;
    }

    write!(
        out,
        "{}: valid ({} dropped, {} dangling)",
        path.display(),
        file.dropped.len(),
        dangling.len()
    )?;
    Ok(out)
}

pub fn info(path: &Path) -> Result<String> {
    let schema = load(path)?.schema;
    let timeline = &schema.timeline;
    let duration = timeline.duration();
    let mut out = String::new();

    writeln!(out, "Timeline: {} ({})", timeline.name, timeline.id)?;
    writeln!(out, "Schema version: {}", schema.version)?;
    writeln!(out, "Frame rate: {} fps", timeline.frame_rate())?;
    writeln!(
        out,
        "Duration: {} ({})",
        duration.to_timecode(timeline.frame_rate().drop_frames_per_minute().is_some()),
        duration
    )?;
    writeln!(out, "Sources: {}", schema.sources.len())?;
    writeln!(out, "Transitions: {}", timeline.transitions.len())?;
    write!(out, "Tracks: {}", timeline.tracks.len())?;
    for track in &timeline.tracks {
        let end = track
            .end_time()
            .map_or_else(|| "-".to_string(), |t| t.to_string());
        let mut flags = Vec::new();
        if track.locked {
            flags.push("locked");
        }
        if track.muted {
            flags.push("muted");
        }
        if !track.enabled {
            flags.push("disabled");
        }
        write!(
            out,
            "\n  [{}] {:<12} {:<8} {:>4} clips  ends {}  {}",
            track.index,
            track.name,
            track.kind.as_str(),
            track.clip_count(),
            end,
            flags.join(",")
        )?;
    }
    Ok(out)
}

pub fn export(path: &Path, format: InterchangeFormat) -> Result<String> {
    let schema = load(path)?.schema;
    let text = splice_interchange::export(&schema, format)
        .with_context(|| format!("Failed to export as {format}"))?;
    info!(%format, clips = schema.timeline.clips().count(), "exported timeline");
    Ok(text)
}

/// The explicit format, else the one implied by the extension. Formats
/// without an importer are refused.
pub fn import_format(path: &Path, format: Option<InterchangeFormat>) -> Result<InterchangeFormat> {
    let format = match format {
        Some(format) => format,
        None => path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(InterchangeFormat::from_extension)
            .with_context(|| format!("Cannot tell the format of {}; pass --format", path.display()))?,
    };
    if !format.supports_import() {
        bail!("{format} import is not supported");
    }
    Ok(format)
}

/// Convert an interchange file to TimelineSchema JSON.
pub fn import(path: &Path, format: Option<InterchangeFormat>) -> Result<String> {
    let format = import_format(path, format)?;
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let schema: TimelineSchema = splice_interchange::import(&text, format)
        .with_context(|| format!("Failed to import {}", path.display()))?;

    let json = SchemaFile::new(schema).to_json()?;
    String::from_utf8(json).context("Serialized timeline is not UTF-8")
}
