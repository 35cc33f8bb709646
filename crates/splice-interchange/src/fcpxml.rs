//! Final Cut Pro XML (1.10) export.

use splice_core::{FrameRate, RationalTime};
use splice_timeline::TimelineSchema;
use tracing::warn;

use crate::error::{InterchangeError, Result};

/// Resource id of the sequence format; assets follow as `r2`, `r3`, ...
const FORMAT_ID: &str = "r1";

/// FCPXML import is not supported.
pub fn from_fcpxml(_xml: &str) -> Result<TimelineSchema> {
    Err(InterchangeError::NotImplemented("FCPXML"))
}

/// Render an `fcpxml` document with one asset per media source and one
/// `asset-clip` per clip in a single spine.
///
/// Clips whose source is missing cannot reference an asset and are left
/// out.
pub fn to_fcpxml(schema: &TimelineSchema) -> String {
    let timeline = &schema.timeline;
    let name = escape_xml(&timeline.name);
    let mut out = String::new();

    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<!DOCTYPE fcpxml>\n");
    out.push_str("<fcpxml version=\"1.10\">\n");
    out.push_str("  <resources>\n");
    out.push_str(&format!("    {}\n", format_element(schema)));
    for (i, source) in schema.sources.iter().enumerate() {
        out.push_str(&format!(
            "    <asset id=\"{}\" name=\"{}\" src=\"{}\" duration=\"{}\" format=\"{FORMAT_ID}\"/>\n",
            asset_id(i),
            escape_xml(&source.name),
            escape_xml(&source.path),
            fcpxml_time(source.duration()),
        ));
    }
    out.push_str("  </resources>\n");
    out.push_str("  <library>\n");
    out.push_str(&format!("    <event name=\"{name}\">\n"));
    out.push_str(&format!("      <project name=\"{name}\">\n"));
    out.push_str(&format!(
        "        <sequence duration=\"{}\" format=\"{FORMAT_ID}\">\n",
        fcpxml_time(Some(timeline.duration())),
    ));
    out.push_str("          <spine>\n");

    for track in &timeline.tracks {
        for clip in &track.clips {
            let Some(index) = schema.sources.iter().position(|s| s.id == clip.source_id) else {
                warn!(clip = %clip.id, "clip source missing; left out of FCPXML");
                continue;
            };
            out.push_str(&format!(
                "            <asset-clip name=\"{}\" ref=\"{}\" offset=\"{}\" duration=\"{}\" start=\"{}\"/>\n",
                escape_xml(&clip.name),
                asset_id(index),
                fcpxml_time(Some(clip.start())),
                fcpxml_time(Some(clip.duration())),
                fcpxml_time(Some(clip.source_range.start)),
            ));
        }
    }

    out.push_str("          </spine>\n");
    out.push_str("        </sequence>\n");
    out.push_str("      </project>\n");
    out.push_str("    </event>\n");
    out.push_str("  </library>\n");
    out.push_str("</fcpxml>\n");
    out
}

fn asset_id(source_index: usize) -> String {
    format!("r{}", source_index + 2)
}

fn format_element(schema: &TimelineSchema) -> String {
    let metadata = &schema.timeline.metadata;
    let mut element = format!(
        "<format id=\"{FORMAT_ID}\" frameDuration=\"{}\"",
        frame_duration(metadata.frame_rate)
    );
    if let (Some(width), Some(height)) = (metadata.width, metadata.height) {
        element.push_str(&format!(" width=\"{width}\" height=\"{height}\""));
    }
    element.push_str("/>");
    element
}

/// One frame as a rational number of seconds, e.g. `1001/30000s`.
fn frame_duration(rate: FrameRate) -> String {
    if rate.numerator() == 1 && rate.denominator() == 1 {
        return "1s".into();
    }
    format!("{}/{}s", rate.denominator(), rate.numerator())
}

/// Seconds as `Ns` when whole, else with three decimals.
fn fcpxml_time(time: Option<RationalTime>) -> String {
    let Some(time) = time else {
        return "0s".into();
    };
    let seconds = time.seconds();
    if seconds.is_integer() {
        format!("{}s", seconds.to_integer())
    } else {
        format!("{:.3}s", time.seconds_f64())
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
