//! SMPTE timecode formatting and parsing.
//!
//! A time's `value` is its frame count at its own rate. Labels use the
//! nominal (rounded) rate, so 29.97 fps counts frames 00-29. Drop-frame
//! labels skip frames 0 and 1 (0-3 at 59.94) at the start of every minute
//! except each tenth minute.

use crate::error::{CoreError, Result};
use crate::time::{FrameRate, RationalTime};

/// Render `time` as `HH:MM:SS:FF`.
///
/// With `drop_frame` at 29.97 or 59.94 fps the separator before the frame
/// field becomes `;` and drop-frame numbering is used. At any other rate the
/// flag is ignored.
pub fn format_timecode(time: RationalTime, drop_frame: bool) -> String {
    let fps = time.rate.nominal_fps();
    let sign = if time.is_negative() { "-" } else { "" };
    let mut frames = time.value.abs();

    let drop = if drop_frame {
        time.rate.drop_frames_per_minute()
    } else {
        None
    };

    if let Some(dropped) = drop {
        let per_minute = fps * 60 - dropped;
        let per_ten_minutes = fps * 600 - dropped * 9;
        let tens = frames / per_ten_minutes;
        let rem = frames % per_ten_minutes;
        frames += dropped * 9 * tens;
        if rem > dropped {
            frames += dropped * ((rem - dropped) / per_minute);
        }
    }

    let ff = frames % fps;
    let total_seconds = frames / fps;
    let ss = total_seconds % 60;
    let mm = (total_seconds / 60) % 60;
    let hh = total_seconds / 3600;
    let sep = if drop.is_some() { ';' } else { ':' };

    format!("{sign}{hh:02}:{mm:02}:{ss:02}{sep}{ff:02}")
}

/// Parse `HH:MM:SS:FF` or `HH:MM:SS;FF` into a time at `rate`.
///
/// A `;` before the frame field selects drop-frame numbering when `rate` is
/// 29.97 or 59.94; at other rates it reads as non-drop.
pub fn parse_timecode(timecode: &str, rate: FrameRate) -> Result<RationalTime> {
    let invalid = |reason: &str| CoreError::InvalidTimecode {
        timecode: timecode.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = timecode.trim();
    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let drop_marked = body.contains(';');

    let parts = body
        .split([':', ';'])
        .map(|p| p.parse::<i64>().map_err(|_| invalid("fields must be numeric")))
        .collect::<Result<Vec<_>>>()?;
    let [hh, mm, ss, ff] = parts[..] else {
        return Err(invalid("expected HH:MM:SS:FF or HH:MM:SS;FF"));
    };

    let fps = rate.nominal_fps();
    if hh < 0 || !(0..60).contains(&mm) || !(0..60).contains(&ss) || !(0..fps).contains(&ff) {
        return Err(invalid("field out of range"));
    }

    let mut frames = (hh * 3600 + mm * 60 + ss) * fps + ff;

    if let Some(dropped) = rate.drop_frames_per_minute().filter(|_| drop_marked) {
        if ss == 0 && ff < dropped && mm % 10 != 0 {
            return Err(invalid("frame label is dropped in drop-frame counting"));
        }
        let total_minutes = hh * 60 + mm;
        frames -= dropped * (total_minutes - total_minutes / 10);
    }

    Ok(RationalTime::with_rate(
        if negative { -frames } else { frames },
        rate,
    ))
}
