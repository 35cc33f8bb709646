//! Identifier and timestamp generation.

use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

/// A fresh random identifier.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// The current UTC time as an RFC 3339 string with millisecond precision.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
