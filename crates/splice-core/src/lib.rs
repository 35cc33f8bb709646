//! Splice Core - exact time primitives
//!
//! This crate provides the time types every other Splice crate builds on:
//! - `FrameRate`: a rational rate such as 24/1 or 30000/1001
//! - `RationalTime`: an integer count of ticks at a `FrameRate`
//! - `TimeRange`: a start plus a duration at the same rate
//! - SMPTE timecode formatting and parsing

pub mod error;
pub mod time;
pub mod timecode;

pub use error::{CoreError, Result};
pub use num_rational::Rational64;
pub use time::{FrameRate, RationalTime, TimeRange};
pub use timecode::{format_timecode, parse_timecode};
