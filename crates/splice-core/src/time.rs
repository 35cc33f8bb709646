//! Time representation for frame-accurate editing
//!
//! A `RationalTime` is an integer tick count at a rational `FrameRate`, so
//! `value / rate` seconds. Comparisons across rates go through exact
//! `Rational64` seconds; only resampling to another rate rounds.

use num_rational::Rational64;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Neg, Sub};

use crate::error::{CoreError, Result};

/// Frame rate as a rational number (e.g., 30000/1001 for 29.97 fps).
///
/// Always positive and stored in lowest terms. Serialized as a plain JSON
/// number; 23.976, 29.97 and 59.94 read back as their exact 1001-based forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRate {
    numerator: u32,
    denominator: u32,
}

impl FrameRate {
    /// Create a frame rate from a numerator and denominator.
    pub fn new(numerator: u32, denominator: u32) -> Result<Self> {
        if numerator == 0 || denominator == 0 {
            return Err(CoreError::InvalidRate(format!(
                "{numerator}/{denominator} must be positive"
            )));
        }
        let reduced = Rational64::new(numerator as i64, denominator as i64);
        Ok(Self {
            numerator: *reduced.numer() as u32,
            denominator: *reduced.denom() as u32,
        })
    }

    /// Create an integer frame rate. Fails if `fps <= 0`.
    pub fn from_integer(fps: i64) -> Result<Self> {
        if fps <= 0 || fps > u32::MAX as i64 {
            return Err(CoreError::InvalidRate(format!("{fps} must be positive")));
        }
        Ok(Self {
            numerator: fps as u32,
            denominator: 1,
        })
    }

    /// Create a frame rate from a floating-point fps value.
    ///
    /// Whole numbers map to `n/1`, NTSC-style rates to `n*1000/1001`, anything
    /// else to the nearest millihertz.
    pub fn from_f64(fps: f64) -> Result<Self> {
        if !fps.is_finite() || fps <= 0.0 || fps > 1_000_000.0 {
            return Err(CoreError::InvalidRate(format!("{fps} must be positive")));
        }
        let rounded = fps.round();
        if (fps - rounded).abs() < 1e-6 {
            return Self::from_integer(rounded as i64);
        }
        let ntsc = (fps * 1.001).round();
        if (ntsc * 1000.0 / 1001.0 - fps).abs() < 0.005 {
            return Self::new((ntsc as u32) * 1000, 1001);
        }
        Self::new((fps * 1000.0).round() as u32, 1000)
    }

    /// Numerator in lowest terms.
    #[inline]
    pub const fn numerator(self) -> u32 {
        self.numerator
    }

    /// Denominator in lowest terms.
    #[inline]
    pub const fn denominator(self) -> u32 {
        self.denominator
    }

    /// The rate as an exact rational (frames per second).
    #[inline]
    pub fn as_rational(self) -> Rational64 {
        Rational64::new(self.numerator as i64, self.denominator as i64)
    }

    /// Convert to frames per second as f64.
    #[inline]
    pub fn to_fps_f64(self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    /// True for whole-number rates such as 24 or 30.
    #[inline]
    pub fn is_integer(self) -> bool {
        self.denominator == 1
    }

    /// The rate rounded to whole frames per second (30 for 29.97).
    pub fn nominal_fps(self) -> i64 {
        self.as_rational().round().to_integer().max(1)
    }

    /// Frame labels skipped per minute under drop-frame counting, if this
    /// rate supports it.
    pub fn drop_frames_per_minute(self) -> Option<i64> {
        if self == Self::FPS_29_97 {
            Some(2)
        } else if self == Self::FPS_59_94 {
            Some(4)
        } else {
            None
        }
    }

    /// Common frame rates
    pub const FPS_23_976: Self = Self::raw(24000, 1001);
    pub const FPS_24: Self = Self::raw(24, 1);
    pub const FPS_25: Self = Self::raw(25, 1);
    pub const FPS_29_97: Self = Self::raw(30000, 1001);
    pub const FPS_30: Self = Self::raw(30, 1);
    pub const FPS_50: Self = Self::raw(50, 1);
    pub const FPS_59_94: Self = Self::raw(60000, 1001);
    pub const FPS_60: Self = Self::raw(60, 1);

    /// 1000 ticks per second, for wall-clock quantities such as thresholds.
    pub const MILLISECONDS: Self = Self::raw(1000, 1);

    const fn raw(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::FPS_24
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_integer() {
            write!(f, "{} fps", self.numerator)
        } else {
            write!(f, "{:.3} fps", self.to_fps_f64())
        }
    }
}

impl Serialize for FrameRate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if self.is_integer() {
            serializer.serialize_u32(self.numerator)
        } else {
            serializer.serialize_f64(self.to_fps_f64())
        }
    }
}

impl<'de> Deserialize<'de> for FrameRate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let fps = f64::deserialize(deserializer)?;
        FrameRate::from_f64(fps).map_err(serde::de::Error::custom)
    }
}

/// A point in time: `value` ticks at `rate` ticks per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RationalTime {
    /// Tick count (frames at `rate`)
    pub value: i64,
    /// Ticks per second
    pub rate: FrameRate,
}

impl RationalTime {
    /// Create a time at an integer rate. Fails if `rate <= 0`.
    pub fn new(value: i64, rate: i64) -> Result<Self> {
        Ok(Self {
            value,
            rate: FrameRate::from_integer(rate)?,
        })
    }

    /// Create a time at an already validated rate.
    #[inline]
    pub const fn with_rate(value: i64, rate: FrameRate) -> Self {
        Self { value, rate }
    }

    /// Zero at the given rate.
    #[inline]
    pub const fn zero(rate: FrameRate) -> Self {
        Self { value: 0, rate }
    }

    /// Nearest tick at `rate` to an exact number of seconds.
    pub fn from_seconds(seconds: Rational64, rate: FrameRate) -> Self {
        Self {
            value: (seconds * rate.as_rational()).round().to_integer(),
            rate,
        }
    }

    /// Nearest tick at `rate` to a floating-point number of seconds.
    pub fn from_seconds_f64(seconds: f64, rate: FrameRate) -> Self {
        Self {
            value: (seconds * rate.to_fps_f64()).round() as i64,
            rate,
        }
    }

    /// Exact time in seconds.
    #[inline]
    pub fn seconds(self) -> Rational64 {
        Rational64::new(
            self.value * self.rate.denominator as i64,
            self.rate.numerator as i64,
        )
    }

    /// Time in seconds as f64.
    #[inline]
    pub fn seconds_f64(self) -> f64 {
        self.value as f64 * self.rate.denominator as f64 / self.rate.numerator as f64
    }

    /// Express this time at another rate.
    ///
    /// A no-op when the rates match. Otherwise the value is rounded to the
    /// nearest tick of `rate`, so repeated resampling is lossy.
    pub fn rescaled_to(self, rate: FrameRate) -> Self {
        if rate == self.rate {
            self
        } else {
            Self::from_seconds(self.seconds(), rate)
        }
    }

    /// Order two times by their exact position, whatever their rates.
    pub fn compare(self, other: Self) -> Ordering {
        if self.rate == other.rate {
            self.value.cmp(&other.value)
        } else {
            self.seconds().cmp(&other.seconds())
        }
    }

    /// Check if this time is zero.
    #[inline]
    pub fn is_zero(self) -> bool {
        self.value == 0
    }

    /// Check if this time is before zero.
    #[inline]
    pub fn is_negative(self) -> bool {
        self.value < 0
    }

    /// Get the absolute value of this time.
    #[inline]
    pub fn abs(self) -> Self {
        Self {
            value: self.value.abs(),
            rate: self.rate,
        }
    }

    /// Format as `HH:MM:SS:FF` (or `HH:MM:SS;FF` for drop-frame).
    pub fn to_timecode(self, drop_frame: bool) -> String {
        crate::timecode::format_timecode(self, drop_frame)
    }
}

impl Add for RationalTime {
    type Output = Self;
    /// The right-hand side is resampled to the left-hand rate.
    fn add(self, rhs: Self) -> Self {
        Self {
            value: self.value + rhs.rescaled_to(self.rate).value,
            rate: self.rate,
        }
    }
}

impl Sub for RationalTime {
    type Output = Self;
    /// The right-hand side is resampled to the left-hand rate.
    fn sub(self, rhs: Self) -> Self {
        Self {
            value: self.value - rhs.rescaled_to(self.rate).value,
            rate: self.rate,
        }
    }
}

impl Neg for RationalTime {
    type Output = Self;
    fn neg(self) -> Self {
        Self {
            value: -self.value,
            rate: self.rate,
        }
    }
}

impl fmt::Display for RationalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.seconds_f64())
    }
}

/// A time range with inclusive start and exclusive end.
///
/// `start` and `duration` share one rate; `new` enforces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    /// Start time (inclusive)
    pub start: RationalTime,
    /// Duration of the range
    pub duration: RationalTime,
}

impl TimeRange {
    /// Create a new time range. Fails if the rates differ.
    pub fn new(start: RationalTime, duration: RationalTime) -> Result<Self> {
        if start.rate != duration.rate {
            return Err(CoreError::RateMismatch {
                start: start.rate.to_string(),
                duration: duration.rate.to_string(),
            });
        }
        Ok(Self { start, duration })
    }

    /// Create a range from raw tick counts at one rate.
    #[inline]
    pub const fn at_rate(start: i64, duration: i64, rate: FrameRate) -> Self {
        Self {
            start: RationalTime::with_rate(start, rate),
            duration: RationalTime::with_rate(duration, rate),
        }
    }

    /// Create a range from start and end; `end` is resampled to the start rate.
    pub fn from_start_end(start: RationalTime, end: RationalTime) -> Self {
        Self {
            start,
            duration: end - start,
        }
    }

    /// The shared rate of start and duration.
    #[inline]
    pub fn rate(self) -> FrameRate {
        self.start.rate
    }

    /// End time (exclusive).
    #[inline]
    pub fn end(self) -> RationalTime {
        self.start + self.duration
    }

    /// Check if a time is within this range.
    pub fn contains(self, time: RationalTime) -> bool {
        time.compare(self.start) != Ordering::Less && time.compare(self.end()) == Ordering::Less
    }

    /// Check if two ranges overlap.
    pub fn overlaps(self, other: Self) -> bool {
        self.start.compare(other.end()) == Ordering::Less
            && other.start.compare(self.end()) == Ordering::Less
    }

    /// Express the range at another rate (lossy, see `RationalTime::rescaled_to`).
    pub fn rescaled_to(self, rate: FrameRate) -> Self {
        Self {
            start: self.start.rescaled_to(rate),
            duration: self.duration.rescaled_to(rate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rational_time_seconds() {
        let time = RationalTime::new(48, 24).unwrap();
        assert_eq!(time.seconds(), Rational64::from_integer(2));
        assert_eq!(time.seconds_f64(), 2.0);
    }

    #[test]
    fn test_zero_rate_rejected() {
        assert!(RationalTime::new(10, 0).is_err());
        assert!(RationalTime::new(10, -24).is_err());
        assert!(FrameRate::new(0, 1).is_err());
        assert!(FrameRate::from_f64(f64::NAN).is_err());
    }

    #[test]
    fn test_frame_rate_23_976() {
        let rate = FrameRate::from_f64(23.976).unwrap();
        assert_eq!(rate, FrameRate::FPS_23_976);
        assert!((rate.to_fps_f64() - 23.976).abs() < 0.001);
        assert_eq!(rate.nominal_fps(), 24);
    }

    #[test]
    fn test_frame_rate_reduced() {
        let rate = FrameRate::new(48, 2).unwrap();
        assert_eq!(rate, FrameRate::FPS_24);
        assert!(rate.is_integer());
    }

    #[test]
    fn test_time_range_rate_mismatch() {
        let start = RationalTime::new(0, 24).unwrap();
        let duration = RationalTime::new(10, 30).unwrap();
        assert!(matches!(
            TimeRange::new(start, duration),
            Err(CoreError::RateMismatch { .. })
        ));
    }

    #[test]
    fn test_time_range_overlap() {
        let a = TimeRange::at_rate(0, 240, FrameRate::FPS_24);
        let b = TimeRange::at_rate(150, 300, FrameRate::FPS_30);
        assert!(a.overlaps(b));

        let c = TimeRange::at_rate(240, 24, FrameRate::FPS_24);
        assert!(!a.overlaps(c));
        assert!(a.contains(RationalTime::with_rate(239, FrameRate::FPS_24)));
        assert!(!a.contains(a.end()));
    }

    #[test]
    fn test_time_arithmetic_across_rates() {
        let a = RationalTime::new(30, 30).unwrap(); // 1s
        let b = RationalTime::new(12, 24).unwrap(); // 0.5s
        let sum = a + b;
        assert_eq!(sum.rate, FrameRate::FPS_30);
        assert_eq!(sum.value, 45);
        assert_eq!((a - b).value, 15);
    }

    #[test]
    fn test_compare_across_rates() {
        let a = RationalTime::new(24, 24).unwrap();
        let b = RationalTime::new(30, 30).unwrap();
        assert_eq!(a.compare(b), Ordering::Equal);
        assert_ne!(a, b);
        let c = RationalTime::with_rate(30, FrameRate::FPS_29_97);
        assert_eq!(b.compare(c), Ordering::Less);
    }

    #[test]
    fn test_rescale_identity_when_rates_match() {
        let t = RationalTime::new(17, 25).unwrap();
        assert_eq!(t.rescaled_to(FrameRate::FPS_25), t);
    }

    #[test]
    fn test_rescale_rounds_to_nearest_tick() {
        let t = RationalTime::new(1, 30).unwrap();
        assert_eq!(t.rescaled_to(FrameRate::FPS_24).value, 1);
        let t = RationalTime::new(100, 30).unwrap();
        assert_eq!(t.rescaled_to(FrameRate::FPS_24).value, 80);
    }

    #[test]
    fn test_rate_serializes_as_number() {
        let t = RationalTime::with_rate(5, FrameRate::FPS_29_97);
        let json = serde_json::to_value(t).unwrap();
        assert!(json["rate"].is_f64());
        let back: RationalTime = serde_json::from_value(json).unwrap();
        assert_eq!(back, t);

        let json = serde_json::json!({ "value": 10, "rate": 24 });
        let t: RationalTime = serde_json::from_value(json).unwrap();
        assert_eq!(t.rate, FrameRate::FPS_24);
    }

    #[test]
    fn test_zero_rate_fails_to_deserialize() {
        let json = serde_json::json!({ "value": 10, "rate": 0 });
        assert!(serde_json::from_value::<RationalTime>(json).is_err());
    }

    proptest! {
        #[test]
        fn resample_preserves_seconds(value in -1_000_000i64..1_000_000, from in 1i64..240, to in 1i64..240) {
            let t = RationalTime::new(value, from).unwrap();
            let target = FrameRate::from_integer(to).unwrap();
            let resampled = t.rescaled_to(target);
            // Rounding moves the value by at most half a target tick.
            let tolerance = 0.5 / to as f64 + 1e-9;
            prop_assert!((resampled.seconds_f64() - t.seconds_f64()).abs() <= tolerance);
        }
    }
}
