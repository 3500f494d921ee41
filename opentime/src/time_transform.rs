//! Affine transforms between time spaces

use crate::rational_time::RationalTime;
use crate::time_range::TimeRange;
use core::fmt;

/// `t * scale + offset`, optionally rescaled to `rate`
///
/// A non-positive `rate` keeps the input's rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeTransform {
    offset: RationalTime,
    scale: f64,
    rate: f64,
}

impl Default for TimeTransform {
    fn default() -> Self {
        Self {
            offset: RationalTime::default(),
            scale: 1.0,
            rate: -1.0,
        }
    }
}

impl TimeTransform {
    /// Create a new transform
    pub const fn new(offset: RationalTime, scale: f64, rate: f64) -> Self {
        Self {
            offset,
            scale,
            rate,
        }
    }

    /// Offset added after scaling
    pub fn offset(&self) -> RationalTime {
        self.offset
    }

    /// Multiplier applied to the input value
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Output rate, or a non-positive value for "keep input rate"
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Map a single time
    pub fn applied_to_time(&self, time: RationalTime) -> RationalTime {
        let result = RationalTime::new(time.value() * self.scale, time.rate()) + self.offset;
        let target = if self.rate > 0.0 { self.rate } else { time.rate() };
        if target > 0.0 {
            result.rescaled_to(target)
        } else {
            result
        }
    }

    /// Map both ends of a range
    pub fn applied_to_range(&self, range: &TimeRange) -> TimeRange {
        TimeRange::range_from_start_end_time(
            self.applied_to_time(range.start_time()),
            self.applied_to_time(range.end_time_exclusive()),
        )
    }

    /// Compose with another transform; `self` supplies the rate when it has one
    pub fn applied_to_transform(&self, other: &Self) -> Self {
        let rate = if self.rate > 0.0 { self.rate } else { other.rate };
        Self::new(self.offset + other.offset, self.scale * other.scale, rate)
    }
}

impl fmt::Display for TimeTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimeTransform({}, {}, {})", self.offset, self.scale, self.rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_identity() {
        let t = RationalTime::new(12.0, 24.0);
        let mapped = TimeTransform::default().applied_to_time(t);
        assert!(mapped.strictly_equal(&t));
    }

    #[test]
    fn test_offset_and_scale() {
        let tx = TimeTransform::new(RationalTime::new(10.0, 24.0), 2.0, -1.0);
        assert_eq!(tx.applied_to_time(RationalTime::new(5.0, 24.0)), RationalTime::new(20.0, 24.0));

        let range = tx.applied_to_range(&TimeRange::from_values(0.0, 10.0, 24.0));
        assert_eq!(range, TimeRange::from_values(10.0, 20.0, 24.0));
    }

    #[test]
    fn test_rate_override() {
        let tx = TimeTransform::new(RationalTime::default(), 1.0, 48.0);
        let mapped = tx.applied_to_time(RationalTime::new(24.0, 24.0));
        assert_eq!(mapped.rate(), 48.0);
        assert_eq!(mapped.value(), 48.0);
    }
}
