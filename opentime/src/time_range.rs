//! Half-open time ranges

use crate::rational_time::RationalTime;
use core::fmt;

/// Tolerance in seconds used by range comparisons (half a sample at 192 kHz)
pub const DEFAULT_EPSILON: f64 = 1.0 / (2.0 * 192_000.0);

/// A span of time starting at `start_time` and lasting `duration`
///
/// The end is exclusive: a range `[0, 24)` at 24 fps contains frame 23 but
/// not frame 24.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeRange {
    start_time: RationalTime,
    duration: RationalTime,
}

impl TimeRange {
    /// Create a new range
    pub const fn new(start_time: RationalTime, duration: RationalTime) -> Self {
        Self {
            start_time,
            duration,
        }
    }

    /// Create a range from raw values sharing one rate
    pub fn from_values(start: f64, duration: f64, rate: f64) -> Self {
        Self::new(RationalTime::new(start, rate), RationalTime::new(duration, rate))
    }

    /// A zero-length range at `start_time`
    pub fn from_start_time(start_time: RationalTime) -> Self {
        Self::new(start_time, RationalTime::new(0.0, start_time.rate()))
    }

    /// Start of the range
    pub fn start_time(&self) -> RationalTime {
        self.start_time
    }

    /// Length of the range
    pub fn duration(&self) -> RationalTime {
        self.duration
    }

    /// True if either bound is an invalid time or the duration is negative
    pub fn is_invalid_range(&self) -> bool {
        self.start_time.is_invalid_time()
            || self.duration.is_invalid_time()
            || self.duration.value() < 0.0
    }

    /// Inverse of [`is_invalid_range`](Self::is_invalid_range)
    pub fn is_valid_range(&self) -> bool {
        !self.is_invalid_range()
    }

    /// `start_time + duration`
    pub fn end_time_exclusive(&self) -> RationalTime {
        self.duration + self.start_time.rescaled_to(self.duration.rate())
    }

    /// The last whole sample inside the range
    pub fn end_time_inclusive(&self) -> RationalTime {
        let end = self.end_time_exclusive();
        let span = end - self.start_time.rescaled_to(self.duration.rate());
        if span.value() > 1.0 {
            if self.duration.value() != self.duration.value().floor() {
                return end.floor();
            }
            return end - RationalTime::new(1.0, self.duration.rate());
        }
        self.start_time
    }

    /// The same start with `other` added to the duration
    pub fn duration_extended_by(&self, other: RationalTime) -> Self {
        Self::new(self.start_time, self.duration + other)
    }

    /// The smallest range covering both `self` and `other`
    pub fn extended_by(&self, other: &Self) -> Self {
        let start = if other.start_time < self.start_time {
            other.start_time
        } else {
            self.start_time
        };
        let this_end = self.end_time_exclusive();
        let other_end = other.end_time_exclusive();
        let end = if other_end > this_end { other_end } else { this_end };
        Self::new(start, RationalTime::duration_from_start_end_time(start, end))
    }

    /// `time` limited to `[start_time, end_time_inclusive]`
    pub fn clamped_time(&self, time: RationalTime) -> RationalTime {
        let mut result = time;
        if result < self.start_time {
            result = self.start_time;
        }
        let end = self.end_time_inclusive();
        if result > end {
            result = end;
        }
        result
    }

    /// `other` trimmed so that it lies within `self`
    ///
    /// When the ranges do not overlap the resulting duration is zero or
    /// negative; use [`intersects`](Self::intersects) first to tell.
    pub fn clamped_range(&self, other: &Self) -> Self {
        let start = if self.start_time > other.start_time {
            self.start_time
        } else {
            other.start_time
        };
        let this_end = self.end_time_exclusive();
        let other_end = other.end_time_exclusive();
        let end = if this_end < other_end {
            this_end
        } else {
            other_end
        };
        Self::new(start, end - start)
    }

    /// `start_time <= time < end_time_exclusive`
    pub fn contains(&self, time: RationalTime) -> bool {
        self.start_time <= time && time < self.end_time_exclusive()
    }

    /// Whether `other` lies entirely within `self`, with `epsilon` seconds of slack
    pub fn contains_range(&self, other: &Self, epsilon: f64) -> bool {
        let (start, end) = self.bounds_seconds();
        let (other_start, other_end) = other.bounds_seconds();
        start - other_start <= epsilon && other_end - end <= epsilon
    }

    /// `self` starts before `other` and ends inside it
    pub fn overlaps(&self, other: &Self, epsilon: f64) -> bool {
        let (start, end) = self.bounds_seconds();
        let (other_start, other_end) = other.bounds_seconds();
        less_than(start, other_start, epsilon)
            && greater_than(end, other_start, epsilon)
            && greater_than(other_end, end, epsilon)
    }

    /// Whether the two ranges share any time, with `epsilon` seconds of slack
    pub fn intersects(&self, other: &Self, epsilon: f64) -> bool {
        let (start, end) = self.bounds_seconds();
        let (other_start, other_end) = other.bounds_seconds();
        less_than(start, other_end, epsilon) && greater_than(end, other_start, epsilon)
    }

    /// `self` ends at or before `other` begins
    pub fn before(&self, other: &Self, epsilon: f64) -> bool {
        let end = self.end_time_exclusive().to_seconds();
        let other_start = other.start_time.to_seconds();
        less_than(end, other_start, epsilon) || (end - other_start).abs() <= epsilon
    }

    /// `self` ends exactly where `other` begins
    pub fn meets(&self, other: &Self, epsilon: f64) -> bool {
        let end = self.end_time_exclusive().to_seconds();
        let other_start = other.start_time.to_seconds();
        (end - other_start).abs() <= epsilon
    }

    /// A range from a start and an exclusive end
    pub fn range_from_start_end_time(start: RationalTime, end_exclusive: RationalTime) -> Self {
        Self::new(
            start,
            RationalTime::duration_from_start_end_time(start, end_exclusive),
        )
    }

    /// A range from a start and an inclusive end
    pub fn range_from_start_end_time_inclusive(
        start: RationalTime,
        end_inclusive: RationalTime,
    ) -> Self {
        Self::new(
            start,
            RationalTime::duration_from_start_end_time_inclusive(start, end_inclusive),
        )
    }

    fn bounds_seconds(&self) -> (f64, f64) {
        (
            self.start_time.to_seconds(),
            self.end_time_exclusive().to_seconds(),
        )
    }
}

fn greater_than(lhs: f64, rhs: f64, epsilon: f64) -> bool {
    lhs - rhs >= epsilon
}

fn less_than(lhs: f64, rhs: f64, epsilon: f64) -> bool {
    rhs - lhs >= epsilon
}

impl PartialEq for TimeRange {
    /// Start and duration each agree within [`DEFAULT_EPSILON`] seconds
    fn eq(&self, other: &Self) -> bool {
        let start = self.start_time - other.start_time;
        let duration = self.duration - other.duration;
        start.to_seconds().abs() < DEFAULT_EPSILON && duration.to_seconds().abs() < DEFAULT_EPSILON
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimeRange({}, {})", self.start_time, self.duration)
    }
}
