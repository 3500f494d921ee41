//! Rational time values

use crate::error::TimecodeError;
use core::cmp::Ordering;
use core::fmt;
use core::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Rates that have a SMPTE timecode representation
const SMPTE_TIMECODE_RATES: [f64; 8] = [23.976, 24.0, 25.0, 29.97, 30.0, 50.0, 59.94, 60.0];

/// Drop-frame selection for [`RationalTime::to_timecode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DropFrame {
    /// Use drop-frame for 29.97 and 59.94, non-drop otherwise
    #[default]
    InferFromRate,
    /// Always non-drop
    ForceNo,
    /// Always drop-frame; fails for rates without a drop-frame form
    ForceYes,
}

/// A point in time expressed as `value` ticks at `rate` ticks per second
///
/// Equality rescales before comparing, so `RationalTime(24, 24)` equals
/// `RationalTime(1, 1)`. Use [`RationalTime::strictly_equal`] to compare
/// the raw fields.
#[derive(Debug, Clone, Copy)]
pub struct RationalTime {
    value: f64,
    rate: f64,
}

impl Default for RationalTime {
    fn default() -> Self {
        Self { value: 0.0, rate: 1.0 }
    }
}

impl RationalTime {
    /// Create a new time
    pub const fn new(value: f64, rate: f64) -> Self {
        Self { value, rate }
    }

    /// Tick count
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Ticks per second
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// True when value or rate is NaN, or the rate is not positive
    pub fn is_invalid_time(&self) -> bool {
        self.value.is_nan() || self.rate.is_nan() || self.rate <= 0.0
    }

    /// Inverse of [`is_invalid_time`](Self::is_invalid_time)
    pub fn is_valid_time(&self) -> bool {
        !self.is_invalid_time()
    }

    /// The same instant expressed at `new_rate`
    pub fn rescaled_to(&self, new_rate: f64) -> Self {
        Self::new(self.value_rescaled_to(new_rate), new_rate)
    }

    /// The tick count this instant has at `new_rate`
    pub fn value_rescaled_to(&self, new_rate: f64) -> f64 {
        if new_rate == self.rate {
            self.value
        } else {
            self.value * new_rate / self.rate
        }
    }

    /// Compare after rescaling `self` into `other`'s rate, within `delta` ticks
    pub fn almost_equal(&self, other: &Self, delta: f64) -> bool {
        (self.value_rescaled_to(other.rate) - other.value).abs() <= delta
    }

    /// Field-by-field equality without rescaling
    pub fn strictly_equal(&self, other: &Self) -> bool {
        self.value == other.value && self.rate == other.rate
    }

    /// Ordering by absolute time in seconds
    pub fn cmp_seconds(&self, other: &Self) -> Ordering {
        self.to_seconds()
            .partial_cmp(&other.to_seconds())
            .unwrap_or(Ordering::Equal)
    }

    /// Round the value down to a whole tick
    pub fn floor(&self) -> Self {
        Self::new(self.value.floor(), self.rate)
    }

    /// Round the value up to a whole tick
    pub fn ceil(&self) -> Self {
        Self::new(self.value.ceil(), self.rate)
    }

    /// Round the value to the nearest whole tick
    pub fn round(&self) -> Self {
        Self::new(self.value.round(), self.rate)
    }

    /// Convert seconds to a time at `rate`
    pub fn from_seconds(seconds: f64, rate: f64) -> Self {
        Self::new(seconds, 1.0).rescaled_to(rate)
    }

    /// A whole frame number at `rate`
    pub fn from_frames(frame: f64, rate: f64) -> Self {
        Self::new(frame.trunc(), rate)
    }

    /// Whole frames at the current rate
    pub fn to_frames(&self) -> i64 {
        self.value as i64
    }

    /// Whole frames at `rate`
    pub fn to_frames_at(&self, rate: f64) -> i64 {
        self.value_rescaled_to(rate) as i64
    }

    /// Absolute time in seconds
    pub fn to_seconds(&self) -> f64 {
        self.value_rescaled_to(1.0)
    }

    /// Duration between a start and an exclusive end, in the start's rate
    pub fn duration_from_start_end_time(start: Self, end_exclusive: Self) -> Self {
        Self::new(
            end_exclusive.value_rescaled_to(start.rate) - start.value,
            start.rate,
        )
    }

    /// Duration between a start and an inclusive end, in the start's rate
    pub fn duration_from_start_end_time_inclusive(start: Self, end_inclusive: Self) -> Self {
        Self::new(
            end_inclusive.value_rescaled_to(start.rate) - start.value + 1.0,
            start.rate,
        )
    }

    /// Whether `rate` is one of the SMPTE timecode rates
    pub fn is_smpte_timecode_rate(rate: f64) -> bool {
        SMPTE_TIMECODE_RATES.iter().any(|r| (rate - r).abs() < 0.01)
    }

    /// The SMPTE timecode rate closest to `rate`
    pub fn nearest_smpte_timecode_rate(rate: f64) -> f64 {
        SMPTE_TIMECODE_RATES
            .iter()
            .copied()
            .min_by(|a, b| {
                (rate - a)
                    .abs()
                    .partial_cmp(&(rate - b).abs())
                    .unwrap_or(Ordering::Equal)
            })
            .unwrap_or(24.0)
    }

    /// Format as SMPTE timecode at `rate`
    ///
    /// Drop-frame output uses `;` before the frame field and drops two
    /// (29.97) or four (59.94) frame numbers every minute except each tenth.
    pub fn to_timecode(&self, rate: f64, drop_frame: DropFrame) -> Result<String, TimecodeError> {
        if self.is_invalid_time() || rate.is_nan() || rate <= 0.0 {
            return Err(TimecodeError::InvalidTime(self.to_string()));
        }

        let use_drop_frame = match drop_frame {
            DropFrame::ForceNo => false,
            DropFrame::InferFromRate => is_drop_frame_rate(rate),
            DropFrame::ForceYes => {
                if !is_drop_frame_rate(rate) {
                    return Err(TimecodeError::DropFrameUnsupported(rate));
                }
                true
            }
        };

        let nominal = nominal_rate(rate)?;
        let mut frame = self.value_rescaled_to(rate).round() as i64;
        if frame < 0 {
            return Err(TimecodeError::NegativeTimecode);
        }

        if use_drop_frame {
            let overflow = || TimecodeError::InvalidTime(self.to_string());
            let dropped = drop_frames_for(nominal);
            let per_minute = nominal
                .checked_mul(60)
                .map(|frames| frames - dropped)
                .ok_or(TimecodeError::InvalidRate(rate))?;
            let per_ten_minutes = per_minute
                .checked_mul(10)
                .and_then(|frames| frames.checked_add(dropped))
                .ok_or(TimecodeError::InvalidRate(rate))?;

            let tens = frame / per_ten_minutes;
            let rem = frame % per_ten_minutes;
            frame = (dropped * 9)
                .checked_mul(tens)
                .and_then(|skipped| frame.checked_add(skipped))
                .ok_or_else(overflow)?;
            if rem > dropped {
                frame = frame
                    .checked_add(dropped * ((rem - dropped) / per_minute))
                    .ok_or_else(overflow)?;
            }
        }

        let frames = frame % nominal;
        let seconds = (frame / nominal) % 60;
        let minutes = (frame / nominal / 60) % 60;
        let hours = frame / nominal / 3600;
        let sep = if use_drop_frame { ';' } else { ':' };

        Ok(format!(
            "{hours:02}:{minutes:02}:{seconds:02}{sep}{frames:02}"
        ))
    }

    /// Format as timecode at the time's own rate
    pub fn to_timecode_auto(&self) -> Result<String, TimecodeError> {
        self.to_timecode(self.rate, DropFrame::InferFromRate)
    }

    /// Parse `HH:MM:SS:FF` (non-drop) or `HH:MM:SS;FF` (drop-frame) at `rate`
    pub fn from_timecode(timecode: &str, rate: f64) -> Result<Self, TimecodeError> {
        let bad = || TimecodeError::InvalidFormat(timecode.to_string());

        let (negative, body) = match timecode.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, timecode),
        };

        let split_at = body.rfind([':', ';']).ok_or_else(bad)?;
        let drop_frame = body.as_bytes()[split_at] == b';';
        let (hms, frames) = (&body[..split_at], &body[split_at + 1..]);

        let fields: Vec<&str> = hms.split(':').collect();
        if fields.len() != 3 || frames.len() < 2 {
            return Err(bad());
        }
        let parse = |s: &str, max_len: usize| -> Result<i64, TimecodeError> {
            if s.is_empty() || s.len() > max_len || !s.bytes().all(|b| b.is_ascii_digit()) {
                return Err(bad());
            }
            s.parse::<i64>().map_err(|_| bad())
        };
        let hours = parse(fields[0], 2)?;
        let minutes = parse(fields[1], 2)?;
        let seconds = parse(fields[2], 2)?;
        let frames = parse(frames, usize::MAX)?;
        if fields[1].len() != 2 || fields[2].len() != 2 {
            return Err(bad());
        }

        let nominal = nominal_rate(rate)?;
        let mut total = (hours * 3600 + minutes * 60 + seconds)
            .checked_mul(nominal)
            .and_then(|whole| whole.checked_add(frames))
            .ok_or_else(bad)?;
        if drop_frame {
            let total_minutes = hours * 60 + minutes;
            total -= drop_frames_for(nominal) * (total_minutes - total_minutes / 10);
        }
        if negative {
            total = -total;
        }

        Ok(Self::new(total as f64, rate))
    }

    /// Format as `HH:MM:SS.ssssss`, trimming trailing zeros of the fraction
    pub fn to_time_string(&self) -> String {
        let mut total = self.to_seconds();
        let sign = if total < 0.0 {
            total = -total;
            "-"
        } else {
            ""
        };

        let hours = (total / 3600.0) as i64;
        let minutes = ((total / 60.0) % 60.0) as i64;
        let seconds = total % 60.0;
        let whole = seconds as i64;
        let frac = seconds - whole as f64;

        let frac_str = if frac == 0.0 {
            ".0".to_string()
        } else {
            let formatted = format!("{frac:.6}");
            formatted
                .trim_start_matches('0')
                .trim_end_matches('0')
                .to_string()
        };

        format!("{sign}{hours:02}:{minutes:02}:{whole:02}{frac_str}")
    }

    /// Parse `HH:MM:SS` or `HH:MM:SS.sss` into a time at `rate`
    pub fn from_time_string(time_string: &str, rate: f64) -> Result<Self, TimecodeError> {
        let bad = || TimecodeError::InvalidTimeString(time_string.to_string());

        let (negative, body) = match time_string.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, time_string),
        };
        let fields: Vec<&str> = body.split(':').collect();
        if fields.len() != 3 || fields[1].len() != 2 {
            return Err(bad());
        }
        let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        if !digits(fields[0]) || !digits(fields[1]) {
            return Err(bad());
        }
        let seconds_ok = match fields[2].split_once('.') {
            Some((whole, frac)) => digits(whole) && digits(frac),
            None => digits(fields[2]),
        };
        if !seconds_ok {
            return Err(bad());
        }

        let hours: f64 = fields[0].parse().map_err(|_| bad())?;
        let minutes: f64 = fields[1].parse().map_err(|_| bad())?;
        let seconds: f64 = fields[2].parse().map_err(|_| bad())?;

        let mut total = hours * 3600.0 + minutes * 60.0 + seconds;
        if negative {
            total = -total;
        }
        Ok(Self::from_seconds(total, rate))
    }
}

fn is_drop_frame_rate(rate: f64) -> bool {
    (rate - 29.97).abs() < 0.01 || (rate - 59.94).abs() < 0.01
}

/// Whole frames per second used for timecode fields; at least one
fn nominal_rate(rate: f64) -> Result<i64, TimecodeError> {
    let nominal = rate.round();
    if nominal.is_nan() || nominal < 1.0 || nominal >= i64::MAX as f64 {
        return Err(TimecodeError::InvalidRate(rate));
    }
    Ok(nominal as i64)
}

fn drop_frames_for(nominal_rate: i64) -> i64 {
    if nominal_rate >= 60 {
        4
    } else {
        2
    }
}

impl PartialEq for RationalTime {
    fn eq(&self, other: &Self) -> bool {
        self.value_rescaled_to(other.rate) == other.value
    }
}

impl PartialOrd for RationalTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.to_seconds().partial_cmp(&other.to_seconds())
    }
}

impl Add for RationalTime {
    type Output = RationalTime;

    /// The result carries the higher of the two rates. A time whose rate is
    /// not positive acts as zero.
    fn add(self, other: Self) -> Self {
        if self.rate <= 0.0 {
            return other;
        }
        if other.rate <= 0.0 {
            return self;
        }
        if self.rate < other.rate {
            Self::new(self.value_rescaled_to(other.rate) + other.value, other.rate)
        } else {
            Self::new(self.value + other.value_rescaled_to(self.rate), self.rate)
        }
    }
}

impl Sub for RationalTime {
    type Output = RationalTime;

    fn sub(self, other: Self) -> Self {
        if self.rate <= 0.0 {
            return -other;
        }
        if other.rate <= 0.0 {
            return self;
        }
        if self.rate < other.rate {
            Self::new(self.value_rescaled_to(other.rate) - other.value, other.rate)
        } else {
            Self::new(self.value - other.value_rescaled_to(self.rate), self.rate)
        }
    }
}

impl Neg for RationalTime {
    type Output = RationalTime;

    fn neg(self) -> Self {
        Self::new(-self.value, self.rate)
    }
}

impl AddAssign for RationalTime {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl SubAssign for RationalTime {
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl fmt::Display for RationalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RationalTime({}, {})", self.value, self.rate)
    }
}
