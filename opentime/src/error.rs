//! Error types for time conversions

/// Errors produced when converting to or from timecode and time strings
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TimecodeError {
    /// The time value or rate is NaN, or the rate is not positive
    #[error("Invalid time: {0}")]
    InvalidTime(String),

    /// The rate rounds to less than one frame per second
    #[error("Invalid timecode rate: {0}")]
    InvalidRate(f64),

    /// Negative times cannot be expressed as timecode
    #[error("Negative timecode not supported")]
    NegativeTimecode,

    /// Drop-frame timecode was requested at a rate that has no drop-frame form
    #[error("Rate {0} does not support drop-frame timecode")]
    DropFrameUnsupported(f64),

    /// The input string does not match `HH:MM:SS:FF` / `HH:MM:SS;FF`
    #[error("Invalid timecode format: {0}")]
    InvalidFormat(String),

    /// The input string does not match `HH:MM:SS.sss`
    #[error("Invalid time string format: {0}")]
    InvalidTimeString(String),
}
