//! # opentime
//!
//! Exact rational time primitives used by the timeline data model.
//!
//! ## Modules
//!
//! - `rational_time`: A point in time as `value / rate`, plus timecode conversion
//! - `time_range`: A half-open span of time
//! - `time_transform`: Offset/scale/rate mapping between time spaces
//! - `error`: Timecode and time string parse errors

#![warn(missing_docs)]

pub mod error;
pub mod rational_time;
mod serde_impl;
pub mod time_range;
pub mod time_transform;

pub use error::TimecodeError;
pub use rational_time::{DropFrame, RationalTime};
pub use time_range::{TimeRange, DEFAULT_EPSILON};
pub use time_transform::TimeTransform;
