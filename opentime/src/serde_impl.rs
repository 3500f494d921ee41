//! JSON wire representation of the time types
//!
//! Numeric fields accept `null` and read it back as NaN.

use crate::{RationalTime, TimeRange, TimeTransform};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const RATIONAL_TIME_SCHEMA: &str = "RationalTime.1";
const TIME_RANGE_SCHEMA: &str = "TimeRange.1";
const TIME_TRANSFORM_SCHEMA: &str = "TimeTransform.1";

fn nullable_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

fn check_schema<E: serde::de::Error>(found: Option<&str>, expected: &str) -> Result<(), E> {
    match found {
        None => Ok(()),
        Some(schema) if schema.split('.').next() == expected.split('.').next() => Ok(()),
        Some(schema) => Err(E::custom(format!(
            "expected {expected} object, got {schema}"
        ))),
    }
}

#[derive(Serialize)]
struct RationalTimeRepr {
    #[serde(rename = "OTIO_SCHEMA")]
    schema: &'static str,
    rate: f64,
    value: f64,
}

impl Serialize for RationalTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RationalTimeRepr {
            schema: RATIONAL_TIME_SCHEMA,
            rate: self.rate(),
            value: self.value(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RationalTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = OwnedRationalTime::deserialize(deserializer)?;
        check_schema::<D::Error>(repr.schema.as_deref(), RATIONAL_TIME_SCHEMA)?;
        Ok(RationalTime::new(repr.value, repr.rate))
    }
}

#[derive(Deserialize)]
struct OwnedRationalTime {
    #[serde(rename = "OTIO_SCHEMA", default)]
    schema: Option<String>,
    #[serde(deserialize_with = "nullable_f64")]
    rate: f64,
    #[serde(deserialize_with = "nullable_f64")]
    value: f64,
}

#[derive(Serialize)]
struct TimeRangeRepr {
    #[serde(rename = "OTIO_SCHEMA")]
    schema: &'static str,
    duration: RationalTime,
    start_time: RationalTime,
}

#[derive(Deserialize)]
struct OwnedTimeRange {
    #[serde(rename = "OTIO_SCHEMA", default)]
    schema: Option<String>,
    duration: RationalTime,
    start_time: RationalTime,
}

impl Serialize for TimeRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        TimeRangeRepr {
            schema: TIME_RANGE_SCHEMA,
            duration: self.duration(),
            start_time: self.start_time(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TimeRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = OwnedTimeRange::deserialize(deserializer)?;
        check_schema::<D::Error>(repr.schema.as_deref(), TIME_RANGE_SCHEMA)?;
        Ok(TimeRange::new(repr.start_time, repr.duration))
    }
}

#[derive(Serialize)]
struct TimeTransformRepr {
    #[serde(rename = "OTIO_SCHEMA")]
    schema: &'static str,
    offset: RationalTime,
    rate: f64,
    scale: f64,
}

#[derive(Deserialize)]
struct OwnedTimeTransform {
    #[serde(rename = "OTIO_SCHEMA", default)]
    schema: Option<String>,
    offset: RationalTime,
    #[serde(deserialize_with = "nullable_f64")]
    rate: f64,
    #[serde(deserialize_with = "nullable_f64")]
    scale: f64,
}

impl Serialize for TimeTransform {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        TimeTransformRepr {
            schema: TIME_TRANSFORM_SCHEMA,
            offset: self.offset(),
            rate: self.rate(),
            scale: self.scale(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TimeTransform {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = OwnedTimeTransform::deserialize(deserializer)?;
        check_schema::<D::Error>(repr.schema.as_deref(), TIME_TRANSFORM_SCHEMA)?;
        Ok(TimeTransform::new(repr.offset, repr.scale, repr.rate))
    }
}
