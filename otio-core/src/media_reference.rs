//! Media references: where a clip's media lives, or how it is made

use crate::constants::schemas;
use crate::decoder::FieldReader;
use crate::encoder::ObjectWriter;
use crate::error::OtioError;
use crate::schema::Schema;
use crate::serializable::OtioSerializable;
use crate::types::{Box2d, Metadata};
use crate::Result;
use opentime::{RationalTime, TimeRange};
use serde_json::Value;

/// Widest zero padding honoured for image sequence frame numbers
pub const MAX_FRAME_ZERO_PADDING: usize = 32;

/// What an image sequence does when a frame file is absent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MissingFramePolicy {
    /// Fail
    #[default]
    Error,
    /// Repeat the previous frame
    Hold,
    /// Show black
    Black,
}

impl MissingFramePolicy {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            MissingFramePolicy::Error => "error",
            MissingFramePolicy::Hold => "hold",
            MissingFramePolicy::Black => "black",
        }
    }

    fn parse(name: &str) -> Result<Self> {
        match name {
            "error" | "" => Ok(MissingFramePolicy::Error),
            "hold" => Ok(MissingFramePolicy::Hold),
            "black" => Ok(MissingFramePolicy::Black),
            other => Err(OtioError::json(format!("unknown missing_frame_policy '{other}'"))),
        }
    }
}

/// Numbered image files forming one piece of media
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSequence {
    /// Directory or URL prefix
    pub target_url_base: String,
    /// File name part before the frame number
    pub name_prefix: String,
    /// File name part after the frame number, usually the extension
    pub name_suffix: String,
    /// Number of the first file
    pub start_frame: i64,
    /// Increment between consecutive files
    pub frame_step: i64,
    /// Frames per second of the sequence
    pub rate: f64,
    /// Minimum digits of the frame number
    pub frame_zero_padding: usize,
    /// Behaviour for absent files
    pub missing_frame_policy: MissingFramePolicy,
}

impl Default for ImageSequence {
    fn default() -> Self {
        Self {
            target_url_base: String::new(),
            name_prefix: String::new(),
            name_suffix: String::new(),
            start_frame: 1,
            frame_step: 1,
            rate: 1.0,
            frame_zero_padding: 0,
            missing_frame_policy: MissingFramePolicy::Error,
        }
    }
}

/// The flavour of a [`MediaReference`]
#[derive(Debug, Clone, PartialEq)]
pub enum MediaReferenceKind {
    /// `ExternalReference.1`
    External {
        /// Location of the media
        target_url: String,
    },
    /// `MissingReference.1`
    Missing,
    /// `GeneratorReference.1`
    Generator {
        /// Generator identifier, e.g. `"SMPTEBars"`
        generator_kind: String,
        /// Generator settings
        parameters: Metadata,
    },
    /// `ImageSequenceReference.1`
    ImageSequence(ImageSequence),
}

/// Media a clip can resolve to
#[derive(Debug, Clone, PartialEq)]
pub struct MediaReference {
    /// Display name
    pub name: String,
    /// User data
    pub metadata: Metadata,
    /// Range of media that exists
    pub available_range: Option<TimeRange>,
    /// Image extent of the media
    pub available_image_bounds: Option<Box2d>,
    /// Flavour and flavour-specific data
    pub kind: MediaReferenceKind,
}

impl Default for MediaReference {
    fn default() -> Self {
        Self::missing()
    }
}

impl MediaReference {
    fn with_kind(kind: MediaReferenceKind) -> Self {
        Self {
            name: String::new(),
            metadata: Metadata::new(),
            available_range: None,
            available_image_bounds: None,
            kind,
        }
    }

    /// Reference to media at `target_url`
    pub fn external(target_url: impl Into<String>) -> Self {
        Self::with_kind(MediaReferenceKind::External {
            target_url: target_url.into(),
        })
    }

    /// Placeholder for media that is not available
    pub fn missing() -> Self {
        Self::with_kind(MediaReferenceKind::Missing)
    }

    /// Procedural media
    pub fn generator(generator_kind: impl Into<String>) -> Self {
        Self::with_kind(MediaReferenceKind::Generator {
            generator_kind: generator_kind.into(),
            parameters: Metadata::new(),
        })
    }

    /// Image sequence rooted at `target_url_base` with default numbering
    pub fn image_sequence(target_url_base: impl Into<String>) -> Self {
        Self::with_kind(MediaReferenceKind::ImageSequence(ImageSequence {
            target_url_base: target_url_base.into(),
            ..Default::default()
        }))
    }

    /// Set the available range
    pub fn with_available_range(mut self, range: TimeRange) -> Self {
        self.available_range = Some(range);
        self
    }

    /// Set the image bounds
    pub fn with_image_bounds(mut self, bounds: Box2d) -> Self {
        self.available_image_bounds = Some(bounds);
        self
    }

    /// Set the name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// True for `MissingReference`
    pub fn is_missing_reference(&self) -> bool {
        matches!(self.kind, MediaReferenceKind::Missing)
    }

    /// URL of external media
    pub fn target_url(&self) -> Option<&str> {
        match &self.kind {
            MediaReferenceKind::External { target_url } => Some(target_url),
            _ => None,
        }
    }

    /// Image sequence settings
    pub fn as_image_sequence(&self) -> Option<&ImageSequence> {
        match &self.kind {
            MediaReferenceKind::ImageSequence(seq) => Some(seq),
            _ => None,
        }
    }

    /// Mutable image sequence settings
    pub fn as_image_sequence_mut(&mut self) -> Option<&mut ImageSequence> {
        match &mut self.kind {
            MediaReferenceKind::ImageSequence(seq) => Some(seq),
            _ => None,
        }
    }

    /// Value equality
    pub fn is_equivalent_to(&self, other: &MediaReference) -> bool {
        self == other
    }

    pub(crate) fn read_fields(&mut self, reader: &FieldReader<'_>) -> Result<()> {
        self.name = reader.string("name")?;
        self.metadata = reader.metadata("metadata")?;
        self.available_range = reader.typed("available_range")?;
        self.available_image_bounds = reader.typed("available_image_bounds")?;

        match &mut self.kind {
            MediaReferenceKind::External { target_url } => {
                *target_url = reader.string("target_url")?;
            }
            MediaReferenceKind::Missing => {}
            MediaReferenceKind::Generator {
                generator_kind,
                parameters,
            } => {
                *generator_kind = reader.string("generator_kind")?;
                *parameters = reader.metadata("parameters")?;
            }
            MediaReferenceKind::ImageSequence(seq) => {
                seq.target_url_base = reader.string("target_url_base")?;
                seq.name_prefix = reader.string("name_prefix")?;
                seq.name_suffix = reader.string("name_suffix")?;
                seq.start_frame = reader.i64_or("start_frame", 1)?;
                seq.frame_step = reader.i64_or("frame_step", 1)?;
                seq.rate = reader.f64_or("rate", 1.0)?;
                seq.frame_zero_padding = reader
                    .i64_or("frame_zero_padding", 0)?
                    .clamp(0, MAX_FRAME_ZERO_PADDING as i64) as usize;
                seq.missing_frame_policy =
                    MissingFramePolicy::parse(&reader.string("missing_frame_policy")?)?;
            }
        }
        Ok(())
    }
}

impl ImageSequence {
    /// Files per second; a rate that is not a positive number cannot be resolved
    fn playback_rate(&self) -> Result<f64> {
        let rate = self.rate / self.frame_step.max(1) as f64;
        if rate.is_nan() || rate <= 0.0 || rate.is_infinite() {
            return Err(OtioError::CannotComputeAvailableRange);
        }
        Ok(rate)
    }

    fn frame_number(&self, image_number: i64, size: usize) -> Result<i64> {
        image_number
            .checked_mul(self.frame_step)
            .and_then(|offset| self.start_frame.checked_add(offset))
            .ok_or(OtioError::IndexOutOfBounds {
                index: image_number,
                size,
            })
    }

    /// Number of files covered by `available_range`
    pub fn number_of_images_in_sequence(&self, available_range: Option<&TimeRange>) -> Result<i64> {
        match available_range {
            Some(range) => Ok(range
                .duration()
                .value_rescaled_to(self.playback_rate()?)
                .ceil()
                .max(0.0) as i64),
            None => Ok(0),
        }
    }

    /// Frame number of the last file
    pub fn end_frame(&self, available_range: Option<&TimeRange>) -> Result<i64> {
        let count = self.number_of_images_in_sequence(available_range)?;
        if count == 0 {
            return Ok(self.start_frame);
        }
        self.frame_number(count - 1, count as usize)
    }

    /// Frame number of the file shown at `time`
    pub fn frame_for_time(
        &self,
        time: RationalTime,
        available_range: Option<&TimeRange>,
    ) -> Result<i64> {
        let range = available_range.ok_or(OtioError::CannotComputeAvailableRange)?;
        if !range.contains(time) {
            return Err(OtioError::InvalidTimecode(format!(
                "{time} is outside the sequence range {range}"
            )));
        }
        let offset = (time - range.start_time()).value_rescaled_to(self.playback_rate()?);
        let count = self.number_of_images_in_sequence(available_range)?;
        self.frame_number(offset.floor() as i64, count as usize)
    }

    /// URL of the `image_number`-th file, counted from zero
    pub fn target_url_for_image_number(
        &self,
        image_number: i64,
        available_range: Option<&TimeRange>,
    ) -> Result<String> {
        let count = self.number_of_images_in_sequence(available_range)?;
        let size = count.max(0) as usize;
        if available_range.is_some() && (image_number < 0 || image_number >= count) {
            return Err(OtioError::IndexOutOfBounds {
                index: image_number,
                size,
            });
        }

        let frame = self.frame_number(image_number, size)?;
        let width = self.frame_zero_padding.min(MAX_FRAME_ZERO_PADDING);
        let digits = if frame < 0 {
            format!("-{:0width$}", frame.unsigned_abs())
        } else {
            format!("{frame:0width$}")
        };

        let mut url = self.target_url_base.clone();
        if !url.is_empty() && !url.ends_with('/') {
            url.push('/');
        }
        url.push_str(&self.name_prefix);
        url.push_str(&digits);
        url.push_str(&self.name_suffix);
        Ok(url)
    }
}

impl OtioSerializable for MediaReference {
    fn schema(&self) -> Schema {
        match self.kind {
            MediaReferenceKind::External { .. } => schemas::EXTERNAL_REFERENCE,
            MediaReferenceKind::Missing => schemas::MISSING_REFERENCE,
            MediaReferenceKind::Generator { .. } => schemas::GENERATOR_REFERENCE,
            MediaReferenceKind::ImageSequence(_) => schemas::IMAGE_SEQUENCE_REFERENCE,
        }
    }

    fn to_json_value(&self) -> Result<Value> {
        let writer = ObjectWriter::new(&self.schema())
            .string("name", &self.name)
            .metadata("metadata", &self.metadata)
            .optional("available_range", self.available_range.as_ref())?
            .optional("available_image_bounds", self.available_image_bounds.as_ref())?;

        let writer = match &self.kind {
            MediaReferenceKind::External { target_url } => writer.string("target_url", target_url),
            MediaReferenceKind::Missing => writer,
            MediaReferenceKind::Generator {
                generator_kind,
                parameters,
            } => writer
                .string("generator_kind", generator_kind)
                .metadata("parameters", parameters),
            MediaReferenceKind::ImageSequence(seq) => writer
                .string("target_url_base", &seq.target_url_base)
                .string("name_prefix", &seq.name_prefix)
                .string("name_suffix", &seq.name_suffix)
                .value("start_frame", seq.start_frame.into())
                .value("frame_step", seq.frame_step.into())
                .number("rate", seq.rate)
                .value("frame_zero_padding", (seq.frame_zero_padding as u64).into())
                .string("missing_frame_policy", seq.missing_frame_policy.as_str()),
        };
        Ok(writer.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequence() -> (ImageSequence, TimeRange) {
        let seq = ImageSequence {
            target_url_base: "file:///shots/sh010".to_string(),
            name_prefix: "sh010.".to_string(),
            name_suffix: ".exr".to_string(),
            start_frame: 1001,
            frame_step: 1,
            rate: 24.0,
            frame_zero_padding: 4,
            missing_frame_policy: MissingFramePolicy::Hold,
        };
        (seq, TimeRange::from_values(0.0, 48.0, 24.0))
    }

    #[test]
    fn test_image_sequence_numbering() {
        let (seq, range) = sequence();
        assert_eq!(seq.number_of_images_in_sequence(Some(&range)).unwrap(), 48);
        assert_eq!(seq.end_frame(Some(&range)).unwrap(), 1048);
        assert_eq!(
            seq.frame_for_time(RationalTime::new(12.0, 24.0), Some(&range)).unwrap(),
            1013
        );
    }

    #[test]
    fn test_image_sequence_urls() {
        let (seq, range) = sequence();
        assert_eq!(
            seq.target_url_for_image_number(0, Some(&range)).unwrap(),
            "file:///shots/sh010/sh010.1001.exr"
        );
        assert!(matches!(
            seq.target_url_for_image_number(48, Some(&range)),
            Err(OtioError::IndexOutOfBounds { index: 48, size: 48 })
        ));
    }

    #[test]
    fn test_frame_step_halves_count() {
        let (mut seq, range) = sequence();
        seq.frame_step = 2;
        assert_eq!(seq.number_of_images_in_sequence(Some(&range)).unwrap(), 24);
        assert_eq!(seq.end_frame(Some(&range)).unwrap(), 1047);
    }

    #[test]
    fn test_unbounded_image_number_overflow_is_error() {
        let (mut seq, _) = sequence();
        seq.frame_step = 2;
        assert!(matches!(
            seq.target_url_for_image_number(i64::MAX / 2 + 10, None),
            Err(OtioError::IndexOutOfBounds { .. })
        ));
        assert_eq!(
            seq.target_url_for_image_number(3, None).unwrap(),
            "file:///shots/sh010/sh010.1007.exr"
        );
    }

    #[test]
    fn test_unusable_rate_cannot_compute() {
        let range = TimeRange::from_values(0.0, 48.0, 24.0);
        for rate in [0.0, -24.0, f64::NAN] {
            let (mut seq, _) = sequence();
            seq.rate = rate;
            assert_eq!(
                seq.number_of_images_in_sequence(Some(&range)),
                Err(OtioError::CannotComputeAvailableRange)
            );
            assert_eq!(seq.end_frame(Some(&range)), Err(OtioError::CannotComputeAvailableRange));
            assert!(seq.target_url_for_image_number(0, Some(&range)).is_err());
        }
    }

    #[test]
    fn test_decoded_padding_is_clamped() {
        let doc = serde_json::json!({
            "OTIO_SCHEMA": "ImageSequenceReference.1",
            "target_url_base": "file:///seq/",
            "start_frame": 7,
            "rate": 24,
            "frame_zero_padding": 1_000_000_000_i64
        });
        let reference = crate::decoder::from_json_value(&doc)
            .unwrap()
            .into_media_reference()
            .unwrap();
        let seq = reference.as_image_sequence().unwrap();
        assert_eq!(seq.frame_zero_padding, MAX_FRAME_ZERO_PADDING);
        let url = seq.target_url_for_image_number(0, None).unwrap();
        assert_eq!(url.len(), "file:///seq/".len() + MAX_FRAME_ZERO_PADDING);
    }

    #[test]
    fn test_schema_per_kind() {
        assert_eq!(MediaReference::external("a").schema().to_string(), "ExternalReference.1");
        assert_eq!(MediaReference::missing().schema().to_string(), "MissingReference.1");
        assert_eq!(MediaReference::generator("bars").schema().to_string(), "GeneratorReference.1");
        assert_eq!(
            MediaReference::image_sequence("a").schema().to_string(),
            "ImageSequenceReference.1"
        );
    }

    #[test]
    fn test_external_wire_fields() {
        let reference = MediaReference::external("file:///a.mov")
            .with_available_range(TimeRange::from_values(0.0, 100.0, 24.0));
        let value = reference.to_json_value().unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            [
                "OTIO_SCHEMA",
                "name",
                "metadata",
                "available_range",
                "available_image_bounds",
                "target_url"
            ]
        );
        assert!(value["available_image_bounds"].is_null());
    }

    #[test]
    fn test_missing_frame_policy_names() {
        assert_eq!(MissingFramePolicy::parse("hold").unwrap(), MissingFramePolicy::Hold);
        assert!(MissingFramePolicy::parse("explode").is_err());
    }
}
