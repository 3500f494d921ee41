//! Transitions between adjacent items of a track

use crate::decoder::FieldReader;
use crate::encoder::ObjectWriter;
use crate::types::Metadata;
use crate::Result;
use opentime::RationalTime;

/// Standard cross dissolve
pub const SMPTE_DISSOLVE: &str = "SMPTE_Dissolve";

/// Producer-specific transition
pub const CUSTOM_TRANSITION: &str = "Custom_Transition";

/// A blend that overlaps its neighbours by `in_offset` and `out_offset`
///
/// Transitions are not visible: a track does not advance past them.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Display name
    pub name: String,
    /// User data
    pub metadata: Metadata,
    /// Kind of blend, e.g. [`SMPTE_DISSOLVE`]
    pub transition_type: String,
    /// Overlap into the preceding item
    pub in_offset: RationalTime,
    /// Overlap into the following item
    pub out_offset: RationalTime,
}

impl Default for Transition {
    fn default() -> Self {
        Self {
            name: String::new(),
            metadata: Metadata::new(),
            transition_type: SMPTE_DISSOLVE.to_string(),
            in_offset: RationalTime::default(),
            out_offset: RationalTime::default(),
        }
    }
}

impl Transition {
    /// A transition of `transition_type` with the given overlaps
    pub fn new(
        name: impl Into<String>,
        transition_type: impl Into<String>,
        in_offset: RationalTime,
        out_offset: RationalTime,
    ) -> Self {
        Self {
            name: name.into(),
            metadata: Metadata::new(),
            transition_type: transition_type.into(),
            in_offset,
            out_offset,
        }
    }

    /// `in_offset + out_offset`
    pub fn duration(&self) -> RationalTime {
        self.in_offset + self.out_offset
    }

    pub(crate) fn read_fields(&mut self, reader: &FieldReader<'_>) -> Result<()> {
        self.name = reader.string("name")?;
        self.metadata = reader.metadata("metadata")?;
        self.transition_type = reader.string_or("transition_type", SMPTE_DISSOLVE)?;
        self.in_offset = reader.typed("in_offset")?.unwrap_or_default();
        self.out_offset = reader.typed("out_offset")?.unwrap_or_default();
        Ok(())
    }

    pub(crate) fn write_fields(&self, writer: ObjectWriter) -> Result<ObjectWriter> {
        Ok(writer
            .string("name", &self.name)
            .metadata("metadata", &self.metadata)
            .string("transition_type", &self.transition_type)
            .serialize("in_offset", &self.in_offset)?
            .serialize("out_offset", &self.out_offset)?)
    }
}
