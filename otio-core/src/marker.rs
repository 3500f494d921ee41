//! Markers: annotations over a range of an item

use crate::constants::schemas;
use crate::decoder::FieldReader;
use crate::encoder::ObjectWriter;
use crate::schema::Schema;
use crate::serializable::OtioSerializable;
use crate::types::{MarkerColor, Metadata};
use crate::Result;
use opentime::TimeRange;
use serde_json::Value;

/// A named, coloured note attached to an item
///
/// `marked_range` is expressed in the owning item's own time space.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Marker {
    /// Display name
    pub name: String,
    /// User data
    pub metadata: Metadata,
    /// Span the marker covers
    pub marked_range: TimeRange,
    /// Display colour
    pub color: MarkerColor,
    /// Free text
    pub comment: String,
}

impl Marker {
    /// Create a zero-length green marker
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Create a marker over `marked_range`
    pub fn with_range(name: impl Into<String>, marked_range: TimeRange, color: MarkerColor) -> Self {
        Self {
            name: name.into(),
            marked_range,
            color,
            ..Default::default()
        }
    }

    /// Value equality
    pub fn is_equivalent_to(&self, other: &Marker) -> bool {
        self == other
    }

    pub(crate) fn read_fields(&mut self, reader: &FieldReader<'_>) -> Result<()> {
        self.name = reader.string("name")?;
        self.metadata = reader.metadata("metadata")?;
        self.marked_range = reader.typed("marked_range")?.unwrap_or_default();
        let color = reader.string_or("color", MarkerColor::default().as_str())?;
        self.color = MarkerColor::from(color.as_str());
        self.comment = reader.string("comment")?;
        Ok(())
    }
}

impl OtioSerializable for Marker {
    fn schema(&self) -> Schema {
        schemas::MARKER
    }

    fn to_json_value(&self) -> Result<Value> {
        Ok(ObjectWriter::new(&self.schema())
            .string("name", &self.name)
            .metadata("metadata", &self.metadata)
            .serialize("marked_range", &self.marked_range)?
            .string("color", self.color.as_str())
            .string("comment", &self.comment)
            .finish())
    }
}
