//! Attributes shared by every item that occupies time in a composition

use crate::decoder::FieldReader;
use crate::encoder::ObjectWriter;
use crate::effect::Effect;
use crate::marker::Marker;
use crate::serializable::SerializableObject;
use crate::types::{Color, Metadata};
use crate::Result;
use opentime::TimeRange;

/// Name, metadata, trim, attachments, enable flag and colour
#[derive(Debug, Clone, PartialEq)]
pub struct ItemData {
    /// Display name
    pub name: String,
    /// User data
    pub metadata: Metadata,
    /// Explicit trim in the item's own time space
    pub source_range: Option<TimeRange>,
    /// Effects, applied in order
    pub effects: Vec<Effect>,
    /// Markers over the item
    pub markers: Vec<Marker>,
    /// Disabled items keep their time but are not shown
    pub enabled: bool,
    /// Display colour
    pub color: Option<Color>,
}

impl Default for ItemData {
    fn default() -> Self {
        Self {
            name: String::new(),
            metadata: Metadata::new(),
            source_range: None,
            effects: Vec::new(),
            markers: Vec::new(),
            enabled: true,
            color: None,
        }
    }
}

impl ItemData {
    /// Item data with only a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Item data with a name and an explicit trim
    pub fn with_source_range(name: impl Into<String>, source_range: TimeRange) -> Self {
        Self {
            name: name.into(),
            source_range: Some(source_range),
            ..Default::default()
        }
    }

    pub(crate) fn read_fields(&mut self, reader: &FieldReader<'_>) -> Result<()> {
        self.name = reader.string("name")?;
        self.metadata = reader.metadata("metadata")?;
        self.source_range = reader.typed("source_range")?;
        self.effects = reader.objects_as("effects", SerializableObject::into_effect)?;
        self.markers = reader.objects_as("markers", SerializableObject::into_marker)?;
        self.enabled = reader.bool_or("enabled", true)?;
        self.color = reader.typed("color")?;
        Ok(())
    }

    pub(crate) fn write_fields(&self, writer: ObjectWriter) -> Result<ObjectWriter> {
        writer
            .string("name", &self.name)
            .metadata("metadata", &self.metadata)
            .optional("source_range", self.source_range.as_ref())?
            .objects("effects", &self.effects)?
            .objects("markers", &self.markers)?
            .value("enabled", self.enabled.into())
            .optional("color", self.color.as_ref())
    }
}
