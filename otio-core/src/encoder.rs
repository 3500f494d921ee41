//! JSON encoding
//!
//! Every object renders itself into a [`serde_json::Value`] through
//! [`ObjectWriter`], which keeps fields in insertion order so that
//! `OTIO_SCHEMA` always comes first. The value is then written compactly
//! or with an indent.

use crate::constants::SCHEMA_KEY;
use crate::error::OtioError;
use crate::schema::Schema;
use crate::serializable::OtioSerializable;
use crate::types::Metadata;
use crate::Result;
use bytes::Bytes;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

#[cfg(feature = "logging")]
use tracing::trace;

/// Builder for one encoded object
pub(crate) struct ObjectWriter {
    fields: Map<String, Value>,
}

impl ObjectWriter {
    pub(crate) fn new(schema: &Schema) -> Self {
        Self::with_schema_string(&schema.to_string())
    }

    pub(crate) fn with_schema_string(schema: &str) -> Self {
        let mut fields = Map::new();
        fields.insert(SCHEMA_KEY.to_string(), Value::String(schema.to_string()));
        Self { fields }
    }

    pub(crate) fn value(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    pub(crate) fn string(self, key: &str, value: &str) -> Self {
        self.value(key, Value::String(value.to_string()))
    }

    pub(crate) fn metadata(self, key: &str, value: &Metadata) -> Self {
        self.value(key, Value::Object(value.clone()))
    }

    /// Non-finite numbers are written as `null`
    pub(crate) fn number(self, key: &str, value: f64) -> Self {
        self.value(key, Value::from(value))
    }

    pub(crate) fn serialize<T: Serialize>(self, key: &str, value: &T) -> Result<Self> {
        let value = serde_json::to_value(value)?;
        Ok(self.value(key, value))
    }

    /// `None` is written as `null`
    pub(crate) fn optional<T: Serialize>(self, key: &str, value: Option<&T>) -> Result<Self> {
        match value {
            Some(value) => self.serialize(key, value),
            None => Ok(self.value(key, Value::Null)),
        }
    }

    pub(crate) fn object<T: OtioSerializable + ?Sized>(self, key: &str, value: &T) -> Result<Self> {
        let value = value.to_json_value()?;
        Ok(self.value(key, value))
    }

    pub(crate) fn objects<T: OtioSerializable>(self, key: &str, values: &[T]) -> Result<Self> {
        let encoded = values
            .iter()
            .map(OtioSerializable::to_json_value)
            .collect::<Result<Vec<_>>>()?;
        Ok(self.value(key, Value::Array(encoded)))
    }

    pub(crate) fn object_map<T: OtioSerializable>(
        self,
        key: &str,
        values: &BTreeMap<String, T>,
    ) -> Result<Self> {
        let mut encoded = Map::new();
        for (name, value) in values {
            encoded.insert(name.clone(), value.to_json_value()?);
        }
        Ok(self.value(key, Value::Object(encoded)))
    }

    /// Append every entry of `fields` after the ones already written
    pub(crate) fn extend(mut self, fields: &Metadata) -> Self {
        for (key, value) in fields {
            if key != SCHEMA_KEY {
                self.fields.insert(key.clone(), value.clone());
            }
        }
        self
    }

    pub(crate) fn finish(self) -> Value {
        Value::Object(self.fields)
    }
}

/// Output formatting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    indent: Option<usize>,
}

impl EncodeOptions {
    /// Compact output
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretty output with `width` spaces per level
    pub fn indent(mut self, width: usize) -> Self {
        self.indent = Some(width);
        self
    }

    /// Indent width, if pretty printing
    pub fn indent_width(&self) -> Option<usize> {
        self.indent
    }
}

/// Encode into a JSON value
pub fn to_json_value<T: OtioSerializable + ?Sized>(object: &T) -> Result<Value> {
    object.to_json_value()
}

fn write_value<W: Write>(writer: W, value: &Value, options: &EncodeOptions) -> Result<()> {
    match options.indent {
        None => serde_json::to_writer(writer, value)?,
        Some(width) => {
            let indent = vec![b' '; width];
            let formatter = PrettyFormatter::with_indent(&indent);
            let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
            value.serialize(&mut serializer)?;
        }
    }
    Ok(())
}

/// Encode to a writer
pub fn to_json_writer<T: OtioSerializable + ?Sized, W: Write>(
    object: &T,
    writer: W,
    options: &EncodeOptions,
) -> Result<()> {
    #[cfg(feature = "logging")]
    trace!(schema = %object.schema(), "Encoding object");

    let value = object.to_json_value()?;
    write_value(writer, &value, options)
}

/// Encode to compact JSON bytes
pub fn to_json_bytes<T: OtioSerializable + ?Sized>(object: &T) -> Result<Bytes> {
    let mut buf = Vec::new();
    to_json_writer(object, &mut buf, &EncodeOptions::default())?;
    Ok(Bytes::from(buf))
}

/// Encode to a compact JSON string
pub fn to_json_string<T: OtioSerializable + ?Sized>(object: &T) -> Result<String> {
    to_json_string_with(object, &EncodeOptions::default())
}

/// Encode to a JSON string with the given formatting
pub fn to_json_string_with<T: OtioSerializable + ?Sized>(
    object: &T,
    options: &EncodeOptions,
) -> Result<String> {
    let mut buf = Vec::new();
    to_json_writer(object, &mut buf, options)?;
    String::from_utf8(buf).map_err(|err| OtioError::json(err.to_string()))
}

/// Encode and write to a file, replacing it if it exists
pub fn to_json_file<T: OtioSerializable + ?Sized>(
    object: &T,
    path: impl AsRef<Path>,
    options: &EncodeOptions,
) -> Result<()> {
    let file = std::fs::File::create(path.as_ref())?;
    let mut writer = std::io::BufWriter::new(file);
    to_json_writer(object, &mut writer, options)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::Marker;
    use crate::unknown::UnknownSchema;

    #[test]
    fn test_schema_written_first() {
        let value = ObjectWriter::new(&Schema::new("Thing", 4))
            .string("name", "n")
            .number("x", 1.5)
            .finish();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["OTIO_SCHEMA", "name", "x"]);
        assert_eq!(value["OTIO_SCHEMA"], "Thing.4");
    }

    #[test]
    fn test_non_finite_numbers_become_null() {
        let value = ObjectWriter::new(&Schema::new("T", 1))
            .number("x", f64::INFINITY)
            .finish();
        assert!(value["x"].is_null());
    }

    #[test]
    fn test_compact_and_indented() {
        let marker = Marker::new("m");
        let compact = to_json_string(&marker).unwrap();
        assert!(!compact.contains('\n'));
        assert!(compact.starts_with(r#"{"OTIO_SCHEMA":"Marker.2""#));

        let pretty = to_json_string_with(&marker, &EncodeOptions::new().indent(4)).unwrap();
        assert!(pretty.contains("\n    \"OTIO_SCHEMA\": \"Marker.2\""));
    }

    #[test]
    fn test_bytes_match_string() {
        let unknown = UnknownSchema::new("Custom.1", Metadata::new());
        let bytes = to_json_bytes(&unknown).unwrap();
        assert_eq!(&bytes[..], to_json_string(&unknown).unwrap().as_bytes());
    }
}
