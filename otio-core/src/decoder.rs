//! JSON decoding with schema dispatch
//!
//! Decoding goes through a [`serde_json::Value`] tree. Each object's
//! `OTIO_SCHEMA` is resolved through the registry, a default instance is
//! created, and that instance reads its own fields. Nested polymorphic
//! fields are handed back to [`decode_value`] one element at a time.

use crate::constants::SCHEMA_KEY;
use crate::error::OtioError;
use crate::registry::{global_registry, SchemaRegistry};
use crate::sanitize::sanitize_non_finite;
use crate::schema::Schema;
use crate::serializable::SerializableObject;
use crate::types::Metadata;
use crate::unknown::UnknownSchema;
use crate::Result;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;

#[cfg(feature = "logging")]
use tracing::{trace, warn};

/// Typed view over one object's fields during decoding
pub(crate) struct FieldReader<'a> {
    fields: &'a Map<String, Value>,
    schema: &'a str,
    registry: &'a SchemaRegistry,
}

impl<'a> FieldReader<'a> {
    fn error(&self, key: &str, expected: &str) -> OtioError {
        OtioError::json(format!("{}: field '{key}' is not {expected}", self.schema))
    }

    /// The value at `key`, treating `null` as absent
    fn get(&self, key: &str) -> Option<&'a Value> {
        self.fields.get(key).filter(|value| !value.is_null())
    }

    /// Whether `key` is present with a non-null value
    pub(crate) fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// The `OTIO_SCHEMA` string of the object being read
    pub(crate) fn schema_string(&self) -> &'a str {
        self.schema
    }

    /// Every field, untouched
    pub(crate) fn raw_fields(&self) -> &'a Map<String, Value> {
        self.fields
    }

    /// String field; missing reads as empty
    pub(crate) fn string(&self, key: &str) -> Result<String> {
        self.string_or(key, "")
    }

    pub(crate) fn string_or(&self, key: &str, default: &str) -> Result<String> {
        match self.get(key) {
            None => Ok(default.to_string()),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(_) => Err(self.error(key, "a string")),
        }
    }

    /// Free-form mapping; missing reads as empty
    pub(crate) fn metadata(&self, key: &str) -> Result<Metadata> {
        match self.get(key) {
            None => Ok(Metadata::new()),
            Some(Value::Object(map)) => Ok(map.clone()),
            Some(_) => Err(self.error(key, "an object")),
        }
    }

    /// Field decoded through its serde implementation
    pub(crate) fn typed<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => T::deserialize(value).map(Some).map_err(|err| {
                OtioError::json(format!("{}: field '{key}': {err}", self.schema))
            }),
        }
    }

    /// Number; `null` is the placeholder for a non-finite literal and reads as NaN
    pub(crate) fn f64_or(&self, key: &str, default: f64) -> Result<f64> {
        match self.fields.get(key) {
            None => Ok(default),
            Some(Value::Null) => Ok(f64::NAN),
            Some(value) => value.as_f64().ok_or_else(|| self.error(key, "a number")),
        }
    }

    /// Integer; integral floats are accepted
    pub(crate) fn i64_or(&self, key: &str, default: i64) -> Result<i64> {
        match self.get(key) {
            None => Ok(default),
            Some(value) => value
                .as_i64()
                .or_else(|| value.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
                .ok_or_else(|| self.error(key, "an integer")),
        }
    }

    pub(crate) fn bool_or(&self, key: &str, default: bool) -> Result<bool> {
        match self.get(key) {
            None => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(_) => Err(self.error(key, "a boolean")),
        }
    }

    /// A nested object, dispatched on its own schema
    pub(crate) fn object(&self, key: &str) -> Result<Option<SerializableObject>> {
        self.get(key)
            .map(|value| decode_value(value, self.registry))
            .transpose()
    }

    /// An array of nested objects, each dispatched on its own schema
    pub(crate) fn objects(&self, key: &str) -> Result<Vec<SerializableObject>> {
        match self.get(key) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| decode_value(item, self.registry))
                .collect(),
            Some(_) => Err(self.error(key, "an array")),
        }
    }

    /// An array of nested objects that must all convert to `T`
    pub(crate) fn objects_as<T>(
        &self,
        key: &str,
        convert: impl Fn(SerializableObject) -> Result<T>,
    ) -> Result<Vec<T>> {
        self.objects(key)?.into_iter().map(convert).collect()
    }

    /// A mapping of key to nested object
    pub(crate) fn object_map(&self, key: &str) -> Result<Vec<(String, SerializableObject)>> {
        match self.get(key) {
            None => Ok(Vec::new()),
            Some(Value::Object(map)) => map
                .iter()
                .map(|(k, v)| Ok((k.clone(), decode_value(v, self.registry)?)))
                .collect(),
            Some(_) => Err(self.error(key, "an object")),
        }
    }
}

/// Decode one JSON object into the type its `OTIO_SCHEMA` names
///
/// Unregistered schemas become [`SerializableObject::Unknown`].
pub fn decode_value(value: &Value, registry: &SchemaRegistry) -> Result<SerializableObject> {
    let fields = value
        .as_object()
        .ok_or_else(|| OtioError::json("expected a JSON object"))?;
    let schema_string = fields
        .get(SCHEMA_KEY)
        .and_then(Value::as_str)
        .ok_or_else(|| OtioError::json("missing OTIO_SCHEMA field"))?;
    let schema = Schema::parse(schema_string)?;

    let mut object = match registry.create(schema.name()) {
        Ok(object) => object,
        Err(_) => {
            #[cfg(feature = "logging")]
            warn!(schema = schema_string, "Unregistered schema, keeping fields as UnknownSchema");
            return Ok(SerializableObject::Unknown(UnknownSchema::new(
                schema_string,
                fields.clone(),
            )));
        }
    };

    let reader = FieldReader {
        fields,
        schema: schema_string,
        registry,
    };
    object.read_fields(&reader)?;
    Ok(object)
}

/// Decode an already parsed document using the process-wide registry
pub fn from_json_value(value: &Value) -> Result<SerializableObject> {
    decode_value(value, global_registry())
}

/// Decode JSON bytes using the process-wide registry
///
/// Bare `Inf`, `-Infinity` and `NaN` literals are accepted.
pub fn from_json_bytes(input: &[u8]) -> Result<SerializableObject> {
    from_json_bytes_with(input, global_registry())
}

/// Decode JSON bytes against an explicit registry
pub fn from_json_bytes_with(input: &[u8], registry: &SchemaRegistry) -> Result<SerializableObject> {
    #[cfg(feature = "logging")]
    trace!(len = input.len(), "Decoding document");

    let sanitized = sanitize_non_finite(input);
    let mut deserializer = serde_json::Deserializer::from_slice(&sanitized);
    let value = Value::deserialize(&mut deserializer)?;
    deserializer.end()?;
    decode_value(&value, registry)
}

/// Decode a JSON string using the process-wide registry
pub fn from_json_str(input: &str) -> Result<SerializableObject> {
    from_json_bytes(input.as_bytes())
}

/// Decode a JSON string against an explicit registry
pub fn from_json_str_with(input: &str, registry: &SchemaRegistry) -> Result<SerializableObject> {
    from_json_bytes_with(input.as_bytes(), registry)
}

/// Read and decode a file using the process-wide registry
pub fn from_json_file(path: impl AsRef<Path>) -> Result<SerializableObject> {
    from_json_file_with(path, global_registry())
}

/// Read and decode a file against an explicit registry
pub fn from_json_file_with(
    path: impl AsRef<Path>,
    registry: &SchemaRegistry,
) -> Result<SerializableObject> {
    let bytes = std::fs::read(path.as_ref())?;
    from_json_bytes_with(&bytes, registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composable::Composable;
    use serde_json::json;

    #[test]
    fn test_non_object_is_json_error() {
        assert!(matches!(from_json_str("[1, 2]"), Err(OtioError::JsonError(_))));
        assert!(matches!(from_json_str("{\"a\": 1}"), Err(OtioError::JsonError(_))));
        assert!(matches!(from_json_str("{"), Err(OtioError::JsonError(_))));
        assert!(matches!(from_json_str("{} trailing"), Err(OtioError::JsonError(_))));
    }

    #[test]
    fn test_unknown_schema_degrades() {
        let object = from_json_str(r#"{"OTIO_SCHEMA": "CustomType.1", "custom_field": 42}"#).unwrap();
        let unknown = object.as_unknown().unwrap();
        assert_eq!(unknown.original_schema(), "CustomType.1");
        assert_eq!(unknown.data()["custom_field"], json!(42));
    }

    #[test]
    fn test_alias_decodes_to_track() {
        let object = from_json_str(r#"{"OTIO_SCHEMA": "Sequence.1", "name": "legacy"}"#).unwrap();
        let node = object.into_composable().unwrap();
        assert!(matches!(&*node.borrow(), Composable::Track(_)));
        assert_eq!(node.name(), "legacy");
    }

    #[test]
    fn test_wrong_field_type() {
        let err = from_json_str(r#"{"OTIO_SCHEMA": "Gap.1", "name": 7}"#).unwrap_err();
        assert!(matches!(err, OtioError::JsonError(msg) if msg.contains("name")));
    }

    #[test]
    fn test_effect_slot_rejects_media_reference() {
        let doc = json!({
            "OTIO_SCHEMA": "Clip.2",
            "effects": [{"OTIO_SCHEMA": "ExternalReference.1", "target_url": "a.mov"}]
        });
        let err = from_json_value(&doc).unwrap_err();
        assert_eq!(err, OtioError::type_mismatch("Effect", "ExternalReference"));
    }

    #[test]
    fn test_isolated_registry() {
        let registry = SchemaRegistry::new();
        let object = from_json_str_with(r#"{"OTIO_SCHEMA": "Gap.1"}"#, &registry).unwrap();
        assert!(object.as_unknown().is_some());
    }

    #[test]
    fn test_null_number_reads_as_nan() {
        let doc = r#"{"OTIO_SCHEMA": "LinearTimeWarp.1", "time_scalar": NaN}"#;
        let effect = from_json_str(doc).unwrap().into_effect().unwrap();
        assert!(effect.time_scalar().unwrap().is_nan());
    }
}
