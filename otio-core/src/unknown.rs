//! Lossless capture of objects whose schema is not registered

use crate::constants::SCHEMA_KEY;
use crate::decoder::FieldReader;
use crate::encoder::ObjectWriter;
use crate::schema::Schema;
use crate::serializable::OtioSerializable;
use crate::types::Metadata;
use crate::Result;
use serde_json::Value;

/// Every field of an unrecognized object plus its `OTIO_SCHEMA` string, verbatim
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UnknownSchema {
    original_schema: String,
    data: Metadata,
}

impl UnknownSchema {
    /// Capture `fields`; any `OTIO_SCHEMA` entry among them is dropped
    pub fn new(original_schema: impl Into<String>, mut fields: Metadata) -> Self {
        fields.remove(SCHEMA_KEY);
        Self {
            original_schema: original_schema.into(),
            data: fields,
        }
    }

    /// The schema string exactly as it was read
    pub fn original_schema(&self) -> &str {
        &self.original_schema
    }

    /// Name part of the original schema
    pub fn original_schema_name(&self) -> String {
        self.schema().name().to_string()
    }

    /// Version part of the original schema
    pub fn original_schema_version(&self) -> u32 {
        self.schema().version()
    }

    /// Captured fields, without `OTIO_SCHEMA`
    pub fn data(&self) -> &Metadata {
        &self.data
    }

    /// Mutable captured fields
    pub fn data_mut(&mut self) -> &mut Metadata {
        &mut self.data
    }

    /// The captured `name` field, if it is a string
    pub fn name(&self) -> String {
        self.data
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    /// Same schema string and deeply equal fields
    pub fn is_equivalent_to(&self, other: &UnknownSchema) -> bool {
        self == other
    }

    pub(crate) fn read_fields(&mut self, reader: &FieldReader<'_>) -> Result<()> {
        self.original_schema = reader.schema_string().to_string();
        self.data = reader.raw_fields().clone();
        self.data.remove(SCHEMA_KEY);
        Ok(())
    }
}

impl OtioSerializable for UnknownSchema {
    fn schema(&self) -> Schema {
        Schema::parse(&self.original_schema).unwrap_or_else(|_| Schema::new("", 1))
    }

    fn to_json_value(&self) -> Result<Value> {
        Ok(ObjectWriter::with_schema_string(&self.original_schema)
            .extend(&self.data)
            .finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Metadata {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_reemits_schema_first() {
        let unknown = UnknownSchema::new(
            "CustomType.3",
            fields(json!({"custom_field": 42, "OTIO_SCHEMA": "CustomType.3"})),
        );
        assert_eq!(unknown.original_schema_name(), "CustomType");
        assert_eq!(unknown.original_schema_version(), 3);

        let value = unknown.to_json_value().unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["OTIO_SCHEMA", "custom_field"]);
        assert_eq!(value["OTIO_SCHEMA"], "CustomType.3");
    }

    #[test]
    fn test_equivalence_compares_schema_and_data() {
        let a = UnknownSchema::new("X.1", fields(json!({"v": [1, 2]})));
        let b = UnknownSchema::new("X.2", fields(json!({"v": [1, 2]})));
        let c = UnknownSchema::new("X.1", fields(json!({"v": [1, 3]})));
        assert!(a.is_equivalent_to(&a.clone()));
        assert!(!a.is_equivalent_to(&b));
        assert!(!a.is_equivalent_to(&c));
    }
}
