//! Schema identity: a `(name, version)` pair written as `"Name.Version"`

use crate::error::OtioError;
use crate::Result;
use std::borrow::Cow;
use std::fmt;

/// A type tag as it appears in `OTIO_SCHEMA`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Schema {
    name: Cow<'static, str>,
    version: u32,
}

impl Schema {
    /// Create a schema identity
    pub fn new(name: impl Into<String>, version: u32) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            version,
        }
    }

    pub(crate) const fn new_static(name: &'static str, version: u32) -> Self {
        Self {
            name: Cow::Borrowed(name),
            version,
        }
    }

    /// Type name without the version
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Schema version
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Parse `"Name.Version"`
    ///
    /// The version is whatever follows the last dot. A missing or
    /// non-numeric suffix leaves the whole string as the name with version 1.
    pub fn parse(schema: &str) -> Result<Self> {
        if schema.is_empty() {
            return Err(OtioError::schema(schema, "empty schema string"));
        }
        if let Some((name, version)) = schema.rsplit_once('.') {
            if !name.is_empty() {
                if let Ok(version) = version.parse::<u32>() {
                    return Ok(Self::new(name, version));
                }
            }
        }
        Ok(Self::new(schema, 1))
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.name, self.version)
    }
}
