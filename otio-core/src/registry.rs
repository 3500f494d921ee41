//! Schema registry: wire type name → factory, plus legacy aliases
//!
//! The process-wide instance is built with every built-in type on first
//! use and guarded by a read-mostly lock, so decoders running on several
//! threads only contend when someone registers a new schema.

use crate::clip::Clip;
use crate::collection::SerializableCollection;
use crate::composable::Composable;
use crate::composition::Composition;
use crate::constants::{schemas, SEQUENCE_ALIAS};
use crate::effect::Effect;
use crate::error::OtioError;
use crate::gap::Gap;
use crate::marker::Marker;
use crate::media_reference::MediaReference;
use crate::schema::Schema;
use crate::serializable::SerializableObject;
use crate::stack::Stack;
use crate::timeline::Timeline;
use crate::track::Track;
use crate::transition::Transition;
use crate::Result;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[cfg(feature = "logging")]
use tracing::debug;

/// Zero-argument constructor producing a default instance of one schema
pub type SchemaFactory = fn() -> SerializableObject;

#[derive(Default)]
struct Tables {
    factories: HashMap<String, (Schema, SchemaFactory)>,
    aliases: HashMap<String, String>,
}

impl Tables {
    fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map(String::as_str).unwrap_or(name)
    }
}

/// Name → factory table with alias resolution
pub struct SchemaRegistry {
    tables: RwLock<Tables>,
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }

    /// Create a registry holding every built-in schema and the `Sequence` alias
    pub fn with_builtins() -> Self {
        let registry = Self::new();

        // Composables
        registry.register(schemas::CLIP, || {
            SerializableObject::from(Composable::Clip(Clip::default()))
        });
        registry.register(schemas::GAP, || {
            SerializableObject::from(Composable::Gap(Gap::default()))
        });
        registry.register(schemas::TRANSITION, || {
            SerializableObject::from(Composable::Transition(Transition::default()))
        });
        registry.register(schemas::TRACK, || {
            SerializableObject::from(Composable::Track(Track::default()))
        });
        registry.register(schemas::STACK, || {
            SerializableObject::from(Composable::Stack(Stack::default()))
        });
        registry.register(schemas::COMPOSITION, || {
            SerializableObject::from(Composable::Composition(Composition::default()))
        });

        // Containers
        registry.register(schemas::TIMELINE, || {
            SerializableObject::Timeline(Timeline::default())
        });
        registry.register(schemas::SERIALIZABLE_COLLECTION, || {
            SerializableObject::Collection(SerializableCollection::default())
        });

        // Media references
        registry.register(schemas::EXTERNAL_REFERENCE, || {
            SerializableObject::MediaReference(MediaReference::external(""))
        });
        registry.register(schemas::MISSING_REFERENCE, || {
            SerializableObject::MediaReference(MediaReference::missing())
        });
        registry.register(schemas::GENERATOR_REFERENCE, || {
            SerializableObject::MediaReference(MediaReference::generator(""))
        });
        registry.register(schemas::IMAGE_SEQUENCE_REFERENCE, || {
            SerializableObject::MediaReference(MediaReference::image_sequence(""))
        });

        // Attachments
        registry.register(schemas::MARKER, || SerializableObject::Marker(Marker::default()));
        registry.register(schemas::EFFECT, || SerializableObject::Effect(Effect::new("")));
        registry.register(schemas::TIME_EFFECT, || {
            SerializableObject::Effect(Effect::time_effect(""))
        });
        registry.register(schemas::LINEAR_TIME_WARP, || {
            SerializableObject::Effect(Effect::linear_time_warp("", 1.0))
        });
        registry.register(schemas::FREEZE_FRAME, || {
            SerializableObject::Effect(Effect::freeze_frame(""))
        });

        registry.register_alias(SEQUENCE_ALIAS, schemas::TRACK.name());

        #[cfg(feature = "logging")]
        debug!(count = registry.len(), "Registered built-in schemas");

        registry
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a factory under the schema's name. Overwrites any previous entry.
    pub fn register(&self, schema: Schema, factory: SchemaFactory) {
        let name = schema.name().to_string();
        self.write().factories.insert(name, (schema, factory));
    }

    /// Register a factory, failing if the name is already taken
    pub fn try_register(&self, schema: Schema, factory: SchemaFactory) -> Result<()> {
        let mut tables = self.write();
        if tables.factories.contains_key(schema.name()) {
            return Err(OtioError::schema(schema.to_string(), "schema already registered"));
        }
        tables
            .factories
            .insert(schema.name().to_string(), (schema, factory));
        Ok(())
    }

    /// Map a legacy name onto a canonical one
    pub fn register_alias(&self, alias: &str, canonical_name: &str) {
        self.write()
            .aliases
            .insert(alias.to_string(), canonical_name.to_string());
    }

    /// The canonical name for `name`, or `name` itself when it is not an alias
    pub fn resolve_alias(&self, name: &str) -> String {
        self.read().resolve(name).to_string()
    }

    /// Build a default instance of the named schema
    pub fn create(&self, name: &str) -> Result<SerializableObject> {
        let factory = {
            let tables = self.read();
            tables
                .factories
                .get(tables.resolve(name))
                .map(|(_, factory)| *factory)
        };
        match factory {
            Some(factory) => Ok(factory()),
            None => Err(OtioError::schema(name, "schema not registered")),
        }
    }

    /// Whether `name`, after alias resolution, has a factory
    pub fn is_registered(&self, name: &str) -> bool {
        let tables = self.read();
        tables.factories.contains_key(tables.resolve(name))
    }

    /// The registered schema for `name`, after alias resolution
    pub fn schema_for(&self, name: &str) -> Option<Schema> {
        let tables = self.read();
        tables
            .factories
            .get(tables.resolve(name))
            .map(|(schema, _)| schema.clone())
    }

    /// Canonical names of every registered schema, sorted
    pub fn registered_schemas(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().factories.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered schemas
    pub fn len(&self) -> usize {
        self.read().factories.len()
    }

    /// True when nothing is registered
    pub fn is_empty(&self) -> bool {
        self.read().factories.is_empty()
    }
}

static GLOBAL_REGISTRY: Lazy<SchemaRegistry> = Lazy::new(SchemaRegistry::with_builtins);

/// The process-wide registry used by the codec entry points
pub fn global_registry() -> &'static SchemaRegistry {
    &GLOBAL_REGISTRY
}

/// Register a schema in the process-wide registry
pub fn register_schema(schema: Schema, factory: SchemaFactory) {
    GLOBAL_REGISTRY.register(schema, factory);
}

/// Register an alias in the process-wide registry
pub fn register_schema_alias(alias: &str, canonical_name: &str) {
    GLOBAL_REGISTRY.register_alias(alias, canonical_name);
}

/// Create an instance from the process-wide registry
pub fn create_schema(name: &str) -> Result<SerializableObject> {
    GLOBAL_REGISTRY.create(name)
}

/// Whether the process-wide registry knows `name`
pub fn is_schema_registered(name: &str) -> bool {
    GLOBAL_REGISTRY.is_registered(name)
}

/// Parse `"Name.Version"`; see [`Schema::parse`]
pub fn parse_schema(schema: &str) -> Result<Schema> {
    Schema::parse(schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_registered() {
        let registry = SchemaRegistry::with_builtins();
        for name in [
            "Clip",
            "Gap",
            "Transition",
            "Track",
            "Stack",
            "Composition",
            "Timeline",
            "SerializableCollection",
            "ExternalReference",
            "MissingReference",
            "GeneratorReference",
            "ImageSequenceReference",
            "Marker",
            "Effect",
            "TimeEffect",
            "LinearTimeWarp",
            "FreezeFrame",
        ] {
            assert!(registry.is_registered(name), "{name} should be registered");
        }
        assert_eq!(registry.len(), 17);
    }

    #[test]
    fn test_alias_resolves_before_lookup() {
        let registry = SchemaRegistry::with_builtins();
        assert!(registry.is_registered("Sequence"));
        assert_eq!(registry.resolve_alias("Sequence"), "Track");
        let obj = registry.create("Sequence").unwrap();
        assert_eq!(obj.schema_name(), "Track");
    }

    #[test]
    fn test_create_unknown_fails() {
        let registry = SchemaRegistry::with_builtins();
        match registry.create("CustomType") {
            Err(OtioError::SchemaError { schema, message }) => {
                assert_eq!(schema, "CustomType");
                assert_eq!(message, "schema not registered");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(!registry.is_registered("CustomType"));
    }

    #[test]
    fn test_register_custom_schema_in_isolated_registry() {
        let registry = SchemaRegistry::new();
        assert!(registry.is_empty());
        registry.register(Schema::new("Holder", 1), || {
            SerializableObject::Marker(Marker::new("holder"))
        });
        assert!(registry.is_registered("Holder"));
        assert!(registry
            .try_register(Schema::new("Holder", 2), || SerializableObject::Marker(
                Marker::default()
            ))
            .is_err());
        assert_eq!(registry.schema_for("Holder").unwrap().version(), 1);
        assert!(!global_registry().is_registered("Holder"));
    }

    #[test]
    fn test_registered_schemas_sorted() {
        let names = SchemaRegistry::with_builtins().registered_schemas();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_concurrent_lookups() {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                std::thread::spawn(|| {
                    for _ in 0..100 {
                        assert!(is_schema_registered("Clip"));
                        assert!(create_schema("Gap").is_ok());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
