//! # OTIO Core
//!
//! An interchange data model for editorial timelines: tracks, clips, gaps,
//! transitions and media references, exchanged as schema-versioned JSON.
//!
//! ## Modules
//!
//! - `constants`: Wire keys, tolerances and built-in schema identities
//! - `schema`: `Name.Version` schema identities
//! - `registry`: Schema name → factory table with legacy aliases
//! - `serializable`: The polymorphic object and the encode capability
//! - `composable`: Tree nodes and the shared handle that links them
//! - `composition`, `track`, `stack`: Child lists and their layout rules
//! - `transform`: Range resolution and time conversion between nodes
//! - `clip`, `gap`, `transition`, `item`: Leaf nodes and shared item attributes
//! - `media_reference`, `effect`, `marker`: What items point at and carry
//! - `timeline`, `collection`, `unknown`: Document roots and lossless fallback
//! - `encoder`, `decoder`, `sanitize`: The JSON codec

#![warn(missing_docs)]

pub mod clip;
pub mod collection;
pub mod composable;
pub mod composition;
pub mod constants;
pub mod decoder;
pub mod effect;
pub mod encoder;
pub mod error;
pub mod gap;
pub mod item;
pub mod marker;
pub mod media_reference;
pub mod registry;
pub mod sanitize;
pub mod schema;
pub mod serializable;
pub mod stack;
pub mod timeline;
pub mod track;
pub mod transform;
pub mod transition;
pub mod types;
pub mod unknown;

// Re-export commonly used types
pub use clip::Clip;
pub use collection::SerializableCollection;
pub use composable::{Composable, ComposableRef};
pub use composition::{ChildFilter, Composition, CompositionData};
pub use decoder::{
    from_json_bytes, from_json_bytes_with, from_json_file, from_json_file_with, from_json_str,
    from_json_str_with, from_json_value,
};
pub use effect::{Effect, EffectKind};
pub use encoder::{
    to_json_bytes, to_json_file, to_json_string, to_json_string_with, to_json_value,
    to_json_writer, EncodeOptions,
};
pub use error::OtioError;
pub use gap::Gap;
pub use item::ItemData;
pub use marker::Marker;
pub use media_reference::{ImageSequence, MediaReference, MediaReferenceKind, MissingFramePolicy};
pub use registry::{
    create_schema, global_registry, is_schema_registered, parse_schema, register_schema,
    register_schema_alias, SchemaFactory, SchemaRegistry,
};
pub use schema::Schema;
pub use serializable::{OtioSerializable, SerializableObject};
pub use stack::Stack;
pub use timeline::Timeline;
pub use track::{NeighborGapPolicy, Track};
pub use transition::Transition;
pub use types::{Box2d, Color, MarkerColor, Metadata, Vec2d};
pub use unknown::UnknownSchema;

pub use opentime::{RationalTime, TimeRange};

/// Result type alias for timeline operations
pub type Result<T> = core::result::Result<T, OtioError>;
