//! The polymorphic object every decoder produces and every encoder accepts

use crate::collection::SerializableCollection;
use crate::composable::{Composable, ComposableRef};
use crate::decoder::FieldReader;
use crate::effect::Effect;
use crate::encoder::ObjectWriter;
use crate::error::OtioError;
use crate::marker::Marker;
use crate::media_reference::MediaReference;
use crate::schema::Schema;
use crate::timeline::Timeline;
use crate::unknown::UnknownSchema;
use crate::Result;
use serde_json::Value;

/// Anything with a wire identity that can render itself as JSON
pub trait OtioSerializable {
    /// `OTIO_SCHEMA` identity
    fn schema(&self) -> Schema;

    /// Encode into a JSON object, `OTIO_SCHEMA` first
    fn to_json_value(&self) -> Result<Value>;
}

/// Any object the codec understands
#[derive(Debug)]
pub enum SerializableObject {
    /// Root aggregate
    Timeline(Timeline),
    /// Tree node
    Composable(ComposableRef),
    /// Media reference of any flavour
    MediaReference(MediaReference),
    /// Effect of any flavour
    Effect(Effect),
    /// Marker
    Marker(Marker),
    /// Bag of objects
    Collection(SerializableCollection),
    /// A type this build does not know
    Unknown(UnknownSchema),
}

macro_rules! accessors {
    ($($variant:ident: $ty:ty => $as_ref:ident, $as_mut:ident, $into:ident;)*) => {
        $(
            #[doc = concat!("The ", stringify!($variant), ", if that is what this is")]
            pub fn $as_ref(&self) -> Option<&$ty> {
                match self {
                    SerializableObject::$variant(inner) => Some(inner),
                    _ => None,
                }
            }

            #[doc = concat!("Mutable ", stringify!($variant), " access")]
            pub fn $as_mut(&mut self) -> Option<&mut $ty> {
                match self {
                    SerializableObject::$variant(inner) => Some(inner),
                    _ => None,
                }
            }

            #[doc = concat!("Unwrap the ", stringify!($variant), ", or fail with `TypeMismatch`")]
            pub fn $into(self) -> Result<$ty> {
                match self {
                    SerializableObject::$variant(inner) => Ok(inner),
                    other => Err(OtioError::type_mismatch(
                        stringify!($variant),
                        other.schema_name(),
                    )),
                }
            }
        )*
    };
}

impl SerializableObject {
    accessors! {
        Timeline: Timeline => as_timeline, as_timeline_mut, into_timeline;
        Composable: ComposableRef => as_composable, as_composable_mut, into_composable;
        MediaReference: MediaReference => as_media_reference, as_media_reference_mut, into_media_reference;
        Effect: Effect => as_effect, as_effect_mut, into_effect;
        Marker: Marker => as_marker, as_marker_mut, into_marker;
        Collection: SerializableCollection => as_collection, as_collection_mut, into_collection;
        Unknown: UnknownSchema => as_unknown, as_unknown_mut, into_unknown;
    }

    /// Wire identity
    pub fn schema(&self) -> Schema {
        match self {
            SerializableObject::Timeline(o) => o.schema(),
            SerializableObject::Composable(o) => o.schema(),
            SerializableObject::MediaReference(o) => o.schema(),
            SerializableObject::Effect(o) => o.schema(),
            SerializableObject::Marker(o) => o.schema(),
            SerializableObject::Collection(o) => o.schema(),
            SerializableObject::Unknown(o) => o.schema(),
        }
    }

    /// Schema name without the version
    pub fn schema_name(&self) -> String {
        self.schema().name().to_string()
    }

    /// Schema version
    pub fn schema_version(&self) -> u32 {
        self.schema().version()
    }

    /// Display name
    pub fn name(&self) -> String {
        match self {
            SerializableObject::Timeline(o) => o.name.clone(),
            SerializableObject::Composable(o) => o.name(),
            SerializableObject::MediaReference(o) => o.name.clone(),
            SerializableObject::Effect(o) => o.name.clone(),
            SerializableObject::Marker(o) => o.name.clone(),
            SerializableObject::Collection(o) => o.name.clone(),
            SerializableObject::Unknown(o) => o.name(),
        }
    }

    /// Independent copy; no node of the copy is shared with `self`
    pub fn deep_clone(&self) -> SerializableObject {
        match self {
            SerializableObject::Timeline(o) => SerializableObject::Timeline(o.deep_clone()),
            SerializableObject::Composable(o) => SerializableObject::Composable(o.deep_clone()),
            SerializableObject::MediaReference(o) => SerializableObject::MediaReference(o.clone()),
            SerializableObject::Effect(o) => SerializableObject::Effect(o.clone()),
            SerializableObject::Marker(o) => SerializableObject::Marker(o.clone()),
            SerializableObject::Collection(o) => SerializableObject::Collection(o.deep_clone()),
            SerializableObject::Unknown(o) => SerializableObject::Unknown(o.clone()),
        }
    }

    /// Field-by-field equality; objects of different types are never equivalent
    pub fn is_equivalent_to(&self, other: &SerializableObject) -> bool {
        match (self, other) {
            (SerializableObject::Timeline(a), SerializableObject::Timeline(b)) => {
                a.is_equivalent_to(b)
            }
            (SerializableObject::Composable(a), SerializableObject::Composable(b)) => {
                a.is_equivalent_to(b)
            }
            (SerializableObject::MediaReference(a), SerializableObject::MediaReference(b)) => {
                a.is_equivalent_to(b)
            }
            (SerializableObject::Effect(a), SerializableObject::Effect(b)) => a.is_equivalent_to(b),
            (SerializableObject::Marker(a), SerializableObject::Marker(b)) => a.is_equivalent_to(b),
            (SerializableObject::Collection(a), SerializableObject::Collection(b)) => {
                a.is_equivalent_to(b)
            }
            (SerializableObject::Unknown(a), SerializableObject::Unknown(b)) => {
                a.is_equivalent_to(b)
            }
            _ => false,
        }
    }

    /// Fill a freshly created instance from decoded fields
    pub(crate) fn read_fields(&mut self, reader: &FieldReader<'_>) -> Result<()> {
        match self {
            SerializableObject::Timeline(o) => o.read_fields(reader),
            SerializableObject::Composable(o) => o.read_fields(reader),
            SerializableObject::MediaReference(o) => o.read_fields(reader),
            SerializableObject::Effect(o) => o.read_fields(reader),
            SerializableObject::Marker(o) => o.read_fields(reader),
            SerializableObject::Collection(o) => o.read_fields(reader),
            SerializableObject::Unknown(o) => o.read_fields(reader),
        }
    }
}

impl OtioSerializable for SerializableObject {
    fn schema(&self) -> Schema {
        SerializableObject::schema(self)
    }

    fn to_json_value(&self) -> Result<Value> {
        match self {
            SerializableObject::Timeline(o) => o.to_json_value(),
            SerializableObject::Composable(o) => o.to_json_value(),
            SerializableObject::MediaReference(o) => o.to_json_value(),
            SerializableObject::Effect(o) => o.to_json_value(),
            SerializableObject::Marker(o) => o.to_json_value(),
            SerializableObject::Collection(o) => o.to_json_value(),
            SerializableObject::Unknown(o) => o.to_json_value(),
        }
    }
}

impl OtioSerializable for ComposableRef {
    fn schema(&self) -> Schema {
        ComposableRef::schema(self)
    }

    fn to_json_value(&self) -> Result<Value> {
        let value = self.borrow();
        let writer = ObjectWriter::new(&value.schema());
        let writer = match &*value {
            Composable::Clip(clip) => clip.write_fields(writer)?,
            Composable::Gap(gap) => gap.item.write_fields(writer)?,
            Composable::Transition(t) => t.write_fields(writer)?,
            Composable::Track(track) => track
                .data
                .item
                .write_fields(writer)?
                .objects("children", &track.data.children)?
                .string("kind", &track.kind),
            Composable::Stack(stack) => stack
                .data
                .item
                .write_fields(writer)?
                .objects("children", &stack.data.children)?,
            Composable::Composition(c) => c
                .data
                .item
                .write_fields(writer)?
                .objects("children", &c.data.children)?,
        };
        Ok(writer.finish())
    }
}

impl ComposableRef {
    pub(crate) fn read_fields(&self, reader: &FieldReader<'_>) -> Result<()> {
        {
            let mut value = self.borrow_mut();
            match &mut *value {
                Composable::Clip(clip) => clip.read_fields(reader)?,
                Composable::Gap(gap) => gap.item.read_fields(reader)?,
                Composable::Transition(t) => t.read_fields(reader)?,
                Composable::Track(track) => {
                    track.data.item.read_fields(reader)?;
                    track.kind = reader.string_or("kind", crate::constants::TRACK_KIND_VIDEO)?;
                }
                Composable::Stack(stack) => stack.data.item.read_fields(reader)?,
                Composable::Composition(c) => c.data.item.read_fields(reader)?,
            }
        }
        if self.is_composition() {
            for child in reader.objects_as("children", SerializableObject::into_composable)? {
                self.append_child(child)?;
            }
        }
        Ok(())
    }
}

impl From<Composable> for SerializableObject {
    fn from(value: Composable) -> Self {
        SerializableObject::Composable(ComposableRef::new(value))
    }
}

impl From<ComposableRef> for SerializableObject {
    fn from(value: ComposableRef) -> Self {
        SerializableObject::Composable(value)
    }
}

impl From<Timeline> for SerializableObject {
    fn from(value: Timeline) -> Self {
        SerializableObject::Timeline(value)
    }
}

impl From<SerializableCollection> for SerializableObject {
    fn from(value: SerializableCollection) -> Self {
        SerializableObject::Collection(value)
    }
}

impl From<MediaReference> for SerializableObject {
    fn from(value: MediaReference) -> Self {
        SerializableObject::MediaReference(value)
    }
}

impl From<Effect> for SerializableObject {
    fn from(value: Effect) -> Self {
        SerializableObject::Effect(value)
    }
}

impl From<Marker> for SerializableObject {
    fn from(value: Marker) -> Self {
        SerializableObject::Marker(value)
    }
}

macro_rules! impl_try_from {
    ($($ty:ty => $into:ident),*) => {
        $(
            impl TryFrom<SerializableObject> for $ty {
                type Error = OtioError;

                fn try_from(object: SerializableObject) -> Result<Self> {
                    object.$into()
                }
            }
        )*
    };
}

impl_try_from!(
    Timeline => into_timeline,
    ComposableRef => into_composable,
    MediaReference => into_media_reference,
    Effect => into_effect,
    Marker => into_marker,
    SerializableCollection => into_collection,
    UnknownSchema => into_unknown
);
