//! Timelines: the root of an editorial document

use crate::composable::{Composable, ComposableRef};
use crate::composition::ChildFilter;
use crate::constants::{schemas, TIMELINE_TRACKS_NAME};
use crate::decoder::FieldReader;
use crate::encoder::ObjectWriter;
use crate::error::OtioError;
use crate::schema::Schema;
use crate::serializable::{OtioSerializable, SerializableObject};
use crate::stack::Stack;
use crate::types::{Box2d, Metadata};
use crate::Result;
use opentime::{RationalTime, TimeRange};
use serde_json::Value;

/// A named stack of tracks with an optional global start time
///
/// A timeline is never placed inside a composition.
#[derive(Debug)]
pub struct Timeline {
    /// Display name
    pub name: String,
    /// User data
    pub metadata: Metadata,
    /// Time of the first frame, e.g. 01:00:00:00
    pub global_start_time: Option<RationalTime>,
    tracks: ComposableRef,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new("")
    }
}

fn tracks_stack() -> ComposableRef {
    ComposableRef::from(Stack::new(TIMELINE_TRACKS_NAME))
}

impl Timeline {
    /// An empty timeline
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metadata: Metadata::new(),
            global_start_time: None,
            tracks: tracks_stack(),
        }
    }

    /// The stack holding every track
    pub fn tracks(&self) -> &ComposableRef {
        &self.tracks
    }

    /// Replace the stack of tracks; it must be a parentless stack
    pub fn set_tracks(&mut self, tracks: ComposableRef) -> Result<()> {
        if !matches!(&*tracks.borrow(), Composable::Stack(_)) {
            return Err(OtioError::type_mismatch("Stack", tracks.schema().name()));
        }
        if tracks.parent().is_some() {
            return Err(OtioError::ChildAlreadyHasParent);
        }
        self.tracks = tracks;
        Ok(())
    }

    /// Length of the tracks stack
    pub fn duration(&self) -> Result<RationalTime> {
        self.tracks.duration()
    }

    /// Available range of the tracks stack
    pub fn available_range(&self) -> Result<TimeRange> {
        self.tracks.available_range()
    }

    fn tracks_where(&self, keep: impl Fn(&crate::track::Track) -> bool) -> Vec<ComposableRef> {
        self.tracks
            .children()
            .into_iter()
            .filter(|child| child.borrow().as_track().is_some_and(&keep))
            .collect()
    }

    /// Top-level tracks of kind `Video`
    pub fn video_tracks(&self) -> Vec<ComposableRef> {
        self.tracks_where(|track| track.is_video())
    }

    /// Top-level tracks of kind `Audio`
    pub fn audio_tracks(&self) -> Vec<ComposableRef> {
        self.tracks_where(|track| track.is_audio())
    }

    /// Clips anywhere in the timeline, optionally limited to a range
    pub fn find_clips(
        &self,
        search_range: Option<&TimeRange>,
        shallow: bool,
    ) -> Result<Vec<ComposableRef>> {
        self.tracks.find_clips(search_range, shallow)
    }

    /// Nodes anywhere in the timeline, optionally limited and filtered
    pub fn find_children(
        &self,
        search_range: Option<&TimeRange>,
        shallow: bool,
        filter: Option<ChildFilter<'_>>,
    ) -> Result<Vec<ComposableRef>> {
        self.tracks.find_children(search_range, shallow, filter)
    }

    /// Union of every clip's image bounds
    pub fn available_image_bounds(&self) -> Option<Box2d> {
        self.tracks.available_image_bounds()
    }

    /// Independent copy including every track
    pub fn deep_clone(&self) -> Timeline {
        Timeline {
            name: self.name.clone(),
            metadata: self.metadata.clone(),
            global_start_time: self.global_start_time,
            tracks: self.tracks.deep_clone(),
        }
    }

    /// Field equality, comparing tracks structurally
    pub fn is_equivalent_to(&self, other: &Timeline) -> bool {
        self.name == other.name
            && self.metadata == other.metadata
            && self.global_start_time == other.global_start_time
            && self.tracks.is_equivalent_to(&other.tracks)
    }

    pub(crate) fn read_fields(&mut self, reader: &FieldReader<'_>) -> Result<()> {
        self.name = reader.string("name")?;
        self.metadata = reader.metadata("metadata")?;
        self.global_start_time = reader.typed("global_start_time")?;
        let tracks = match reader.object("tracks")? {
            Some(object) => match object {
                SerializableObject::Composable(node) => node,
                other => return Err(OtioError::type_mismatch("Stack", other.schema_name())),
            },
            None => tracks_stack(),
        };
        self.set_tracks(tracks)
    }
}

impl OtioSerializable for Timeline {
    fn schema(&self) -> Schema {
        schemas::TIMELINE
    }

    fn to_json_value(&self) -> Result<Value> {
        Ok(ObjectWriter::new(&self.schema())
            .string("name", &self.name)
            .metadata("metadata", &self.metadata)
            .optional("global_start_time", self.global_start_time.as_ref())?
            .object("tracks", &self.tracks)?
            .finish())
    }
}
