//! Serializable collections: bags of arbitrary objects

use crate::composable::ComposableRef;
use crate::composition::ChildFilter;
use crate::constants::schemas;
use crate::decoder::FieldReader;
use crate::encoder::ObjectWriter;
use crate::error::OtioError;
use crate::schema::Schema;
use crate::serializable::{OtioSerializable, SerializableObject};
use crate::types::Metadata;
use crate::Result;
use serde_json::Value;

/// An ordered list of objects with no timing relationship between them
#[derive(Debug, Default)]
pub struct SerializableCollection {
    /// Display name
    pub name: String,
    /// User data
    pub metadata: Metadata,
    children: Vec<SerializableObject>,
}

impl SerializableCollection {
    /// An empty collection
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// The objects, in order
    pub fn children(&self) -> &[SerializableObject] {
        &self.children
    }

    /// Mutable access to the objects
    pub fn children_mut(&mut self) -> &mut [SerializableObject] {
        &mut self.children
    }

    /// Number of objects
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// True when the collection holds nothing
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Add an object at the end
    pub fn push(&mut self, child: impl Into<SerializableObject>) {
        self.children.push(child.into());
    }

    /// Alias of [`push`](Self::push)
    pub fn append_child(&mut self, child: impl Into<SerializableObject>) {
        self.push(child);
    }

    /// Insert an object before `index`
    pub fn insert_child(&mut self, index: i64, child: impl Into<SerializableObject>) -> Result<()> {
        let size = self.children.len();
        if index < 0 || index as u64 > size as u64 {
            return Err(OtioError::IndexOutOfBounds { index, size });
        }
        self.children.insert(index as usize, child.into());
        Ok(())
    }

    /// Remove and return the object at `index`
    pub fn remove_child(&mut self, index: i64) -> Result<SerializableObject> {
        let size = self.children.len();
        if index < 0 || index as u64 >= size as u64 {
            return Err(OtioError::IndexOutOfBounds { index, size });
        }
        Ok(self.children.remove(index as usize))
    }

    /// Replace every object
    pub fn set_children(&mut self, children: Vec<SerializableObject>) {
        self.children = children;
    }

    /// Remove every object
    pub fn clear_children(&mut self) {
        self.children.clear();
    }

    /// Tree nodes held directly or inside timelines, compositions and nested collections
    pub fn find_children(&self, filter: Option<ChildFilter<'_>>) -> Result<Vec<ComposableRef>> {
        let keep = |node: &ComposableRef| filter.map_or(true, |f| f(node));
        let mut found = Vec::new();
        for child in &self.children {
            match child {
                SerializableObject::Composable(node) => {
                    if keep(node) {
                        found.push(node.clone());
                    }
                    if node.is_composition() {
                        found.extend(node.find_children(None, false, filter)?);
                    }
                }
                SerializableObject::Timeline(timeline) => {
                    found.extend(timeline.find_children(None, false, filter)?);
                }
                SerializableObject::Collection(nested) => {
                    found.extend(nested.find_children(filter)?);
                }
                _ => {}
            }
        }
        Ok(found)
    }

    /// Every clip reachable from the collection
    pub fn find_clips(&self) -> Result<Vec<ComposableRef>> {
        let is_clip = |node: &ComposableRef| node.is_clip();
        self.find_children(Some(&is_clip as ChildFilter<'_>))
    }

    /// Independent copy of every object
    pub fn deep_clone(&self) -> SerializableCollection {
        SerializableCollection {
            name: self.name.clone(),
            metadata: self.metadata.clone(),
            children: self.children.iter().map(SerializableObject::deep_clone).collect(),
        }
    }

    /// Field equality, comparing objects pairwise
    pub fn is_equivalent_to(&self, other: &SerializableCollection) -> bool {
        self.name == other.name
            && self.metadata == other.metadata
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(&other.children)
                .all(|(a, b)| a.is_equivalent_to(b))
    }

    pub(crate) fn read_fields(&mut self, reader: &FieldReader<'_>) -> Result<()> {
        self.name = reader.string("name")?;
        self.metadata = reader.metadata("metadata")?;
        self.children = reader.objects("children")?;
        Ok(())
    }
}

impl OtioSerializable for SerializableCollection {
    fn schema(&self) -> Schema {
        schemas::SERIALIZABLE_COLLECTION
    }

    fn to_json_value(&self) -> Result<Value> {
        Ok(ObjectWriter::new(&self.schema())
            .string("name", &self.name)
            .metadata("metadata", &self.metadata)
            .objects("children", &self.children)?
            .finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::Clip;
    use crate::marker::Marker;
    use crate::timeline::Timeline;
    use crate::track::Track;

    #[test]
    fn test_insert_and_remove_bounds() {
        let mut collection = SerializableCollection::new("bin");
        collection.push(Marker::new("a"));
        assert!(collection.insert_child(2, Marker::new("b")).is_err());
        collection.insert_child(0, Marker::new("b")).unwrap();
        assert_eq!(collection.children()[0].name(), "b");
        assert_eq!(
            collection.remove_child(-1).unwrap_err(),
            OtioError::IndexOutOfBounds { index: -1, size: 2 }
        );
        assert_eq!(collection.remove_child(1).unwrap().name(), "a");
    }

    #[test]
    fn test_find_clips_recurses() {
        let timeline = Timeline::new("t");
        let track = ComposableRef::from(Track::new("v"));
        track.append_child(ComposableRef::from(Clip::new("in timeline"))).unwrap();
        timeline.tracks().append_child(track).unwrap();

        let mut nested = SerializableCollection::new("nested");
        nested.push(ComposableRef::from(Clip::new("nested clip")));

        let mut collection = SerializableCollection::new("bin");
        collection.push(timeline);
        collection.push(nested);
        collection.push(ComposableRef::from(Clip::new("loose")));
        collection.push(Marker::new("ignored"));

        let names: Vec<String> = collection
            .find_clips()
            .unwrap()
            .iter()
            .map(ComposableRef::name)
            .collect();
        assert_eq!(names, vec!["in timeline", "nested clip", "loose"]);
    }
}
