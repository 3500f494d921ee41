//! Clips: items that resolve to one of several named media references

use crate::constants::DEFAULT_MEDIA_KEY;
use crate::decoder::FieldReader;
use crate::encoder::ObjectWriter;
use crate::error::OtioError;
use crate::item::ItemData;
use crate::media_reference::MediaReference;
use crate::types::Box2d;
use crate::Result;
use opentime::TimeRange;
use std::collections::BTreeMap;

/// A segment of media placed in a composition
///
/// The active key always names an entry of the reference mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    /// Shared item attributes
    pub item: ItemData,
    media_references: BTreeMap<String, MediaReference>,
    active_media_reference_key: String,
}

impl Default for Clip {
    fn default() -> Self {
        let mut media_references = BTreeMap::new();
        media_references.insert(DEFAULT_MEDIA_KEY.to_string(), MediaReference::missing());
        Self {
            item: ItemData::default(),
            media_references,
            active_media_reference_key: DEFAULT_MEDIA_KEY.to_string(),
        }
    }
}

impl Clip {
    /// A clip with a missing reference and no trim
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            item: ItemData::new(name),
            ..Default::default()
        }
    }

    /// A clip resolving to `media_reference`, optionally trimmed
    pub fn with_media(
        name: impl Into<String>,
        media_reference: MediaReference,
        source_range: Option<TimeRange>,
    ) -> Self {
        let mut clip = Self::new(name);
        clip.item.source_range = source_range;
        clip.set_media_reference(Some(media_reference));
        clip
    }

    /// The reference at the active key
    pub fn media_reference(&self) -> Option<&MediaReference> {
        self.media_references.get(&self.active_media_reference_key)
    }

    /// Mutable access to the reference at the active key
    pub fn media_reference_mut(&mut self) -> Option<&mut MediaReference> {
        self.media_references.get_mut(&self.active_media_reference_key)
    }

    /// Replace the reference at the active key; `None` stores a fresh missing reference
    pub fn set_media_reference(&mut self, media_reference: Option<MediaReference>) {
        self.media_references.insert(
            self.active_media_reference_key.clone(),
            media_reference.unwrap_or_else(MediaReference::missing),
        );
    }

    /// Every reference, by key
    pub fn media_references(&self) -> &BTreeMap<String, MediaReference> {
        &self.media_references
    }

    /// Replace the whole mapping and active key together
    ///
    /// Fails with `MediaReferenceNotFound` when `active_key` is not in
    /// `media_references`; the clip is left unchanged.
    pub fn set_media_references(
        &mut self,
        media_references: BTreeMap<String, MediaReference>,
        active_key: impl Into<String>,
    ) -> Result<()> {
        let active_key = active_key.into();
        if !media_references.contains_key(&active_key) {
            return Err(OtioError::MediaReferenceNotFound(active_key));
        }
        self.media_references = media_references;
        self.active_media_reference_key = active_key;
        Ok(())
    }

    /// Key of the reference the clip currently resolves to
    pub fn active_media_reference_key(&self) -> &str {
        &self.active_media_reference_key
    }

    /// Switch to another existing key
    pub fn set_active_media_reference_key(&mut self, key: impl Into<String>) -> Result<()> {
        let key = key.into();
        if !self.media_references.contains_key(&key) {
            return Err(OtioError::MediaReferenceNotFound(key));
        }
        self.active_media_reference_key = key;
        Ok(())
    }

    /// The active reference's available range
    pub fn available_range(&self) -> Result<TimeRange> {
        self.media_reference()
            .ok_or(OtioError::MissingReference)?
            .available_range
            .ok_or(OtioError::CannotComputeAvailableRange)
    }

    /// The active reference's image bounds, if it has any
    pub fn available_image_bounds(&self) -> Option<Box2d> {
        self.media_reference()
            .and_then(|reference| reference.available_image_bounds)
    }

    pub(crate) fn read_fields(&mut self, reader: &FieldReader<'_>) -> Result<()> {
        self.item.read_fields(reader)?;

        let mut references = BTreeMap::new();
        if reader.has("media_references") {
            for (key, object) in reader.object_map("media_references")? {
                references.insert(key, object.into_media_reference()?);
            }
        } else if let Some(object) = reader.object("media_reference")? {
            references.insert(DEFAULT_MEDIA_KEY.to_string(), object.into_media_reference()?);
        }

        let active = reader.string_or("active_media_reference_key", DEFAULT_MEDIA_KEY)?;
        references
            .entry(active.clone())
            .or_insert_with(MediaReference::missing);

        self.media_references = references;
        self.active_media_reference_key = active;
        Ok(())
    }

    pub(crate) fn write_fields(&self, writer: ObjectWriter) -> Result<ObjectWriter> {
        Ok(self
            .item
            .write_fields(writer)?
            .object_map("media_references", &self.media_references)?
            .string("active_media_reference_key", &self.active_media_reference_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn external(url: &str, duration: f64) -> MediaReference {
        MediaReference::external(url)
            .with_available_range(TimeRange::from_values(0.0, duration, 24.0))
    }

    #[test]
    fn test_default_has_missing_reference() {
        let clip = Clip::new("c");
        assert_eq!(clip.active_media_reference_key(), DEFAULT_MEDIA_KEY);
        assert!(clip.media_reference().unwrap().is_missing_reference());
    }

    #[test]
    fn test_available_range_from_reference() {
        let clip = Clip::with_media("c", external("a.mov", 100.0), None);
        assert_eq!(clip.available_range().unwrap(), TimeRange::from_values(0.0, 100.0, 24.0));
        assert_eq!(
            Clip::new("c").available_range(),
            Err(OtioError::CannotComputeAvailableRange)
        );
    }

    #[test]
    fn test_set_none_stores_missing() {
        let mut clip = Clip::with_media("c", external("a.mov", 10.0), None);
        clip.set_media_reference(None);
        assert!(clip.media_reference().unwrap().is_missing_reference());
    }

    #[test]
    fn test_set_media_references_rejects_unknown_key() {
        let mut clip = Clip::with_media("c", external("a.mov", 10.0), None);
        let mut map = BTreeMap::new();
        map.insert("high".to_string(), external("hi.mov", 10.0));

        let err = clip.set_media_references(map.clone(), "low").unwrap_err();
        assert_eq!(err, OtioError::MediaReferenceNotFound("low".to_string()));
        assert_eq!(clip.media_reference().unwrap().target_url(), Some("a.mov"));

        clip.set_media_references(map, "high").unwrap();
        assert_eq!(clip.active_media_reference_key(), "high");
        assert_eq!(clip.media_reference().unwrap().target_url(), Some("hi.mov"));
    }

    #[test]
    fn test_set_active_key_keeps_previous_on_failure() {
        let mut clip = Clip::new("c");
        assert!(clip.set_active_media_reference_key("proxy").is_err());
        assert_eq!(clip.active_media_reference_key(), DEFAULT_MEDIA_KEY);
    }

    #[test]
    fn test_image_bounds_delegate() {
        use crate::types::Vec2d;
        let bounds = Box2d::new(Vec2d::new(0.0, 0.0), Vec2d::new(16.0, 9.0));
        let clip = Clip::with_media("c", external("a.mov", 10.0).with_image_bounds(bounds), None);
        assert_eq!(clip.available_image_bounds(), Some(bounds));
        assert_eq!(Clip::new("c").available_image_bounds(), None);
    }
}
