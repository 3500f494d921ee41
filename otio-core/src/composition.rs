//! Compositions: ordered owners of child nodes
//!
//! Child-list mutation and the time queries shared by every composition
//! kind live here as methods on [`ComposableRef`]. The per-kind layout of
//! a child within its parent is delegated to [`track`](crate::track) and
//! [`stack`](crate::stack).

use crate::composable::{Composable, ComposableRef};
use crate::constants::RANGE_EPSILON;
use crate::error::OtioError;
use crate::item::ItemData;
use crate::stack;
use crate::track;
use crate::Result;
use opentime::{RationalTime, TimeRange};
use std::collections::HashMap;

/// Item attributes plus the ordered child list
#[derive(Debug, Default)]
pub struct CompositionData {
    /// Shared item attributes
    pub item: ItemData,
    pub(crate) children: Vec<ComposableRef>,
}

impl CompositionData {
    /// Composition data with only a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            item: ItemData::new(name),
            children: Vec::new(),
        }
    }

    /// Handles of the children, in order
    pub fn children(&self) -> &[ComposableRef] {
        &self.children
    }

    pub(crate) fn without_children(&self) -> CompositionData {
        CompositionData {
            item: self.item.clone(),
            children: Vec::new(),
        }
    }
}

/// A composition with no layout rule of its own; children follow each other
#[derive(Debug, Default)]
pub struct Composition {
    /// Item attributes and children
    pub data: CompositionData,
}

impl Composition {
    /// An empty composition
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            data: CompositionData::new(name),
        }
    }
}

/// Predicate used to filter tree searches
pub type ChildFilter<'a> = &'a dyn Fn(&ComposableRef) -> bool;

fn check_index(index: i64, size: usize, allow_end: bool) -> Result<usize> {
    let last = if allow_end { size as i64 } else { size as i64 - 1 };
    if index < 0 || index > last {
        return Err(OtioError::IndexOutOfBounds { index, size });
    }
    Ok(index as usize)
}

impl ComposableRef {
    fn require_composition(&self) -> Result<()> {
        if self.is_composition() {
            Ok(())
        } else {
            Err(OtioError::type_mismatch("Composition", self.schema().name()))
        }
    }

    /// A child may join `self` when it is parentless and not `self` or an ancestor of it
    fn check_adoptable(&self, child: &ComposableRef) -> Result<()> {
        if child.parent().is_some() {
            return Err(OtioError::ChildAlreadyHasParent);
        }
        if child.is_self_or_ancestor_of(self) {
            return Err(OtioError::WouldCreateCycle);
        }
        Ok(())
    }

    /// Handles of the children, in order; empty for non-compositions
    pub fn children(&self) -> Vec<ComposableRef> {
        self.borrow()
            .composition_data()
            .map(|data| data.children.clone())
            .unwrap_or_default()
    }

    /// Number of children
    pub fn child_count(&self) -> usize {
        self.borrow()
            .composition_data()
            .map_or(0, |data| data.children.len())
    }

    /// The child at `index`
    pub fn child_at_index(&self, index: usize) -> Option<ComposableRef> {
        self.borrow()
            .composition_data()
            .and_then(|data| data.children.get(index).cloned())
    }

    /// Position of `child` among the children
    pub fn index_of_child(&self, child: &ComposableRef) -> Result<usize> {
        self.borrow()
            .composition_data()
            .and_then(|data| data.children.iter().position(|c| c.ptr_eq(child)))
            .ok_or(OtioError::NotFound)
    }

    /// Whether `child` is a direct child
    pub fn has_child(&self, child: &ComposableRef) -> bool {
        child.parent().is_some_and(|parent| parent.ptr_eq(self))
    }

    /// Whether `self` is an ancestor of `other` at any depth
    pub fn is_parent_of(&self, other: &ComposableRef) -> bool {
        other
            .parent()
            .is_some_and(|parent| self.is_self_or_ancestor_of(&parent))
    }

    /// Whether any descendant is a clip
    pub fn has_clips(&self) -> bool {
        self.children()
            .iter()
            .any(|child| child.is_clip() || child.has_clips())
    }

    /// Append `child` at the end
    ///
    /// Fails with `ChildAlreadyHasParent` if the child belongs to another
    /// composition. Nothing changes on failure.
    pub fn append_child(&self, child: ComposableRef) -> Result<()> {
        self.require_composition()?;
        self.check_adoptable(&child)?;
        self.attach(child);
        Ok(())
    }

    /// Insert `child` before `index`; `index == child_count()` appends
    pub fn insert_child(&self, index: i64, child: ComposableRef) -> Result<()> {
        self.require_composition()?;
        let index = check_index(index, self.child_count(), true)?;
        self.check_adoptable(&child)?;
        if let Some(data) = self.borrow_mut().composition_data_mut() {
            data.children.insert(index, child.clone());
        }
        child.set_parent(Some(self));
        Ok(())
    }

    /// Replace the child at `index`; the previous child is detached
    pub fn set_child(&self, index: i64, child: ComposableRef) -> Result<()> {
        self.require_composition()?;
        let index = check_index(index, self.child_count(), false)?;
        let previous = self.child_at_index(index);
        if previous.as_ref().is_some_and(|p| p.ptr_eq(&child)) {
            return Ok(());
        }
        self.check_adoptable(&child)?;
        if let Some(data) = self.borrow_mut().composition_data_mut() {
            data.children[index] = child.clone();
        }
        if let Some(previous) = previous {
            previous.set_parent(None);
        }
        child.set_parent(Some(self));
        Ok(())
    }

    /// Detach and return the child at `index`
    pub fn remove_child(&self, index: i64) -> Result<ComposableRef> {
        self.require_composition()?;
        let index = check_index(index, self.child_count(), false)?;
        let removed = self
            .borrow_mut()
            .composition_data_mut()
            .map(|data| data.children.remove(index))
            .ok_or(OtioError::NotFound)?;
        removed.set_parent(None);
        Ok(removed)
    }

    /// Detach every child
    pub fn clear_children(&self) {
        let removed = match self.borrow_mut().composition_data_mut() {
            Some(data) => std::mem::take(&mut data.children),
            None => return,
        };
        for child in removed {
            child.set_parent(None);
        }
    }

    /// Replace the whole child list
    ///
    /// Every incoming child is checked first; on failure the current list
    /// stays as it was. Children already in `self` may be reordered.
    pub fn set_children(&self, children: Vec<ComposableRef>) -> Result<()> {
        self.require_composition()?;
        for (i, child) in children.iter().enumerate() {
            if children[..i].iter().any(|c| c.ptr_eq(child)) {
                return Err(OtioError::ChildAlreadyHasParent);
            }
            if !self.has_child(child) {
                self.check_adoptable(child)?;
            }
        }
        self.clear_children();
        for child in children {
            self.attach(child);
        }
        Ok(())
    }

    /// Untrimmed range of the child at `index`, in this composition's time space
    pub fn range_of_child_at_index(&self, index: usize) -> Result<TimeRange> {
        let value = self.borrow();
        let data = value
            .composition_data()
            .ok_or_else(|| OtioError::type_mismatch("Composition", value.schema().name()))?;
        let size = data.children.len();
        if index >= size {
            return Err(OtioError::IndexOutOfBounds {
                index: index as i64,
                size,
            });
        }
        match &*value {
            Composable::Stack(_) => stack::range_of_child_at_index(&data.children, index),
            Composable::Track(_) => track::range_of_child_at_index(&data.children, index, true),
            _ => track::range_of_child_at_index(&data.children, index, false),
        }
    }

    /// Range of the child at `index` clipped to this composition's source range
    ///
    /// `None` when the child lies wholly outside the trim.
    pub fn trimmed_range_of_child_at_index(&self, index: usize) -> Result<Option<TimeRange>> {
        let range = self.range_of_child_at_index(index)?;
        Ok(self.trim_child_range(range))
    }

    fn trim_child_range(&self, range: TimeRange) -> Option<TimeRange> {
        match self.source_range() {
            None => Some(range),
            Some(trim) if !trim.intersects(&range, RANGE_EPSILON) => None,
            Some(trim) => Some(trim.clamped_range(&range)),
        }
    }

    fn child_index(&self, child: &ComposableRef) -> Result<usize> {
        if !self.has_child(child) {
            return Err(OtioError::NotAChild);
        }
        self.index_of_child(child).map_err(|_| OtioError::NotAChild)
    }

    /// Untrimmed range of `child`; `NotAChild` if it is not a child of `self`
    pub fn range_of_child(&self, child: &ComposableRef) -> Result<TimeRange> {
        let index = self.child_index(child)?;
        self.range_of_child_at_index(index)
    }

    /// Trimmed range of `child`; `NotAChild` if it is not a child of `self`
    pub fn trimmed_range_of_child(&self, child: &ComposableRef) -> Result<Option<TimeRange>> {
        let index = self.child_index(child)?;
        self.trimmed_range_of_child_at_index(index)
    }

    /// Untrimmed range of every child, in order
    fn child_ranges(&self) -> Result<Vec<TimeRange>> {
        let value = self.borrow();
        let data = value
            .composition_data()
            .ok_or_else(|| OtioError::type_mismatch("Composition", value.schema().name()))?;
        match &*value {
            Composable::Stack(_) => stack::range_of_all_children(&data.children),
            Composable::Track(_) => track::range_of_all_children(&data.children, true),
            _ => track::range_of_all_children(&data.children, false),
        }
    }

    /// Range of every child, keyed by handle
    pub fn range_of_all_children(&self) -> Result<HashMap<ComposableRef, TimeRange>> {
        let ranges = self.child_ranges()?;
        Ok(self.children().into_iter().zip(ranges).collect())
    }

    /// The child covering `time`
    ///
    /// With `shallow` false the search descends into compositions, mapping
    /// `time` into each child's own time space, and returns the deepest
    /// match. Transitions are skipped. Stacks are searched top layer first.
    ///
    /// The mapping is `time - range_in_parent.start + child.trimmed_range.start`,
    /// so a nested composition trimmed to start at frame 10 is searched from
    /// its frame 10 onwards, not from its frame 0.
    pub fn child_at_time(&self, time: RationalTime, shallow: bool) -> Result<Option<ComposableRef>> {
        let ranges = self.child_ranges()?;
        let mut candidates: Vec<(ComposableRef, TimeRange)> =
            self.children().into_iter().zip(ranges).collect();
        if stack::searches_top_first(&self.borrow()) {
            candidates.reverse();
        }

        for (child, range) in candidates {
            if !child.borrow().visible() || !range.contains(time) {
                continue;
            }
            if shallow || !child.is_composition() {
                return Ok(Some(child));
            }
            let local = time - range.start_time() + child.trimmed_range()?.start_time();
            return child.child_at_time(local, false);
        }
        Ok(None)
    }

    /// Children whose range shares any time with `search_range`
    pub fn children_in_range(&self, search_range: &TimeRange) -> Result<Vec<ComposableRef>> {
        let ranges = self.child_ranges()?;
        Ok(self
            .children()
            .into_iter()
            .zip(ranges)
            .filter(|(_, range)| range.intersects(search_range, RANGE_EPSILON))
            .map(|(child, _)| child)
            .collect())
    }

    /// Children, optionally limited to `search_range` and filtered
    ///
    /// With `shallow` false every descendant is visited; the range is
    /// mapped into each nested composition's own time space on the way down.
    pub fn find_children(
        &self,
        search_range: Option<&TimeRange>,
        shallow: bool,
        filter: Option<ChildFilter<'_>>,
    ) -> Result<Vec<ComposableRef>> {
        let children = self.children();
        // child ranges are resolved only for a range search
        let ranges: Vec<Option<TimeRange>> = match search_range {
            Some(_) => self.child_ranges()?.into_iter().map(Some).collect(),
            None => vec![None; children.len()],
        };
        let mut found = Vec::new();

        for (child, range) in children.into_iter().zip(ranges) {
            let nested_range = match (search_range, range) {
                (Some(search), Some(range)) => {
                    if !range.intersects(search, RANGE_EPSILON) {
                        continue;
                    }
                    Some((search, range))
                }
                _ => None,
            };
            if filter.map_or(true, |keep| keep(&child)) {
                found.push(child.clone());
            }
            if shallow || !child.is_composition() {
                continue;
            }
            let nested_range = match nested_range {
                Some((search, range)) => {
                    let start = search.start_time() - range.start_time()
                        + child.trimmed_range()?.start_time();
                    Some(TimeRange::new(start, search.duration()))
                }
                None => None,
            };
            found.extend(child.find_children(nested_range.as_ref(), false, filter)?);
        }
        Ok(found)
    }

    /// Clips among the children (every descendant unless `shallow`)
    pub fn find_clips(
        &self,
        search_range: Option<&TimeRange>,
        shallow: bool,
    ) -> Result<Vec<ComposableRef>> {
        let is_clip = |child: &ComposableRef| child.is_clip();
        self.find_children(search_range, shallow, Some(&is_clip as ChildFilter<'_>))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::Clip;
    use crate::gap::Gap;
    use crate::stack::Stack;
    use crate::track::Track;

    fn clip(name: &str, frames: f64) -> ComposableRef {
        let mut clip = Clip::new(name);
        clip.item.source_range = Some(TimeRange::from_values(0.0, frames, 24.0));
        ComposableRef::from(clip)
    }

    fn track_of(children: &[ComposableRef]) -> ComposableRef {
        let track = ComposableRef::from(Track::new("v1"));
        for child in children {
            track.append_child(child.clone()).unwrap();
        }
        track
    }

    #[test]
    fn test_append_sets_parent() {
        let c = clip("a", 24.0);
        let track = track_of(&[c.clone()]);
        assert_eq!(c.parent(), Some(track.clone()));
        assert!(track.has_child(&c));
        assert_eq!(track.index_of_child(&c).unwrap(), 0);
    }

    #[test]
    fn test_append_to_leaf_is_type_mismatch() {
        let leaf = clip("a", 24.0);
        let err = leaf.append_child(clip("b", 1.0)).unwrap_err();
        assert_eq!(err, OtioError::type_mismatch("Composition", "Clip"));
    }

    #[test]
    fn test_cycle_rejected() {
        let outer = ComposableRef::from(Stack::new("outer"));
        let inner = ComposableRef::from(Track::new("inner"));
        outer.append_child(inner.clone()).unwrap();
        assert_eq!(outer.append_child(outer.clone()), Err(OtioError::WouldCreateCycle));

        let root = outer.clone();
        let detached = ComposableRef::from(Track::new("t"));
        detached.append_child(clip("x", 1.0)).unwrap();
        assert!(root.append_child(detached).is_ok());
        assert!(root.is_parent_of(&inner));
        assert!(!inner.is_parent_of(&root));
    }

    #[test]
    fn test_insert_bounds() {
        let track = track_of(&[clip("a", 24.0), clip("b", 24.0)]);
        let x = clip("x", 1.0);
        for index in [-1, 3] {
            assert_eq!(
                track.insert_child(index, x.clone()),
                Err(OtioError::IndexOutOfBounds { index, size: 2 })
            );
        }
        assert_eq!(track.child_count(), 2);
        assert!(x.parent().is_none());

        track.insert_child(2, x.clone()).unwrap();
        assert_eq!(track.index_of_child(&x).unwrap(), 2);
    }

    #[test]
    fn test_remove_and_set_child() {
        let a = clip("a", 24.0);
        let b = clip("b", 24.0);
        let track = track_of(&[a.clone(), b.clone()]);

        let c = clip("c", 10.0);
        track.set_child(0, c.clone()).unwrap();
        assert!(a.parent().is_none());
        assert_eq!(c.parent(), Some(track.clone()));

        let removed = track.remove_child(1).unwrap();
        assert_eq!(removed, b);
        assert!(b.parent().is_none());
        assert_eq!(
            track.remove_child(5).unwrap_err(),
            OtioError::IndexOutOfBounds { index: 5, size: 1 }
        );
    }

    #[test]
    fn test_set_children_validates_first() {
        let a = clip("a", 24.0);
        let track = track_of(&[a.clone()]);
        let owned_elsewhere = clip("o", 1.0);
        let _other = track_of(&[owned_elsewhere.clone()]);

        let err = track
            .set_children(vec![clip("n", 1.0), owned_elsewhere])
            .unwrap_err();
        assert_eq!(err, OtioError::ChildAlreadyHasParent);
        assert_eq!(track.children(), vec![a.clone()]);

        let b = clip("b", 1.0);
        track.set_children(vec![b.clone(), a.clone()]).unwrap();
        assert_eq!(track.children(), vec![b, a]);
    }

    #[test]
    fn test_clear_children_detaches() {
        let a = clip("a", 24.0);
        let track = track_of(&[a.clone()]);
        track.clear_children();
        assert_eq!(track.child_count(), 0);
        assert!(a.parent().is_none());
    }

    #[test]
    fn test_range_of_child_not_a_child() {
        let track = track_of(&[clip("a", 24.0)]);
        let stranger = clip("s", 1.0);
        assert_eq!(track.range_of_child(&stranger), Err(OtioError::NotAChild));
        assert_eq!(track.trimmed_range_of_child(&stranger), Err(OtioError::NotAChild));
    }

    #[test]
    fn test_trimmed_child_range_against_source_range() {
        let a = clip("a", 24.0);
        let b = clip("b", 24.0);
        let track = track_of(&[a.clone(), b.clone()]);
        track
            .set_source_range(Some(TimeRange::from_values(12.0, 24.0, 24.0)))
            .unwrap();

        assert_eq!(
            track.trimmed_range_of_child(&a).unwrap(),
            Some(TimeRange::from_values(12.0, 12.0, 24.0))
        );
        assert_eq!(
            track.trimmed_range_of_child(&b).unwrap(),
            Some(TimeRange::from_values(24.0, 12.0, 24.0))
        );

        track
            .set_source_range(Some(TimeRange::from_values(0.0, 10.0, 24.0)))
            .unwrap();
        assert_eq!(track.trimmed_range_of_child(&b).unwrap(), None);
    }

    #[test]
    fn test_child_at_time_descends() {
        let inner_clip = clip("deep", 24.0);
        let inner = track_of(&[inner_clip.clone()]);
        let first = clip("first", 24.0);
        let outer = track_of(&[first.clone(), inner.clone()]);

        let t = |f: f64| RationalTime::new(f, 24.0);
        assert_eq!(outer.child_at_time(t(0.0), false).unwrap(), Some(first));
        assert_eq!(outer.child_at_time(t(30.0), true).unwrap(), Some(inner));
        assert_eq!(outer.child_at_time(t(30.0), false).unwrap(), Some(inner_clip));
        assert_eq!(outer.child_at_time(t(48.0), false).unwrap(), None);
    }

    #[test]
    fn test_find_clips_deep_and_shallow() {
        let inner = track_of(&[clip("deep", 24.0)]);
        let gap = ComposableRef::from(Gap::new(RationalTime::new(5.0, 24.0)));
        let outer = track_of(&[clip("first", 24.0), inner, gap]);

        assert_eq!(outer.find_clips(None, true).unwrap().len(), 1);
        let all = outer.find_clips(None, false).unwrap();
        let names: Vec<String> = all.iter().map(ComposableRef::name).collect();
        assert_eq!(names, vec!["first", "deep"]);
        assert!(outer.has_clips());
    }

    #[test]
    fn test_child_at_time_honours_nested_trim() {
        let early = clip("early", 10.0);
        let late = clip("late", 20.0);
        let inner = track_of(&[early.clone(), late.clone()]);
        inner
            .set_source_range(Some(TimeRange::from_values(10.0, 20.0, 24.0)))
            .unwrap();
        let outer = track_of(&[clip("lead", 24.0), inner]);

        // outer frame 24 is inner frame 10, the first frame of "late"
        let t = |f: f64| RationalTime::new(f, 24.0);
        assert_eq!(outer.child_at_time(t(24.0), false).unwrap(), Some(late.clone()));
        assert_eq!(outer.child_at_time(t(43.0), false).unwrap(), Some(late));
        assert_eq!(outer.child_at_time(t(44.0), false).unwrap(), None);
        assert!(early.parent().is_some());
    }

    #[test]
    fn test_find_clips_with_unresolvable_clip() {
        use crate::media_reference::MediaReference;

        let untrimmed = ComposableRef::from(Clip::with_media(
            "untrimmed",
            MediaReference::external("file:///no_range.mov"),
            None,
        ));
        assert!(untrimmed.duration().is_err());
        let inner = track_of(&[untrimmed.clone()]);
        let outer = track_of(&[clip("trimmed", 24.0), inner]);

        let names: Vec<String> = outer
            .find_clips(None, false)
            .unwrap()
            .iter()
            .map(ComposableRef::name)
            .collect();
        assert_eq!(names, vec!["trimmed", "untrimmed"]);
        assert_eq!(outer.find_children(None, true, None).unwrap().len(), 2);

        // a range search still has to resolve every range
        let range = TimeRange::from_values(0.0, 24.0, 24.0);
        assert_eq!(
            outer.find_clips(Some(&range), false).unwrap_err(),
            OtioError::CannotComputeAvailableRange
        );
    }

    #[test]
    fn test_find_children_in_range() {
        let outer = track_of(&[clip("a", 24.0), clip("b", 24.0), clip("c", 24.0)]);
        let range = TimeRange::from_values(30.0, 24.0, 24.0);
        let names: Vec<String> = outer
            .find_children(Some(&range), true, None)
            .unwrap()
            .iter()
            .map(ComposableRef::name)
            .collect();
        assert_eq!(names, vec!["b", "c"]);
    }

    #[test]
    fn test_range_of_all_children() {
        let a = clip("a", 24.0);
        let b = clip("b", 48.0);
        let track = track_of(&[a.clone(), b.clone()]);
        let ranges = track.range_of_all_children().unwrap();
        assert_eq!(ranges[&a], TimeRange::from_values(0.0, 24.0, 24.0));
        assert_eq!(ranges[&b], TimeRange::from_values(24.0, 48.0, 24.0));
    }
}
