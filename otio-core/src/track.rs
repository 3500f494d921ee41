//! Tracks: children laid out one after another

use crate::composable::{Composable, ComposableRef};
use crate::composition::CompositionData;
use crate::constants::{TRACK_KIND_AUDIO, TRACK_KIND_VIDEO};
use crate::error::OtioError;
use crate::gap::Gap;
use crate::Result;
use opentime::{RationalTime, TimeRange};

/// Sequential composition; each visible child starts where the previous one ends
#[derive(Debug)]
pub struct Track {
    /// Item attributes and children
    pub data: CompositionData,
    /// `"Video"`, `"Audio"` or any producer-specific kind
    pub kind: String,
}

impl Default for Track {
    fn default() -> Self {
        Self {
            data: CompositionData::default(),
            kind: TRACK_KIND_VIDEO.to_string(),
        }
    }
}

impl Track {
    /// An empty video track
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_kind(name, TRACK_KIND_VIDEO)
    }

    /// An empty track of the given kind
    pub fn with_kind(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            data: CompositionData::new(name),
            kind: kind.into(),
        }
    }

    /// Whether this is a picture track
    pub fn is_video(&self) -> bool {
        self.kind == TRACK_KIND_VIDEO
    }

    /// Whether this is a sound track
    pub fn is_audio(&self) -> bool {
        self.kind == TRACK_KIND_AUDIO
    }
}

/// Whether [`ComposableRef::neighbors_of`] invents gaps next to edge transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NeighborGapPolicy {
    /// Missing neighbours are reported as `None`
    #[default]
    Never,
    /// A transition at either end of the track gets a gap as long as its offset
    AroundTransitions,
}

/// Ranges of every child laid end to end
///
/// With `skip_invisible` set, transitions are positioned but do not advance
/// the running start time.
pub(crate) fn range_of_all_children(
    children: &[ComposableRef],
    skip_invisible: bool,
) -> Result<Vec<TimeRange>> {
    let mut ranges = Vec::with_capacity(children.len());
    let mut cursor: Option<RationalTime> = None;
    for child in children {
        let duration = child.duration()?;
        let start = cursor.unwrap_or_else(|| RationalTime::new(0.0, duration.rate()));
        ranges.push(TimeRange::new(start, duration));
        if !skip_invisible || child.borrow().visible() {
            cursor = Some(start + duration);
        } else {
            cursor = Some(start);
        }
    }
    Ok(ranges)
}

/// Range of the child at `index`; only children before it are measured
pub(crate) fn range_of_child_at_index(
    children: &[ComposableRef],
    index: usize,
    skip_invisible: bool,
) -> Result<TimeRange> {
    let duration = children[index].duration()?;
    let mut start = RationalTime::new(0.0, duration.rate());
    for child in &children[..index] {
        if !skip_invisible || child.borrow().visible() {
            start += child.duration()?;
        }
    }
    Ok(TimeRange::new(start, duration))
}

fn transition_offsets(node: Option<&ComposableRef>) -> Option<(RationalTime, RationalTime)> {
    let node = node?;
    let value = node.borrow();
    value.as_transition().map(|t| (t.in_offset, t.out_offset))
}

impl ComposableRef {
    fn require_track(&self) -> Result<()> {
        match &*self.borrow() {
            Composable::Track(_) => Ok(()),
            other => Err(OtioError::type_mismatch("Track", other.schema().name())),
        }
    }

    /// The children on either side of `child` in this track
    pub fn neighbors_of(
        &self,
        child: &ComposableRef,
        policy: NeighborGapPolicy,
    ) -> Result<(Option<ComposableRef>, Option<ComposableRef>)> {
        self.require_track()?;
        if !self.has_child(child) {
            return Err(OtioError::NotAChild);
        }
        let index = self.index_of_child(child).map_err(|_| OtioError::NotAChild)?;
        let mut previous = index.checked_sub(1).and_then(|i| self.child_at_index(i));
        let mut next = self.child_at_index(index + 1);

        if policy == NeighborGapPolicy::AroundTransitions {
            if let Some((in_offset, out_offset)) = transition_offsets(Some(child)) {
                if previous.is_none() {
                    previous = Some(ComposableRef::from(Gap::new(in_offset)));
                }
                if next.is_none() {
                    next = Some(ComposableRef::from(Gap::new(out_offset)));
                }
            }
        }
        Ok((previous, next))
    }

    /// How far the transitions on either side of `child` reach into it
    pub fn handles_of_child(
        &self,
        child: &ComposableRef,
    ) -> Result<(Option<RationalTime>, Option<RationalTime>)> {
        let (previous, next) = self.neighbors_of(child, NeighborGapPolicy::Never)?;
        let head = transition_offsets(previous.as_ref()).map(|(in_offset, _)| in_offset);
        let tail = transition_offsets(next.as_ref()).map(|(_, out_offset)| out_offset);
        Ok((head, tail))
    }
}
