//! Range resolution and time conversion between nodes of a tree

use crate::composable::{Composable, ComposableRef};
use crate::error::OtioError;
use crate::track::NeighborGapPolicy;
use crate::types::{union_bounds, Box2d};
use crate::Result;
use opentime::{RationalTime, TimeRange};

fn zero_range(duration: RationalTime) -> TimeRange {
    TimeRange::new(RationalTime::new(0.0, duration.rate()), duration)
}

fn longest(children: &[ComposableRef]) -> Result<RationalTime> {
    let mut longest = RationalTime::default();
    for child in children {
        let duration = child.duration()?;
        if duration > longest {
            longest = duration;
        }
    }
    Ok(longest)
}

fn summed(children: &[ComposableRef], skip_invisible: bool) -> Result<RationalTime> {
    let mut total = RationalTime::default();
    for child in children {
        if skip_invisible && !child.borrow().visible() {
            continue;
        }
        total += child.duration()?;
    }
    Ok(total)
}

impl ComposableRef {
    /// Length of the node: the explicit trim's duration, else the available range's
    pub fn duration(&self) -> Result<RationalTime> {
        if let Composable::Transition(t) = &*self.borrow() {
            return Ok(t.duration());
        }
        Ok(self.trimmed_range()?.duration())
    }

    /// Everything the node could show if it were not trimmed
    ///
    /// Clips ask their active media reference; gaps fall back to their trim;
    /// tracks add up their visible children; stacks take the longest child.
    pub fn available_range(&self) -> Result<TimeRange> {
        let value = self.borrow();
        match &*value {
            Composable::Clip(clip) => clip.available_range(),
            Composable::Gap(gap) => gap.available_range(),
            Composable::Transition(t) => Ok(zero_range(t.duration())),
            Composable::Track(track) => summed(&track.data.children, true).map(zero_range),
            Composable::Stack(stack) => longest(&stack.data.children).map(zero_range),
            Composable::Composition(c) => summed(&c.data.children, false).map(zero_range),
        }
    }

    /// The explicit trim when present, else the available range
    pub fn trimmed_range(&self) -> Result<TimeRange> {
        match self.source_range() {
            Some(range) => Ok(range),
            None => self.available_range(),
        }
    }

    /// Trimmed range widened by the transitions that overlap this node in a track
    pub fn visible_range(&self) -> Result<TimeRange> {
        let mut range = self.trimmed_range()?;
        let Some(parent) = self.parent() else {
            return Ok(range);
        };
        if parent.borrow().as_track().is_none() {
            return Ok(range);
        }

        let (previous, next) = parent.neighbors_of(self, NeighborGapPolicy::Never)?;
        if let Some(previous) = previous {
            if let Some(t) = previous.borrow().as_transition() {
                range = TimeRange::new(
                    range.start_time() - t.in_offset,
                    range.duration() + t.in_offset,
                );
            }
        }
        if let Some(next) = next {
            if let Some(t) = next.borrow().as_transition() {
                range = TimeRange::new(range.start_time(), range.duration() + t.out_offset);
            }
        }
        Ok(range)
    }

    /// Where this node sits in its parent's time space
    pub fn range_in_parent(&self) -> Result<TimeRange> {
        let parent = self.parent().ok_or(OtioError::NotAChild)?;
        parent.range_of_child(self)
    }

    /// [`range_in_parent`](Self::range_in_parent) clipped to the parent's trim
    pub fn trimmed_range_in_parent(&self) -> Result<Option<TimeRange>> {
        let parent = self.parent().ok_or(OtioError::NotAChild)?;
        parent.trimmed_range_of_child(self)
    }

    /// Convert `time` from this node's time space to `to`'s
    ///
    /// The walk goes up from `self` until it meets `to` or the root, then
    /// down from the root to `to`. The result is not clamped to `to`'s
    /// extent. `None` or `self` as the target returns `time` unchanged.
    pub fn transformed_time(
        &self,
        time: RationalTime,
        to: Option<&ComposableRef>,
    ) -> Result<RationalTime> {
        let Some(to) = to else {
            return Ok(time);
        };
        if self.ptr_eq(to) {
            return Ok(time);
        }

        let mut result = time;
        let mut node = self.clone();
        while !node.ptr_eq(to) {
            let Some(parent) = node.parent() else {
                break;
            };
            result = result - node.trimmed_range()?.start_time()
                + parent.range_of_child(&node)?.start_time();
            node = parent;
        }
        if node.ptr_eq(to) {
            return Ok(result);
        }

        let root = node;
        let mut descent = Vec::new();
        let mut step = to.clone();
        while !step.ptr_eq(&root) {
            let parent = step.parent().ok_or(OtioError::NoCommonAncestor)?;
            let in_parent = parent.range_of_child(&step)?.start_time();
            descent.push((step.trimmed_range()?.start_time(), in_parent));
            step = parent;
        }
        for (trimmed_start, in_parent_start) in descent.into_iter().rev() {
            result = result - in_parent_start + trimmed_start;
        }
        Ok(result)
    }

    /// Convert the start of `range` into `to`'s time space; the duration is kept
    pub fn transformed_time_range(
        &self,
        range: &TimeRange,
        to: Option<&ComposableRef>,
    ) -> Result<TimeRange> {
        Ok(TimeRange::new(
            self.transformed_time(range.start_time(), to)?,
            range.duration(),
        ))
    }

    /// Union of the image bounds of every clip at or below this node
    pub fn available_image_bounds(&self) -> Option<Box2d> {
        let value = self.borrow();
        match &*value {
            Composable::Clip(clip) => clip.available_image_bounds(),
            Composable::Gap(_) | Composable::Transition(_) => None,
            other => other.composition_data().and_then(|data| {
                union_bounds(data.children.iter().map(ComposableRef::available_image_bounds))
            }),
        }
    }
}
