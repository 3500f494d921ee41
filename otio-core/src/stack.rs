//! Stacks: children layered on top of one another

use crate::composable::{Composable, ComposableRef};
use crate::composition::CompositionData;
use crate::Result;
use opentime::{RationalTime, TimeRange};

/// Layered composition; every child starts at zero and later children sit on top
#[derive(Debug, Default)]
pub struct Stack {
    /// Item attributes and children
    pub data: CompositionData,
}

impl Stack {
    /// An empty stack
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            data: CompositionData::new(name),
        }
    }
}

fn layered(duration: RationalTime) -> TimeRange {
    TimeRange::new(RationalTime::new(0.0, duration.rate()), duration)
}

pub(crate) fn range_of_all_children(children: &[ComposableRef]) -> Result<Vec<TimeRange>> {
    children
        .iter()
        .map(|child| child.duration().map(layered))
        .collect()
}

pub(crate) fn range_of_child_at_index(children: &[ComposableRef], index: usize) -> Result<TimeRange> {
    children[index].duration().map(layered)
}

/// The topmost layer wins a time search
pub(crate) fn searches_top_first(value: &Composable) -> bool {
    matches!(value, Composable::Stack(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::Clip;
    use crate::track::Track;

    fn clip(name: &str, frames: f64) -> ComposableRef {
        let mut clip = Clip::new(name);
        clip.item.source_range = Some(TimeRange::from_values(10.0, frames, 24.0));
        ComposableRef::from(clip)
    }

    #[test]
    fn test_children_co_start() {
        let stack = ComposableRef::from(Stack::new("s"));
        stack.append_child(clip("short", 24.0)).unwrap();
        stack.append_child(clip("long", 96.0)).unwrap();

        for index in 0..2 {
            assert_eq!(
                stack.range_of_child_at_index(index).unwrap().start_time(),
                RationalTime::new(0.0, 24.0)
            );
        }
        assert_eq!(stack.duration().unwrap(), RationalTime::new(96.0, 24.0));
    }

    #[test]
    fn test_child_at_time_prefers_top_layer() {
        let stack = ComposableRef::from(Stack::new("s"));
        let bottom = clip("bottom", 96.0);
        let top = clip("top", 24.0);
        stack.append_child(bottom.clone()).unwrap();
        stack.append_child(top.clone()).unwrap();

        let t = |f: f64| RationalTime::new(f, 24.0);
        assert_eq!(stack.child_at_time(t(5.0), true).unwrap(), Some(top));
        assert_eq!(stack.child_at_time(t(50.0), true).unwrap(), Some(bottom));
    }

    #[test]
    fn test_nested_tracks_in_stack() {
        let stack = ComposableRef::from(Stack::new("s"));
        let v1 = ComposableRef::from(Track::new("v1"));
        let c = clip("c", 24.0);
        v1.append_child(c.clone()).unwrap();
        stack.append_child(v1).unwrap();

        let found = stack.child_at_time(RationalTime::new(12.0, 24.0), false).unwrap();
        assert_eq!(found, Some(c));
    }
}
