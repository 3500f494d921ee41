//! Gaps: explicit empty space in a composition

use crate::item::ItemData;
use crate::Result;
use crate::error::OtioError;
use opentime::{RationalTime, TimeRange};

/// An item that occupies time without media
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Gap {
    /// Shared item attributes
    pub item: ItemData,
}

impl Gap {
    /// A gap lasting `duration`
    pub fn new(duration: RationalTime) -> Self {
        Self::with_source_range(TimeRange::new(
            RationalTime::new(0.0, duration.rate()),
            duration,
        ))
    }

    /// A gap with an explicit range
    pub fn with_source_range(source_range: TimeRange) -> Self {
        Self {
            item: ItemData {
                source_range: Some(source_range),
                ..Default::default()
            },
        }
    }

    /// A gap has no media, so its source range is all there is
    pub fn available_range(&self) -> Result<TimeRange> {
        self.item
            .source_range
            .ok_or(OtioError::CannotComputeAvailableRange)
    }
}
