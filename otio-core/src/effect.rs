//! Effects attached to items, including time warps

use crate::constants::schemas;
use crate::decoder::FieldReader;
use crate::encoder::ObjectWriter;
use crate::schema::Schema;
use crate::serializable::OtioSerializable;
use crate::types::Metadata;
use crate::Result;
use serde_json::Value;

/// The concrete flavour of an [`Effect`]
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EffectKind {
    /// `Effect.1`
    #[default]
    Generic,
    /// `TimeEffect.1`
    TimeEffect,
    /// `LinearTimeWarp.1`: playback speed multiplied by `time_scalar`
    LinearTimeWarp {
        /// Speed multiplier
        time_scalar: f64,
    },
    /// `FreezeFrame.1`: a time warp with scalar 0
    FreezeFrame,
}

/// An ordered attachment on an item
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Effect {
    /// Display name
    pub name: String,
    /// User data
    pub metadata: Metadata,
    /// Name of the effect in the producing application
    pub effect_name: String,
    /// Flavour and flavour-specific data
    pub kind: EffectKind,
}

impl Effect {
    /// A generic effect
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// A time effect with no further parameters
    pub fn time_effect(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EffectKind::TimeEffect,
            ..Default::default()
        }
    }

    /// A constant speed change
    pub fn linear_time_warp(name: impl Into<String>, time_scalar: f64) -> Self {
        Self {
            name: name.into(),
            effect_name: "LinearTimeWarp".to_string(),
            kind: EffectKind::LinearTimeWarp { time_scalar },
            ..Default::default()
        }
    }

    /// Hold the first frame for the item's duration
    pub fn freeze_frame(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            effect_name: "FreezeFrame".to_string(),
            kind: EffectKind::FreezeFrame,
            ..Default::default()
        }
    }

    /// Speed multiplier for time warps, `None` for other effects
    pub fn time_scalar(&self) -> Option<f64> {
        match self.kind {
            EffectKind::LinearTimeWarp { time_scalar } => Some(time_scalar),
            EffectKind::FreezeFrame => Some(0.0),
            EffectKind::Generic | EffectKind::TimeEffect => None,
        }
    }

    /// Whether the effect alters timing
    pub fn is_time_effect(&self) -> bool {
        !matches!(self.kind, EffectKind::Generic)
    }

    /// Value equality, including the flavour
    pub fn is_equivalent_to(&self, other: &Effect) -> bool {
        self == other
    }

    pub(crate) fn read_fields(&mut self, reader: &FieldReader<'_>) -> Result<()> {
        self.name = reader.string("name")?;
        self.metadata = reader.metadata("metadata")?;
        self.effect_name = reader.string("effect_name")?;
        if let EffectKind::LinearTimeWarp { time_scalar } = &mut self.kind {
            *time_scalar = reader.f64_or("time_scalar", 1.0)?;
        }
        Ok(())
    }
}

impl OtioSerializable for Effect {
    fn schema(&self) -> Schema {
        match self.kind {
            EffectKind::Generic => schemas::EFFECT,
            EffectKind::TimeEffect => schemas::TIME_EFFECT,
            EffectKind::LinearTimeWarp { .. } => schemas::LINEAR_TIME_WARP,
            EffectKind::FreezeFrame => schemas::FREEZE_FRAME,
        }
    }

    fn to_json_value(&self) -> Result<Value> {
        let writer = ObjectWriter::new(&self.schema())
            .string("name", &self.name)
            .metadata("metadata", &self.metadata)
            .string("effect_name", &self.effect_name);
        let writer = match self.time_scalar() {
            Some(scalar) => writer.number("time_scalar", scalar),
            None => writer,
        };
        Ok(writer.finish())
    }
}
