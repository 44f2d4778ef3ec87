//! Combined effects: weighted blends of already-uploaded slots.

use serde::{Deserialize, Serialize};

use t500rs_curves::WeightCurve;
use t500rs_protocol::MAX_COMBINED_EFFECTS;

use crate::error::FfbError;

/// One referenced effect inside a combined blend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectRef {
    /// Slot id of the referenced (already-uploaded) effect.
    pub slot: u8,
    /// Blend weight, 0..=255.
    pub weight: u8,
    /// Lower weight bound, enforced for dynamic-weight updates.
    pub min_weight: u8,
    /// Upper weight bound, enforced for dynamic-weight updates.
    pub max_weight: u8,
    /// Weight curve driving this reference when dynamic weights are enabled.
    pub curve: WeightCurve,
}

impl EffectRef {
    /// Reference a slot with a static weight and the full 0..=255 bounds.
    pub fn new(slot: u8, weight: u8) -> Self {
        Self {
            slot,
            weight,
            min_weight: 0,
            max_weight: 0xff,
            curve: WeightCurve::linear(),
        }
    }

    /// Restrict the weight to the given bounds.
    pub fn with_bounds(mut self, min_weight: u8, max_weight: u8) -> Self {
        self.min_weight = min_weight;
        self.max_weight = max_weight;
        self
    }

    /// Drive the weight with a curve.
    pub fn with_curve(mut self, curve: WeightCurve) -> Self {
        self.curve = curve;
        self
    }
}

/// A blend of up to [`MAX_COMBINED_EFFECTS`] uploaded effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedEffect {
    refs: Vec<EffectRef>,
    dynamic_weights: bool,
}

impl CombinedEffect {
    /// Build a combination whose weights stay fixed after upload.
    pub fn with_static_weights(refs: Vec<EffectRef>) -> Result<Self, FfbError> {
        Self::build(refs, false)
    }

    /// Build a combination whose weights follow their curves and accept
    /// incremental updates.
    pub fn with_dynamic_weights(refs: Vec<EffectRef>) -> Result<Self, FfbError> {
        Self::build(refs, true)
    }

    fn build(refs: Vec<EffectRef>, dynamic_weights: bool) -> Result<Self, FfbError> {
        if refs.is_empty() {
            return Err(FfbError::InvalidArgument(
                "combined effect references no effects",
            ));
        }
        if refs.len() > MAX_COMBINED_EFFECTS {
            return Err(FfbError::CapacityExceeded(
                "combined effect references more slots than supported",
            ));
        }
        for reference in &refs {
            if reference.min_weight > reference.max_weight {
                return Err(FfbError::InvalidArgument(
                    "weight bounds are inverted",
                ));
            }
            if dynamic_weights
                && !(reference.min_weight..=reference.max_weight).contains(&reference.weight)
            {
                return Err(FfbError::InvalidArgument(
                    "weight outside its declared bounds",
                ));
            }
        }
        Ok(Self {
            refs,
            dynamic_weights,
        })
    }

    /// The referenced effects, in wire order.
    pub fn refs(&self) -> &[EffectRef] {
        &self.refs
    }

    /// Whether weights are curve-driven and incrementally updatable.
    pub fn dynamic_weights(&self) -> bool {
        self.dynamic_weights
    }

    /// Number of referenced effects.
    pub fn num_effects(&self) -> usize {
        self.refs.len()
    }

    /// Host-side preview of a reference's weight at normalized progress
    /// `x ∈ [0,1]`.
    ///
    /// For static weights this is the stored weight. For dynamic weights the
    /// reference's curve maps progress into the declared min/max span;
    /// device-evaluated curve kinds have no host value and yield `None`.
    pub fn weight_at(&self, index: usize, x: f32) -> Option<u8> {
        let reference = self.refs.get(index)?;
        if !self.dynamic_weights {
            return Some(reference.weight);
        }
        let y = reference.curve.evaluate(x)?;
        let min = f32::from(reference.min_weight);
        let max = f32::from(reference.max_weight);
        Some((min + y * (max - min)).round() as u8)
    }

    /// Position of a referenced slot id, if present.
    pub(crate) fn index_of(&self, effect_id: u8) -> Option<usize> {
        self.refs.iter().position(|r| r.slot == effect_id)
    }

    /// Mutable access for incremental weight updates.
    pub(crate) fn ref_mut(&mut self, index: usize) -> Option<&mut EffectRef> {
        self.refs.get_mut(index)
    }
}

/// Incremental update of one weight inside an uploaded combined effect.
///
/// Bounded cost: only a single update frame referencing this effect is sent,
/// never a re-upload of the whole combination, so updates can run at
/// interactive rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightUpdate {
    /// Slot id of the referenced effect whose weight changes.
    pub effect_id: u8,
    /// The new weight; must lie within the reference's declared bounds.
    pub new_weight: u8,
    /// Ask the device to ramp to the new weight over `transition_steps`.
    pub smooth_transition: bool,
    /// Ramp step count; ignored unless `smooth_transition` is set.
    pub transition_steps: u8,
}

impl WeightUpdate {
    /// Immediate weight change.
    pub fn immediate(effect_id: u8, new_weight: u8) -> Self {
        Self {
            effect_id,
            new_weight,
            smooth_transition: false,
            transition_steps: 0,
        }
    }

    /// Smoothed weight change over the given number of device steps.
    pub fn smooth(effect_id: u8, new_weight: u8, transition_steps: u8) -> Self {
        Self {
            effect_id,
            new_weight,
            smooth_transition: true,
            transition_steps,
        }
    }

    /// The step byte that reaches the wire.
    pub(crate) fn wire_steps(&self) -> u8 {
        if self.smooth_transition {
            self.transition_steps
        } else {
            0
        }
    }
}
