//! Generic force-feedback effect descriptors.
//!
//! Descriptors carry the wider-range values of the generic effect model
//! (16-bit levels and coefficients); the encoder downscales them to the wire
//! bytes at upload time. A descriptor is immutable once submitted; changing a
//! playing effect means re-submitting to the same slot.

use serde::{Deserialize, Serialize};

use t500rs_protocol::ids::effect_types;

/// Attack/fade shaping applied to an effect's magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Envelope {
    /// Attack duration in milliseconds.
    pub attack_length: u16,
    /// Level at the start of the attack.
    pub attack_level: u8,
    /// Fade duration in milliseconds.
    pub fade_length: u16,
    /// Level at the end of the fade.
    pub fade_level: u8,
}

impl Envelope {
    /// An envelope with no attack and no fade is skipped on upload.
    pub fn is_zero(&self) -> bool {
        self.attack_length == 0 && self.fade_length == 0
    }
}

/// Playback timing: total length and pre-start delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Replay {
    /// Total playback length in milliseconds; `0` plays until stopped.
    pub length_ms: u16,
    /// Delay before the effect starts, in milliseconds.
    pub delay_ms: u16,
}

/// Periodic waveform shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Waveform {
    Sine,
    Square,
    Triangle,
    SawtoothUp,
    SawtoothDown,
}

impl Waveform {
    /// The wire effect-type byte for this waveform.
    pub fn effect_type(self) -> u8 {
        match self {
            Self::Sine => effect_types::SINE,
            Self::Square => effect_types::SQUARE,
            Self::Triangle => effect_types::TRIANGLE,
            Self::SawtoothUp => effect_types::SAWTOOTH_UP,
            Self::SawtoothDown => effect_types::SAWTOOTH_DOWN,
        }
    }
}

/// Parameters for condition effects (force computed from wheel position or
/// velocity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConditionParams {
    pub right_coeff: i16,
    pub left_coeff: i16,
    pub right_saturation: u16,
    pub left_saturation: u16,
    pub deadband: u16,
    pub center: i16,
}

/// The kind-specific payload of an effect descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    /// Constant force at a fixed level.
    Constant {
        /// Signed force level; the low byte reaches the wire.
        level: i16,
    },
    /// Force ramping between two levels over the effect length.
    Ramp { start_level: i16, end_level: i16 },
    /// Periodic waveform.
    Periodic {
        waveform: Waveform,
        magnitude: i16,
        offset: i16,
        phase: u16,
        period_ms: u16,
    },
    /// Spring: force toward a center position.
    Spring(ConditionParams),
    /// Damper: force opposing velocity.
    Damper(ConditionParams),
    /// Friction: force opposing motion.
    Friction(ConditionParams),
    /// Inertia: force opposing acceleration.
    Inertia(ConditionParams),
}

/// A complete, caller-supplied effect description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectDescriptor {
    pub kind: EffectKind,
    pub envelope: Envelope,
    pub replay: Replay,
}

impl EffectDescriptor {
    fn from_kind(kind: EffectKind) -> Self {
        Self {
            kind,
            envelope: Envelope::default(),
            replay: Replay::default(),
        }
    }

    /// Constant-force effect at the given level, playing until stopped.
    pub fn constant(level: i16) -> Self {
        Self::from_kind(EffectKind::Constant { level })
    }

    /// Ramp effect between two levels.
    pub fn ramp(start_level: i16, end_level: i16) -> Self {
        Self::from_kind(EffectKind::Ramp {
            start_level,
            end_level,
        })
    }

    /// Periodic effect with the given waveform and period.
    pub fn periodic(waveform: Waveform, magnitude: i16, period_ms: u16) -> Self {
        Self::from_kind(EffectKind::Periodic {
            waveform,
            magnitude,
            offset: 0,
            phase: 0,
            period_ms,
        })
    }

    /// Spring condition effect.
    pub fn spring(params: ConditionParams) -> Self {
        Self::from_kind(EffectKind::Spring(params))
    }

    /// Damper condition effect.
    pub fn damper(params: ConditionParams) -> Self {
        Self::from_kind(EffectKind::Damper(params))
    }

    /// Friction condition effect.
    pub fn friction(params: ConditionParams) -> Self {
        Self::from_kind(EffectKind::Friction(params))
    }

    /// Inertia condition effect.
    pub fn inertia(params: ConditionParams) -> Self {
        Self::from_kind(EffectKind::Inertia(params))
    }

    /// Set the attack/fade envelope.
    pub fn with_envelope(mut self, envelope: Envelope) -> Self {
        self.envelope = envelope;
        self
    }

    /// Set the total playback length in milliseconds (`0` = until stopped).
    pub fn with_length(mut self, length_ms: u16) -> Self {
        self.replay.length_ms = length_ms;
        self
    }

    /// Set the pre-start delay in milliseconds.
    pub fn with_delay(mut self, delay_ms: u16) -> Self {
        self.replay.delay_ms = delay_ms;
        self
    }

    /// The playback length, if the effect is finite.
    pub fn finite_length(&self) -> Option<u16> {
        (self.replay.length_ms > 0).then_some(self.replay.length_ms)
    }

    /// A periodic descriptor with a zero period can never be scheduled.
    pub fn has_zero_period(&self) -> bool {
        matches!(self.kind, EffectKind::Periodic { period_ms: 0, .. })
    }
}
