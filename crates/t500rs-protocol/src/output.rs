//! T500RS output command encoding for force feedback.
//!
//! All builders are pure and allocation-free. Each command's parameter block
//! is a typed struct with an `encode()` that produces the exact byte layout
//! observed in USB captures of the Windows driver; the numeric downscaling
//! from the generic 16-bit effect model (`>> 8` coefficients, `>> 9`
//! saturations/deadband/center) must be reproduced bit-for-bit for device
//! compatibility.
//!
//! # Block layouts
//!
//! | Block | Size | Layout |
//! |-------|------|--------|
//! | Envelope | 9 | `[0x02, 0x1c, slot, attack_len LE16, attack_level, fade_len LE16, fade_level]` |
//! | Constant | 4 | `[0x03, 0x0e, slot, level]` |
//! | Ramp | 5 | `[0x07, 0x0e, slot, start, end]` |
//! | Periodic | 8 | `[0x04, 0x0e, slot, magnitude, offset, phase, period LE16]` |
//! | Basic condition | 11 | `[0x05, 0x0e, slot, center, deadband, 0×4, right, left]` |
//! | Upload trailer | 13 | `[0x01, slot, type, 0x40, 0x17, 0x25, 0x00, 0xff, 0xff, 0x0e, 0x00, 0x1c, 0x00]` |
//! | Extended condition | 15 | `[type, slot, 0, 0, 0x05, 0x0e, coeffs…, factors…]` |
//! | Inertia | 8 | `[0x41, slot, 0, 0, 0x03, 0x0e, strength, damping]` |
//! | Autocenter | 8 | `[0x06, 0, 0, 0, 0x03, 0x0e, strength, coefficient]` |
//! | Combined | 8+2n/3n | `[0x0f, slot, 0, 0, 0x05, 0x0e, n, dyn, entries…]` |
//! | Weight curve | 6–14 | `[0x06, slot, index, kind, strength, invert, extra…]` |
//! | Weight update | 8 | `[0x06, slot, 0, 0, id, weight, steps, 0]` |
//! | Play / Stop | 8 | `[0x00, slot, 0, 0, 0x41, 0x00, 0x41/0x00, 0x01]` |

#![deny(static_mut_refs)]

use tracing::trace;

use crate::frame::{EncodeError, Frame, MAX_PARAMS_LEN};
use crate::ids::{MAX_COMBINED_EFFECTS, commands, effect_types, marks, rotation};

/// Scale a generic signed 16-bit coefficient to the wire byte.
pub fn scale_coefficient(value: i16) -> u8 {
    (value >> 8) as u8
}

/// Scale a generic 16-bit saturation to the wire byte.
pub fn scale_saturation(value: u16) -> u8 {
    (value >> 9) as u8
}

/// Scale a generic 16-bit deadband to the wire byte.
pub fn scale_deadband(value: u16) -> u8 {
    (value >> 9) as u8
}

/// Scale a generic signed 16-bit center offset to the wire byte.
pub fn scale_center(value: i16) -> u8 {
    (value >> 9) as u8
}

/// Envelope block. A zeroed envelope always precedes constant, ramp, and
/// periodic uploads; a second envelope carrying the real attack/fade values
/// follows the upload trailer when the descriptor's envelope is nonzero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnvelopeBlock {
    pub slot: u8,
    pub attack_length: u16,
    pub attack_level: u8,
    pub fade_length: u16,
    pub fade_level: u8,
}

impl EnvelopeBlock {
    /// The all-zero envelope sent ahead of every level-based upload.
    pub fn zeroed(slot: u8) -> Self {
        Self {
            slot,
            ..Self::default()
        }
    }

    pub fn to_params(self) -> [u8; 9] {
        let [attack_lo, attack_hi] = self.attack_length.to_le_bytes();
        let [fade_lo, fade_hi] = self.fade_length.to_le_bytes();
        [
            commands::SET_ENVELOPE,
            marks::ENVELOPE_BLOCK,
            self.slot,
            attack_lo,
            attack_hi,
            self.attack_level,
            fade_lo,
            fade_hi,
            self.fade_level,
        ]
    }

    pub fn encode(self) -> Frame {
        Frame::from_block(self.to_params())
    }
}

/// Constant-force level block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantBlock {
    pub slot: u8,
    pub level: u8,
}

impl ConstantBlock {
    pub fn to_params(self) -> [u8; 4] {
        [commands::SET_CONSTANT, marks::PARAM_BLOCK, self.slot, self.level]
    }

    pub fn encode(self) -> Frame {
        Frame::from_block(self.to_params())
    }
}

/// Ramp start/end level block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RampBlock {
    pub slot: u8,
    pub start_level: u8,
    pub end_level: u8,
}

impl RampBlock {
    pub fn to_params(self) -> [u8; 5] {
        [
            commands::SET_RAMP,
            marks::PARAM_BLOCK,
            self.slot,
            self.start_level,
            self.end_level,
        ]
    }

    pub fn encode(self) -> Frame {
        Frame::from_block(self.to_params())
    }
}

/// Periodic waveform parameter block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodicBlock {
    pub slot: u8,
    pub magnitude: u8,
    pub offset: u8,
    pub phase: u8,
    pub period_ms: u16,
}

impl PeriodicBlock {
    pub fn to_params(self) -> [u8; 8] {
        let [period_lo, period_hi] = self.period_ms.to_le_bytes();
        [
            commands::SET_PERIODIC,
            marks::PARAM_BLOCK,
            self.slot,
            self.magnitude,
            self.offset,
            self.phase,
            period_lo,
            period_hi,
        ]
    }

    pub fn encode(self) -> Frame {
        Frame::from_block(self.to_params())
    }
}

/// Basic condition block, used by the spring upload path.
///
/// Center and deadband are fixed at `0x64` on this path; only the
/// coefficients vary (scaled by the driver's spring level).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasicConditionBlock {
    pub slot: u8,
    pub center: u8,
    pub deadband: u8,
    pub right_coeff: u8,
    pub left_coeff: u8,
}

impl BasicConditionBlock {
    /// Spring block with the fixed center/deadband bytes.
    pub fn spring(slot: u8, coefficient: u8) -> Self {
        Self {
            slot,
            center: 0x64,
            deadband: 0x64,
            right_coeff: coefficient,
            left_coeff: coefficient,
        }
    }

    pub fn to_params(self) -> [u8; 11] {
        [
            commands::SET_CONDITION,
            marks::PARAM_BLOCK,
            self.slot,
            self.center,
            self.deadband,
            0x00,
            0x00,
            0x00,
            0x00,
            self.right_coeff,
            self.left_coeff,
        ]
    }

    pub fn encode(self) -> Frame {
        Frame::from_block(self.to_params())
    }
}

/// Upload trailer, finalizing a slot's effect definition on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadBlock {
    pub slot: u8,
    pub effect_type: u8,
}

impl UploadBlock {
    pub fn to_params(self) -> [u8; 13] {
        [
            commands::UPLOAD_EFFECT,
            self.slot,
            self.effect_type,
            0x40,
            0x17,
            0x25,
            0x00,
            0xff,
            0xff,
            0x0e,
            0x00,
            0x1c,
            0x00,
        ]
    }

    pub fn encode(self) -> Frame {
        Frame::from_block(self.to_params())
    }

    /// Recover the slot and effect type from an upload parameter block.
    ///
    /// Returns `None` when the block is not a well-formed upload trailer.
    pub fn decode(params: &[u8]) -> Option<Self> {
        let [opcode, slot, effect_type, rest @ ..] = params else {
            return None;
        };
        if *opcode != commands::UPLOAD_EFFECT || rest.len() != 10 {
            return None;
        }
        if rest != [0x40, 0x17, 0x25, 0x00, 0xff, 0xff, 0x0e, 0x00, 0x1c, 0x00] {
            return None;
        }
        Some(Self {
            slot: *slot,
            effect_type: *effect_type,
        })
    }
}

/// Extended condition block: damper and friction use this richer encoding by
/// default because the extra velocity/acceleration (damper) and
/// position/velocity (friction) factors give noticeably better physical
/// fidelity than the basic condition path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtendedConditionBlock {
    pub effect_type: u8,
    pub slot: u8,
    pub right_coeff: u8,
    pub left_coeff: u8,
    pub right_sat: u8,
    pub left_sat: u8,
    pub deadband: u8,
    pub center: u8,
    pub velocity_factor: u8,
    pub acceleration_factor: u8,
    pub position_factor: u8,
}

impl ExtendedConditionBlock {
    /// Default damper factors observed in captures.
    pub fn damper_factors() -> (u8, u8) {
        (0x64, 0x32)
    }

    /// Default friction factors observed in captures.
    pub fn friction_factors() -> (u8, u8) {
        (0x64, 0x32)
    }

    pub fn to_params(self) -> [u8; 15] {
        [
            self.effect_type,
            self.slot,
            0x00,
            0x00,
            commands::SET_CONDITION,
            marks::PARAM_BLOCK,
            self.right_coeff,
            self.left_coeff,
            self.right_sat,
            self.left_sat,
            self.deadband,
            self.center,
            self.velocity_factor,
            self.acceleration_factor,
            self.position_factor,
        ]
    }

    pub fn encode(self) -> Frame {
        Frame::from_block(self.to_params())
    }

    /// Recover the condition bytes from an extended-condition block.
    pub fn decode(params: &[u8]) -> Option<Self> {
        let &[effect_type, slot, 0x00, 0x00, cmd, mark, right_coeff, left_coeff, right_sat, left_sat, deadband, center, velocity_factor, acceleration_factor, position_factor] =
            params
        else {
            return None;
        };
        if cmd != commands::SET_CONDITION || mark != marks::PARAM_BLOCK {
            return None;
        }
        Some(Self {
            effect_type,
            slot,
            right_coeff,
            left_coeff,
            right_sat,
            left_sat,
            deadband,
            center,
            velocity_factor,
            acceleration_factor,
            position_factor,
        })
    }
}

/// Inertia block. Strength and damping come from the condition descriptor's
/// coefficients shifted down to wire scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InertiaBlock {
    pub slot: u8,
    pub strength: u8,
    pub damping: u8,
}

impl InertiaBlock {
    pub fn to_params(self) -> [u8; 8] {
        [
            effect_types::BASIC_CONDITION,
            self.slot,
            0x00,
            0x00,
            0x03,
            marks::PARAM_BLOCK,
            self.strength,
            self.damping,
        ]
    }

    pub fn encode(self) -> Frame {
        Frame::from_block(self.to_params())
    }
}

/// Autocenter block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutocenterBlock {
    pub strength: u8,
    pub coefficient: u8,
}

impl AutocenterBlock {
    pub fn to_params(self) -> [u8; 8] {
        [
            effect_types::AUTOCENTER,
            0x00,
            0x00,
            0x00,
            0x03,
            marks::PARAM_BLOCK,
            self.strength,
            self.coefficient,
        ]
    }

    pub fn encode(self) -> Frame {
        Frame::from_block(self.to_params())
    }
}

/// One reference inside a combined-effect block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombinedEntry {
    pub effect_id: u8,
    pub weight: u8,
    /// Minimum weight, used only when dynamic weights are enabled.
    pub min_weight: u8,
    /// Maximum weight, used only when dynamic weights are enabled.
    pub max_weight: u8,
}

impl CombinedEntry {
    /// Pack the min/max bounds into the single nibble byte the wire carries.
    fn packed_bounds(self) -> u8 {
        (self.min_weight & 0xf0) | ((self.max_weight >> 4) & 0x0f)
    }
}

/// Combined-effect header block: effect count, dynamic-weights flag, then
/// `(id, weight[, packed min/max])` pairs or triples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombinedBlock<'a> {
    pub slot: u8,
    pub dynamic_weights: bool,
    pub entries: &'a [CombinedEntry],
}

impl CombinedBlock<'_> {
    /// Encoded block size for a given entry count.
    pub fn encoded_len(dynamic_weights: bool, num_effects: usize) -> usize {
        8 + num_effects * if dynamic_weights { 3 } else { 2 }
    }

    pub fn encode(self) -> Result<Frame, EncodeError> {
        if self.entries.is_empty() {
            return Err(EncodeError::EmptyCombined);
        }
        if self.entries.len() > MAX_COMBINED_EFFECTS {
            return Err(EncodeError::CapacityExceeded(self.entries.len()));
        }

        let mut params = [0u8; MAX_PARAMS_LEN];
        params[0] = effect_types::COMBINE;
        params[1] = self.slot;
        params[4] = commands::SET_CONDITION;
        params[5] = marks::PARAM_BLOCK;
        params[6] = self.entries.len() as u8;
        params[7] = u8::from(self.dynamic_weights);

        let stride = if self.dynamic_weights { 3 } else { 2 };
        for (i, entry) in self.entries.iter().enumerate() {
            params[8 + i * stride] = entry.effect_id;
            params[9 + i * stride] = entry.weight;
            if self.dynamic_weights {
                params[10 + i * stride] = entry.packed_bounds();
            }
        }

        let len = Self::encoded_len(self.dynamic_weights, self.entries.len());
        trace!(
            slot = self.slot,
            num_effects = self.entries.len(),
            dynamic = self.dynamic_weights,
            "encoded combined block"
        );
        Frame::from_params(&params[..len])
    }
}

/// Weight-curve upload block, forwarding one reference's curve parameters to
/// the device. The kind-specific `extra` bytes are forwarded raw; the host
/// does not interpret them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightCurveBlock<'a> {
    pub slot: u8,
    pub weight_index: u8,
    pub curve_kind: u8,
    pub strength: u8,
    pub invert: bool,
    pub extra: &'a [u8],
}

impl WeightCurveBlock<'_> {
    /// Longest kind-specific parameter tail (the 8 custom-curve points).
    pub const MAX_EXTRA: usize = 8;

    pub fn encode(self) -> Result<Frame, EncodeError> {
        if self.extra.len() > Self::MAX_EXTRA {
            return Err(EncodeError::Oversize(6 + self.extra.len()));
        }
        let mut params = [0u8; 6 + Self::MAX_EXTRA];
        params[0] = commands::UPDATE_WEIGHTS;
        params[1] = self.slot;
        params[2] = self.weight_index;
        params[3] = self.curve_kind;
        params[4] = self.strength;
        params[5] = u8::from(self.invert);
        params[6..6 + self.extra.len()].copy_from_slice(self.extra);
        Frame::from_params(&params[..6 + self.extra.len()])
    }
}

/// Single-weight incremental update for an already-uploaded combined effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightUpdateBlock {
    pub slot: u8,
    pub effect_id: u8,
    pub weight: u8,
    /// Smoothing step count; zero requests an immediate change.
    pub transition_steps: u8,
}

impl WeightUpdateBlock {
    pub fn to_params(self) -> [u8; 8] {
        [
            commands::UPDATE_WEIGHTS,
            self.slot,
            0x00,
            0x00,
            self.effect_id,
            self.weight,
            self.transition_steps,
            0x00,
        ]
    }

    pub fn encode(self) -> Frame {
        Frame::from_block(self.to_params())
    }
}

/// Playback control block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartStopBlock {
    pub slot: u8,
    pub start: bool,
}

impl StartStopBlock {
    pub fn play(slot: u8) -> Self {
        Self { slot, start: true }
    }

    pub fn stop(slot: u8) -> Self {
        Self { slot, start: false }
    }

    pub fn to_params(self) -> [u8; 8] {
        [
            effect_types::CONSTANT,
            self.slot,
            0x00,
            0x00,
            commands::START_STOP,
            0x00,
            if self.start { marks::START } else { marks::STOP },
            0x01,
        ]
    }

    pub fn encode(self) -> Frame {
        Frame::from_block(self.to_params())
    }
}

/// Build a device-gain setup command: the 16-bit gain's high byte.
pub fn build_gain_command(gain: u16) -> [u8; 2] {
    [0x02, (gain >> 8) as u8]
}

/// Build a rotation-range setup command.
///
/// `degrees` is clamped to the device's 40..=1080 range, then scaled by
/// `0x3c` and transmitted little-endian.
pub fn build_range_command(degrees: u16) -> [u8; 4] {
    let clamped = degrees.clamp(rotation::MIN_DEGREES, rotation::MAX_DEGREES);
    let scaled = u32::from(clamped) * u32::from(rotation::DEGREE_SCALE);
    let [lo, hi] = (scaled as u16).to_le_bytes();
    [0x08, 0x11, lo, hi]
}
