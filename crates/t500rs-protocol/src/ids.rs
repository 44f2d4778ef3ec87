//! T500RS device identification and wire-format constants.

#![deny(static_mut_refs)]

/// Thrustmaster USB vendor ID.
pub const THRUSTMASTER_VENDOR_ID: u16 = 0x044f;

/// T500RS wheelbase product ID.
pub const T500RS_PRODUCT_ID: u16 = 0xb65e;

/// Number of device-side effect storage slots.
pub const MAX_EFFECT_SLOTS: usize = 16;

/// Maximum number of references in one combined effect.
///
/// The dynamic-weight combined block packs `8 + 3 * n` bytes; 8 references is
/// the largest count that fits the parameter area of a command frame with
/// margin to spare.
pub const MAX_COMBINED_EFFECTS: usize = 8;

/// Command opcodes (byte 0 of the parameter block).
pub mod commands {
    /// Upload a new effect to a slot.
    pub const UPLOAD_EFFECT: u8 = 0x01;
    /// Modify an already-uploaded effect.
    pub const MODIFY_EFFECT: u8 = 0x02;
    /// Set envelope parameters.
    pub const SET_ENVELOPE: u8 = 0x02;
    /// Set constant-force parameters.
    pub const SET_CONSTANT: u8 = 0x03;
    /// Set periodic-waveform parameters.
    pub const SET_PERIODIC: u8 = 0x04;
    /// Set condition parameters.
    pub const SET_CONDITION: u8 = 0x05;
    /// Upload or update combined-effect weights.
    pub const UPDATE_WEIGHTS: u8 = 0x06;
    /// Set ramp parameters.
    pub const SET_RAMP: u8 = 0x07;
    /// Start/stop playback (byte 6 of the block selects start or stop).
    pub const START_STOP: u8 = 0x41;
}

/// Effect type bytes used in upload trailers and extended-effect blocks.
pub mod effect_types {
    /// Constant force.
    pub const CONSTANT: u8 = 0x00;
    /// Auto-centering.
    pub const AUTOCENTER: u8 = 0x06;
    /// Enhanced inertia.
    pub const INERTIA_2: u8 = 0x07;
    /// Enhanced friction.
    pub const FRICTION_2: u8 = 0x0c;
    /// Enhanced damper.
    pub const DAMPER_2: u8 = 0x0d;
    /// Combined (weighted multi-effect) block.
    pub const COMBINE: u8 = 0x0f;
    /// Square wave.
    pub const SQUARE: u8 = 0x20;
    /// Triangle wave.
    pub const TRIANGLE: u8 = 0x21;
    /// Sine wave.
    pub const SINE: u8 = 0x22;
    /// Sawtooth, rising edge.
    pub const SAWTOOTH_UP: u8 = 0x23;
    /// Sawtooth, falling edge.
    pub const SAWTOOTH_DOWN: u8 = 0x24;
    /// Ramp (shares the sawtooth-down type byte).
    pub const RAMP: u8 = 0x24;
    /// Spring condition.
    pub const SPRING: u8 = 0x40;
    /// Basic friction/damper/inertia condition.
    pub const BASIC_CONDITION: u8 = 0x41;
}

/// Fixed marker bytes carried inside parameter blocks.
pub mod marks {
    /// Marker at byte 1 of the SET_* parameter blocks.
    pub const PARAM_BLOCK: u8 = 0x0e;
    /// Marker at byte 1 of the envelope block.
    pub const ENVELOPE_BLOCK: u8 = 0x1c;
    /// Playback block start marker.
    pub const START: u8 = 0x41;
    /// Playback block stop marker.
    pub const STOP: u8 = 0x00;
}

/// Wheel rotation range limits in degrees, as enforced by the device.
pub mod rotation {
    pub const MIN_DEGREES: u16 = 40;
    pub const MAX_DEGREES: u16 = 1080;
    /// Wire scale: degrees are multiplied by this before transmission.
    pub const DEGREE_SCALE: u16 = 0x3c;
}
