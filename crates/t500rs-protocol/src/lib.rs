//! Thrustmaster T500RS wire protocol: command frames and FFB effect encoding.
//!
//! This crate is intentionally I/O-free and allocation-free on hot paths.
//! It provides pure functions and types that can be tested and fuzzed without
//! hardware or OS-level HID plumbing.
//!
//! # Wire protocol reference
//!
//! The T500RS accepts vendor-specific output reports of 64 bytes: a fixed
//! 23-byte command header followed by a per-command parameter block, with
//! unused trailing bytes zero-filled. Command opcodes, effect type bytes, and
//! block layouts are documented on the individual builders in [`output`].
//!
//! The T500RS protocol is older than and distinct from the T300RS-family
//! protocol used by the T300 RS / T248 / TX / TS-XW / TS-PC wheels; the two
//! share only the setup command style (gain, rotation range).

#![deny(static_mut_refs)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod frame;
pub mod ids;
pub mod output;

pub use frame::{EncodeError, FRAME_LEN, Frame, HEADER_LEN, MAX_PARAMS_LEN};
pub use ids::{
    MAX_COMBINED_EFFECTS, MAX_EFFECT_SLOTS, T500RS_PRODUCT_ID, THRUSTMASTER_VENDOR_ID,
};
pub use output::{
    AutocenterBlock, BasicConditionBlock, CombinedBlock, CombinedEntry, ConstantBlock,
    EnvelopeBlock, ExtendedConditionBlock, InertiaBlock, PeriodicBlock, RampBlock, StartStopBlock,
    UploadBlock, WeightCurveBlock, WeightUpdateBlock, build_gain_command, build_range_command,
    scale_center, scale_coefficient, scale_deadband, scale_saturation,
};
