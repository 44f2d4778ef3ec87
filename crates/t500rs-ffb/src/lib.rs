//! T500RS force-feedback core.
//!
//! Owns the effect slot table, the combined-effect engine, and the periodic
//! scheduler that reconciles them with the device: callers submit generic
//! effect descriptors and playback requests from any context, and the next
//! scheduler tick encodes and transmits the corresponding command frames in
//! protocol order.
//!
//! The crate deliberately stops at two boundaries: the [`TransportPort`]
//! trait is the physical write path (owned by the surrounding HID driver),
//! and the timer that fires [`FfbDevice::tick`] belongs to the embedding
//! driver as well; the core only decides, via [`TickOutcome`], whether the
//! timer keeps running.
//!
//! # Example
//!
//! ```
//! use t500rs_ffb::{EffectDescriptor, FfbDevice, RecordingTransport, TickOutcome};
//!
//! let (transport, log) = RecordingTransport::new();
//! let device = FfbDevice::new(transport);
//!
//! device.submit_effect(0, EffectDescriptor::constant(0x40).with_length(1000))?;
//! device.play(0, 1)?;
//!
//! // The embedding driver's timer fires:
//! let outcome = device.tick()?;
//! assert_eq!(outcome, TickOutcome::Rearm);
//! assert!(!log.is_empty());
//! # Ok::<(), t500rs_ffb::FfbError>(())
//! ```

#![deny(static_mut_refs)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_debug_implementations)]

pub mod clock;
pub mod combined;
pub mod config;
pub mod device;
pub mod effect;
mod encode;
pub mod error;
pub mod slot;
pub mod transport;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use combined::{CombinedEffect, EffectRef, WeightUpdate};
pub use config::DeviceConfig;
pub use device::{FfbDevice, TickOutcome};
pub use effect::{ConditionParams, EffectDescriptor, EffectKind, Envelope, Replay, Waveform};
pub use error::FfbError;
pub use slot::{EffectSlot, SlotPhase};
pub use transport::{FrameLog, RecordingTransport, TransportError, TransportPort};

pub use t500rs_curves::{CurveParams, WeightCurve, WeightCurveKind};
pub use t500rs_protocol::{Frame, MAX_COMBINED_EFFECTS, MAX_EFFECT_SLOTS};
