//! Per-slot effect state.
//!
//! Each of the 16 device-side slots runs an explicit state machine instead of
//! the independently settable flag bits a naive driver would use: a tagged
//! phase plus a transition function that rejects contradictory requests, so a
//! slot can never be simultaneously playing and stopping, or uploaded and
//! empty.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::combined::CombinedEffect;
use crate::effect::EffectDescriptor;

/// What a slot currently holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SlotBinding {
    /// A single generic effect.
    Effect(EffectDescriptor),
    /// A weighted blend of other uploaded slots.
    Combined(CombinedEffect),
}

/// Lifecycle phase of one slot.
///
/// ```text
/// Idle ──submit──▶ PendingUpload ──tick──▶ Uploaded ──play──▶ PendingStart
///                       ▲                     ▲                    │tick
///                       └──────submit─────────┤                    ▼
///                                             │◀──tick── PendingStop ◀──stop── Playing
///                                             └───────(length elapsed)─────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SlotPhase {
    /// Nothing bound.
    #[default]
    Idle,
    /// Descriptor bound, upload queued for the next tick. `start_queued`
    /// records a play request that arrived before the upload went out.
    PendingUpload {
        start_queued: bool,
    },
    /// On the device, not playing.
    Uploaded,
    /// Start command queued for the next tick.
    PendingStart,
    Playing,
    /// Stop command queued for the next tick.
    PendingStop,
}

/// Requests and scheduler actions driving the phase machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotEvent {
    /// A descriptor was (re-)bound to the slot.
    Submit,
    /// Playback was requested.
    Play,
    /// A stop was requested.
    Stop,
    /// The scheduler issued the upload frames.
    UploadIssued,
    /// The scheduler issued the start frame.
    StartIssued,
    /// The scheduler issued the stop frame.
    StopIssued,
    /// A finite effect's length elapsed.
    Completed {
        repeats_remain: bool,
    },
    /// The slot was erased.
    Erase,
}

/// A request that is illegal in the slot's current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("slot event {event:?} is illegal in phase {phase:?}")]
pub struct SlotTransitionError {
    pub phase: SlotPhase,
    pub event: SlotEvent,
}

impl SlotPhase {
    /// Apply an event, rejecting transitions the lifecycle does not allow.
    pub fn transition(self, event: SlotEvent) -> Result<SlotPhase, SlotTransitionError> {
        use SlotEvent::*;
        use SlotPhase::*;

        let next = match (self, event) {
            // Binding a descriptor always queues an upload; a start that was
            // already queued survives the re-bind.
            (PendingUpload { start_queued }, Submit) => PendingUpload { start_queued },
            (PendingStart, Submit) => PendingUpload { start_queued: true },
            (_, Submit) => PendingUpload {
                start_queued: false,
            },

            (PendingUpload { .. }, Play) => PendingUpload { start_queued: true },
            (Uploaded | PendingStart | Playing | PendingStop, Play) => PendingStart,

            // A stop while the upload is still queued just cancels the
            // queued start; nothing was ever sent.
            (PendingUpload { .. }, Stop) => PendingUpload {
                start_queued: false,
            },
            (Uploaded | PendingStart | Playing | PendingStop, Stop) => PendingStop,

            (PendingUpload { start_queued: true }, UploadIssued) => PendingStart,
            (PendingUpload { start_queued: false }, UploadIssued) => Uploaded,

            (PendingStart, StartIssued) => Playing,
            (PendingStop, StopIssued) => Uploaded,

            (Playing, Completed { repeats_remain }) => {
                if repeats_remain {
                    PendingStart
                } else {
                    Uploaded
                }
            }

            (_, Erase) => Idle,

            (phase, event) => return Err(SlotTransitionError { phase, event }),
        };
        Ok(next)
    }
}

/// One entry of the slot table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EffectSlot {
    pub(crate) binding: Option<SlotBinding>,
    /// Previous descriptor, kept for diffing when a slot is re-submitted.
    pub(crate) old: Option<EffectDescriptor>,
    pub(crate) phase: SlotPhase,
    pub(crate) update_pending: bool,
    /// Absolute millisecond tick when playback began.
    pub(crate) start_time_ms: u64,
    /// Decremented each time a finite effect completes naturally; reset by
    /// every new play request.
    pub(crate) remaining_repeats: u32,
}

impl EffectSlot {
    /// Whether a descriptor or combined effect is bound.
    pub fn is_occupied(&self) -> bool {
        self.binding.is_some()
    }

    /// The slot's current phase.
    pub fn phase(&self) -> SlotPhase {
        self.phase
    }

    /// Whether the effect is resident on the device.
    pub fn is_uploaded(&self) -> bool {
        matches!(
            self.phase,
            SlotPhase::Uploaded | SlotPhase::PendingStart | SlotPhase::Playing | SlotPhase::PendingStop
        )
    }

    /// The bound effect's finite length, if any. Combined effects have no
    /// host-tracked length.
    pub(crate) fn finite_length(&self) -> Option<u16> {
        match &self.binding {
            Some(SlotBinding::Effect(descriptor)) => descriptor.finite_length(),
            _ => None,
        }
    }

    /// Whether the scheduler still has anything to do for this slot.
    pub(crate) fn has_outstanding_work(&self) -> bool {
        match self.phase {
            SlotPhase::PendingUpload { .. } | SlotPhase::PendingStart | SlotPhase::PendingStop => {
                true
            }
            SlotPhase::Playing => self.finite_length().is_some(),
            SlotPhase::Idle | SlotPhase::Uploaded => false,
        }
    }

    /// Reset to empty. Terminal: drops the binding and every flag.
    pub(crate) fn erase(&mut self) {
        *self = Self::default();
    }
}
