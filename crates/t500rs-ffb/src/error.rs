//! Error taxonomy for the FFB core.

use thiserror::Error;

use t500rs_protocol::EncodeError;

use crate::slot::SlotTransitionError;
use crate::transport::TransportError;

/// Errors surfaced by the public entry points and the scheduler tick.
///
/// Argument and capacity problems are rejected synchronously and never
/// queued; transport failures abort the tick that hit them and are never
/// retried by the core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FfbError {
    /// An argument was out of range or structurally invalid.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// A fixed-capacity resource was exhausted.
    #[error("capacity exceeded: {0}")]
    CapacityExceeded(&'static str),
    /// The transport port failed to send a frame.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl From<EncodeError> for FfbError {
    fn from(err: EncodeError) -> Self {
        match err {
            EncodeError::CapacityExceeded(_) => {
                Self::CapacityExceeded("combined effect references more slots than supported")
            }
            EncodeError::EmptyCombined => {
                Self::InvalidArgument("combined effect references no effects")
            }
            EncodeError::Oversize(_) => {
                Self::InvalidArgument("parameter block exceeds frame capacity")
            }
        }
    }
}

impl From<SlotTransitionError> for FfbError {
    fn from(_: SlotTransitionError) -> Self {
        Self::InvalidArgument("illegal slot state transition")
    }
}
