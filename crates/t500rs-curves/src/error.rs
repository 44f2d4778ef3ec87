//! Curve validation errors.

use thiserror::Error;

/// Errors surfaced by curve construction and validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurveError {
    /// The kind-specific parameters do not belong to the given curve kind.
    #[error("curve parameters {params} are not valid for the {kind} curve")]
    ParamsMismatch {
        /// The curve kind being validated.
        kind: &'static str,
        /// The parameter family that was supplied.
        params: &'static str,
    },
    /// A wire byte does not name a known curve kind.
    #[error("unknown curve kind byte 0x{0:02x}")]
    UnknownKind(u8),
}
