//! Weight curves for T500RS combined force-feedback effects.
//!
//! A combined effect blends up to eight already-uploaded effects; when its
//! weights are dynamic, each referenced effect carries a [`WeightCurve`]
//! mapping normalized playback progress `x ∈ [0,1]` to a blend weight.
//!
//! Five curve shapes are evaluated host-side with exact closed forms (the
//! same math drives the device firmware and any preview surface); every other
//! shape in the catalog is evaluated by the device from its uploaded
//! parameters, so the host only validates the parameter/kind pairing and
//! forwards the raw bytes.
//!
//! # Example
//!
//! ```
//! use t500rs_curves::{CurveParams, WeightCurve, WeightCurveKind};
//!
//! let curve = WeightCurve::new(WeightCurveKind::Sigmoid, 64, CurveParams::None)?;
//! // Host-evaluated: sigmoid at the midpoint is exactly 0.5.
//! assert_eq!(curve.evaluate(0.5), Some(0.5));
//!
//! let device_side = WeightCurve::new(
//!     WeightCurveKind::Bounce,
//!     32,
//!     CurveParams::Bounce { bounces: 3, decay: 10 },
//! )?;
//! // Device-evaluated kinds have no host value.
//! assert_eq!(device_side.evaluate(0.5), None);
//! # Ok::<(), t500rs_curves::CurveError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod curve;
pub mod error;
pub mod kind;

pub use curve::{CurveParams, STRENGTH_SCALE, WeightCurve, evaluate_shape};
pub use error::CurveError;
pub use kind::WeightCurveKind;
