//! The fixed catalog of weight-curve shapes.

use serde::{Deserialize, Serialize};

use crate::error::CurveError;

/// Weight-curve shapes understood by the device.
///
/// Discriminants are the wire bytes. The first five kinds are additionally
/// evaluated host-side with closed forms; see
/// [`evaluate_shape`](crate::evaluate_shape).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum WeightCurveKind {
    /// Identity mapping.
    #[default]
    Linear = 0,
    /// Power curve, progressively steeper with strength.
    Exponential = 1,
    /// Compressed response for fine control.
    Logarithmic = 2,
    /// S-shaped transition around the midpoint.
    Sigmoid = 3,
    /// Sine oscillation over progress.
    Sine = 4,
    /// Cosine oscillation (device-evaluated).
    Cosine = 5,
    /// Hermite smoothstep (device-evaluated).
    Smoothstep = 6,
    /// Perlin smootherstep (device-evaluated).
    Smootherstep = 7,
    /// Decaying bounces (device-evaluated).
    Bounce = 8,
    /// Damped elastic overshoot (device-evaluated).
    Elastic = 9,
    /// Quadratic ease (device-evaluated).
    Quadratic = 10,
    /// Cubic ease (device-evaluated).
    Cubic = 11,
    /// Pulse train (device-evaluated).
    Pulse = 12,
    /// Ramp to full then hold (device-evaluated).
    RampHold = 13,
    /// Triangle oscillation (device-evaluated).
    Triangle = 14,
    /// Sawtooth oscillation (device-evaluated).
    Sawtooth = 15,
    /// Band-limited noise (device-evaluated).
    Noise = 16,
    /// Spring settle (device-evaluated).
    Spring = 17,
    /// Eight explicit control points (device-evaluated).
    Custom = 18,
}

impl WeightCurveKind {
    /// The byte carried on the wire for this kind.
    pub fn wire_id(self) -> u8 {
        self as u8
    }

    /// Look a kind up by its wire byte.
    pub fn from_wire_id(id: u8) -> Result<Self, CurveError> {
        use WeightCurveKind::*;
        Ok(match id {
            0 => Linear,
            1 => Exponential,
            2 => Logarithmic,
            3 => Sigmoid,
            4 => Sine,
            5 => Cosine,
            6 => Smoothstep,
            7 => Smootherstep,
            8 => Bounce,
            9 => Elastic,
            10 => Quadratic,
            11 => Cubic,
            12 => Pulse,
            13 => RampHold,
            14 => Triangle,
            15 => Sawtooth,
            16 => Noise,
            17 => Spring,
            18 => Custom,
            other => return Err(CurveError::UnknownKind(other)),
        })
    }

    /// Whether the host evaluates this kind with a closed form.
    ///
    /// Everything else is uploaded to and evaluated by the device.
    pub fn is_host_evaluated(self) -> bool {
        matches!(
            self,
            Self::Linear | Self::Exponential | Self::Logarithmic | Self::Sigmoid | Self::Sine
        )
    }

    /// Human-readable name, used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Exponential => "exponential",
            Self::Logarithmic => "logarithmic",
            Self::Sigmoid => "sigmoid",
            Self::Sine => "sine",
            Self::Cosine => "cosine",
            Self::Smoothstep => "smoothstep",
            Self::Smootherstep => "smootherstep",
            Self::Bounce => "bounce",
            Self::Elastic => "elastic",
            Self::Quadratic => "quadratic",
            Self::Cubic => "cubic",
            Self::Pulse => "pulse",
            Self::RampHold => "ramp-hold",
            Self::Triangle => "triangle",
            Self::Sawtooth => "sawtooth",
            Self::Noise => "noise",
            Self::Spring => "spring",
            Self::Custom => "custom",
        }
    }
}
