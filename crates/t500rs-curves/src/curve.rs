//! Weight curve parameters and host-side evaluation.

use serde::{Deserialize, Serialize};

use crate::error::CurveError;
use crate::kind::WeightCurveKind;

/// Fixed-point divisor mapping the wire strength byte to the evaluation
/// strength: `s = strength / 16.0`, giving a usable 0..16 range.
pub const STRENGTH_SCALE: f32 = 16.0;

/// Kind-specific curve parameters.
///
/// Only the family matching the curve kind is meaningful; [`WeightCurve::new`]
/// rejects mismatched pairings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CurveParams {
    /// No extra parameters.
    #[default]
    None,
    /// Oscillating kinds (sine, cosine, triangle, sawtooth).
    Wave {
        /// Oscillation frequency.
        frequency: u8,
        /// Phase offset.
        phase: u8,
    },
    /// Bounce kind.
    Bounce {
        /// Number of bounces before settling.
        bounces: u8,
        /// Per-bounce amplitude decay.
        decay: u8,
    },
    /// Elastic kind.
    Elastic {
        /// Overshoot elasticity.
        elasticity: u8,
        /// Oscillation damping.
        damping: u8,
    },
    /// Pulse kind.
    Pulse {
        /// Pulse width.
        width: u8,
        /// Duty cycle.
        duty_cycle: u8,
        /// Rise time.
        rise: u8,
        /// Fall time.
        fall: u8,
    },
    /// Custom kind: eight explicit control points.
    Custom {
        /// Control point values, evenly spaced over progress.
        points: [u8; 8],
    },
}

impl CurveParams {
    /// Family name, used in error messages.
    pub fn family(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Wave { .. } => "wave",
            Self::Bounce { .. } => "bounce",
            Self::Elastic { .. } => "elastic",
            Self::Pulse { .. } => "pulse",
            Self::Custom { .. } => "custom",
        }
    }

    /// The raw bytes forwarded to the device after the common block prefix.
    pub fn wire_bytes(&self) -> CurveParamBytes {
        let mut bytes = CurveParamBytes::default();
        match *self {
            Self::None => {}
            Self::Wave { frequency, phase } => bytes.push2(frequency, phase),
            Self::Bounce { bounces, decay } => bytes.push2(bounces, decay),
            Self::Elastic { elasticity, damping } => bytes.push2(elasticity, damping),
            Self::Pulse {
                width,
                duty_cycle,
                rise,
                fall,
            } => {
                bytes.push2(width, duty_cycle);
                bytes.push2(rise, fall);
            }
            Self::Custom { points } => {
                for point in points {
                    bytes.push(point);
                }
            }
        }
        bytes
    }
}

/// Small inline buffer for forwarded curve parameter bytes (at most the
/// eight custom points).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CurveParamBytes {
    buf: [u8; 8],
    len: usize,
}

impl CurveParamBytes {
    fn push(&mut self, byte: u8) {
        if let Some(slot) = self.buf.get_mut(self.len) {
            *slot = byte;
            self.len += 1;
        }
    }

    fn push2(&mut self, a: u8, b: u8) {
        self.push(a);
        self.push(b);
    }

    /// The forwarded bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

/// One reference's weight curve: shape, strength, inversion, and the
/// kind-specific parameters forwarded to the device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct WeightCurve {
    kind: WeightCurveKind,
    strength: u8,
    invert: bool,
    params: CurveParams,
}

impl WeightCurve {
    /// Create a curve, validating that the parameters belong to the kind.
    pub fn new(
        kind: WeightCurveKind,
        strength: u8,
        params: CurveParams,
    ) -> Result<Self, CurveError> {
        let matches = match kind {
            WeightCurveKind::Sine
            | WeightCurveKind::Cosine
            | WeightCurveKind::Triangle
            | WeightCurveKind::Sawtooth => {
                matches!(params, CurveParams::None | CurveParams::Wave { .. })
            }
            WeightCurveKind::Bounce => matches!(params, CurveParams::Bounce { .. }),
            WeightCurveKind::Elastic => matches!(params, CurveParams::Elastic { .. }),
            WeightCurveKind::Pulse => matches!(params, CurveParams::Pulse { .. }),
            WeightCurveKind::Custom => matches!(params, CurveParams::Custom { .. }),
            _ => matches!(params, CurveParams::None),
        };
        if !matches {
            return Err(CurveError::ParamsMismatch {
                kind: kind.name(),
                params: params.family(),
            });
        }
        Ok(Self {
            kind,
            strength,
            invert: false,
            params,
        })
    }

    /// Linear identity curve, the default blend.
    pub fn linear() -> Self {
        Self::default()
    }

    /// Invert the curve's output (`y` becomes `1 − y`).
    pub fn inverted(mut self) -> Self {
        self.invert = true;
        self
    }

    /// The curve's shape.
    pub fn kind(&self) -> WeightCurveKind {
        self.kind
    }

    /// The wire strength byte.
    pub fn strength(&self) -> u8 {
        self.strength
    }

    /// Whether the output is inverted.
    pub fn is_inverted(&self) -> bool {
        self.invert
    }

    /// The kind-specific parameters.
    pub fn params(&self) -> &CurveParams {
        &self.params
    }

    /// Evaluate the curve at normalized progress `x` (clamped to `[0,1]`).
    ///
    /// Returns `None` for device-evaluated kinds: the host has no closed form
    /// for them and only forwards their parameters.
    pub fn evaluate(&self, x: f32) -> Option<f32> {
        let strength = f32::from(self.strength) / STRENGTH_SCALE;
        let y = evaluate_shape(self.kind, strength, x)?;
        Some(if self.invert { 1.0 - y } else { y })
    }
}

/// Evaluate a host-evaluated curve shape at `x ∈ [0,1]` with strength `s`.
///
/// Pure and deterministic: the same `(kind, strength, x)` always yields the
/// identical bits. Returns `None` for device-evaluated kinds.
pub fn evaluate_shape(kind: WeightCurveKind, strength: f32, x: f32) -> Option<f32> {
    let x = x.clamp(0.0, 1.0);
    match kind {
        WeightCurveKind::Linear => Some(x),
        WeightCurveKind::Exponential => Some(x.powf(1.0 + strength)),
        WeightCurveKind::Logarithmic => {
            // ln(1+x·s)/ln(1+s); the s→0 limit of the closed form is x.
            if strength == 0.0 {
                return Some(x);
            }
            Some((1.0 + x * strength).ln() / (1.0 + strength).ln())
        }
        WeightCurveKind::Sigmoid => Some(1.0 / (1.0 + (-strength * (x - 0.5)).exp())),
        WeightCurveKind::Sine => {
            Some(0.5 + 0.5 * (x * 2.0 * core::f32::consts::PI * strength).sin())
        }
        _ => None,
    }
}
