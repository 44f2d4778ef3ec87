//! Upload sequence encoding.
//!
//! Maps a slot binding onto the exact command frame sequence the device
//! expects. Frame order is part of the device contract and must not change:
//! level-based effects are always preceded by a zeroed envelope, spring sends
//! its condition block first, and the extended damper/friction encodings are
//! single-frame.

use tracing::trace;

use t500rs_protocol::ids::effect_types;
use t500rs_protocol::output::{
    BasicConditionBlock, CombinedBlock, CombinedEntry, ConstantBlock, EnvelopeBlock,
    ExtendedConditionBlock, InertiaBlock, PeriodicBlock, RampBlock, UploadBlock, WeightCurveBlock,
    scale_center, scale_coefficient, scale_deadband, scale_saturation,
};
use t500rs_protocol::Frame;

use crate::combined::CombinedEffect;
use crate::config::DeviceConfig;
use crate::effect::{ConditionParams, EffectDescriptor, EffectKind, Envelope};
use crate::error::FfbError;
use crate::slot::SlotBinding;

/// Coefficient byte for the basic spring path; the wire uses a fixed value
/// scaled only by the configured spring level.
const SPRING_COEFFICIENT: u8 = 0x64;

fn envelope_block(slot: u8, envelope: &Envelope) -> EnvelopeBlock {
    EnvelopeBlock {
        slot,
        attack_length: envelope.attack_length,
        attack_level: envelope.attack_level,
        fade_length: envelope.fade_length,
        fade_level: envelope.fade_level,
    }
}

/// Append the trailing envelope+upload pair sent when a level-based effect
/// carries a nonzero envelope.
fn push_envelope_refinement(
    frames: &mut Vec<Frame>,
    slot: u8,
    effect_type: u8,
    envelope: &Envelope,
) {
    frames.push(envelope_block(slot, envelope).encode());
    frames.push(UploadBlock { slot, effect_type }.encode());
}

fn extended_condition(
    effect_type: u8,
    slot: u8,
    params: &ConditionParams,
    level: u8,
) -> ExtendedConditionBlock {
    let (velocity_factor, acceleration_factor, position_factor) = match effect_type {
        effect_types::DAMPER_2 => {
            let (velocity, acceleration) = ExtendedConditionBlock::damper_factors();
            (velocity, acceleration, 0x00)
        }
        _ => {
            let (position, velocity) = ExtendedConditionBlock::friction_factors();
            (velocity, 0x00, position)
        }
    };
    ExtendedConditionBlock {
        effect_type,
        slot,
        right_coeff: DeviceConfig::scale_by_level(scale_coefficient(params.right_coeff), level),
        left_coeff: DeviceConfig::scale_by_level(scale_coefficient(params.left_coeff), level),
        right_sat: scale_saturation(params.right_saturation),
        left_sat: scale_saturation(params.left_saturation),
        deadband: scale_deadband(params.deadband),
        center: scale_center(params.center),
        velocity_factor,
        acceleration_factor,
        position_factor,
    }
}

/// Encode the full upload frame sequence for a slot binding.
pub(crate) fn upload_sequence(
    slot: u8,
    binding: &SlotBinding,
    config: &DeviceConfig,
) -> Result<Vec<Frame>, FfbError> {
    let mut frames = Vec::new();
    match binding {
        SlotBinding::Effect(descriptor) => {
            encode_effect(&mut frames, slot, descriptor, config);
        }
        SlotBinding::Combined(combined) => {
            encode_combined(&mut frames, slot, combined)?;
        }
    }
    trace!(slot, frames = frames.len(), "encoded upload sequence");
    Ok(frames)
}

fn encode_effect(
    frames: &mut Vec<Frame>,
    slot: u8,
    descriptor: &EffectDescriptor,
    config: &DeviceConfig,
) {
    match descriptor.kind {
        EffectKind::Constant { level } => {
            frames.push(EnvelopeBlock::zeroed(slot).encode());
            frames.push(
                ConstantBlock {
                    slot,
                    level: level as u8,
                }
                .encode(),
            );
            frames.push(
                UploadBlock {
                    slot,
                    effect_type: effect_types::CONSTANT,
                }
                .encode(),
            );
            if !descriptor.envelope.is_zero() {
                push_envelope_refinement(
                    frames,
                    slot,
                    effect_types::CONSTANT,
                    &descriptor.envelope,
                );
            }
        }
        EffectKind::Ramp {
            start_level,
            end_level,
        } => {
            frames.push(EnvelopeBlock::zeroed(slot).encode());
            frames.push(
                RampBlock {
                    slot,
                    start_level: start_level as u8,
                    end_level: end_level as u8,
                }
                .encode(),
            );
            frames.push(
                UploadBlock {
                    slot,
                    effect_type: effect_types::RAMP,
                }
                .encode(),
            );
            if !descriptor.envelope.is_zero() {
                push_envelope_refinement(frames, slot, effect_types::RAMP, &descriptor.envelope);
            }
        }
        EffectKind::Periodic {
            waveform,
            magnitude,
            offset,
            phase,
            period_ms,
        } => {
            frames.push(EnvelopeBlock::zeroed(slot).encode());
            frames.push(
                PeriodicBlock {
                    slot,
                    magnitude: magnitude as u8,
                    offset: offset as u8,
                    phase: phase as u8,
                    period_ms,
                }
                .encode(),
            );
            frames.push(
                UploadBlock {
                    slot,
                    effect_type: waveform.effect_type(),
                }
                .encode(),
            );
        }
        EffectKind::Spring(_) => {
            let coefficient =
                DeviceConfig::scale_by_level(SPRING_COEFFICIENT, config.spring_level);
            frames.push(BasicConditionBlock::spring(slot, coefficient).encode());
            frames.push(EnvelopeBlock::zeroed(slot).encode());
            frames.push(
                UploadBlock {
                    slot,
                    effect_type: effect_types::SPRING,
                }
                .encode(),
            );
        }
        EffectKind::Damper(params) => {
            frames.push(
                extended_condition(effect_types::DAMPER_2, slot, &params, config.damper_level)
                    .encode(),
            );
        }
        EffectKind::Friction(params) => {
            frames.push(
                extended_condition(
                    effect_types::FRICTION_2,
                    slot,
                    &params,
                    config.friction_level,
                )
                .encode(),
            );
        }
        EffectKind::Inertia(params) => {
            frames.push(
                InertiaBlock {
                    slot,
                    strength: scale_coefficient(params.right_coeff),
                    damping: scale_coefficient(params.left_coeff),
                }
                .encode(),
            );
        }
    }
}

fn encode_combined(
    frames: &mut Vec<Frame>,
    slot: u8,
    combined: &CombinedEffect,
) -> Result<(), FfbError> {
    let entries: Vec<CombinedEntry> = combined
        .refs()
        .iter()
        .map(|r| CombinedEntry {
            effect_id: r.slot,
            weight: r.weight,
            min_weight: r.min_weight,
            max_weight: r.max_weight,
        })
        .collect();
    frames.push(
        CombinedBlock {
            slot,
            dynamic_weights: combined.dynamic_weights(),
            entries: &entries,
        }
        .encode()?,
    );

    if combined.dynamic_weights() {
        for (index, reference) in combined.refs().iter().enumerate() {
            let extra = reference.curve.params().wire_bytes();
            frames.push(
                WeightCurveBlock {
                    slot,
                    weight_index: index as u8,
                    curve_kind: reference.curve.kind().wire_id(),
                    strength: reference.curve.strength(),
                    invert: reference.curve.is_inverted(),
                    extra: extra.as_slice(),
                }
                .encode()?,
            );
        }
    }
    Ok(())
}
