//! The device core: slot table, public entry points, and the scheduler tick.
//!
//! Concurrency model: entry points may be called from any context (input
//! event handlers included) while a tick is in flight. All shared state lives
//! behind one short-held mutex; entry points only mutate that state and wake
//! the scheduler, and the tick snapshots/encodes under the lock but performs
//! transport I/O strictly outside it. A transport failure aborts the tick
//! (partial protocol state on the device is unsafe to keep building on) and
//! is propagated to the caller; the core never retries.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use t500rs_protocol::output::{
    AutocenterBlock, StartStopBlock, WeightUpdateBlock, build_gain_command, build_range_command,
};
use t500rs_protocol::{Frame, MAX_EFFECT_SLOTS};

use crate::clock::{Clock, MonotonicClock};
use crate::combined::{CombinedEffect, WeightUpdate};
use crate::config::DeviceConfig;
use crate::effect::EffectDescriptor;
use crate::encode::upload_sequence;
use crate::error::FfbError;
use crate::slot::{EffectSlot, SlotBinding, SlotEvent, SlotPhase};
use crate::transport::TransportPort;

/// Coefficient byte paired with the autocenter strength.
const AUTOCENTER_COEFFICIENT: u8 = 0x64;

/// Scheduler decision returned by [`FfbDevice::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum TickOutcome {
    /// Some slot still has outstanding work: re-arm the timer for the next
    /// period.
    Rearm,
    /// Nothing left to do: the timer may stop. The next entry point that
    /// queues work re-arms it lazily.
    Idle,
}

#[derive(Debug, Clone, Copy)]
struct QueuedWeightUpdate {
    slot: u8,
    effect_id: u8,
    weight: u8,
    steps: u8,
}

#[derive(Default)]
struct Shared {
    slots: [EffectSlot; MAX_EFFECT_SLOTS],
    pending_gain: Option<u16>,
    pending_autocenter: Option<u16>,
    pending_range: Option<u16>,
    pending_weight_updates: Vec<QueuedWeightUpdate>,
    timer_armed: bool,
}

type WakeFn = dyn Fn() + Send + Sync;

/// One attached T500RS wheelbase.
///
/// Owns the effect slot table and drives the transport through a periodic
/// [`tick`](Self::tick). The embedding driver runs the actual timer (period
/// [`DeviceConfig::tick_period_ms`]), calls `tick()` on each firing, and
/// stops when it returns [`TickOutcome::Idle`]; the optional waker is invoked
/// whenever an entry point arms an inactive timer. The timer must be fully
/// stopped before dropping the device.
pub struct FfbDevice<T: TransportPort> {
    config: DeviceConfig,
    clock: Arc<dyn Clock>,
    shared: Mutex<Shared>,
    transport: Mutex<T>,
    waker: Option<Box<WakeFn>>,
}

impl<T: TransportPort> FfbDevice<T> {
    /// Create a device with default configuration and the monotonic clock.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, DeviceConfig::default())
    }

    /// Create a device with an explicit configuration.
    pub fn with_config(transport: T, config: DeviceConfig) -> Self {
        Self {
            config,
            clock: Arc::new(MonotonicClock::default()),
            shared: Mutex::new(Shared::default()),
            transport: Mutex::new(transport),
            waker: None,
        }
    }

    /// Replace the clock. Intended for deterministic tests and simulation.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Install a waker called whenever an entry point arms an inactive
    /// scheduler timer.
    pub fn with_waker(mut self, waker: impl Fn() + Send + Sync + 'static) -> Self {
        self.waker = Some(Box::new(waker));
        self
    }

    /// The device configuration.
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Whether the scheduler timer should currently be running.
    pub fn timer_armed(&self) -> bool {
        self.shared.lock().timer_armed
    }

    /// Queue the attach-time setup commands (rotation range, master gain)
    /// and arm the scheduler.
    pub fn init(&self) {
        let mut shared = self.shared.lock();
        shared.pending_range = Some(self.config.rotation_range_deg);
        shared.pending_gain = Some(self.config.gain);
        let wake = self.arm(&mut shared);
        drop(shared);
        self.maybe_wake(wake);
    }

    /// Lowest unoccupied slot id, if any.
    ///
    /// Callers that do not manage slot ids themselves can use this to pick
    /// one; all 16 slots occupied means the device-side table is full.
    pub fn first_free_slot(&self) -> Result<u8, FfbError> {
        let shared = self.shared.lock();
        shared
            .slots
            .iter()
            .position(|slot| !slot.is_occupied())
            .map(|index| index as u8)
            .ok_or(FfbError::CapacityExceeded("no free effect slot available"))
    }

    /// Bind an effect descriptor to a slot, queueing its upload.
    ///
    /// Replacing an occupied slot records the previous descriptor so the next
    /// tick can skip a no-op re-upload.
    pub fn submit_effect(
        &self,
        slot_id: u8,
        descriptor: EffectDescriptor,
    ) -> Result<(), FfbError> {
        if descriptor.has_zero_period() {
            warn!(slot_id, "rejected periodic effect with zero period");
            return Err(FfbError::InvalidArgument(
                "periodic effect has zero period",
            ));
        }

        let mut shared = self.shared.lock();
        let slot = slot_mut(&mut shared, slot_id)?;

        slot.old = match slot.binding.take() {
            Some(SlotBinding::Effect(previous)) => Some(previous),
            _ => None,
        };
        slot.update_pending = slot.old.is_some();
        slot.binding = Some(SlotBinding::Effect(descriptor));
        slot.phase = slot.phase.transition(SlotEvent::Submit)?;
        debug!(slot_id, ?descriptor.kind, "effect submitted");
        Ok(())
    }

    /// Bind a combined effect to a slot, queueing its upload.
    ///
    /// Every referenced id must name a currently-uploaded slot.
    pub fn submit_combined(
        &self,
        slot_id: u8,
        combined: CombinedEffect,
    ) -> Result<(), FfbError> {
        let mut shared = self.shared.lock();
        if usize::from(slot_id) >= MAX_EFFECT_SLOTS {
            return Err(FfbError::InvalidArgument("slot id out of range"));
        }
        for reference in combined.refs() {
            if reference.slot == slot_id {
                return Err(FfbError::InvalidArgument(
                    "combined effect references its own slot",
                ));
            }
            let referenced = shared
                .slots
                .get(usize::from(reference.slot))
                .ok_or(FfbError::InvalidArgument(
                    "combined effect references a slot out of range",
                ))?;
            if !referenced.is_uploaded() {
                return Err(FfbError::InvalidArgument(
                    "combined effect references a slot that is not uploaded",
                ));
            }
        }

        let slot = slot_mut(&mut shared, slot_id)?;
        slot.old = None;
        slot.update_pending = slot.binding.is_some();
        slot.binding = Some(SlotBinding::Combined(combined));
        slot.phase = slot.phase.transition(SlotEvent::Submit)?;
        debug!(slot_id, "combined effect submitted");
        Ok(())
    }

    /// Start or stop playback.
    ///
    /// `repeat_count > 0` queues a start and plays the effect that many times
    /// (finite-length effects auto-replay); `repeat_count <= 0` queues a stop,
    /// following the generic stop convention. Either way the scheduler is
    /// armed if it was idle.
    pub fn play(&self, slot_id: u8, repeat_count: i32) -> Result<(), FfbError> {
        let mut shared = self.shared.lock();
        let now = self.clock.now_ms();
        let slot = slot_mut(&mut shared, slot_id)?;
        if !slot.is_occupied() {
            return Err(FfbError::InvalidArgument("slot has no effect bound"));
        }

        if repeat_count > 0 {
            slot.remaining_repeats = repeat_count as u32;
            slot.start_time_ms = now;
            slot.phase = slot.phase.transition(SlotEvent::Play)?;
            debug!(slot_id, repeat_count, "playback queued");
        } else {
            slot.phase = slot.phase.transition(SlotEvent::Stop)?;
            debug!(slot_id, "stop queued");
        }

        let wake = self.arm(&mut shared);
        drop(shared);
        self.maybe_wake(wake);
        Ok(())
    }

    /// Queue a stop for the slot. Equivalent to `play(slot_id, 0)`.
    pub fn stop(&self, slot_id: u8) -> Result<(), FfbError> {
        self.play(slot_id, 0)
    }

    /// Erase a slot: terminal, clears the binding and every flag. No command
    /// is sent; the device-side definition is simply abandoned.
    pub fn erase(&self, slot_id: u8) -> Result<(), FfbError> {
        let mut shared = self.shared.lock();
        let slot = slot_mut(&mut shared, slot_id)?;
        slot.erase();
        debug!(slot_id, "slot erased");
        Ok(())
    }

    /// Update one weight inside an uploaded dynamic combined effect.
    ///
    /// Bounded cost: queues exactly one update frame for that reference,
    /// never a re-upload of the whole combination.
    pub fn update_weight(&self, slot_id: u8, update: WeightUpdate) -> Result<(), FfbError> {
        let mut shared = self.shared.lock();
        let slot = slot_mut(&mut shared, slot_id)?;

        let Some(SlotBinding::Combined(combined)) = &mut slot.binding else {
            return Err(FfbError::InvalidArgument(
                "slot does not hold a combined effect",
            ));
        };
        if !combined.dynamic_weights() {
            return Err(FfbError::InvalidArgument(
                "combined effect does not have dynamic weights",
            ));
        }
        let index = combined.index_of(update.effect_id).ok_or(
            FfbError::InvalidArgument("effect is not part of the combined effect"),
        )?;
        let reference = combined
            .ref_mut(index)
            .ok_or(FfbError::InvalidArgument("effect reference out of range"))?;
        if !(reference.min_weight..=reference.max_weight).contains(&update.new_weight) {
            return Err(FfbError::InvalidArgument(
                "weight outside its declared bounds",
            ));
        }
        reference.weight = update.new_weight;

        let queued = QueuedWeightUpdate {
            slot: slot_id,
            effect_id: update.effect_id,
            weight: update.new_weight,
            steps: update.wire_steps(),
        };
        shared.pending_weight_updates.push(queued);
        let wake = self.arm(&mut shared);
        drop(shared);
        self.maybe_wake(wake);
        Ok(())
    }

    /// Queue a master gain change (full 16-bit range).
    pub fn set_gain(&self, gain: u16) {
        let mut shared = self.shared.lock();
        shared.pending_gain = Some(gain);
        let wake = self.arm(&mut shared);
        drop(shared);
        self.maybe_wake(wake);
    }

    /// Queue an autocenter strength change (full 16-bit range).
    pub fn set_autocenter(&self, strength: u16) {
        let mut shared = self.shared.lock();
        shared.pending_autocenter = Some(strength);
        let wake = self.arm(&mut shared);
        drop(shared);
        self.maybe_wake(wake);
    }

    /// Queue a rotation range change (degrees, clamped to the device range).
    pub fn set_range(&self, degrees: u16) {
        let mut shared = self.shared.lock();
        shared.pending_range = Some(degrees);
        let wake = self.arm(&mut shared);
        drop(shared);
        self.maybe_wake(wake);
    }

    /// One scheduler pass.
    ///
    /// Scans every slot in id order: retires elapsed finite effects
    /// (decrementing repeats and auto-replaying while any remain), issues
    /// queued uploads, starts, and stops, and flushes device-level pending
    /// commands. State transitions happen under the lock before any I/O; the
    /// frames are then sent in order outside it. The first transport error
    /// aborts the tick and is returned.
    pub fn tick(&self) -> Result<TickOutcome, FfbError> {
        let now = self.clock.now_ms();
        let mut frames: Vec<Frame> = Vec::new();

        let outcome = {
            let mut shared = self.shared.lock();

            if let Some(gain) = shared.pending_gain.take() {
                frames.push(Frame::from_params(&build_gain_command(gain))?);
            }
            if let Some(strength) = shared.pending_autocenter.take() {
                frames.push(
                    AutocenterBlock {
                        strength: (strength >> 8) as u8,
                        coefficient: AUTOCENTER_COEFFICIENT,
                    }
                    .encode(),
                );
            }
            if let Some(degrees) = shared.pending_range.take() {
                frames.push(Frame::from_params(&build_range_command(degrees))?);
            }
            for update in shared.pending_weight_updates.drain(..) {
                frames.push(
                    WeightUpdateBlock {
                        slot: update.slot,
                        effect_id: update.effect_id,
                        weight: update.weight,
                        transition_steps: update.steps,
                    }
                    .encode(),
                );
            }

            let config = self.config;
            for (index, slot) in shared.slots.iter_mut().enumerate() {
                self.tick_slot(index as u8, slot, now, &config, &mut frames)?;
            }

            let outstanding = shared.slots.iter().any(EffectSlot::has_outstanding_work);
            shared.timer_armed = outstanding;
            if outstanding {
                TickOutcome::Rearm
            } else {
                TickOutcome::Idle
            }
        };

        let mut transport = self.transport.lock();
        for frame in &frames {
            transport.send(frame)?;
        }
        drop(transport);

        if !frames.is_empty() {
            debug!(sent = frames.len(), ?outcome, "tick completed");
        }
        Ok(outcome)
    }

    fn tick_slot(
        &self,
        slot_id: u8,
        slot: &mut EffectSlot,
        now: u64,
        config: &DeviceConfig,
        frames: &mut Vec<Frame>,
    ) -> Result<(), FfbError> {
        // 1. Finite playback that ran out: retire it, auto-replay if repeats
        //    remain. The restart timestamp resets so every repeat lasts the
        //    full length.
        if slot.phase == SlotPhase::Playing {
            if let Some(length) = slot.finite_length() {
                if now.saturating_sub(slot.start_time_ms) >= u64::from(length) {
                    slot.update_pending = false;
                    if slot.remaining_repeats > 0 {
                        slot.remaining_repeats -= 1;
                    }
                    let repeats_remain = slot.remaining_repeats > 0;
                    slot.phase = slot
                        .phase
                        .transition(SlotEvent::Completed { repeats_remain })?;
                    if repeats_remain {
                        slot.start_time_ms = now;
                    }
                }
            }
        }

        // 2. Queued upload. A re-submit with an unchanged descriptor skips
        //    the frames entirely; the device-side definition is already
        //    current.
        if let SlotPhase::PendingUpload { .. } = slot.phase {
            let unchanged = match (&slot.binding, &slot.old) {
                (Some(SlotBinding::Effect(current)), Some(previous)) => {
                    slot.update_pending && current == previous
                }
                _ => false,
            };
            if let Some(binding) = &slot.binding {
                if !unchanged {
                    frames.extend(upload_sequence(slot_id, binding, config)?);
                }
            }
            slot.old = None;
            slot.update_pending = false;
            slot.phase = slot.phase.transition(SlotEvent::UploadIssued)?;
        }

        // 3. Queued start.
        if slot.phase == SlotPhase::PendingStart {
            frames.push(StartStopBlock::play(slot_id).encode());
            slot.phase = slot.phase.transition(SlotEvent::StartIssued)?;
        }

        // 4. Queued stop.
        if slot.phase == SlotPhase::PendingStop {
            frames.push(StartStopBlock::stop(slot_id).encode());
            slot.phase = slot.phase.transition(SlotEvent::StopIssued)?;
            slot.remaining_repeats = 0;
        }

        Ok(())
    }

    /// Arm the timer if it is idle; returns whether the waker should fire.
    fn arm(&self, shared: &mut Shared) -> bool {
        if shared.timer_armed {
            false
        } else {
            shared.timer_armed = true;
            true
        }
    }

    fn maybe_wake(&self, wake: bool) {
        if wake {
            if let Some(waker) = &self.waker {
                waker();
            }
        }
    }
}

impl<T: TransportPort> core::fmt::Debug for FfbDevice<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FfbDevice")
            .field("config", &self.config)
            .field("timer_armed", &self.shared.lock().timer_armed)
            .finish_non_exhaustive()
    }
}

fn slot_mut(shared: &mut Shared, slot_id: u8) -> Result<&mut EffectSlot, FfbError> {
    shared
        .slots
        .get_mut(usize::from(slot_id))
        .ok_or(FfbError::InvalidArgument("slot id out of range"))
}
