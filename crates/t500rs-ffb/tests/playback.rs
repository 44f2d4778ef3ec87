//! End-to-end playback tests: submit/play/stop through the scheduler tick,
//! against a recording transport and a manual clock.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use t500rs_ffb::{
    DeviceConfig, EffectDescriptor, Envelope, FfbDevice, FfbError, Frame, ManualClock,
    RecordingTransport, TickOutcome, TransportError, Waveform,
};

fn must<T, E: std::fmt::Debug>(result: Result<T, E>) -> T {
    match result {
        Ok(v) => v,
        Err(e) => panic!("unexpected error: {:?}", e),
    }
}

struct Rig {
    device: FfbDevice<RecordingTransport>,
    log: t500rs_ffb::FrameLog,
    clock: Arc<ManualClock>,
}

fn rig() -> Rig {
    let (transport, log) = RecordingTransport::new();
    let clock = Arc::new(ManualClock::new());
    let device = FfbDevice::new(transport).with_clock(clock.clone());
    Rig { device, log, clock }
}

fn params(frames: &[Frame]) -> Vec<Vec<u8>> {
    frames.iter().map(|f| f.params().to_vec()).collect()
}

#[test]
fn test_constant_upload_scenario_exact_frames() {
    let r = rig();
    must(
        r.device
            .submit_effect(0, EffectDescriptor::constant(0x40).with_length(1000)),
    );
    let _outcome = must(r.device.tick());

    let frames = r.log.frames();
    assert_eq!(
        params(&frames),
        vec![
            vec![0x02, 0x1c, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
            vec![0x03, 0x0e, 0x00, 0x40],
            vec![0x01, 0x00, 0x00, 0x40, 0x17, 0x25, 0x00, 0xff, 0xff, 0x0e, 0x00, 0x1c, 0x00],
        ]
    );
}

#[test]
fn test_play_then_elapse_clears_playing_without_frames() {
    let r = rig();
    must(
        r.device
            .submit_effect(0, EffectDescriptor::constant(0x40).with_length(1000)),
    );
    let _outcome = must(r.device.tick());
    r.log.clear();

    must(r.device.play(0, 1));
    let outcome = must(r.device.tick());
    assert_eq!(outcome, TickOutcome::Rearm);
    assert_eq!(
        params(&r.log.frames()),
        vec![vec![0x00, 0x00, 0x00, 0x00, 0x41, 0x00, 0x41, 0x01]]
    );
    r.log.clear();

    // One tick at or past the effect length retires it silently.
    r.clock.advance(1000);
    let outcome = must(r.device.tick());
    assert_eq!(outcome, TickOutcome::Idle);
    assert!(r.log.is_empty());
    assert!(!r.device.timer_armed());
}

#[test]
fn test_repeat_count_replays_exactly_n_times() {
    let r = rig();
    must(
        r.device
            .submit_effect(0, EffectDescriptor::constant(10).with_length(100)),
    );
    let _outcome = must(r.device.tick());
    r.log.clear();

    must(r.device.play(0, 3));
    let mut starts = 0usize;
    let mut ticks = 0usize;
    loop {
        let outcome = must(r.device.tick());
        starts += r.log.len();
        r.log.clear();
        if outcome == TickOutcome::Idle {
            break;
        }
        r.clock.advance(100);
        ticks += 1;
        assert!(ticks < 32, "scheduler failed to deactivate");
    }
    // Exactly n start commands, no stop frames, and the scheduler
    // self-deactivated after the last completion.
    assert_eq!(starts, 3);
    assert!(!r.device.timer_armed());
}

#[test]
fn test_each_repeat_lasts_full_length() {
    let r = rig();
    must(
        r.device
            .submit_effect(0, EffectDescriptor::constant(10).with_length(100)),
    );
    let _outcome = must(r.device.tick());
    r.log.clear();

    must(r.device.play(0, 2));
    let _outcome = must(r.device.tick()); // first start at t=0
    r.log.clear();

    // Half-way through the first run nothing happens.
    r.clock.advance(50);
    let _outcome = must(r.device.tick());
    assert!(r.log.is_empty());

    // At t=100 the first run retires and the replay starts.
    r.clock.advance(50);
    let _outcome = must(r.device.tick());
    assert_eq!(r.log.len(), 1);
    r.log.clear();

    // The replay must last its own full 100 ms from the restart.
    r.clock.advance(50);
    let _outcome = must(r.device.tick());
    assert!(r.log.is_empty());
    r.clock.advance(50);
    let outcome = must(r.device.tick());
    assert_eq!(outcome, TickOutcome::Idle);
}

#[test]
fn test_stop_sends_stop_frame_and_idles() {
    let r = rig();
    must(r.device.submit_effect(4, EffectDescriptor::constant(10)));
    let _outcome = must(r.device.tick());
    must(r.device.play(4, 1));
    let _outcome = must(r.device.tick());
    r.log.clear();

    must(r.device.stop(4));
    assert!(r.device.timer_armed());
    let outcome = must(r.device.tick());
    assert_eq!(outcome, TickOutcome::Idle);
    assert_eq!(
        params(&r.log.frames()),
        vec![vec![0x00, 0x04, 0x00, 0x00, 0x41, 0x00, 0x00, 0x01]]
    );
}

#[test]
fn test_until_stopped_effect_idles_the_timer() {
    // An until-stopped effect needs no elapsed-time ticks; the stop entry
    // point re-arms the timer itself.
    let r = rig();
    must(r.device.submit_effect(0, EffectDescriptor::constant(10)));
    must(r.device.play(0, 1));
    let outcome = must(r.device.tick());
    assert_eq!(outcome, TickOutcome::Idle);
    assert!(!r.device.timer_armed());

    must(r.device.stop(0));
    assert!(r.device.timer_armed());
}

#[test]
fn test_play_before_first_tick_uploads_then_starts() {
    let r = rig();
    must(
        r.device
            .submit_effect(0, EffectDescriptor::constant(0x40).with_length(500)),
    );
    must(r.device.play(0, 1));
    let _outcome = must(r.device.tick());

    let frames = r.log.frames();
    assert_eq!(frames.len(), 4);
    // Upload sequence first, then the start frame, in one tick.
    assert_eq!(frames[0].params()[0], 0x02);
    assert_eq!(frames[1].params()[0], 0x03);
    assert_eq!(frames[2].params()[0], 0x01);
    assert_eq!(
        frames[3].params(),
        [0x00, 0x00, 0x00, 0x00, 0x41, 0x00, 0x41, 0x01]
    );
}

#[test]
fn test_stop_before_first_tick_cancels_queued_start() {
    let r = rig();
    must(r.device.submit_effect(0, EffectDescriptor::constant(10)));
    must(r.device.play(0, 1));
    must(r.device.stop(0));
    let _outcome = must(r.device.tick());

    // The upload still goes out, but no start and no stop frame: nothing was
    // ever started on the device.
    let frames = r.log.frames();
    assert_eq!(frames.len(), 3);
    assert!(frames.iter().all(|f| f.params()[0] != 0x00));
}

#[test]
fn test_envelope_refinement_frames() {
    let r = rig();
    let descriptor = EffectDescriptor::constant(0x30).with_envelope(Envelope {
        attack_length: 0x0064,
        attack_level: 0x20,
        fade_length: 0x00c8,
        fade_level: 0x10,
    });
    must(r.device.submit_effect(0, descriptor));
    let _outcome = must(r.device.tick());

    let frames = r.log.frames();
    assert_eq!(frames.len(), 5);
    assert_eq!(
        frames[3].params(),
        [0x02, 0x1c, 0x00, 0x64, 0x00, 0x20, 0xc8, 0x00, 0x10]
    );
    assert_eq!(frames[4].params()[0], 0x01);
}

#[test]
fn test_periodic_zero_period_rejected() {
    let r = rig();
    let result = r
        .device
        .submit_effect(0, EffectDescriptor::periodic(Waveform::Sine, 100, 0));
    assert_eq!(
        result,
        Err(FfbError::InvalidArgument("periodic effect has zero period"))
    );
    let _outcome = must(r.device.tick());
    assert!(r.log.is_empty());
}

#[test]
fn test_out_of_range_slot_rejected() {
    let r = rig();
    let result = r.device.submit_effect(16, EffectDescriptor::constant(1));
    assert_eq!(result, Err(FfbError::InvalidArgument("slot id out of range")));
    assert!(r.device.play(16, 1).is_err());
    assert!(r.device.erase(16).is_err());
}

#[test]
fn test_play_on_empty_slot_rejected() {
    let r = rig();
    let result = r.device.play(2, 1);
    assert_eq!(
        result,
        Err(FfbError::InvalidArgument("slot has no effect bound"))
    );
    // Same for a stop request: there is nothing to stop.
    assert!(r.device.stop(2).is_err());
}

#[test]
fn test_erase_is_terminal() {
    let r = rig();
    must(r.device.submit_effect(0, EffectDescriptor::constant(10)));
    let _outcome = must(r.device.tick());
    must(r.device.erase(0));
    assert!(r.device.play(0, 1).is_err());
    // Erase performs no I/O.
    r.log.clear();
    let _outcome = must(r.device.tick());
    assert!(r.log.is_empty());
}

#[test]
fn test_resubmit_unchanged_descriptor_skips_upload() {
    let r = rig();
    let descriptor = EffectDescriptor::constant(0x40).with_length(1000);
    must(r.device.submit_effect(0, descriptor));
    let _outcome = must(r.device.tick());
    r.log.clear();

    must(r.device.submit_effect(0, descriptor));
    let _outcome = must(r.device.tick());
    assert!(r.log.is_empty(), "no-op re-upload should be skipped");
}

#[test]
fn test_resubmit_changed_descriptor_reuploads() {
    let r = rig();
    must(r.device.submit_effect(0, EffectDescriptor::constant(0x40)));
    let _outcome = must(r.device.tick());
    r.log.clear();

    must(r.device.submit_effect(0, EffectDescriptor::constant(0x50)));
    let _outcome = must(r.device.tick());
    let frames = r.log.frames();
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[1].params(), [0x03, 0x0e, 0x00, 0x50]);
}

#[test]
fn test_transport_failure_aborts_tick() {
    let r = rig();
    must(r.device.submit_effect(0, EffectDescriptor::constant(10)));
    r.log.inject_failure(TransportError::Timeout);

    let result = r.device.tick();
    assert_eq!(result, Err(FfbError::Transport(TransportError::Timeout)));
    // The failing frame was not recorded and nothing after it was sent.
    assert!(r.log.is_empty());
}

#[test]
fn test_init_queues_range_and_gain() {
    let r = rig();
    r.device.init();
    assert!(r.device.timer_armed());
    let _outcome = must(r.device.tick());

    // Gain first, then range (1024 degrees * 0x3c = 0xf000).
    assert_eq!(
        params(&r.log.frames()),
        vec![vec![0x02, 0xff], vec![0x08, 0x11, 0x00, 0xf0]]
    );
}

#[test]
fn test_set_gain_and_autocenter_are_queued_not_sent() {
    let r = rig();
    r.device.set_gain(0x8000);
    r.device.set_autocenter(0x4000);
    assert!(r.log.is_empty(), "entry points must never touch the transport");

    let _outcome = must(r.device.tick());
    assert_eq!(
        params(&r.log.frames()),
        vec![
            vec![0x02, 0x80],
            vec![0x06, 0x00, 0x00, 0x00, 0x03, 0x0e, 0x40, 0x64],
        ]
    );
}

#[test]
fn test_waker_fires_once_per_arming() {
    let (transport, _log) = RecordingTransport::new();
    let wakes = Arc::new(AtomicUsize::new(0));
    let counter = wakes.clone();
    let clock = Arc::new(ManualClock::new());
    let device = FfbDevice::new(transport)
        .with_clock(clock)
        .with_waker(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

    must(device.submit_effect(0, EffectDescriptor::constant(10)));
    must(device.play(0, 1));
    assert_eq!(wakes.load(Ordering::SeqCst), 1);

    // Already armed: no second wake.
    must(device.play(0, 1));
    assert_eq!(wakes.load(Ordering::SeqCst), 1);

    // After the tick idles the timer, the next request wakes again.
    let _outcome = must(device.tick());
    must(device.stop(0));
    assert_eq!(wakes.load(Ordering::SeqCst), 2);
}

#[test]
fn test_first_free_slot_and_table_exhaustion() {
    let r = rig();
    assert_eq!(must(r.device.first_free_slot()), 0);
    for slot in 0..16 {
        must(r.device.submit_effect(slot, EffectDescriptor::constant(1)));
    }
    assert_eq!(
        r.device.first_free_slot(),
        Err(FfbError::CapacityExceeded("no free effect slot available"))
    );
    must(r.device.erase(5));
    assert_eq!(must(r.device.first_free_slot()), 5);
}

#[test]
fn test_custom_tick_period_is_configurable() {
    let (transport, _log) = RecordingTransport::new();
    let config = DeviceConfig {
        tick_period_ms: 4,
        ..DeviceConfig::default()
    };
    let device = FfbDevice::with_config(transport, config);
    assert_eq!(device.config().tick_period_ms, 4);
}

#[test]
fn test_upload_frame_round_trip_decodes_scaled_fields() {
    use t500rs_protocol::output::UploadBlock;

    let r = rig();
    must(
        r.device
            .submit_effect(3, EffectDescriptor::periodic(Waveform::Triangle, 0x55, 500)),
    );
    let _outcome = must(r.device.tick());

    let frames = r.log.frames();
    let upload = must(
        UploadBlock::decode(frames[2].params()).ok_or("upload trailer did not decode"),
    );
    assert_eq!(upload.slot, 3);
    assert_eq!(upload.effect_type, 0x21);

    // The periodic block carries the truncated magnitude and LE period.
    assert_eq!(frames[1].params(), [0x04, 0x0e, 0x03, 0x55, 0x00, 0x00, 0xf4, 0x01]);
}
