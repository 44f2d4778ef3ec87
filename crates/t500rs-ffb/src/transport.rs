//! The transport boundary.
//!
//! The core never talks to USB directly: the surrounding driver owns the
//! physical write path (HID report set or interrupt URB) and hands the core a
//! [`TransportPort`]. Frames are always the protocol's fixed report size; the
//! port is responsible for the physical write and defines its own send
//! timeout.

use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use t500rs_protocol::Frame;

/// Transport failures, as reported by the port.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The port's send timeout elapsed.
    #[error("send timed out")]
    Timeout,
    /// The device went away.
    #[error("device detached")]
    Disconnected,
    /// Any other write failure.
    #[error("transport failure: {0}")]
    Io(String),
}

/// Blocking "send now" boundary to the physical device.
///
/// Implementations must be `Send`; the core serializes calls itself and
/// never issues them while holding its state lock.
pub trait TransportPort: Send {
    /// Transmit one frame. Errors are propagated to the tick caller; the
    /// core performs no retry.
    fn send(&mut self, frame: &Frame) -> Result<(), TransportError>;
}

/// Shared handle onto the frames recorded by a [`RecordingTransport`].
#[derive(Debug, Clone, Default)]
pub struct FrameLog {
    inner: Arc<Mutex<FrameLogInner>>,
}

#[derive(Debug, Default)]
struct FrameLogInner {
    sent: Vec<Frame>,
    next_failure: Option<TransportError>,
}

impl FrameLog {
    /// Snapshot of every frame sent so far, in order.
    pub fn frames(&self) -> Vec<Frame> {
        self.inner.lock().sent.clone()
    }

    /// Number of frames sent so far.
    pub fn len(&self) -> usize {
        self.inner.lock().sent.len()
    }

    /// Whether nothing has been sent yet.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().sent.is_empty()
    }

    /// Drop the recorded frames.
    pub fn clear(&self) {
        self.inner.lock().sent.clear();
    }

    /// Make the next send fail with the given error.
    pub fn inject_failure(&self, error: TransportError) {
        self.inner.lock().next_failure = Some(error);
    }
}

/// In-memory transport that records every frame, for tests and diagnostics.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    log: FrameLog,
}

impl RecordingTransport {
    /// Create a transport and the log handle observing it.
    pub fn new() -> (Self, FrameLog) {
        let transport = Self::default();
        let log = transport.log.clone();
        (transport, log)
    }
}

impl TransportPort for RecordingTransport {
    fn send(&mut self, frame: &Frame) -> Result<(), TransportError> {
        let mut inner = self.log.inner.lock();
        if let Some(error) = inner.next_failure.take() {
            return Err(error);
        }
        inner.sent.push(*frame);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(params: &[u8]) -> Frame {
        match Frame::from_params(params) {
            Ok(f) => f,
            Err(e) => panic!("encode failed: {e}"),
        }
    }

    #[test]
    fn test_recording_transport_records_in_order() -> Result<(), TransportError> {
        let (mut transport, log) = RecordingTransport::new();
        transport.send(&frame(&[0x01]))?;
        transport.send(&frame(&[0x02]))?;
        let frames = log.frames();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].params(), &[0x01]);
        assert_eq!(frames[1].params(), &[0x02]);
        Ok(())
    }

    #[test]
    fn test_injected_failure_consumed_once() {
        let (mut transport, log) = RecordingTransport::new();
        log.inject_failure(TransportError::Timeout);
        let f = frame(&[0x01]);
        assert_eq!(transport.send(&f), Err(TransportError::Timeout));
        assert_eq!(transport.send(&f), Ok(()));
        assert_eq!(log.len(), 1);
    }
}
