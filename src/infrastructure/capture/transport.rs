//! Frame transport between the capture context and the controller
//!
//! The capture callback runs on the platform's real-time audio thread and
//! must never block, so messages travel one way over a bounded channel and
//! sends never wait. The in-process sink exists for hosts without a
//! dedicated audio thread; both sides of the abstraction see the same
//! ordered start/data/stop protocol.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::domain::capture::CaptureMessage;

/// Batches buffered before backpressure drops them. At the one-second flush
/// threshold this is over a minute of audio in flight.
pub const FRAME_CHANNEL_CAPACITY: usize = 64;

/// One-way, ordered sink for capture messages
pub trait FrameSink: Send {
    fn send(&mut self, message: CaptureMessage);
}

/// Sink that delivers messages to an in-process callback
pub struct DirectSink<F: FnMut(CaptureMessage) + Send>(F);

impl<F: FnMut(CaptureMessage) + Send> DirectSink<F> {
    pub fn new(deliver: F) -> Self {
        Self(deliver)
    }
}

impl<F: FnMut(CaptureMessage) + Send> FrameSink for DirectSink<F> {
    fn send(&mut self, message: CaptureMessage) {
        (self.0)(message);
    }
}

/// Sink backed by a bounded cross-thread channel.
///
/// Sends never block: when the controller falls behind far enough to fill
/// the channel, data batches are dropped and counted instead.
#[derive(Clone)]
pub struct ChannelSink {
    tx: Sender<CaptureMessage>,
    dropped: Arc<AtomicU64>,
}

impl ChannelSink {
    /// Number of batches dropped under backpressure so far
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl FrameSink for ChannelSink {
    fn send(&mut self, message: CaptureMessage) {
        match self.tx.try_send(message) {
            Ok(()) => {}
            Err(TrySendError::Full(CaptureMessage::Data(_))) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
            Err(TrySendError::Full(message)) => {
                // Control messages must arrive; block briefly for them
                let _ = self.tx.send(message);
            }
            Err(TrySendError::Disconnected(_)) => {}
        }
    }
}

/// Create the bounded capture channel
pub fn frame_channel() -> (ChannelSink, Receiver<CaptureMessage>) {
    let (tx, rx) = crossbeam_channel::bounded(FRAME_CHANNEL_CAPACITY);
    (
        ChannelSink {
            tx,
            dropped: Arc::new(AtomicU64::new(0)),
        },
        rx,
    )
}
