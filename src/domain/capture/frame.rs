//! Frame accumulation for the real-time capture callback
//!
//! The capture callback owns a [`FrameCollector`] and hands every flushed
//! [`FrameBatch`] to the controller as a [`CaptureMessage`]. Flushing at a
//! fixed sample threshold bounds peak memory regardless of how long the
//! user keeps recording.

/// One mono buffer of `f32` samples as delivered by the audio callback
pub type AudioFrame = Vec<f32>;

/// Flush threshold in samples: one second of audio at a 16 kHz capture rate
pub const FLUSH_THRESHOLD_SAMPLES: usize = 16_000;

/// An ordered run of frames plus the running sample count.
///
/// Invariant: `sample_count` equals the sum of the lengths of all frames
/// pushed since the batch was created.
#[derive(Debug, Clone, Default)]
pub struct FrameBatch {
    frames: Vec<AudioFrame>,
    sample_count: usize,
}

impl FrameBatch {
    /// Create an empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a frame, updating the running count
    pub fn push(&mut self, frame: AudioFrame) {
        self.sample_count += frame.len();
        self.frames.push(frame);
    }

    /// Running sample count across all frames
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// The accumulated frames in arrival order
    pub fn frames(&self) -> &[AudioFrame] {
        &self.frames
    }

    /// Whether no samples have been accumulated
    pub fn is_empty(&self) -> bool {
        self.sample_count == 0
    }

    /// Flatten the batch into one contiguous sample buffer
    pub fn into_samples(self) -> Vec<f32> {
        let mut samples = Vec::with_capacity(self.sample_count);
        for frame in self.frames {
            samples.extend_from_slice(&frame);
        }
        samples
    }
}

/// Messages from the capture context to the controller.
///
/// Delivered in FIFO order over a one-way transport: exactly one `Started`,
/// zero or more `Data`, then exactly one `Stopped` per session.
#[derive(Debug, Clone)]
pub enum CaptureMessage {
    /// Capture is live; frames arrive at this device sample rate
    Started { sample_rate: u32 },
    /// One flushed batch of frames
    Data(FrameBatch),
    /// Terminal signal; no further messages follow
    Stopped,
}

/// Accumulate/flush state machine for audio frames.
///
/// Inactive until [`start`](Self::start); frames pushed while inactive are
/// dropped. Never fails.
#[derive(Debug, Default)]
pub struct FrameCollector {
    active: bool,
    batch: FrameBatch,
    threshold: usize,
}

impl FrameCollector {
    /// Create a collector with the standard one-second flush threshold
    pub fn new() -> Self {
        Self::with_threshold(FLUSH_THRESHOLD_SAMPLES)
    }

    /// Create a collector with a custom flush threshold in samples
    pub fn with_threshold(threshold: usize) -> Self {
        Self {
            active: false,
            batch: FrameBatch::new(),
            threshold,
        }
    }

    /// Reset accumulation and begin collecting
    pub fn start(&mut self) {
        self.active = true;
        self.batch = FrameBatch::new();
    }

    /// Whether the collector is currently accumulating
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Append a frame.
    ///
    /// Returns the flushed batch when the running sample count reaches the
    /// threshold; otherwise `None`. Frames are dropped when the collector is
    /// inactive, and empty frames are ignored.
    pub fn push(&mut self, frame: AudioFrame) -> Option<FrameBatch> {
        if !self.active || frame.is_empty() {
            return None;
        }

        self.batch.push(frame);
        if self.batch.sample_count() >= self.threshold {
            return Some(std::mem::take(&mut self.batch));
        }
        None
    }

    /// Stop collecting and flush whatever remains.
    ///
    /// Returns the final partial batch, or `None` when nothing accumulated
    /// since the last flush.
    pub fn finish(&mut self) -> Option<FrameBatch> {
        self.active = false;
        let batch = std::mem::take(&mut self.batch);
        if batch.is_empty() {
            None
        } else {
            Some(batch)
        }
    }
}
