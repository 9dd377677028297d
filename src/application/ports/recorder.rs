//! Capture port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::audio::{AudioMimeType, EncodedAudio};
use crate::domain::capture::CaptureParams;

/// Capture errors
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    #[error("Microphone access denied: {0}")]
    AccessDenied(String),

    #[error("No audio input device available")]
    NoAudioDevice,

    #[error("Failed to start capture: {0}")]
    StartFailed(String),

    #[error("Capture failed: {0}")]
    CaptureFailed(String),

    #[error("Audio encoding failed: {0}")]
    EncodeFailed(String),

    #[error("A capture session is already in progress")]
    AlreadyRecording,

    #[error("No capture session in progress")]
    NotRecording,
}

/// Port for a chunked capture session.
///
/// One session at a time: `start` opens the microphone and drives the
/// streaming encoder for the negotiated encoding; `stop` releases the
/// hardware track, finalizes the encoder, and yields the assembled blob
/// exactly once. Chunk order is FIFO throughout.
#[async_trait]
pub trait ChunkRecorder: Send + Sync {
    /// Begin a capture session with the negotiated encoding.
    ///
    /// Device acquisition failures surface here, before any chunk is
    /// produced; the recorder stays idle and the caller decides whether to
    /// retry.
    async fn start(
        &self,
        encoding: AudioMimeType,
        params: CaptureParams,
    ) -> Result<(), CaptureError>;

    /// End the session and return the assembled encoded recording.
    ///
    /// The capture device is released before this returns, regardless of
    /// what happens to the blob afterwards.
    async fn stop(&self) -> Result<EncodedAudio, CaptureError>;

    /// Whether a session is currently capturing
    fn is_recording(&self) -> bool;
}
