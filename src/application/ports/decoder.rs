//! Audio decoding port interface

use thiserror::Error;

use crate::domain::audio::{AudioMimeType, DecodedAudio, EncodedAudio};

/// Decoding errors. Terminal for the session; never retried.
#[derive(Debug, Clone, Error)]
pub enum DecodeError {
    #[error("Unsupported audio container: {0}")]
    UnsupportedCodec(AudioMimeType),

    #[error("Malformed audio data: {0}")]
    Malformed(String),
}

/// Port for decoding an encoded blob into raw per-channel samples.
///
/// Pure CPU work; callers that must not block an async executor wrap the
/// call in a blocking task.
pub trait AudioDecoder: Send + Sync {
    fn decode(&self, audio: &EncodedAudio) -> Result<DecodedAudio, DecodeError>;
}
