//! Encoding capability probing, negotiation, and streaming encoder port

use thiserror::Error;

use crate::domain::audio::{AudioMimeType, EncodedChunk};

/// Default candidate chain: canonical WAV first, then lossless
/// FLAC-in-container, then the lossy Opus-in-Ogg container.
pub const DEFAULT_ENCODING_CANDIDATES: &[AudioMimeType] = &[
    AudioMimeType::Wav,
    AudioMimeType::Flac,
    AudioMimeType::Ogg,
];

/// Capability check for streaming-encodable containers
pub trait EncodingSupport: Send + Sync {
    fn is_encoding_supported(&self, encoding: AudioMimeType) -> bool;
}

/// Negotiation failure: none of the candidates is encodable
#[derive(Debug, Clone, Error)]
#[error("No supported recording encoding among candidates: {candidates}")]
pub struct UnsupportedEncoding {
    pub candidates: String,
}

/// Select the first candidate the platform can stream-encode.
///
/// Candidates are probed strictly in priority order; there is no fallback
/// to types outside the list.
pub fn negotiate_encoding(
    support: &dyn EncodingSupport,
    candidates: &[AudioMimeType],
) -> Result<AudioMimeType, UnsupportedEncoding> {
    candidates
        .iter()
        .copied()
        .find(|candidate| support.is_encoding_supported(*candidate))
        .ok_or_else(|| UnsupportedEncoding {
            candidates: candidates
                .iter()
                .map(|c| c.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        })
}

/// Encoding errors
#[derive(Debug, Clone, Error)]
pub enum EncodeError {
    #[error("Unsupported encoding: {0}")]
    Unsupported(AudioMimeType),

    #[error("Encoder init failed: {0}")]
    Init(String),

    #[error("Encoding failed: {0}")]
    Encode(String),

    #[error("Container write failed: {0}")]
    Container(String),
}

/// Streaming encoder for one capture session.
///
/// Consumes mono `f32` samples at the session sample rate and emits encoded
/// chunks at a fixed audio-time cadence. Concatenating every emitted chunk,
/// in order, yields one valid container stream.
pub trait ChunkEncoder: Send + std::fmt::Debug {
    /// The container this encoder produces
    fn mime_type(&self) -> AudioMimeType;

    /// Feed samples, collecting any chunks that completed
    fn push(&mut self, samples: &[f32]) -> Result<Vec<EncodedChunk>, EncodeError>;

    /// Flush the final partial chunk and close the container stream
    fn finish(&mut self) -> Result<Vec<EncodedChunk>, EncodeError>;
}
