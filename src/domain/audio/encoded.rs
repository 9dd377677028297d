//! Encoded audio value objects

use std::fmt;

/// Audio container MIME types the pipeline can negotiate or recognize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioMimeType {
    /// Canonical 16-bit PCM WAV, the pipeline's interchange format
    Wav,
    /// Lossless PCM-in-container encoding
    Flac,
    /// Opus in an Ogg container
    Ogg,
    /// Opus in a WebM container
    Webm,
}

impl AudioMimeType {
    /// Get the MIME type string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Wav => "audio/wav",
            Self::Flac => "audio/flac",
            Self::Ogg => "audio/ogg",
            Self::Webm => "audio/webm",
        }
    }

    /// Get the file extension
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Flac => "flac",
            Self::Ogg => "ogg",
            Self::Webm => "webm",
        }
    }

    /// Whether this type denotes the canonical WAV interchange format
    pub const fn is_canonical_wav(&self) -> bool {
        matches!(self, Self::Wav)
    }
}

impl fmt::Display for AudioMimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Default for AudioMimeType {
    fn default() -> Self {
        Self::Ogg
    }
}

/// One bounded, codec-encoded slice of a recording session.
/// Emitted by the streaming encoder at the chunk cadence and owned by the
/// recorder until the session's blob is assembled.
#[derive(Debug, Clone)]
pub struct EncodedChunk {
    data: Vec<u8>,
    mime_type: AudioMimeType,
}

impl EncodedChunk {
    /// Create a chunk tagged with the session's MIME type
    pub fn new(data: Vec<u8>, mime_type: AudioMimeType) -> Self {
        Self { data, mime_type }
    }

    /// Get the chunk bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get the MIME type
    pub fn mime_type(&self) -> AudioMimeType {
        self.mime_type
    }

    /// Get the size in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the chunk carries no bytes
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Value object holding one complete encoded recording.
/// Contains raw container bytes and their MIME type.
#[derive(Debug, Clone)]
pub struct EncodedAudio {
    data: Vec<u8>,
    mime_type: AudioMimeType,
}

impl EncodedAudio {
    /// Create EncodedAudio from raw bytes
    pub fn new(data: Vec<u8>, mime_type: AudioMimeType) -> Self {
        Self { data, mime_type }
    }

    /// Create EncodedAudio from a byte slice
    pub fn from_bytes(data: &[u8], mime_type: AudioMimeType) -> Self {
        Self {
            data: data.to_vec(),
            mime_type,
        }
    }

    /// Assemble a blob by concatenating chunks in FIFO order
    pub fn from_chunks(chunks: Vec<EncodedChunk>, mime_type: AudioMimeType) -> Self {
        let total: usize = chunks.iter().map(EncodedChunk::len).sum();
        let mut data = Vec::with_capacity(total);
        for chunk in chunks {
            data.extend_from_slice(chunk.data());
        }
        Self { data, mime_type }
    }

    /// Get the raw encoded data
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume and return the raw encoded data
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Get the MIME type
    pub fn mime_type(&self) -> AudioMimeType {
        self.mime_type
    }

    /// Get the size in bytes
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Get human-readable size
    pub fn human_readable_size(&self) -> String {
        let bytes = self.size_bytes();
        if bytes < 1024 {
            format!("{} B", bytes)
        } else if bytes < 1024 * 1024 {
            format!("{:.1} KB", bytes as f64 / 1024.0)
        } else {
            format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
        }
    }
}
