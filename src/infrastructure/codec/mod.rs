//! Codec infrastructure module
//!
//! The registry mirrors what the platform's recorder can actually stream:
//! chunked WAV and FLAC encoders do not exist here (their containers carry
//! up-front sizes), so the default candidate chain negotiates down to
//! Opus-in-Ogg, exactly like a recorder that cannot emit `audio/wav`
//! natively. The decode side accepts more than the encode side so the
//! transcoder can consume foreign blobs.

pub mod opus_ogg;
pub mod wav_reader;

pub use opus_ogg::{OggOpusChunkEncoder, TARGET_SAMPLE_RATE};

use crate::application::ports::{
    AudioDecoder, ChunkEncoder, DecodeError, EncodeError, EncodingSupport,
};
use crate::domain::audio::{AudioMimeType, DecodedAudio, EncodedAudio};

/// Registry of streaming encoders available to the recorder
#[derive(Debug, Clone, Copy, Default)]
pub struct CodecRegistry;

impl CodecRegistry {
    /// Create the default registry
    pub fn new() -> Self {
        Self
    }

    /// Instantiate a streaming encoder for the given encoding
    pub fn create_encoder(
        &self,
        encoding: AudioMimeType,
    ) -> Result<Box<dyn ChunkEncoder>, EncodeError> {
        match encoding {
            AudioMimeType::Ogg => Ok(Box::new(OggOpusChunkEncoder::new()?)),
            other => Err(EncodeError::Unsupported(other)),
        }
    }
}

impl EncodingSupport for CodecRegistry {
    fn is_encoding_supported(&self, encoding: AudioMimeType) -> bool {
        matches!(encoding, AudioMimeType::Ogg)
    }
}

/// Decoder over every container this build understands
#[derive(Debug, Clone, Copy, Default)]
pub struct StdAudioDecoder;

impl StdAudioDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl AudioDecoder for StdAudioDecoder {
    fn decode(&self, audio: &EncodedAudio) -> Result<DecodedAudio, DecodeError> {
        match audio.mime_type() {
            AudioMimeType::Wav => wav_reader::decode(audio.data()),
            AudioMimeType::Ogg => opus_ogg::decode(audio.data()),
            other => Err(DecodeError::UnsupportedCodec(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{negotiate_encoding, DEFAULT_ENCODING_CANDIDATES};

    #[test]
    fn default_chain_negotiates_to_ogg() {
        let registry = CodecRegistry::new();
        let encoding = negotiate_encoding(&registry, DEFAULT_ENCODING_CANDIDATES).unwrap();
        assert_eq!(encoding, AudioMimeType::Ogg);
    }

    #[test]
    fn wav_and_flac_are_not_stream_encodable() {
        let registry = CodecRegistry::new();
        assert!(!registry.is_encoding_supported(AudioMimeType::Wav));
        assert!(!registry.is_encoding_supported(AudioMimeType::Flac));
        assert!(registry.is_encoding_supported(AudioMimeType::Ogg));
    }

    #[test]
    fn create_encoder_rejects_unsupported() {
        let registry = CodecRegistry::new();
        let err = registry.create_encoder(AudioMimeType::Webm).unwrap_err();
        assert!(matches!(
            err,
            EncodeError::Unsupported(AudioMimeType::Webm)
        ));
    }

    #[test]
    fn decoder_rejects_unknown_containers() {
        let decoder = StdAudioDecoder::new();
        let blob = EncodedAudio::new(vec![0u8; 16], AudioMimeType::Webm);
        let err = decoder.decode(&blob).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::UnsupportedCodec(AudioMimeType::Webm)
        ));
    }
}
