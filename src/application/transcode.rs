//! WAV transcoding use case

use thiserror::Error;

use crate::domain::audio::{wav, EncodedAudio, WavPayload};

use super::ports::{AudioDecoder, DecodeError};

/// Errors from the transcode use case
#[derive(Debug, Clone, Error)]
pub enum TranscodeError {
    #[error("Decoding failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("Transcoding task failed: {0}")]
    TaskFailed(String),
}

/// One-directional transcoder: any recognized encoded blob in, canonical
/// WAV bytes out.
///
/// Blobs already tagged as canonical WAV pass through byte-identical, which
/// avoids a redundant decode/re-encode and any precision loss.
pub struct WavTranscoder<D: AudioDecoder> {
    decoder: D,
}

impl<D: AudioDecoder> WavTranscoder<D> {
    /// Create a transcoder over the given decoder
    pub fn new(decoder: D) -> Self {
        Self { decoder }
    }

    /// Transcode a blob into a canonical WAV payload.
    ///
    /// The output always satisfies
    /// `len == 44 + num_channels * num_frames * 2` (pass-through excepted,
    /// where the input bytes are trusted verbatim).
    pub fn transcode(&self, blob: EncodedAudio) -> Result<WavPayload, TranscodeError> {
        if blob.mime_type().is_canonical_wav() {
            return Ok(WavPayload::from_bytes(blob.into_data()));
        }

        let decoded = self.decoder.decode(&blob)?;
        Ok(wav::serialize(&decoded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audio::{AudioMimeType, DecodedAudio};

    /// Decoder that returns a fixed buffer regardless of input
    struct FixedDecoder(DecodedAudio);

    impl AudioDecoder for FixedDecoder {
        fn decode(&self, _audio: &EncodedAudio) -> Result<DecodedAudio, DecodeError> {
            Ok(self.0.clone())
        }
    }

    struct FailingDecoder;

    impl AudioDecoder for FailingDecoder {
        fn decode(&self, audio: &EncodedAudio) -> Result<DecodedAudio, DecodeError> {
            Err(DecodeError::UnsupportedCodec(audio.mime_type()))
        }
    }

    #[test]
    fn wav_blob_passes_through_byte_identical() {
        let bytes = vec![0x52, 0x49, 0x46, 0x46, 0x00, 0x01, 0x02, 0x03];
        let blob = EncodedAudio::new(bytes.clone(), AudioMimeType::Wav);

        let transcoder = WavTranscoder::new(FailingDecoder);
        let wav = transcoder.transcode(blob).unwrap();

        assert_eq!(wav.bytes(), bytes.as_slice());
    }

    #[test]
    fn decoded_blob_is_serialized() {
        let decoder = FixedDecoder(DecodedAudio::mono(16_000, vec![0.0; 16_000]));
        let transcoder = WavTranscoder::new(decoder);

        let blob = EncodedAudio::new(vec![1, 2, 3], AudioMimeType::Ogg);
        let wav = transcoder.transcode(blob).unwrap();

        assert_eq!(wav.len(), 44 + 16_000 * 2);
        assert_eq!(&wav.bytes()[0..4], b"RIFF");
    }

    #[test]
    fn decode_failure_propagates() {
        let transcoder = WavTranscoder::new(FailingDecoder);
        let blob = EncodedAudio::new(vec![1, 2, 3], AudioMimeType::Webm);

        let err = transcoder.transcode(blob).unwrap_err();
        assert!(matches!(
            err,
            TranscodeError::Decode(DecodeError::UnsupportedCodec(AudioMimeType::Webm))
        ));
    }
}
