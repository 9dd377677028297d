//! Canonical WAV serialization
//!
//! The pipeline's single interchange format: 44-byte RIFF header followed by
//! interleaved little-endian 16-bit PCM samples. Every upload carries exactly
//! this layout, so any standard WAV reader can round-trip the payload.

use super::DecodedAudio;

/// Length of the RIFF/fmt/data header preamble
pub const WAV_HEADER_LEN: usize = 44;

/// Output bit depth
pub const BITS_PER_SAMPLE: u16 = 16;

/// Terminal artifact of the pipeline: a byte sequence in canonical WAV
/// layout, ready to be handed to the upload client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavPayload {
    bytes: Vec<u8>,
}

impl WavPayload {
    /// Wrap bytes that are already in canonical WAV layout (pass-through)
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Get the payload bytes
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume and return the payload bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Get the size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Quantize one sample to 16-bit PCM.
///
/// Clamps to [-1.0, 1.0], then scales asymmetrically: negative samples by
/// 32768, non-negative by 32767, truncating toward zero. This keeps -1.0 at
/// the exact i16 minimum without overflowing +1.0.
pub fn quantize_sample(sample: f32) -> i16 {
    let s = sample.clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}

/// Serialize decoded audio into a canonical WAV payload.
///
/// Output length is always `44 + num_channels * num_frames * 2`.
pub fn serialize(audio: &DecodedAudio) -> WavPayload {
    let num_channels = audio.num_channels() as u16;
    let num_frames = audio.num_frames();
    let sample_rate = audio.sample_rate();

    let data_size = num_frames * num_channels as usize * 2;
    let byte_rate = sample_rate * num_channels as u32 * 2;
    let block_align = num_channels * 2;

    let mut out = Vec::with_capacity(WAV_HEADER_LEN + data_size);

    // RIFF chunk descriptor
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_size as u32).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    // fmt subchunk: 16-byte PCM description
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&num_channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    // data subchunk: channels interleaved sample-by-sample
    out.extend_from_slice(b"data");
    out.extend_from_slice(&(data_size as u32).to_le_bytes());
    for frame in 0..num_frames {
        for channel in audio.channels() {
            out.extend_from_slice(&quantize_sample(channel[frame]).to_le_bytes());
        }
    }

    WavPayload::from_bytes(out)
}
