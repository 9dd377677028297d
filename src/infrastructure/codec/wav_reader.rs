//! WAV container reader
//!
//! Decodes canonical (and general) WAV bytes into raw per-channel samples
//! using hound. Integer samples are normalized into [-1.0, 1.0].

use std::io::Cursor;

use crate::application::ports::DecodeError;
use crate::domain::audio::DecodedAudio;

/// Decode WAV bytes into per-channel `f32` samples
pub fn decode(data: &[u8]) -> Result<DecodedAudio, DecodeError> {
    let mut reader = hound::WavReader::new(Cursor::new(data))
        .map_err(|e| DecodeError::Malformed(e.to_string()))?;
    let spec = reader.spec();

    tracing::debug!(
        sample_rate = spec.sample_rate,
        channels = spec.channels,
        bits = spec.bits_per_sample,
        "reading WAV container"
    );

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| DecodeError::Malformed(e.to_string()))?,
        hound::SampleFormat::Int => match spec.bits_per_sample {
            16 => reader
                .samples::<i16>()
                .map(|s| s.map(|v| v as f32 / 32768.0))
                .collect::<Result<_, _>>()
                .map_err(|e| DecodeError::Malformed(e.to_string()))?,
            24 => reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / 8_388_608.0))
                .collect::<Result<_, _>>()
                .map_err(|e| DecodeError::Malformed(e.to_string()))?,
            32 => reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / 2_147_483_648.0))
                .collect::<Result<_, _>>()
                .map_err(|e| DecodeError::Malformed(e.to_string()))?,
            other => {
                return Err(DecodeError::Malformed(format!(
                    "unsupported bit depth: {}",
                    other
                )))
            }
        },
    };

    let channels = spec.channels.max(1) as usize;
    let frames = interleaved.len() / channels;
    let mut per_channel = vec![Vec::with_capacity(frames); channels];
    for frame in interleaved.chunks_exact(channels) {
        for (channel, &sample) in frame.iter().enumerate() {
            per_channel[channel].push(sample);
        }
    }

    Ok(DecodedAudio::new(spec.sample_rate, per_channel))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audio::wav;

    #[test]
    fn reads_back_our_own_serialization() {
        let original = DecodedAudio::mono(16_000, vec![0.0, 0.25, -0.25, 1.0, -1.0]);
        let payload = wav::serialize(&original);

        let decoded = decode(payload.bytes()).unwrap();
        assert_eq!(decoded.sample_rate(), 16_000);
        assert_eq!(decoded.num_channels(), 1);
        assert_eq!(decoded.num_frames(), 5);

        // Quantization error stays within one step
        for (a, b) in original.channels()[0]
            .iter()
            .zip(decoded.channels()[0].iter())
        {
            assert!((a - b).abs() <= 1.0 / 32768.0, "{} vs {}", a, b);
        }
    }

    #[test]
    fn stereo_is_deinterleaved() {
        let original = DecodedAudio::new(8_000, vec![vec![0.5, 0.5], vec![-0.5, -0.5]]);
        let payload = wav::serialize(&original);

        let decoded = decode(payload.bytes()).unwrap();
        assert_eq!(decoded.num_channels(), 2);
        assert_eq!(decoded.num_frames(), 2);
        assert!(decoded.channels()[0].iter().all(|&s| s > 0.0));
        assert!(decoded.channels()[1].iter().all(|&s| s < 0.0));
    }

    #[test]
    fn rejects_non_wav_bytes() {
        let err = decode(b"OggS this is not a wav").unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }

    #[test]
    fn rejects_truncated_header() {
        let payload = wav::serialize(&DecodedAudio::mono(16_000, vec![0.0; 10]));
        let err = decode(&payload.bytes()[..20]).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }
}
