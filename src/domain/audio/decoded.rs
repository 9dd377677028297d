//! Decoded audio value object

/// Raw decoded audio: per-channel floating-point samples in [-1.0, 1.0]
/// plus the sample rate. Produced by decoding an encoded blob and consumed
/// exactly once by the WAV serializer.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl DecodedAudio {
    /// Create decoded audio from per-channel sample buffers
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    /// Create single-channel decoded audio
    pub fn mono(sample_rate: u32, samples: Vec<f32>) -> Self {
        Self {
            sample_rate,
            channels: vec![samples],
        }
    }

    /// Get the sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Get the number of channels
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Number of frames (samples per channel).
    /// Uses the shortest channel so interleaving never reads out of bounds.
    pub fn num_frames(&self) -> usize {
        self.channels.iter().map(Vec::len).min().unwrap_or(0)
    }

    /// Get the per-channel sample buffers
    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Whether there is no audio at all
    pub fn is_empty(&self) -> bool {
        self.num_frames() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mono_constructor() {
        let audio = DecodedAudio::mono(16_000, vec![0.0, 0.5, -0.5]);
        assert_eq!(audio.sample_rate(), 16_000);
        assert_eq!(audio.num_channels(), 1);
        assert_eq!(audio.num_frames(), 3);
        assert!(!audio.is_empty());
    }

    #[test]
    fn num_frames_uses_shortest_channel() {
        let audio = DecodedAudio::new(44_100, vec![vec![0.0; 10], vec![0.0; 8]]);
        assert_eq!(audio.num_frames(), 8);
    }

    #[test]
    fn empty_when_no_channels() {
        let audio = DecodedAudio::new(16_000, Vec::new());
        assert_eq!(audio.num_channels(), 0);
        assert_eq!(audio.num_frames(), 0);
        assert!(audio.is_empty());
    }

    #[test]
    fn empty_when_channels_have_no_samples() {
        let audio = DecodedAudio::mono(16_000, Vec::new());
        assert!(audio.is_empty());
    }
}
