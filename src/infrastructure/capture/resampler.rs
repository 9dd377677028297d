//! Streaming resampler for devices that cannot capture at 16kHz
//!
//! Wraps rubato's FFT resampler with an input carry-over buffer so batches
//! of arbitrary length can be fed as they arrive from the capture channel.

use rubato::{FftFixedIn, Resampler};

use crate::application::ports::CaptureError;

/// Input frames handed to rubato per processing step
const RESAMPLE_CHUNK: usize = 1024;

/// Streaming mono resampler
pub struct StreamResampler {
    inner: FftFixedIn<f32>,
    carry: Vec<f32>,
}

impl StreamResampler {
    /// Create a resampler from the device rate to the target rate
    pub fn new(source_rate: u32, target_rate: u32) -> Result<Self, CaptureError> {
        let inner = FftFixedIn::<f32>::new(
            source_rate as usize,
            target_rate as usize,
            RESAMPLE_CHUNK,
            2, // Sub-chunks
            1, // Mono
        )
        .map_err(|e| CaptureError::CaptureFailed(format!("Resampler init failed: {}", e)))?;

        Ok(Self {
            inner,
            carry: Vec::new(),
        })
    }

    /// Feed samples, returning whatever full chunks could be resampled.
    /// The remainder carries over to the next call.
    pub fn push(&mut self, samples: &[f32]) -> Result<Vec<f32>, CaptureError> {
        self.carry.extend_from_slice(samples);

        let mut output = Vec::new();
        loop {
            let needed = self.inner.input_frames_next();
            if self.carry.len() < needed {
                break;
            }
            let chunk: Vec<f32> = self.carry.drain(..needed).collect();
            let resampled = self
                .inner
                .process(&[chunk], None)
                .map_err(|e| CaptureError::CaptureFailed(format!("Resampling failed: {}", e)))?;
            output.extend_from_slice(&resampled[0]);
        }

        Ok(output)
    }

    /// Flush the carry-over buffer, zero-padding the final chunk
    pub fn finish(&mut self) -> Result<Vec<f32>, CaptureError> {
        if self.carry.is_empty() {
            return Ok(Vec::new());
        }

        let needed = self.inner.input_frames_next();
        let mut chunk = std::mem::take(&mut self.carry);
        chunk.resize(needed, 0.0);

        let resampled = self
            .inner
            .process(&[chunk], None)
            .map_err(|e| CaptureError::CaptureFailed(format!("Resampling failed: {}", e)))?;
        Ok(resampled[0].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downsamples_48k_to_16k() {
        let mut resampler = StreamResampler::new(48_000, 16_000).unwrap();

        let mut out = Vec::new();
        // Two seconds of silence in uneven batches
        for len in [4800usize, 9600, 33600, 48000] {
            out.extend(resampler.push(&vec![0.0; len]).unwrap());
        }
        out.extend(resampler.finish().unwrap());

        // 96000 input samples at a 1:3 ratio, within one chunk of padding
        let expected = 96_000 / 3;
        assert!(out.len() >= expected - RESAMPLE_CHUNK);
        assert!(out.len() <= expected + RESAMPLE_CHUNK);
    }

    #[test]
    fn small_batches_carry_over() {
        let mut resampler = StreamResampler::new(48_000, 16_000).unwrap();

        // Nothing emitted until a full chunk of input has accumulated
        let out = resampler.push(&vec![0.0; 100]).unwrap();
        assert!(out.is_empty());

        let out = resampler.finish().unwrap();
        assert!(!out.is_empty());
    }

    #[test]
    fn finish_on_empty_is_empty() {
        let mut resampler = StreamResampler::new(44_100, 16_000).unwrap();
        assert!(resampler.finish().unwrap().is_empty());
    }
}
