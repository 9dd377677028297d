//! Capture parameter value object

/// Fixed parameters for a microphone capture session.
///
/// Echo cancellation and noise suppression are requested from the platform
/// capture stack; backends that cannot honor them capture unprocessed audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureParams {
    pub channels: u16,
    pub sample_rate: u32,
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
}

impl CaptureParams {
    /// Speech-optimized capture: mono, 16 kHz, voice processing on
    pub const fn speech() -> Self {
        Self {
            channels: 1,
            sample_rate: 16_000,
            echo_cancellation: true,
            noise_suppression: true,
        }
    }
}

impl Default for CaptureParams {
    fn default() -> Self {
        Self::speech()
    }
}
