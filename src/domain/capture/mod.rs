//! Capture domain module

mod frame;
mod params;

pub use frame::{
    AudioFrame, CaptureMessage, FrameBatch, FrameCollector, FLUSH_THRESHOLD_SAMPLES,
};
pub use params::CaptureParams;
