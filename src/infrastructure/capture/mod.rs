//! Capture infrastructure module
//!
//! Microphone capture via cpal, the cross-thread frame transport, and the
//! streaming resampler for devices that cannot record at 16 kHz natively.

mod cpal_recorder;
mod resampler;
pub mod transport;

pub use cpal_recorder::CpalChunkRecorder;
pub use resampler::StreamResampler;
pub use transport::{frame_channel, ChannelSink, DirectSink, FrameSink};
