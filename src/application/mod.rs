//! Application layer - Use cases and port interfaces
//!
//! Contains the core business operations and trait definitions
//! for external system interactions.

pub mod pipeline;
pub mod ports;
pub mod transcode;

// Re-export use cases
pub use pipeline::{PipelineError, StatusObserver, VoicePipeline};
pub use transcode::{TranscodeError, WavTranscoder};
