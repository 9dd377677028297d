//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with cpal, the Opus/Ogg codec, the backend ingress, etc.

pub mod capture;
pub mod codec;
pub mod config;
pub mod upload;

// Re-export adapters
pub use capture::CpalChunkRecorder;
pub use codec::{CodecRegistry, StdAudioDecoder};
pub use config::XdgConfigStore;
pub use upload::HttpUploadClient;
