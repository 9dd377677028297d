//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod codec;
pub mod config;
pub mod decoder;
pub mod recorder;
pub mod uploader;

// Re-export common types
pub use codec::{
    negotiate_encoding, ChunkEncoder, EncodeError, EncodingSupport, UnsupportedEncoding,
    DEFAULT_ENCODING_CANDIDATES,
};
pub use config::ConfigStore;
pub use decoder::{AudioDecoder, DecodeError};
pub use recorder::{CaptureError, ChunkRecorder};
pub use uploader::{
    AgentResult, ProcessedResponse, ResultStatus, UploadClient, UploadError, UPLOAD_FIELD,
    UPLOAD_FILE_NAME,
};
