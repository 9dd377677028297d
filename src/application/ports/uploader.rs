//! Upload port interface and the backend response contract

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::audio::WavPayload;

/// Multipart form field carrying the recording
pub const UPLOAD_FIELD: &str = "audio";

/// File name the backend stores the recording under
pub const UPLOAD_FILE_NAME: &str = "audiofile.wav";

/// Upload errors
#[derive(Debug, Clone, Error)]
pub enum UploadError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Backend returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Backend response did not match the documented shape: {0}")]
    MalformedResponse(String),
}

/// Outcome reported by the speech/agent process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Success,
    Error,
}

/// The speech/agent result embedded in a successful ingress response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResult {
    pub status: ResultStatus,
    pub speech_text: String,
    /// Structured object or plain string, at the agent's discretion
    pub agent_response: serde_json::Value,
    pub error: Option<String>,
}

/// Parsed success response from the backend ingress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedResponse {
    pub message: String,
    pub result: AgentResult,
}

/// Port for handing the final WAV payload to the backend ingress
#[async_trait]
pub trait UploadClient: Send + Sync {
    /// POST the payload as multipart form data and parse the documented
    /// response shape. Anything else is an error; there is no recovery
    /// parsing of malformed bodies.
    async fn upload(&self, wav: &WavPayload) -> Result<ProcessedResponse, UploadError>;
}
