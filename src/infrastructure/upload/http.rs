//! HTTP upload client adapter
//!
//! POSTs the final WAV payload to the backend ingress as multipart form
//! data and parses the documented response shape. No timeout and no retry:
//! a failed upload is terminal for the session and the user starts over.

use async_trait::async_trait;

use crate::application::ports::{
    ProcessedResponse, UploadClient, UploadError, UPLOAD_FIELD, UPLOAD_FILE_NAME,
};
use crate::domain::audio::WavPayload;

/// Upload client over the backend ingress endpoint
pub struct HttpUploadClient {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpUploadClient {
    /// Create a client for the given endpoint URL
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }

    /// The configured endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl UploadClient for HttpUploadClient {
    async fn upload(&self, wav: &WavPayload) -> Result<ProcessedResponse, UploadError> {
        let part = reqwest::multipart::Part::bytes(wav.bytes().to_vec())
            .file_name(UPLOAD_FILE_NAME)
            .mime_str("audio/wav")
            .map_err(|e| UploadError::RequestFailed(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part(UPLOAD_FIELD, part);

        tracing::debug!(bytes = wav.len(), endpoint = %self.endpoint, "uploading recording");

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(status = status.as_u16(), "backend rejected upload");
            return Err(UploadError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<ProcessedResponse>()
            .await
            .map_err(|e| UploadError::MalformedResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_the_endpoint() {
        let client = HttpUploadClient::new("http://localhost:3002/api/process-audio");
        assert_eq!(client.endpoint(), "http://localhost:3002/api/process-audio");
    }
}
