//! Voice pipeline use case
//!
//! Orchestrates one recording session end to end: negotiate an encoding,
//! capture, transcode to canonical WAV, upload, and surface the session
//! status to the presentation layer.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;

use crate::domain::audio::AudioMimeType;
use crate::domain::capture::CaptureParams;
use crate::domain::session::{RecorderSession, RecorderStatus};

use super::ports::{
    negotiate_encoding, AudioDecoder, CaptureError, ChunkRecorder, EncodingSupport,
    ProcessedResponse, ResultStatus, UnsupportedEncoding, UploadClient, UploadError,
    DEFAULT_ENCODING_CANDIDATES,
};
use super::transcode::{TranscodeError, WavTranscoder};

/// Observer invoked on every status change
pub type StatusObserver = Arc<dyn Fn(&RecorderStatus) + Send + Sync>;

/// Errors from the voice pipeline use case
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Recording failed: {0}")]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Negotiation(#[from] UnsupportedEncoding),

    #[error("Transcoding failed: {0}")]
    Transcode(#[from] TranscodeError),

    #[error("Upload failed: {0}")]
    Upload(#[from] UploadError),

    #[error("Processing failed: {0}")]
    Backend(String),

    #[error("No active recording to stop")]
    NotListening,
}

/// The recorder state machine over its collaborator ports.
///
/// `start` and `stop` drive the session phases
/// (idle -> listening -> processing -> complete/error); every stage failure
/// is caught at its own boundary, converted into an error status with a
/// human-readable message, and aborts the remaining stages. Nothing is
/// retried automatically.
pub struct VoicePipeline<R, D, U>
where
    R: ChunkRecorder + EncodingSupport,
    D: AudioDecoder + 'static,
    U: UploadClient,
{
    recorder: R,
    transcoder: Arc<WavTranscoder<D>>,
    uploader: U,
    session: Mutex<RecorderSession>,
    candidates: Vec<AudioMimeType>,
    params: CaptureParams,
    observer: Option<StatusObserver>,
}

impl<R, D, U> VoicePipeline<R, D, U>
where
    R: ChunkRecorder + EncodingSupport,
    D: AudioDecoder + 'static,
    U: UploadClient,
{
    /// Create a pipeline with the default encoding candidates and speech
    /// capture parameters
    pub fn new(recorder: R, transcoder: WavTranscoder<D>, uploader: U) -> Self {
        Self {
            recorder,
            transcoder: Arc::new(transcoder),
            uploader,
            session: Mutex::new(RecorderSession::new()),
            candidates: DEFAULT_ENCODING_CANDIDATES.to_vec(),
            params: CaptureParams::speech(),
            observer: None,
        }
    }

    /// Override the encoding candidate chain
    pub fn with_candidates(mut self, candidates: Vec<AudioMimeType>) -> Self {
        self.candidates = candidates;
        self
    }

    /// Register a status observer (presentation hook)
    pub fn with_observer(mut self, observer: StatusObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Snapshot the current status
    pub async fn status(&self) -> RecorderStatus {
        self.session.lock().await.status()
    }

    async fn update(&self, apply: impl FnOnce(&mut RecorderSession)) {
        let status = {
            let mut session = self.session.lock().await;
            apply(&mut session);
            session.status()
        };
        if let Some(observer) = &self.observer {
            observer(&status);
        }
    }

    /// Begin a recording session.
    ///
    /// Returns `Ok(false)` without side effects when a session is already
    /// listening or processing; overlapping sessions are impossible by
    /// construction. Negotiation or microphone failures move the session to
    /// the error status and are returned to the caller.
    pub async fn start(&self) -> Result<bool, PipelineError> {
        {
            let status = {
                let mut session = self.session.lock().await;
                if !session.try_start() {
                    tracing::debug!(phase = %session.phase(), "start ignored, session busy");
                    return Ok(false);
                }
                session.status()
            };
            if let Some(observer) = &self.observer {
                observer(&status);
            }
        }

        let encoding = match negotiate_encoding(&self.recorder, &self.candidates) {
            Ok(encoding) => encoding,
            Err(e) => {
                self.update(|s| s.fail("Recording not supported", e.to_string()))
                    .await;
                return Err(e.into());
            }
        };
        tracing::debug!(%encoding, "negotiated recording encoding");

        if let Err(e) = self.recorder.start(encoding, self.params).await {
            let (message, detail) = match &e {
                CaptureError::AccessDenied(_) | CaptureError::NoAudioDevice => (
                    "Microphone access denied",
                    "Allow microphone access and try again".to_string(),
                ),
                other => ("Could not start recording", other.to_string()),
            };
            self.update(|s| s.fail(message, detail)).await;
            return Err(e.into());
        }

        Ok(true)
    }

    /// Stop the recording and run it through transcoding and upload.
    ///
    /// The stages are strictly sequenced; the first failure aborts the rest
    /// and leaves the session in the error status. The microphone is
    /// released by the recorder before transcoding begins, even when a later
    /// stage fails.
    pub async fn stop(&self) -> Result<ProcessedResponse, PipelineError> {
        {
            let status = {
                let mut session = self.session.lock().await;
                if !session.try_stop() {
                    return Err(PipelineError::NotListening);
                }
                session.status()
            };
            if let Some(observer) = &self.observer {
                observer(&status);
            }
        }

        let audio = match self.recorder.stop().await {
            Ok(audio) => audio,
            Err(e) => {
                self.update(|s| s.fail("Recording failed", e.to_string()))
                    .await;
                return Err(e.into());
            }
        };
        tracing::debug!(
            size = audio.size_bytes(),
            mime = %audio.mime_type(),
            "assembled recording"
        );

        let transcoder = Arc::clone(&self.transcoder);
        let transcoded = tokio::task::spawn_blocking(move || transcoder.transcode(audio))
            .await
            .map_err(|e| TranscodeError::TaskFailed(e.to_string()));
        let wav = match transcoded {
            Ok(Ok(wav)) => wav,
            Ok(Err(e)) | Err(e) => {
                self.update(|s| s.fail("Could not process the recording", e.to_string()))
                    .await;
                return Err(e.into());
            }
        };
        tracing::debug!(bytes = wav.len(), "transcoded to canonical WAV");

        let response = match self.uploader.upload(&wav).await {
            Ok(response) => response,
            Err(e) => {
                self.update(|s| s.fail("Upload failed", e.to_string())).await;
                return Err(e.into());
            }
        };

        match response.result.status {
            ResultStatus::Success => {
                let speech_text = response.result.speech_text.clone();
                self.update(|s| s.complete(speech_text)).await;
                Ok(response)
            }
            ResultStatus::Error => {
                let detail = response
                    .result
                    .error
                    .clone()
                    .unwrap_or_else(|| "The processing backend reported an error".to_string());
                self.update(|s| s.fail("Processing failed", detail.clone()))
                    .await;
                Err(PipelineError::Backend(detail))
            }
        }
    }
}
