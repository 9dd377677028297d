//! End-to-end pipeline integration tests
//!
//! Drive the full use case against a scripted recorder, the real transcoder,
//! the real HTTP upload client, and a wiremock backend ingress.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use voice_relay::application::ports::{
    CaptureError, ChunkEncoder, ChunkRecorder, EncodingSupport,
};
use voice_relay::application::{PipelineError, VoicePipeline, WavTranscoder};
use voice_relay::domain::audio::{wav, AudioMimeType, DecodedAudio, EncodedAudio};
use voice_relay::domain::capture::CaptureParams;
use voice_relay::domain::session::RecorderPhase;
use voice_relay::infrastructure::codec::OggOpusChunkEncoder;
use voice_relay::infrastructure::{HttpUploadClient, StdAudioDecoder};

const INGRESS_PATH: &str = "/api/process-audio";

/// Recorder stand-in that yields a prepared blob on stop
struct ScriptedRecorder {
    blob: Mutex<Option<EncodedAudio>>,
    recording: AtomicBool,
    deny_access: bool,
}

impl ScriptedRecorder {
    fn with_blob(blob: EncodedAudio) -> Self {
        Self {
            blob: Mutex::new(Some(blob)),
            recording: AtomicBool::new(false),
            deny_access: false,
        }
    }

    fn denying_access() -> Self {
        Self {
            blob: Mutex::new(None),
            recording: AtomicBool::new(false),
            deny_access: true,
        }
    }
}

#[async_trait]
impl ChunkRecorder for ScriptedRecorder {
    async fn start(
        &self,
        _encoding: AudioMimeType,
        _params: CaptureParams,
    ) -> Result<(), CaptureError> {
        if self.deny_access {
            return Err(CaptureError::AccessDenied("permission denied".into()));
        }
        self.recording.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> Result<EncodedAudio, CaptureError> {
        self.recording.store(false, Ordering::SeqCst);
        self.blob
            .lock()
            .unwrap()
            .take()
            .ok_or(CaptureError::NotRecording)
    }

    fn is_recording(&self) -> bool {
        self.recording.load(Ordering::SeqCst)
    }
}

impl EncodingSupport for ScriptedRecorder {
    fn is_encoding_supported(&self, encoding: AudioMimeType) -> bool {
        matches!(encoding, AudioMimeType::Wav | AudioMimeType::Ogg)
    }
}

/// A canonical WAV blob of silent mono frames
fn silent_wav_blob(frames: usize) -> EncodedAudio {
    let payload = wav::serialize(&DecodedAudio::mono(16_000, vec![0.0; frames]));
    EncodedAudio::new(payload.into_bytes(), AudioMimeType::Wav)
}

/// An Opus-in-Ogg blob of one second of silence, built with the real encoder
fn silent_ogg_blob() -> EncodedAudio {
    let mut encoder = OggOpusChunkEncoder::new().unwrap();
    let mut chunks = encoder.push(&vec![0.0f32; 16_000]).unwrap();
    chunks.extend(encoder.finish().unwrap());
    EncodedAudio::from_chunks(chunks, AudioMimeType::Ogg)
}

fn success_body() -> serde_json::Value {
    json!({
        "message": "Audio processed successfully",
        "result": {
            "status": "success",
            "speech_text": "find me a backend role",
            "agent_response": {"roles": ["Backend Engineer", "Platform Engineer"]},
            "error": null
        }
    })
}

fn pipeline_for(
    recorder: ScriptedRecorder,
    server: &MockServer,
) -> VoicePipeline<ScriptedRecorder, StdAudioDecoder, HttpUploadClient> {
    VoicePipeline::new(
        recorder,
        WavTranscoder::new(StdAudioDecoder::new()),
        HttpUploadClient::new(format!("{}{}", server.uri(), INGRESS_PATH)),
    )
}

#[tokio::test]
async fn silent_session_uploads_exact_wav() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(INGRESS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
        .expect(1)
        .mount(&server)
        .await;

    // 2.5 seconds of silence at 16 kHz, already in canonical WAV
    let frames = 40_000;
    let pipeline = pipeline_for(ScriptedRecorder::with_blob(silent_wav_blob(frames)), &server);

    assert!(pipeline.start().await.unwrap());
    assert_eq!(pipeline.status().await.phase, RecorderPhase::Listening);

    let response = pipeline.stop().await.unwrap();
    assert_eq!(response.result.speech_text, "find me a backend role");
    assert_eq!(pipeline.status().await.phase, RecorderPhase::Complete);

    // The multipart body must embed the untouched 44 + frames*2 byte payload
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body = &requests[0].body;
    let wav_len = 44 + frames * 2;
    assert!(body.len() > wav_len);
    assert!(body
        .windows(4)
        .any(|w| w == b"RIFF"));
    assert!(body
        .windows(b"audiofile.wav".len())
        .any(|w| w == b"audiofile.wav"));
}

#[tokio::test]
async fn opus_recording_is_transcoded_and_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(INGRESS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
        .expect(1)
        .mount(&server)
        .await;

    let pipeline = pipeline_for(ScriptedRecorder::with_blob(silent_ogg_blob()), &server);

    pipeline.start().await.unwrap();
    pipeline.stop().await.unwrap();
    assert_eq!(pipeline.status().await.phase, RecorderPhase::Complete);

    // The uploaded bytes are WAV, not the original Ogg
    let requests = server.received_requests().await.unwrap();
    let body = &requests[0].body;
    assert!(body.windows(4).any(|w| w == b"RIFF"));
    assert!(!body.windows(4).any(|w| w == b"OggS"));
}

#[tokio::test]
async fn backend_http_error_moves_to_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(INGRESS_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("speech process crashed"))
        .mount(&server)
        .await;

    let pipeline = pipeline_for(ScriptedRecorder::with_blob(silent_wav_blob(100)), &server);

    pipeline.start().await.unwrap();
    let err = pipeline.stop().await.unwrap_err();
    assert!(matches!(err, PipelineError::Upload(_)));

    let status = pipeline.status().await;
    assert_eq!(status.phase, RecorderPhase::Error);
    assert!(status.message.contains("Upload failed"));
}

#[tokio::test]
async fn backend_error_result_surfaces_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(INGRESS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Audio processed successfully",
            "result": {
                "status": "error",
                "speech_text": "",
                "agent_response": "",
                "error": "could not understand the audio"
            }
        })))
        .mount(&server)
        .await;

    let pipeline = pipeline_for(ScriptedRecorder::with_blob(silent_wav_blob(100)), &server);

    pipeline.start().await.unwrap();
    let err = pipeline.stop().await.unwrap_err();
    assert!(matches!(err, PipelineError::Backend(_)));

    let status = pipeline.status().await;
    assert_eq!(status.phase, RecorderPhase::Error);
    assert_eq!(status.detail, "could not understand the audio");
}

#[tokio::test]
async fn undocumented_response_shape_fails_cleanly() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(INGRESS_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"jobs": "[{'title': 'Engineer'}]"})),
        )
        .mount(&server)
        .await;

    let pipeline = pipeline_for(ScriptedRecorder::with_blob(silent_wav_blob(100)), &server);

    pipeline.start().await.unwrap();
    let err = pipeline.stop().await.unwrap_err();
    assert!(matches!(err, PipelineError::Upload(_)));
    assert_eq!(pipeline.status().await.phase, RecorderPhase::Error);
}

#[tokio::test]
async fn denied_microphone_never_uploads() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(INGRESS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
        .expect(0)
        .mount(&server)
        .await;

    let pipeline = pipeline_for(ScriptedRecorder::denying_access(), &server);

    let err = pipeline.start().await.unwrap_err();
    assert!(matches!(err, PipelineError::Capture(_)));

    let status = pipeline.status().await;
    assert_eq!(status.phase, RecorderPhase::Error);
    assert!(status.message.contains("Microphone access denied"));
}

#[tokio::test]
async fn second_start_while_listening_is_ignored() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(INGRESS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
        .mount(&server)
        .await;

    let pipeline = pipeline_for(ScriptedRecorder::with_blob(silent_wav_blob(100)), &server);

    assert!(pipeline.start().await.unwrap());
    assert!(!pipeline.start().await.unwrap());
    assert_eq!(pipeline.status().await.phase, RecorderPhase::Listening);

    pipeline.stop().await.unwrap();
    assert_eq!(pipeline.status().await.phase, RecorderPhase::Complete);
}
