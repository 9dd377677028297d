//! Upload client integration tests against a wiremock ingress

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use voice_relay::application::ports::{ResultStatus, UploadClient, UploadError};
use voice_relay::domain::audio::{wav, DecodedAudio};
use voice_relay::infrastructure::HttpUploadClient;

fn test_payload() -> voice_relay::domain::audio::WavPayload {
    wav::serialize(&DecodedAudio::mono(16_000, vec![0.0; 1_600]))
}

#[tokio::test]
async fn posts_multipart_with_documented_field_and_filename() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/process-audio"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Audio processed successfully",
            "result": {
                "status": "success",
                "speech_text": "hello",
                "agent_response": {},
                "error": null
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpUploadClient::new(format!("{}/api/process-audio", server.uri()));
    let response = client.upload(&test_payload()).await.unwrap();

    assert_eq!(response.result.status, ResultStatus::Success);
    assert_eq!(response.result.speech_text, "hello");

    let requests = server.received_requests().await.unwrap();
    let request = &requests[0];

    let content_type = request
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(content_type.starts_with("multipart/form-data"));

    let body = String::from_utf8_lossy(&request.body);
    assert!(body.contains("name=\"audio\""));
    assert!(body.contains("filename=\"audiofile.wav\""));
    assert!(body.contains("Content-Type: audio/wav"));
}

#[tokio::test]
async fn non_success_status_is_an_error_with_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/process-audio"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Failed to process audio"))
        .mount(&server)
        .await;

    let client = HttpUploadClient::new(format!("{}/api/process-audio", server.uri()));
    let err = client.upload(&test_payload()).await.unwrap_err();

    match err {
        UploadError::HttpStatus { status, body } => {
            assert_eq!(status, 500);
            assert!(body.contains("Failed to process audio"));
        }
        other => panic!("expected HttpStatus, got {:?}", other),
    }
}

#[tokio::test]
async fn body_outside_the_contract_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/process-audio"))
        .respond_with(ResponseTemplate::new(200).set_body_string("jobs: [not json at all"))
        .mount(&server)
        .await;

    let client = HttpUploadClient::new(format!("{}/api/process-audio", server.uri()));
    let err = client.upload(&test_payload()).await.unwrap_err();

    assert!(matches!(err, UploadError::MalformedResponse(_)));
}

#[tokio::test]
async fn unreachable_backend_is_a_request_failure() {
    // Port 1 is essentially never listening
    let client = HttpUploadClient::new("http://127.0.0.1:1/api/process-audio");
    let err = client.upload(&test_payload()).await.unwrap_err();

    assert!(matches!(err, UploadError::RequestFailed(_)));
}

#[tokio::test]
async fn backend_error_result_still_parses() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/process-audio"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Audio processed successfully",
            "result": {
                "status": "error",
                "speech_text": "",
                "agent_response": "",
                "error": "whisper model not found"
            }
        })))
        .mount(&server)
        .await;

    let client = HttpUploadClient::new(format!("{}/api/process-audio", server.uri()));
    let response = client.upload(&test_payload()).await.unwrap();

    assert_eq!(response.result.status, ResultStatus::Error);
    assert_eq!(
        response.result.error.as_deref(),
        Some("whisper model not found")
    );
}
