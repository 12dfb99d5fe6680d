//! Provider tests against a mock transcription endpoint.

use bytes::Bytes;
use futures::stream;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

use crate::stt::base::{SpeechMetadata, SpeechResult, SttProvider};

use super::client::WhisperApiSTT;
use super::config::WhisperApiConfig;

fn test_metadata() -> SpeechMetadata {
    SpeechMetadata {
        channels: 1,
        sample_rate: 16000,
    }
}

fn audio_stream(chunks: Vec<Vec<u8>>) -> crate::stt::base::AudioStream {
    Box::pin(stream::iter(chunks.into_iter().map(Bytes::from)))
}

fn provider_for(server: &MockServer, extra: serde_json::Value) -> WhisperApiSTT {
    let mut options = json!({
        "server_url": format!("{}/v1/audio/transcriptions", server.uri()),
    });
    if let (Some(base), Some(extra)) = (options.as_object_mut(), extra.as_object()) {
        for (k, v) in extra {
            base.insert(k.clone(), v.clone());
        }
    }
    let config = WhisperApiConfig::from_options(&options).unwrap();
    WhisperApiSTT::new(config).unwrap()
}

/// Matches when the raw request body contains the given byte sequence.
/// Multipart bodies are not valid UTF-8, so string matchers cannot be used.
struct BodyContains(Vec<u8>);

impl BodyContains {
    fn text(needle: &str) -> Self {
        Self(needle.as_bytes().to_vec())
    }
}

impl Match for BodyContains {
    fn matches(&self, request: &Request) -> bool {
        request
            .body
            .windows(self.0.len())
            .any(|window| window == self.0)
    }
}

#[tokio::test]
async fn test_successful_transcription() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/audio/transcriptions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "text": "turn on the kitchen lights"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server, json!({}));
    let result = provider
        .transcribe(test_metadata(), audio_stream(vec![vec![0u8; 3200]]))
        .await;

    assert_eq!(result.text(), Some("turn on the kitchen lights"));
}

#[tokio::test]
async fn test_missing_text_field_yields_empty_transcript() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let provider = provider_for(&server, json!({}));
    let result = provider
        .transcribe(test_metadata(), audio_stream(vec![vec![1u8; 320]]))
        .await;

    assert_eq!(result.text(), Some(""));
}

#[tokio::test]
async fn test_empty_stream_skips_network() {
    let server = MockServer::start().await;

    // Any request hitting the server fails the test.
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "text": "nope" })))
        .expect(0)
        .mount(&server)
        .await;

    let provider = provider_for(&server, json!({}));

    let result = provider
        .transcribe(test_metadata(), audio_stream(vec![]))
        .await;
    assert_eq!(result, SpeechResult::Error);

    // A stream of empty chunks is just as empty.
    let result = provider
        .transcribe(test_metadata(), audio_stream(vec![vec![], vec![]]))
        .await;
    assert_eq!(result, SpeechResult::Error);
}

#[tokio::test]
async fn test_chunks_are_concatenated_in_order() {
    let server = MockServer::start().await;

    // 44-byte header followed by the chunk bytes back to back.
    Mock::given(method("POST"))
        .and(BodyContains(vec![
            0x10, 0x11, 0x12, 0x20, 0x21, 0x22, 0x30, 0x31, 0x32,
        ]))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "text": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server, json!({}));
    let result = provider
        .transcribe(
            test_metadata(),
            audio_stream(vec![
                vec![0x10, 0x11, 0x12],
                vec![0x20, 0x21, 0x22],
                vec![0x30, 0x31, 0x32],
            ]),
        )
        .await;

    assert_eq!(result.text(), Some("ok"));
}

#[tokio::test]
async fn test_multipart_form_fields() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(BodyContains::text("name=\"model\""))
        .and(BodyContains::text("whisper-large-v3"))
        .and(BodyContains::text("name=\"language\""))
        .and(BodyContains::text("name=\"temperature\""))
        .and(BodyContains::text("0.3"))
        .and(BodyContains::text("name=\"prompt\""))
        .and(BodyContains::text("Jargon: thermostat"))
        .and(BodyContains::text("filename=\"audio.wav\""))
        .and(BodyContains::text("audio/wav"))
        .and(BodyContains::text("RIFF"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "text": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(
        &server,
        json!({
            "model": "whisper-large-v3",
            "temperature": 0.3,
            "prompt": "Jargon: thermostat",
        }),
    );
    let result = provider
        .transcribe(test_metadata(), audio_stream(vec![vec![0u8; 640]]))
        .await;

    assert!(result.text().is_some());
}

#[tokio::test]
async fn test_language_field_carries_short_code() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(BodyContains::text("name=\"language\"\r\n\r\nfr"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "text": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server, json!({ "language": "fr_FR" }));
    let result = provider
        .transcribe(test_metadata(), audio_stream(vec![vec![0u8; 320]]))
        .await;

    assert!(result.text().is_some());
}

#[tokio::test]
async fn test_bearer_header_sent_when_api_key_set() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("authorization", "Bearer sk-test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "text": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server, json!({ "api_key": "sk-test-key" }));
    let result = provider
        .transcribe(test_metadata(), audio_stream(vec![vec![0u8; 320]]))
        .await;

    assert!(result.text().is_some());
}

/// No credential means no `Authorization` header at all.
struct NoAuthHeader;

impl Match for NoAuthHeader {
    fn matches(&self, request: &Request) -> bool {
        !request.headers.contains_key("authorization")
    }
}

#[tokio::test]
async fn test_no_bearer_header_when_api_key_empty() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(NoAuthHeader)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "text": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server, json!({}));
    let result = provider
        .transcribe(test_metadata(), audio_stream(vec![vec![0u8; 320]]))
        .await;

    assert!(result.text().is_some());
}

#[tokio::test]
async fn test_upstream_error_maps_to_error_result() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "Invalid API key", "type": "invalid_request_error" }
        })))
        .mount(&server)
        .await;

    let provider = provider_for(&server, json!({ "api_key": "bad-key" }));
    let result = provider
        .transcribe(test_metadata(), audio_stream(vec![vec![0u8; 320]]))
        .await;

    assert_eq!(result, SpeechResult::Error);
}

#[tokio::test]
async fn test_server_error_with_plain_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal failure"))
        .mount(&server)
        .await;

    let provider = provider_for(&server, json!({}));
    let result = provider
        .transcribe(test_metadata(), audio_stream(vec![vec![0u8; 320]]))
        .await;

    assert_eq!(result, SpeechResult::Error);
}

#[tokio::test]
async fn test_malformed_success_body_maps_to_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let provider = provider_for(&server, json!({}));
    let result = provider
        .transcribe(test_metadata(), audio_stream(vec![vec![0u8; 320]]))
        .await;

    assert_eq!(result, SpeechResult::Error);
}

#[tokio::test]
async fn test_unreachable_endpoint_maps_to_error() {
    let config = WhisperApiConfig::from_options(&json!({
        // Reserved port on localhost with nothing listening.
        "server_url": "http://127.0.0.1:9/v1/audio/transcriptions",
    }))
    .unwrap();
    let provider = WhisperApiSTT::new(config).unwrap();

    let result = provider
        .transcribe(test_metadata(), audio_stream(vec![vec![0u8; 320]]))
        .await;

    assert_eq!(result, SpeechResult::Error);
}

#[tokio::test]
async fn test_invalid_metadata_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "text": "nope" })))
        .expect(0)
        .mount(&server)
        .await;

    let provider = provider_for(&server, json!({}));
    let metadata = SpeechMetadata {
        channels: 0,
        sample_rate: 16000,
    };
    let result = provider
        .transcribe(metadata, audio_stream(vec![vec![0u8; 320]]))
        .await;

    assert_eq!(result, SpeechResult::Error);
}

#[tokio::test]
async fn test_working_file_removed_after_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "text": "ok" })))
        .mount(&server)
        .await;

    let staging = tempfile::tempdir().unwrap();
    let provider = provider_for(&server, json!({})).with_staging_dir(staging.path());

    let result = provider
        .transcribe(test_metadata(), audio_stream(vec![vec![0u8; 3200]]))
        .await;
    assert!(result.text().is_some());

    let leftovers: Vec<_> = std::fs::read_dir(staging.path())
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert!(leftovers.is_empty(), "working file not removed: {leftovers:?}");
}

#[tokio::test]
async fn test_working_file_removed_after_upstream_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let staging = tempfile::tempdir().unwrap();
    let provider = provider_for(&server, json!({})).with_staging_dir(staging.path());

    let result = provider
        .transcribe(test_metadata(), audio_stream(vec![vec![0u8; 3200]]))
        .await;
    assert_eq!(result, SpeechResult::Error);

    let leftovers: Vec<_> = std::fs::read_dir(staging.path())
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert!(leftovers.is_empty(), "working file not removed: {leftovers:?}");
}

#[tokio::test]
async fn test_working_file_removed_after_network_error() {
    let staging = tempfile::tempdir().unwrap();
    let config = WhisperApiConfig::from_options(&json!({
        "server_url": "http://127.0.0.1:9/v1/audio/transcriptions",
    }))
    .unwrap();
    let provider = WhisperApiSTT::new(config)
        .unwrap()
        .with_staging_dir(staging.path());

    let result = provider
        .transcribe(test_metadata(), audio_stream(vec![vec![0u8; 3200]]))
        .await;
    assert_eq!(result, SpeechResult::Error);

    let leftovers: Vec<_> = std::fs::read_dir(staging.path())
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert!(leftovers.is_empty(), "working file not removed: {leftovers:?}");
}

#[tokio::test]
async fn test_no_retry_on_failure() {
    let server = MockServer::start().await;

    // Exactly one request even when the endpoint fails.
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server, json!({}));
    let result = provider
        .transcribe(test_metadata(), audio_stream(vec![vec![0u8; 320]]))
        .await;

    assert_eq!(result, SpeechResult::Error);
}

#[test]
fn test_capabilities_reflect_configured_language() {
    let config = WhisperApiConfig::from_options(&json!({
        "server_url": "https://stt.example.com/transcribe",
        "language": "de-DE",
    }))
    .unwrap();
    let provider = WhisperApiSTT::new(config).unwrap();

    assert_eq!(provider.capabilities().languages, vec!["de-DE".to_string()]);
    assert_eq!(provider.provider_info(), "Whisper API STT");
}
