//! Integration tests for voice_synthesis crate
//!
//! Drives the façade end to end against a mocked ElevenLabs API.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use futures::StreamExt;
use tempfile::TempDir;
use voice_synthesis::{
    AudioFormat, MockRecorder, MockTranscriber, MockTranslator, MockVoiceCloner,
    SpeechError, SpeechSynthesizer, StreamStatus, SynthesisConfig, SynthesisMode,
    SynthesisRequest, TranslationPipeline, TtsModel, VoicePreset, VoiceSettings,
    VoiceSynthesizer, audio_info, build_synthesizer,
};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const VOICE: &str = "voice-1";
const CONVERT_PATH: &str = "/v1/text-to-speech/voice-1";
const STREAM_PATH: &str = "/v1/text-to-speech/voice-1/stream";

/// Create a test configuration pointing to mock server
fn test_config(base_url: &str, output_dir: &Path) -> SynthesisConfig {
    SynthesisConfig {
        api_key: Some("test-api-key".to_string()),
        base_url: format!("{base_url}/v1"),
        output_dir: output_dir.to_path_buf(),
        timeout_ms: 5000,
        ..Default::default()
    }
}

fn synthesizer_for(server: &MockServer, dir: &TempDir) -> VoiceSynthesizer {
    VoiceSynthesizer::new(test_config(&server.uri(), dir.path()))
        .expect("Failed to create synthesizer")
}

/// Create mock MP3 audio data of the given length
fn mock_mp3_audio(len: usize) -> Vec<u8> {
    let mut audio = vec![0xFF, 0xFB, 0x90, 0x00];
    audio.extend((0..len.saturating_sub(4)).map(|i| (i % 251) as u8));
    audio
}

/// Mock the structured convert endpoint
async fn mount_structured(server: &MockServer, response: ResponseTemplate, calls: u64) {
    Mock::given(method("POST"))
        .and(path(CONVERT_PATH))
        .and(query_param("output_format", "mp3_44100_128"))
        .and(body_partial_json(serde_json::json!({ "model_id": "eleven_monolingual_v1" })))
        .respond_with(response)
        .expect(calls)
        .mount(server)
        .await;
}

/// Mock the legacy REST endpoint
async fn mount_rest(server: &MockServer, response: ResponseTemplate, calls: u64) {
    Mock::given(method("POST"))
        .and(path(CONVERT_PATH))
        .and(header("xi-api-key", "test-api-key"))
        .and(body_partial_json(serde_json::json!({ "model": "eleven_monolingual_v1" })))
        .respond_with(response)
        .expect(calls)
        .mount(server)
        .await;
}

fn files_in(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .map(|entries| entries.map(|e| e.unwrap().path()).collect())
        .unwrap_or_default()
}

// ============ Buffered Synthesis Integration Tests ============

#[tokio::test]
async fn structured_success_skips_rest() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let audio = mock_mp3_audio(2048);

    mount_structured(
        &server,
        ResponseTemplate::new(200).set_body_bytes(audio.clone()),
        1,
    )
    .await;
    mount_rest(&server, ResponseTemplate::new(200), 0).await;

    let artifact = synthesizer_for(&server, &dir)
        .synthesize(&SynthesisRequest::new("Hello world", VOICE), None)
        .await
        .unwrap();

    assert_eq!(artifact.byte_length, audio.len());
    assert_eq!(std::fs::read(&artifact.path).unwrap(), audio);
    let name = artifact.path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("output_"));
    assert!(name.ends_with(".mp3"));
}

#[tokio::test]
async fn structured_failure_falls_back_to_rest() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let audio = mock_mp3_audio(512);

    mount_structured(
        &server,
        ResponseTemplate::new(500).set_body_string("internal error"),
        1,
    )
    .await;
    mount_rest(
        &server,
        ResponseTemplate::new(200).set_body_bytes(audio.clone()),
        1,
    )
    .await;

    let artifact = synthesizer_for(&server, &dir)
        .synthesize(&SynthesisRequest::new("Hello world", VOICE), None)
        .await
        .unwrap();

    assert_eq!(std::fs::read(&artifact.path).unwrap(), audio);
}

#[tokio::test]
async fn stalled_structured_call_times_out_and_falls_back() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let audio = mock_mp3_audio(256);

    mount_structured(
        &server,
        ResponseTemplate::new(200)
            .set_body_bytes(mock_mp3_audio(64))
            .set_delay(Duration::from_secs(5)),
        1,
    )
    .await;
    mount_rest(
        &server,
        ResponseTemplate::new(200).set_body_bytes(audio.clone()),
        1,
    )
    .await;

    let config = SynthesisConfig {
        timeout_ms: 300,
        ..test_config(&server.uri(), dir.path())
    };
    let started = Instant::now();
    let artifact = VoiceSynthesizer::new(config)
        .unwrap()
        .synthesize(&SynthesisRequest::new("Hello world", VOICE), None)
        .await
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(std::fs::read(&artifact.path).unwrap(), audio);
}

#[tokio::test]
async fn rest_path_requests_and_names_mpeg_audio() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let audio = mock_mp3_audio(128);

    Mock::given(method("POST"))
        .and(path(CONVERT_PATH))
        .and(header("accept", "audio/mpeg"))
        .and(body_partial_json(serde_json::json!({ "model": "eleven_monolingual_v1" })))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(audio.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let config = SynthesisConfig {
        output_format: AudioFormat::Wav,
        use_structured_client: false,
        ..test_config(&server.uri(), dir.path())
    };
    let artifact = VoiceSynthesizer::new(config)
        .unwrap()
        .synthesize(&SynthesisRequest::new("Hello world", VOICE), None)
        .await
        .unwrap();

    assert_eq!(artifact.path.extension().unwrap(), "mp3");
    assert_eq!(std::fs::read(&artifact.path).unwrap(), audio);
}

#[tokio::test]
async fn empty_structured_body_falls_back_to_rest() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let audio = mock_mp3_audio(64);

    mount_structured(&server, ResponseTemplate::new(200), 1).await;
    mount_rest(
        &server,
        ResponseTemplate::new(200).set_body_bytes(audio.clone()),
        1,
    )
    .await;

    let artifact = synthesizer_for(&server, &dir)
        .synthesize(&SynthesisRequest::new("Hello world", VOICE), None)
        .await
        .unwrap();

    assert_eq!(std::fs::read(&artifact.path).unwrap(), audio);
}

#[tokio::test]
async fn both_paths_failing_writes_nothing() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_structured(&server, ResponseTemplate::new(500), 1).await;
    mount_rest(
        &server,
        ResponseTemplate::new(401).set_body_string("unauthorized"),
        1,
    )
    .await;

    let result = synthesizer_for(&server, &dir)
        .synthesize(&SynthesisRequest::new("Hello world", VOICE), None)
        .await;

    match result {
        Err(SpeechError::Transport { status, body }) => {
            assert_eq!(status, 401);
            assert_eq!(body, "unauthorized");
        },
        other => panic!("Expected transport failure, got {other:?}"),
    }
    assert!(files_in(dir.path()).is_empty());
}

#[tokio::test]
async fn empty_bodies_everywhere_is_no_audio() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_structured(&server, ResponseTemplate::new(200), 1).await;
    mount_rest(&server, ResponseTemplate::new(200), 1).await;

    let result = synthesizer_for(&server, &dir)
        .synthesize(&SynthesisRequest::new("Hello world", VOICE), None)
        .await;

    assert!(matches!(result, Err(SpeechError::NoAudio)));
    assert!(files_in(dir.path()).is_empty());
}

#[tokio::test]
async fn invalid_text_never_reaches_the_network() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(mock_mp3_audio(16)))
        .expect(0)
        .mount(&server)
        .await;

    let synthesizer = synthesizer_for(&server, &dir);

    let empty = synthesizer
        .synthesize(&SynthesisRequest::new("", VOICE), None)
        .await;
    assert!(matches!(empty, Err(SpeechError::Validation(msg)) if msg == "Text is empty"));

    let too_long = synthesizer
        .synthesize(&SynthesisRequest::new("a".repeat(5001), VOICE), None)
        .await;
    assert!(matches!(
        too_long,
        Err(SpeechError::Validation(msg)) if msg == "Text too long (5001 chars). Maximum: 5000"
    ));

    let bad_settings = synthesizer
        .synthesize(
            &SynthesisRequest::new("Hello", VOICE).with_settings(VoiceSettings::new(1.5, 0.5)),
            None,
        )
        .await;
    assert!(matches!(bad_settings, Err(SpeechError::Validation(_))));
}

#[tokio::test]
async fn explicit_output_path_is_honoured() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let audio = mock_mp3_audio(128);
    let target = dir.path().join("custom/dir/speech.mp3");

    mount_structured(
        &server,
        ResponseTemplate::new(200).set_body_bytes(audio.clone()),
        1,
    )
    .await;

    let artifact = synthesizer_for(&server, &dir)
        .synthesize(&SynthesisRequest::new("Hello", VOICE), Some(target.clone()))
        .await
        .unwrap();

    assert_eq!(artifact.path, target);
    assert_eq!(std::fs::read(target).unwrap(), audio);
}

#[tokio::test]
async fn repeated_calls_produce_distinct_artifacts() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_structured(
        &server,
        ResponseTemplate::new(200).set_body_bytes(mock_mp3_audio(32)),
        2,
    )
    .await;

    let synthesizer = synthesizer_for(&server, &dir);
    let request = SynthesisRequest::new("Same text", VOICE);

    let first = synthesizer.synthesize(&request, None).await.unwrap();
    let second = synthesizer.synthesize(&request, None).await.unwrap();

    assert_ne!(first.path, second.path);
    assert!(first.path.exists());
    assert!(second.path.exists());
}

#[tokio::test]
async fn preset_settings_reach_the_provider() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path(CONVERT_PATH))
        .and(body_partial_json(serde_json::json!({
            "voice_settings": { "stability": 0.75, "similarity_boost": 0.75 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(mock_mp3_audio(32)))
        .expect(1)
        .mount(&server)
        .await;

    let artifact = synthesizer_for(&server, &dir)
        .synthesize_with_preset("Hello", VOICE, "stable")
        .await
        .unwrap();

    assert!(artifact.path.exists());
    assert_eq!(VoicePreset::from_name("unknown"), VoicePreset::Balanced);
}

#[tokio::test]
async fn multilingual_uses_generate_and_multilingual_model() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let audio = mock_mp3_audio(300);

    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .and(body_partial_json(serde_json::json!({ "model_id": "eleven_multilingual_v2" })))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(audio.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let request = SynthesisRequest::new("Guten Tag", VOICE).with_model(TtsModel::MonolingualV1);
    let artifact = synthesizer_for(&server, &dir)
        .synthesize_multilingual(&request)
        .await
        .unwrap();

    assert_eq!(std::fs::read(&artifact.path).unwrap(), audio);
    let name = artifact.path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("multilingual_"));
}

#[tokio::test]
async fn multilingual_falls_back_to_rest() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let audio = mock_mp3_audio(300);

    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(CONVERT_PATH))
        .and(body_partial_json(serde_json::json!({ "model": "eleven_multilingual_v2" })))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(audio.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let artifact = synthesizer_for(&server, &dir)
        .synthesize_multilingual(&SynthesisRequest::new("Guten Tag", VOICE))
        .await
        .unwrap();

    assert_eq!(std::fs::read(&artifact.path).unwrap(), audio);
}

// ============ Batch Integration Tests ============

#[tokio::test]
async fn batch_omits_failures_and_keeps_order() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({ "text": "second" })))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(CONVERT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(mock_mp3_audio(16)))
        .mount(&server)
        .await;

    let texts = vec![
        "first".to_string(),
        "second".to_string(),
        "third".to_string(),
    ];
    let artifacts = synthesizer_for(&server, &dir)
        .batch_synthesize(&texts, VOICE, VoiceSettings::default())
        .await;

    assert_eq!(artifacts.len(), 2);
    let names: Vec<String> = artifacts
        .iter()
        .map(|a| a.path.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert!(names[0].starts_with("batch_1_"));
    assert!(names[1].starts_with("batch_3_"));
}

// ============ Streaming Integration Tests ============

#[tokio::test]
async fn structured_stream_delivers_provider_chunks() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let audio = mock_mp3_audio(10_000);

    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .and(query_param("output_format", "mp3_44100_128"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(audio.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let stream = synthesizer_for(&server, &dir)
        .synthesize_streaming(&SynthesisRequest::new("Hello", VOICE))
        .await;
    let (bytes, status) = stream.collect_bytes().await;

    assert_eq!(bytes.as_ref(), audio.as_slice());
    assert_eq!(status, StreamStatus::Exhausted);
}

#[tokio::test]
async fn rest_stream_yields_fixed_blocks_after_structured_failure() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let audio = mock_mp3_audio(10_000);

    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    mount_rest(
        &server,
        ResponseTemplate::new(200).set_body_bytes(audio.clone()),
        1,
    )
    .await;

    let stream = synthesizer_for(&server, &dir)
        .synthesize_streaming(&SynthesisRequest::new("Hello", VOICE))
        .await;
    let status = stream.subscribe();
    let chunks: Vec<_> = stream.collect().await;

    assert_eq!(chunks.len(), 3);
    assert!(chunks[..2].iter().all(|chunk| chunk.len() == 4096));
    assert_eq!(chunks.concat(), audio);
    assert_eq!(*status.borrow(), StreamStatus::Exhausted);
}

#[tokio::test]
async fn stream_with_no_working_path_yields_nothing() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_rest(
        &server,
        ResponseTemplate::new(429).set_body_string("rate limited"),
        1,
    )
    .await;

    let stream = synthesizer_for(&server, &dir)
        .synthesize_streaming(&SynthesisRequest::new("Hello", VOICE))
        .await;

    assert_eq!(
        stream.status(),
        StreamStatus::Failed("HTTP 429: rate limited".to_string())
    );
    let (bytes, _) = stream.collect_bytes().await;
    assert!(bytes.is_empty());
}

// ============ Mock Mode Integration Tests ============

#[tokio::test]
async fn missing_api_key_selects_mock_synthesis() {
    let dir = TempDir::new().unwrap();
    let config = SynthesisConfig {
        output_dir: dir.path().to_path_buf(),
        ..SynthesisConfig::default()
    };
    assert_eq!(config.mode(), SynthesisMode::Mock);

    let synthesizer = build_synthesizer(&config).unwrap();
    let artifact = synthesizer
        .synthesize(&SynthesisRequest::new("Hello", "Rachel"), None)
        .await
        .unwrap();

    let info = audio_info(&artifact.path).expect("mock output should be readable");
    assert!((info.duration - 2.0).abs() < 1e-6);
    assert_eq!(info.sample_rate, 22_050);
    assert_eq!(info.channels, 1);
    assert_eq!(info.file_size_bytes, artifact.byte_length as u64);
    assert_eq!(
        artifact.path.extension().unwrap(),
        AudioFormat::Wav.extension()
    );
}

#[tokio::test]
async fn pipeline_runs_against_live_synthesis() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let audio = mock_mp3_audio(256);

    Mock::given(method("POST"))
        .and(path(CONVERT_PATH))
        .and(body_partial_json(serde_json::json!({
            "text": "[de] (Mock) This is a sample transcription."
        })))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(audio.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let mut pipeline = TranslationPipeline::new(
        std::sync::Arc::new(MockRecorder::new(dir.path().join("recordings"))),
        std::sync::Arc::new(MockTranscriber),
        std::sync::Arc::new(MockTranslator),
        std::sync::Arc::new(MockVoiceCloner),
        std::sync::Arc::new(synthesizer_for(&server, &dir)),
        VOICE,
    );

    let artifact = pipeline
        .translate_speech(
            "de",
            std::time::Duration::from_secs(1),
            VoiceSettings::default(),
        )
        .await
        .unwrap();

    assert_eq!(std::fs::read(&artifact.path).unwrap(), audio);
    assert_eq!(pipeline.state().output_path.as_ref(), Some(&artifact.path));
}
