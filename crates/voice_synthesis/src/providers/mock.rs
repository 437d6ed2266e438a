//! Offline mock adapters
//!
//! Used whenever no provider API key is configured. Every adapter is
//! deterministic apart from generated file names and clone timestamps.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use futures::stream;
use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::{debug, info};

use crate::artifact::ArtifactWriter;
use crate::config::SynthesisConfig;
use crate::error::SpeechError;
use crate::ports::{AudioRecorder, SpeechSynthesizer, Transcriber, Translator, VoiceCloner};
use crate::streaming::{AudioStream, fixed_blocks};
use crate::types::{ArtifactTarget, AudioArtifact, AudioFormat, SynthesisRequest, TtsModel};

/// Sample rate of every mock recording and synthesis
pub const MOCK_SAMPLE_RATE: u32 = 22_050;

/// Length of mock synthesized audio
pub const MOCK_DURATION_SECS: u32 = 2;

/// Longest mock recording
pub const MAX_RECORDING_SECS: u32 = 60;

/// Sentence returned by [`MockTranscriber`]
pub const MOCK_TRANSCRIPT: &str = "(Mock) This is a sample transcription.";

/// Encode a silent 16-bit mono WAV
pub fn silent_wav(seconds: u32, sample_rate: u32) -> Result<Vec<u8>, SpeechError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let wav_error =
        |e: hound::Error| SpeechError::InvalidAudio(format!("WAV encoding failed: {e}"));

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec).map_err(wav_error)?;
        for _ in 0..seconds * sample_rate {
            writer.write_sample(0i16).map_err(wav_error)?;
        }
        writer.finalize().map_err(wav_error)?;
    }

    Ok(cursor.into_inner())
}

/// Synthesizer writing silent WAV files instead of calling the provider
#[derive(Debug, Clone)]
pub struct MockSynthesizer {
    writer: ArtifactWriter,
    default_model: TtsModel,
    max_text_length: usize,
    chunk_size: usize,
}

impl MockSynthesizer {
    /// Create a mock synthesizer honouring the configured output directory
    #[must_use]
    pub fn new(config: &SynthesisConfig) -> Self {
        Self {
            writer: ArtifactWriter::new(config.output_dir.clone(), AudioFormat::Wav),
            default_model: config.default_model,
            max_text_length: config.max_text_length,
            chunk_size: config.stream_chunk_size,
        }
    }

    async fn render(
        &self,
        request: &SynthesisRequest,
        target: &ArtifactTarget,
    ) -> Result<AudioArtifact, SpeechError> {
        request.validate(self.max_text_length)?;
        debug!(voice = %request.voice_id, "Mock synthesis");

        let audio = silent_wav(MOCK_DURATION_SECS, MOCK_SAMPLE_RATE)?;
        self.writer.write(&audio, target).await
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    async fn synthesize_to(
        &self,
        request: &SynthesisRequest,
        target: ArtifactTarget,
    ) -> Result<AudioArtifact, SpeechError> {
        self.render(request, &target).await
    }

    async fn synthesize_multilingual(
        &self,
        request: &SynthesisRequest,
    ) -> Result<AudioArtifact, SpeechError> {
        self.render(request, &ArtifactTarget::Generated("multilingual".to_string()))
            .await
    }

    async fn synthesize_streaming(&self, request: &SynthesisRequest) -> AudioStream {
        if let Err(e) = request.validate(self.max_text_length) {
            return AudioStream::failed(e.to_string());
        }

        match silent_wav(MOCK_DURATION_SECS, MOCK_SAMPLE_RATE) {
            Ok(audio) => {
                let source = stream::iter([Ok::<_, SpeechError>(Bytes::from(audio))]);
                AudioStream::new(fixed_blocks(source, self.chunk_size))
            },
            Err(e) => AudioStream::failed(e.to_string()),
        }
    }

    fn default_model(&self) -> TtsModel {
        self.default_model
    }
}

/// Voice cloner that invents identifiers
#[derive(Debug, Clone, Copy, Default)]
pub struct MockVoiceCloner;

#[async_trait]
impl VoiceCloner for MockVoiceCloner {
    async fn clone_voice(&self, audio_path: &Path, name: &str) -> Result<String, SpeechError> {
        debug!(sample = %audio_path.display(), "Mock voice cloning");
        Ok(format!("mock_{}_{name}", Utc::now().timestamp()))
    }
}

/// Transcriber returning a fixed sentence
#[derive(Debug, Clone, Copy, Default)]
pub struct MockTranscriber;

#[async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(&self, _audio_path: &Path) -> Result<String, SpeechError> {
        Ok(MOCK_TRANSCRIPT.to_string())
    }
}

/// Translator tagging the text with the target language
#[derive(Debug, Clone, Copy, Default)]
pub struct MockTranslator;

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, SpeechError> {
        Ok(format!("[{target_language}] {text}"))
    }
}

/// Recorder producing silent WAV files of the requested length
#[derive(Debug, Clone)]
pub struct MockRecorder {
    writer: ArtifactWriter,
}

impl MockRecorder {
    /// Record into the given directory
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            writer: ArtifactWriter::new(output_dir, AudioFormat::Wav),
        }
    }
}

#[async_trait]
impl AudioRecorder for MockRecorder {
    async fn record(&self, max_duration: Duration) -> Result<PathBuf, SpeechError> {
        let seconds = u32::try_from(max_duration.as_secs())
            .unwrap_or(u32::MAX)
            .clamp(1, MAX_RECORDING_SECS);
        let audio = silent_wav(seconds, MOCK_SAMPLE_RATE)?;
        let artifact = self
            .writer
            .write(&audio, &ArtifactTarget::Generated("recording".to_string()))
            .await?;
        info!("Mock recording saved to {}", artifact.path.display());
        Ok(artifact.path)
    }
}
