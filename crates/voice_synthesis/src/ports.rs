//! Port definitions for speech synthesis
//!
//! Defines the traits (ports) that adapters implement: the provider's
//! structured client, the fallback strategies, the synthesis façade itself
//! and the upstream collaborators of the translation pipeline.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use tracing::{info, warn};

use crate::error::SpeechError;
use crate::normalizer::ProviderResponse;
use crate::streaming::AudioStream;
use crate::types::{
    ArtifactTarget, AudioArtifact, AudioFormat, SynthesisRequest, TtsModel, VoicePreset,
    VoiceSettings,
};

/// Lazily produced audio chunks
pub type ChunkStream = BoxStream<'static, Result<Bytes, SpeechError>>;

/// Port for the provider's structured (SDK-like) client
///
/// Every capability is optional. The default implementations report
/// `SpeechError::NotAvailable`, which callers treat exactly like a failed call.
#[async_trait]
pub trait StructuredClient: Send + Sync {
    /// Format of the audio this client returns
    fn audio_format(&self) -> AudioFormat {
        AudioFormat::Mp3
    }

    /// Convert text to audio in a single response
    async fn convert(
        &self,
        voice_id: &str,
        text: &str,
        model: TtsModel,
        settings: VoiceSettings,
    ) -> Result<ProviderResponse, SpeechError> {
        let _ = (voice_id, text, model, settings);
        Err(SpeechError::NotAvailable("convert".to_string()))
    }

    /// Convert text to audio delivered chunk by chunk
    async fn stream(
        &self,
        voice_id: &str,
        text: &str,
        model: TtsModel,
        settings: VoiceSettings,
    ) -> Result<ChunkStream, SpeechError> {
        let _ = (voice_id, text, model, settings);
        Err(SpeechError::NotAvailable("stream".to_string()))
    }

    /// Generate audio from a voice descriptor
    async fn generate(
        &self,
        text: &str,
        voice: &VoiceDescriptor,
        model: TtsModel,
    ) -> Result<ProviderResponse, SpeechError> {
        let _ = (text, voice, model);
        Err(SpeechError::NotAvailable("generate".to_string()))
    }
}

/// Voice plus the settings it should be rendered with
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceDescriptor {
    /// Provider-side voice identifier
    pub voice_id: String,
    /// Tuning parameters
    pub settings: VoiceSettings,
}

/// One step of the buffered fallback chain
#[async_trait]
pub trait SynthesisStrategy: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Format of the audio this strategy yields
    fn audio_format(&self) -> AudioFormat;

    /// Try to obtain audio for the request
    ///
    /// `Ok(None)` means the attempt completed but produced no audio.
    async fn attempt(&self, request: &SynthesisRequest) -> Result<Option<Bytes>, SpeechError>;
}

/// One step of the streaming fallback chain
#[async_trait]
pub trait StreamingStrategy: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Open a chunk stream for the request
    async fn open(&self, request: &SynthesisRequest) -> Result<ChunkStream, SpeechError>;
}

/// Port for anything that turns text into persisted speech
///
/// Implemented by the provider-backed façade and by the offline mock, which
/// makes the two interchangeable.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize and persist to the given target
    async fn synthesize_to(
        &self,
        request: &SynthesisRequest,
        target: ArtifactTarget,
    ) -> Result<AudioArtifact, SpeechError>;

    /// Synthesize with the multilingual model
    async fn synthesize_multilingual(
        &self,
        request: &SynthesisRequest,
    ) -> Result<AudioArtifact, SpeechError>;

    /// Synthesize as a pull-based chunk stream
    ///
    /// Failures are reported through [`AudioStream::status`], never by
    /// aborting chunks already delivered.
    async fn synthesize_streaming(&self, request: &SynthesisRequest) -> AudioStream;

    /// Model used when the caller does not pick one
    fn default_model(&self) -> TtsModel;

    /// Synthesize, writing to `output_path` or to a generated file
    async fn synthesize(
        &self,
        request: &SynthesisRequest,
        output_path: Option<PathBuf>,
    ) -> Result<AudioArtifact, SpeechError> {
        self.synthesize_to(request, ArtifactTarget::output(output_path))
            .await
    }

    /// Synthesize several texts one after another
    ///
    /// Texts that fail are left out; the order of the rest is preserved.
    async fn batch_synthesize(
        &self,
        texts: &[String],
        voice_id: &str,
        settings: VoiceSettings,
    ) -> Vec<AudioArtifact> {
        let mut artifacts = Vec::with_capacity(texts.len());

        for (index, text) in texts.iter().enumerate() {
            let position = index + 1;
            info!("Synthesizing {}/{}", position, texts.len());

            let request = SynthesisRequest::new(text.as_str(), voice_id)
                .with_settings(settings)
                .with_model(self.default_model());
            let target = ArtifactTarget::Generated(format!("batch_{position}"));

            match self.synthesize_to(&request, target).await {
                Ok(artifact) => artifacts.push(artifact),
                Err(e) => warn!("Batch item {} skipped: {e}", position),
            }
        }

        artifacts
    }

    /// Synthesize with a named settings preset
    async fn synthesize_with_preset(
        &self,
        text: &str,
        voice_id: &str,
        preset_name: &str,
    ) -> Result<AudioArtifact, SpeechError> {
        let preset = VoicePreset::from_name(preset_name);
        let request = SynthesisRequest::new(text, voice_id)
            .with_settings(preset.settings())
            .with_model(self.default_model());
        self.synthesize(&request, None).await
    }
}

/// Port for capturing a recording session
#[async_trait]
pub trait AudioRecorder: Send + Sync {
    /// Record for at most `max_duration` and return the audio file
    async fn record(&self, max_duration: Duration) -> Result<PathBuf, SpeechError>;
}

/// Port for speech-to-text
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio file
    async fn transcribe(&self, audio_path: &Path) -> Result<String, SpeechError>;
}

/// Port for text translation
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate text into the target language (ISO 639-1 code)
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, SpeechError>;
}

/// Port for voice cloning
#[async_trait]
pub trait VoiceCloner: Send + Sync {
    /// Clone the voice heard in `audio_path` and return its identifier
    async fn clone_voice(&self, audio_path: &Path, name: &str) -> Result<String, SpeechError>;
}
