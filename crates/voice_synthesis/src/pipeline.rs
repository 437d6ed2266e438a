//! Voice translation pipeline
//!
//! Orchestrates record → transcribe → translate → synthesize over the
//! collaborator ports and keeps the results of the latest run in a
//! [`PipelineState`]. Each stage's output is stored as soon as the stage
//! completes, so a failed run still shows how far it got.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, instrument};

use crate::error::SpeechError;
use crate::ports::{AudioRecorder, SpeechSynthesizer, Transcriber, Translator, VoiceCloner};
use crate::types::{AudioArtifact, SynthesisRequest, VoiceSettings};

/// A voice produced by cloning
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClonedVoice {
    /// Provider-side identifier
    pub id: String,
    /// Name given when cloning
    pub name: String,
}

/// Where the source text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Recognized from a recording
    Transcribed,
    /// Entered by the user
    Typed,
}

impl SourceKind {
    /// Human-readable label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Transcribed => "Transcribed text",
            Self::Typed => "Entered text",
        }
    }
}

/// Results of the most recent pipeline runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineState {
    /// Active cloned voice, if any
    pub cloned_voice: Option<ClonedVoice>,
    /// Text that was spoken or typed
    pub source_text: Option<String>,
    /// Origin of `source_text`
    pub source_kind: Option<SourceKind>,
    /// Translation of `source_text`
    pub translated_text: Option<String>,
    /// Last synthesized artifact
    pub output_path: Option<PathBuf>,
}

/// Stateful voice translation workflow
pub struct TranslationPipeline {
    recorder: Arc<dyn AudioRecorder>,
    transcriber: Arc<dyn Transcriber>,
    translator: Arc<dyn Translator>,
    cloner: Arc<dyn VoiceCloner>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    default_voice: String,
    state: PipelineState,
}

impl std::fmt::Debug for TranslationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationPipeline")
            .field("default_voice", &self.default_voice)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl TranslationPipeline {
    /// Assemble a pipeline from its collaborators
    pub fn new(
        recorder: Arc<dyn AudioRecorder>,
        transcriber: Arc<dyn Transcriber>,
        translator: Arc<dyn Translator>,
        cloner: Arc<dyn VoiceCloner>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        default_voice: impl Into<String>,
    ) -> Self {
        Self {
            recorder,
            transcriber,
            translator,
            cloner,
            synthesizer,
            default_voice: default_voice.into(),
            state: PipelineState::default(),
        }
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Voice used for synthesis: the cloned one, else the default
    #[must_use]
    pub fn active_voice_id(&self) -> &str {
        self.state
            .cloned_voice
            .as_ref()
            .map_or(self.default_voice.as_str(), |voice| voice.id.as_str())
    }

    /// Record a sample and clone the voice in it
    #[instrument(skip(self))]
    pub async fn clone_voice(
        &mut self,
        name: &str,
        max_duration: Duration,
    ) -> Result<ClonedVoice, SpeechError> {
        let sample = self.recorder.record(max_duration).await?;
        info!("Cloning voice from {}", sample.display());

        let id = self.cloner.clone_voice(&sample, name).await?;
        if id.trim().is_empty() {
            return Err(SpeechError::pipeline("clone", "Voice cloning returned no id"));
        }

        let voice = ClonedVoice {
            id,
            name: name.to_string(),
        };
        info!(voice_id = %voice.id, "Voice cloned");
        self.state.cloned_voice = Some(voice.clone());
        Ok(voice)
    }

    /// Forget the cloned voice
    pub fn reset_voice(&mut self) {
        self.state.cloned_voice = None;
    }

    /// Record speech and resynthesize it translated
    #[instrument(skip(self, settings))]
    pub async fn translate_speech(
        &mut self,
        target_language: &str,
        max_duration: Duration,
        settings: VoiceSettings,
    ) -> Result<AudioArtifact, SpeechError> {
        let recording = self.recorder.record(max_duration).await?;

        info!("1/3: Transcribing speech");
        let transcript = self.transcriber.transcribe(&recording).await?;
        self.state.source_text = Some(transcript.clone());
        self.state.source_kind = Some(SourceKind::Transcribed);
        if transcript.trim().is_empty() {
            return Err(SpeechError::pipeline(
                "transcribe",
                "Speech could not be transcribed",
            ));
        }

        info!("2/3: Translating text");
        let translated = self
            .translator
            .translate(&transcript, target_language)
            .await?;
        self.state.translated_text = Some(translated.clone());
        if translated.trim().is_empty() {
            return Err(SpeechError::pipeline("translate", "Text could not be translated"));
        }

        info!("3/3: Synthesizing speech");
        let artifact = self.speak(&translated, settings).await?;
        info!("Translation complete");
        Ok(artifact)
    }

    /// Synthesize typed text in the active voice
    #[instrument(skip(self, text, settings), fields(text_len = text.len()))]
    pub async fn speak_text(
        &mut self,
        text: &str,
        settings: VoiceSettings,
    ) -> Result<AudioArtifact, SpeechError> {
        self.state.source_text = Some(text.to_string());
        self.state.source_kind = Some(SourceKind::Typed);
        self.state.translated_text = None;

        self.speak(text, settings).await
    }

    async fn speak(
        &mut self,
        text: &str,
        settings: VoiceSettings,
    ) -> Result<AudioArtifact, SpeechError> {
        let request = SynthesisRequest::new(text, self.active_voice_id())
            .with_settings(settings)
            .with_model(self.synthesizer.default_model());

        let artifact = self.synthesizer.synthesize(&request, None).await?;
        self.state.output_path = Some(artifact.path.clone());
        Ok(artifact)
    }
}
