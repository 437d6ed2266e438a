//! Provider-backed synthesis façade
//!
//! Walks an ordered chain of strategies (structured client first, raw REST
//! last), persists the first buffer any of them produces and reports a single
//! failure only when the whole chain is exhausted.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, info, instrument, warn};

use crate::artifact::ArtifactWriter;
use crate::config::SynthesisConfig;
use crate::error::SpeechError;
use crate::ports::{SpeechSynthesizer, StreamingStrategy, StructuredClient, SynthesisStrategy};
use crate::providers::elevenlabs::ElevenLabsClient;
use crate::providers::rest::RestClient;
use crate::strategies::{
    RestFallback, RestStream, StructuredConvert, StructuredGenerate, StructuredStream,
};
use crate::streaming::{AudioStream, open_with_fallback};
use crate::types::{ArtifactTarget, AudioArtifact, AudioFormat, SynthesisRequest, TtsModel};

/// Speech synthesis through the provider with REST fallback
pub struct VoiceSynthesizer {
    config: SynthesisConfig,
    writer: ArtifactWriter,
    standard: Vec<Box<dyn SynthesisStrategy>>,
    multilingual: Vec<Box<dyn SynthesisStrategy>>,
    streaming: Vec<Box<dyn StreamingStrategy>>,
}

impl std::fmt::Debug for VoiceSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names = |chain: &[Box<dyn SynthesisStrategy>]| {
            chain.iter().map(|s| s.name()).collect::<Vec<_>>()
        };
        f.debug_struct("VoiceSynthesizer")
            .field("output_dir", &self.writer.output_dir())
            .field("standard", &names(&self.standard))
            .field("multilingual", &names(&self.multilingual))
            .field(
                "streaming",
                &self.streaming.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

impl VoiceSynthesizer {
    /// Create the façade with the ElevenLabs structured client
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` if the configuration is invalid
    /// or carries no API key.
    pub fn new(config: SynthesisConfig) -> Result<Self, SpeechError> {
        let structured: Option<Arc<dyn StructuredClient>> = if config.use_structured_client {
            Some(Arc::new(ElevenLabsClient::new(&config)?))
        } else {
            None
        };
        Self::with_client(config, structured)
    }

    /// Create the façade around an arbitrary structured client
    ///
    /// Without a client, every chain consists of the REST path alone.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` if the configuration is invalid
    /// or carries no API key.
    pub fn with_client(
        config: SynthesisConfig,
        structured: Option<Arc<dyn StructuredClient>>,
    ) -> Result<Self, SpeechError> {
        config.validate().map_err(SpeechError::Configuration)?;
        let rest = RestClient::new(&config)?;

        let mut standard: Vec<Box<dyn SynthesisStrategy>> = Vec::new();
        let mut multilingual: Vec<Box<dyn SynthesisStrategy>> = Vec::new();
        let mut streaming: Vec<Box<dyn StreamingStrategy>> = Vec::new();

        if let Some(client) = structured {
            standard.push(Box::new(StructuredConvert::new(client.clone())));
            multilingual.push(Box::new(StructuredGenerate::new(client.clone())));
            streaming.push(Box::new(StructuredStream::new(client)));
        }

        standard.push(Box::new(RestFallback::new(rest.clone())));
        multilingual.push(Box::new(RestFallback::new(rest.clone())));
        streaming.push(Box::new(RestStream::new(rest)));

        let writer = ArtifactWriter::new(config.output_dir.clone(), config.output_format);

        Ok(Self {
            config,
            writer,
            standard,
            multilingual,
            streaming,
        })
    }

    /// Identifiers of every model the provider offers
    #[must_use]
    pub fn available_models() -> Vec<&'static str> {
        TtsModel::ALL.iter().map(TtsModel::id).collect()
    }

    /// Configuration in use
    #[must_use]
    pub const fn config(&self) -> &SynthesisConfig {
        &self.config
    }
}

/// Run a strategy chain until one yields audio
///
/// Errors from all but the last strategy are logged and dropped. The audio
/// comes back with the format of the strategy that produced it.
async fn run_chain(
    chain: &[Box<dyn SynthesisStrategy>],
    request: &SynthesisRequest,
) -> Result<(Bytes, AudioFormat), SpeechError> {
    let last = chain.len().saturating_sub(1);

    for (index, strategy) in chain.iter().enumerate() {
        match strategy.attempt(request).await {
            Ok(Some(bytes)) => {
                info!(size = bytes.len(), "Audio received via {}", strategy.name());
                return Ok((bytes, strategy.audio_format()));
            },
            Ok(None) => debug!("{} produced no audio", strategy.name()),
            Err(e) if index == last => return Err(e),
            Err(SpeechError::NotAvailable(capability)) => {
                debug!("{} unavailable ({capability}), falling back", strategy.name());
            },
            Err(e) => warn!("{} failed, falling back: {e}", strategy.name()),
        }
    }

    Err(SpeechError::NoAudio)
}

#[async_trait]
impl SpeechSynthesizer for VoiceSynthesizer {
    #[instrument(skip(self, request), fields(voice = %request.voice_id, text_len = request.text.len()))]
    async fn synthesize_to(
        &self,
        request: &SynthesisRequest,
        target: ArtifactTarget,
    ) -> Result<AudioArtifact, SpeechError> {
        request.validate(self.config.max_text_length)?;

        let (audio, format) = run_chain(&self.standard, request).await?;
        self.writer.write_as(&audio, &target, format).await
    }

    #[instrument(skip(self, request), fields(voice = %request.voice_id, text_len = request.text.len()))]
    async fn synthesize_multilingual(
        &self,
        request: &SynthesisRequest,
    ) -> Result<AudioArtifact, SpeechError> {
        let request = request.clone().with_model(self.config.multilingual_model);
        request.validate(self.config.max_text_length)?;

        let (audio, format) = run_chain(&self.multilingual, &request).await?;
        let target = ArtifactTarget::Generated("multilingual".to_string());
        self.writer.write_as(&audio, &target, format).await
    }

    #[instrument(skip(self, request), fields(voice = %request.voice_id, text_len = request.text.len()))]
    async fn synthesize_streaming(&self, request: &SynthesisRequest) -> AudioStream {
        if let Err(e) = request.validate(self.config.max_text_length) {
            return AudioStream::failed(e.to_string());
        }

        open_with_fallback(&self.streaming, request).await
    }

    fn default_model(&self) -> TtsModel {
        self.config.default_model
    }
}
