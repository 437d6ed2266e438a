//! ElevenLabs structured client
//!
//! Speaks the current text-to-speech API (`model_id`, `output_format` query,
//! `/stream` sub-resource) and hands results back in the provider response
//! shapes the normalizer understands. Formats without an `output_format`
//! value are served as MP3.

use async_trait::async_trait;
use bytes::Bytes;
use futures::{StreamExt, TryStreamExt};
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use super::http_client;
use crate::config::SynthesisConfig;
use crate::error::SpeechError;
use crate::normalizer::{AudioContent, ProviderResponse};
use crate::ports::{ChunkStream, StructuredClient, VoiceDescriptor};
use crate::types::{AudioFormat, TtsModel, VoiceSettings};

/// Structured client for the ElevenLabs API
#[derive(Debug, Clone)]
pub struct ElevenLabsClient {
    client: Client,
    base_url: String,
    api_key: String,
    format: AudioFormat,
    timeout_ms: u64,
}

#[derive(Debug, Serialize)]
struct ConvertBody<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

impl ElevenLabsClient {
    /// Create a client from the synthesis configuration
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` if no API key is set or the HTTP
    /// client cannot be built.
    pub fn new(config: &SynthesisConfig) -> Result<Self, SpeechError> {
        let api_key = config
            .api_key()
            .ok_or_else(|| SpeechError::Configuration("API key is required".to_string()))?
            .to_string();

        let format = delivered_format(config.output_format);
        if format != config.output_format {
            warn!(
                requested = %config.output_format,
                "Provider has no such output format, delivering {format}"
            );
        }

        Ok(Self {
            client: http_client(config)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            format,
            timeout_ms: config.timeout_ms,
        })
    }

    fn request(
        &self,
        voice_id: &str,
        suffix: &str,
        text: &str,
        model: TtsModel,
        settings: VoiceSettings,
    ) -> RequestBuilder {
        let url = format!("{}/text-to-speech/{voice_id}{suffix}", self.base_url);
        let body = ConvertBody {
            text,
            model_id: model.id(),
            voice_settings: settings,
        };

        let builder = self
            .client
            .post(url)
            .header("xi-api-key", &self.api_key)
            .header("Accept", self.format.mime_type())
            .json(&body);

        match output_format(self.format) {
            Some(format) => builder.query(&[("output_format", format)]),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response, SpeechError> {
        let response = builder
            .send()
            .await
            .map_err(|e| SpeechError::from_transport(&e, self.timeout_ms))?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(SpeechError::ProviderCall(format!(
            "ElevenLabs API error {status}: {body}"
        )))
    }
}

/// Provider-side `output_format` value, where the API offers one
const fn output_format(format: AudioFormat) -> Option<&'static str> {
    match format {
        AudioFormat::Mp3 => Some("mp3_44100_128"),
        AudioFormat::Opus => Some("opus_48000_128"),
        AudioFormat::Wav | AudioFormat::Ogg | AudioFormat::Flac => None,
    }
}

/// Format the provider actually returns for a requested one
const fn delivered_format(requested: AudioFormat) -> AudioFormat {
    match output_format(requested) {
        Some(_) => requested,
        None => AudioFormat::Mp3,
    }
}

fn into_chunks(response: reqwest::Response, timeout_ms: u64) -> ChunkStream {
    response
        .bytes_stream()
        .map_err(move |e| SpeechError::from_transport(&e, timeout_ms))
        .boxed()
}

/// Convert response whose body is read through the content accessor
struct ConvertResponse {
    response: reqwest::Response,
    timeout_ms: u64,
}

#[async_trait]
impl AudioContent for ConvertResponse {
    async fn content(self: Box<Self>) -> Result<Bytes, SpeechError> {
        let Self {
            response,
            timeout_ms,
        } = *self;
        response
            .bytes()
            .await
            .map_err(|e| SpeechError::from_transport(&e, timeout_ms))
    }
}

#[async_trait]
impl StructuredClient for ElevenLabsClient {
    fn audio_format(&self) -> AudioFormat {
        self.format
    }

    #[instrument(skip(self, text), fields(text_len = text.len()))]
    async fn convert(
        &self,
        voice_id: &str,
        text: &str,
        model: TtsModel,
        settings: VoiceSettings,
    ) -> Result<ProviderResponse, SpeechError> {
        let response = self
            .send(self.request(voice_id, "", text, model, settings))
            .await?;
        debug!("Convert call accepted");
        Ok(ProviderResponse::Content(Box::new(ConvertResponse {
            response,
            timeout_ms: self.timeout_ms,
        })))
    }

    #[instrument(skip(self, text), fields(text_len = text.len()))]
    async fn stream(
        &self,
        voice_id: &str,
        text: &str,
        model: TtsModel,
        settings: VoiceSettings,
    ) -> Result<ChunkStream, SpeechError> {
        let response = self
            .send(self.request(voice_id, "/stream", text, model, settings))
            .await?;
        debug!("Stream call accepted");
        Ok(into_chunks(response, self.timeout_ms))
    }

    #[instrument(skip(self, text, voice), fields(text_len = text.len(), voice = %voice.voice_id))]
    async fn generate(
        &self,
        text: &str,
        voice: &VoiceDescriptor,
        model: TtsModel,
    ) -> Result<ProviderResponse, SpeechError> {
        let response = self
            .send(self.request(&voice.voice_id, "/stream", text, model, voice.settings))
            .await?;
        debug!("Generate call accepted");
        Ok(ProviderResponse::Chunks(into_chunks(response, self.timeout_ms)))
    }
}
