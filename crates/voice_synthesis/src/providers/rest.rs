//! Raw REST fallback
//!
//! Talks to `POST {base_url}/text-to-speech/{voice_id}` directly with the
//! legacy request body. Only an exact `200 OK` counts as success. The legacy
//! endpoint always answers with MPEG audio.

use bytes::Bytes;
use futures::TryStreamExt;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use tracing::{debug, instrument};

use super::http_client;
use crate::config::SynthesisConfig;
use crate::error::SpeechError;
use crate::ports::ChunkStream;
use crate::streaming::fixed_blocks;
use crate::types::{AudioFormat, SynthesisRequest, VoiceSettings};

/// Format delivered by the legacy endpoint
pub const REST_FORMAT: AudioFormat = AudioFormat::Mp3;

/// Direct HTTP client for the text-to-speech endpoint
#[derive(Debug, Clone)]
pub struct RestClient {
    client: Client,
    base_url: String,
    api_key: String,
    timeout_ms: u64,
    chunk_size: usize,
}

#[derive(Debug, Serialize)]
struct RestBody<'a> {
    text: &'a str,
    model: &'a str,
    voice_settings: VoiceSettings,
}

impl RestClient {
    /// Create a REST client from the synthesis configuration
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

        Ok(Self {
            client: http_client(config)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            timeout_ms: config.timeout_ms,
            chunk_size: config.stream_chunk_size,
        })
    }

    fn endpoint(&self, voice_id: &str) -> String {
        format!("{}/text-to-speech/{voice_id}", self.base_url)
    }

    fn request(&self, request: &SynthesisRequest) -> RequestBuilder {
        let body = RestBody {
            text: &request.text,
            model: request.model.id(),
            voice_settings: request.settings,
        };

        self.client
            .post(self.endpoint(&request.voice_id))
            .header("Accept", REST_FORMAT.mime_type())
            .header("Content-Type", "application/json")
            .header("xi-api-key", &self.api_key)
            .json(&body)
    }

    /// Send the request and return the whole body
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Transport` for any status other than `200`, or a
    /// transport error if the call itself fails.
    #[instrument(skip(self, request), fields(voice = %request.voice_id, text_len = request.text.len()))]
    pub async fn generate_bytes(&self, request: &SynthesisRequest) -> Result<Bytes, SpeechError> {
        let response = self.request(request).send().await.map_err(|e| self.transport(&e))?;
        let response = expect_ok(response).await?;

        let bytes = response.bytes().await.map_err(|e| self.transport(&e))?;
        debug!(size = bytes.len(), "REST synthesis complete");
        Ok(bytes)
    }

    /// Send the request and stream the body in fixed-size blocks
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Transport` for any status other than `200`.
    #[instrument(skip(self, request), fields(voice = %request.voice_id, text_len = request.text.len()))]
    pub async fn open_stream(&self, request: &SynthesisRequest) -> Result<ChunkStream, SpeechError> {
        let response = self.request(request).send().await.map_err(|e| self.transport(&e))?;
        let response = expect_ok(response).await?;
        debug!(block_size = self.chunk_size, "REST stream opened");

        let timeout_ms = self.timeout_ms;
        let body = response
            .bytes_stream()
            .map_err(move |e| SpeechError::from_transport(&e, timeout_ms));
        Ok(fixed_blocks(body, self.chunk_size))
    }

    fn transport(&self, err: &reqwest::Error) -> SpeechError {
        SpeechError::from_transport(err, self.timeout_ms)
    }
}

async fn expect_ok(response: reqwest::Response) -> Result<reqwest::Response, SpeechError> {
    let status = response.status();
    if status == StatusCode::OK {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(SpeechError::Transport {
        status: status.as_u16(),
        body,
    })
}
