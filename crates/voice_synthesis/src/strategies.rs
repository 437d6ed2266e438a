//! Fallback strategies
//!
//! Each strategy wraps one way of obtaining audio. The façade walks an ordered
//! list of them; a structured client that lacks a capability simply answers
//! `NotAvailable`, which ends that attempt like any other failure.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::error::SpeechError;
use crate::normalizer::normalize;
use crate::ports::{
    ChunkStream, StreamingStrategy, StructuredClient, SynthesisStrategy, VoiceDescriptor,
};
use crate::providers::rest::{REST_FORMAT, RestClient};
use crate::types::{AudioFormat, SynthesisRequest};

/// Structured single-shot conversion
pub struct StructuredConvert {
    client: Arc<dyn StructuredClient>,
}

impl StructuredConvert {
    /// Wrap a structured client
    pub fn new(client: Arc<dyn StructuredClient>) -> Self {
        Self { client }
    }
}

impl std::fmt::Debug for StructuredConvert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StructuredConvert")
    }
}

#[async_trait]
impl SynthesisStrategy for StructuredConvert {
    fn name(&self) -> &'static str {
        "structured convert"
    }

    fn audio_format(&self) -> AudioFormat {
        self.client.audio_format()
    }

    async fn attempt(&self, request: &SynthesisRequest) -> Result<Option<Bytes>, SpeechError> {
        let response = self
            .client
            .convert(
                &request.voice_id,
                &request.text,
                request.model,
                request.settings,
            )
            .await?;
        debug!(shape = ?response, "Structured convert returned");
        Ok(normalize(response).await)
    }
}

/// Structured generation from a voice descriptor
pub struct StructuredGenerate {
    client: Arc<dyn StructuredClient>,
}

impl StructuredGenerate {
    /// Wrap a structured client
    pub fn new(client: Arc<dyn StructuredClient>) -> Self {
        Self { client }
    }
}

impl std::fmt::Debug for StructuredGenerate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StructuredGenerate")
    }
}

#[async_trait]
impl SynthesisStrategy for StructuredGenerate {
    fn name(&self) -> &'static str {
        "structured generate"
    }

    fn audio_format(&self) -> AudioFormat {
        self.client.audio_format()
    }

    async fn attempt(&self, request: &SynthesisRequest) -> Result<Option<Bytes>, SpeechError> {
        let voice = VoiceDescriptor {
            voice_id: request.voice_id.clone(),
            settings: request.settings,
        };
        let response = self
            .client
            .generate(&request.text, &voice, request.model)
            .await?;
        debug!(shape = ?response, "Structured generate returned");
        Ok(normalize(response).await)
    }
}

/// Raw REST call with the legacy body
#[derive(Debug)]
pub struct RestFallback {
    client: RestClient,
}

impl RestFallback {
    /// Wrap a REST client
    pub const fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SynthesisStrategy for RestFallback {
    fn name(&self) -> &'static str {
        "rest"
    }

    fn audio_format(&self) -> AudioFormat {
        REST_FORMAT
    }

    async fn attempt(&self, request: &SynthesisRequest) -> Result<Option<Bytes>, SpeechError> {
        let bytes = self.client.generate_bytes(request).await?;
        Ok((!bytes.is_empty()).then_some(bytes))
    }
}

/// Structured streaming call
pub struct StructuredStream {
    client: Arc<dyn StructuredClient>,
}

impl StructuredStream {
    /// Wrap a structured client
    pub fn new(client: Arc<dyn StructuredClient>) -> Self {
        Self { client }
    }
}

impl std::fmt::Debug for StructuredStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StructuredStream")
    }
}

#[async_trait]
impl StreamingStrategy for StructuredStream {
    fn name(&self) -> &'static str {
        "structured stream"
    }

    async fn open(&self, request: &SynthesisRequest) -> Result<ChunkStream, SpeechError> {
        self.client
            .stream(
                &request.voice_id,
                &request.text,
                request.model,
                request.settings,
            )
            .await
    }
}

/// REST streaming in fixed-size blocks
#[derive(Debug)]
pub struct RestStream {
    client: RestClient,
}

impl RestStream {
    /// Wrap a REST client
    pub const fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StreamingStrategy for RestStream {
    fn name(&self) -> &'static str {
        "rest stream"
    }

    async fn open(&self, request: &SynthesisRequest) -> Result<ChunkStream, SpeechError> {
        self.client.open_stream(request).await
    }
}
