//! Byte normalization for provider responses
//!
//! Provider clients hand back audio in several shapes depending on the call
//! and client version. [`normalize`] folds all of them into one buffer so the
//! façade never has to care which shape it got.

use std::fmt;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use tracing::{debug, warn};

use crate::error::SpeechError;
use crate::ports::ChunkStream;

/// A response value exposing its whole body through a content accessor
#[async_trait]
pub trait AudioContent: Send {
    /// Consume the response and return its body
    async fn content(self: Box<Self>) -> Result<Bytes, SpeechError>;
}

/// The shapes a structured provider call may return
pub enum ProviderResponse {
    /// Wrapper exposing a content accessor
    Content(Box<dyn AudioContent>),
    /// Raw byte buffer
    Bytes(Bytes),
    /// Chunks to be concatenated in order
    Chunks(ChunkStream),
    /// Anything else; carries a description for the logs
    Unrecognized(String),
}

impl fmt::Debug for ProviderResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Content(_) => f.write_str("Content(..)"),
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Self::Chunks(_) => f.write_str("Chunks(..)"),
            Self::Unrecognized(kind) => f.debug_tuple("Unrecognized").field(kind).finish(),
        }
    }
}

impl From<Vec<u8>> for ProviderResponse {
    fn from(data: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(data))
    }
}

impl From<Bytes> for ProviderResponse {
    fn from(data: Bytes) -> Self {
        Self::Bytes(data)
    }
}

/// Extract a single audio buffer from a provider response
///
/// Returns `None` when the response carries no audio, when reading the
/// content fails, or when any chunk of a chunked response fails. An empty
/// buffer counts as no audio.
pub async fn normalize(response: ProviderResponse) -> Option<Bytes> {
    let bytes = match response {
        ProviderResponse::Content(content) => match content.content().await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Reading response content failed: {e}");
                return None;
            },
        },
        ProviderResponse::Bytes(bytes) => bytes,
        ProviderResponse::Chunks(chunks) => concat_chunks(chunks).await?,
        ProviderResponse::Unrecognized(kind) => {
            debug!("Response shape not recognized: {kind}");
            return None;
        },
    };

    if bytes.is_empty() { None } else { Some(bytes) }
}

/// Concatenate every chunk in order, giving up on the first error
async fn concat_chunks(mut chunks: ChunkStream) -> Option<Bytes> {
    let mut buffer = BytesMut::new();

    while let Some(chunk) = chunks.next().await {
        match chunk {
            Ok(bytes) => buffer.extend_from_slice(&bytes),
            Err(e) => {
                warn!("Chunk iteration failed after {} bytes: {e}", buffer.len());
                return None;
            },
        }
    }

    Some(buffer.freeze())
}
