//! Speech synthesis errors

use thiserror::Error;

/// Errors that can occur during speech synthesis
#[derive(Debug, Error)]
pub enum SpeechError {
    /// Request rejected before any network call
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Structured provider client raised or returned unusable data
    #[error("Provider call failed: {0}")]
    ProviderCall(String),

    /// REST endpoint answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Transport {
        /// HTTP status code
        status: u16,
        /// Response body as text
        body: String,
    },

    /// Every fallback was exhausted without a single byte of audio
    #[error("No audio received")]
    NoAudio,

    /// Writing the artifact to storage failed
    #[error("Persistence failed: {0}")]
    Persistence(String),

    /// Failed to connect to the speech service
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request to the speech service failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Timeout during processing
    #[error("Speech processing timeout after {0}ms")]
    Timeout(u64),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Capability not offered by the provider client
    #[error("Provider not available: {0}")]
    NotAvailable(String),

    /// Invalid audio file or corrupted data
    #[error("Invalid audio: {0}")]
    InvalidAudio(String),

    /// Streaming transport broke mid-stream
    #[error("Stream error: {0}")]
    Stream(String),

    /// A translation pipeline stage produced nothing usable
    #[error("Pipeline stage '{stage}' failed: {message}")]
    Pipeline {
        /// Stage name
        stage: &'static str,
        /// What went wrong
        message: String,
    },
}

impl SpeechError {
    /// Create a pipeline stage error
    pub fn pipeline(stage: &'static str, message: impl Into<String>) -> Self {
        Self::Pipeline {
            stage,
            message: message.into(),
        }
    }

    /// Map an HTTP client error, reporting timeouts against `timeout_ms`
    pub fn from_transport(err: &reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout_ms)
        } else if err.is_connect() {
            Self::ConnectionFailed(err.to_string())
        } else {
            Self::RequestFailed(err.to_string())
        }
    }
}
