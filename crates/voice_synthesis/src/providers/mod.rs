//! Provider adapters
//!
//! Contains the ElevenLabs structured client, the raw REST fallback and the
//! offline mock adapters, plus the factory choosing between live and mock.

pub mod elevenlabs;
pub mod mock;
pub mod rest;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tracing::{info, warn};

pub use elevenlabs::ElevenLabsClient;
pub use mock::{MockRecorder, MockSynthesizer, MockTranscriber, MockTranslator, MockVoiceCloner};
pub use rest::RestClient;

use crate::config::{SynthesisConfig, SynthesisMode};
use crate::error::SpeechError;
use crate::ports::SpeechSynthesizer;
use crate::synthesizer::VoiceSynthesizer;

/// Shared HTTP client settings for every provider call
///
/// `timeout_ms` bounds each whole exchange, response body included, so a
/// stalled provider fails over instead of hanging the chain.
pub(crate) fn http_client(config: &SynthesisConfig) -> Result<Client, SpeechError> {
    let timeout = Duration::from_millis(config.timeout_ms);
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .build()
        .map_err(|e| SpeechError::Configuration(format!("Failed to create HTTP client: {e}")))
}

/// Build the synthesizer matching the configuration
///
/// Uses the provider when an API key is configured and falls back to the
/// offline mock otherwise.
///
/// # Errors
///
/// Returns `SpeechError::Configuration` if the live synthesizer cannot be built.
pub fn build_synthesizer(
    config: &SynthesisConfig,
) -> Result<Arc<dyn SpeechSynthesizer>, SpeechError> {
    match config.mode() {
        SynthesisMode::Live => {
            info!(base_url = %config.base_url, "Using ElevenLabs synthesis");
            Ok(Arc::new(VoiceSynthesizer::new(config.clone())?))
        },
        SynthesisMode::Mock => {
            warn!("No API key configured, using mock synthesis");
            Ok(Arc::new(MockSynthesizer::new(config)))
        },
    }
}
