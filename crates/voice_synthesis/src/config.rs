//! Configuration for speech synthesis

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::text::DEFAULT_MAX_TEXT_LENGTH;
use crate::types::{AudioFormat, TtsModel};

/// Environment variable conventionally holding the provider API key
pub const API_KEY_ENV: &str = "ELEVENLABS_API_KEY";

/// Configuration for the synthesis façade
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Provider API key; without one the mock synthesizer is used
    #[serde(default)]
    pub api_key: Option<String>,

    /// Provider API base URL (for custom endpoints)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model for plain synthesis
    #[serde(default)]
    pub default_model: TtsModel,

    /// Model for multilingual synthesis
    #[serde(default = "default_multilingual_model")]
    pub multilingual_model: TtsModel,

    /// Voice used when no cloned voice is active
    #[serde(default = "default_voice")]
    pub default_voice: String,

    /// Directory receiving generated artifacts
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Audio format requested from the provider
    #[serde(default = "default_output_format")]
    pub output_format: AudioFormat,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum text length in characters
    #[serde(default = "default_max_text_length")]
    pub max_text_length: usize,

    /// Block size for REST streaming, in bytes
    #[serde(default = "default_stream_chunk_size")]
    pub stream_chunk_size: usize,

    /// Whether to try the structured client before the raw REST call
    #[serde(default = "default_use_structured_client")]
    pub use_structured_client: bool,
}

/// Whether synthesis talks to the provider or to the local mock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SynthesisMode {
    /// Provider-backed synthesis
    Live,
    /// Deterministic offline synthesis
    Mock,
}

fn default_base_url() -> String {
    "https://api.elevenlabs.io/v1".to_string()
}

const fn default_multilingual_model() -> TtsModel {
    TtsModel::MultilingualV2
}

fn default_voice() -> String {
    "Rachel".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("assets/outputs")
}

const fn default_output_format() -> AudioFormat {
    AudioFormat::Mp3
}

const fn default_timeout_ms() -> u64 {
    30000 // 30 seconds
}

const fn default_max_text_length() -> usize {
    DEFAULT_MAX_TEXT_LENGTH
}

const fn default_stream_chunk_size() -> usize {
    4096
}

const fn default_use_structured_client() -> bool {
    true
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            default_model: TtsModel::default(),
            multilingual_model: default_multilingual_model(),
            default_voice: default_voice(),
            output_dir: default_output_dir(),
            output_format: default_output_format(),
            timeout_ms: default_timeout_ms(),
            max_text_length: default_max_text_length(),
            stream_chunk_size: default_stream_chunk_size(),
            use_structured_client: default_use_structured_client(),
        }
    }
}

impl SynthesisConfig {
    /// Create a minimal config for testing
    #[cfg(test)]
    pub fn test() -> Self {
        Self {
            api_key: Some("test-key".to_string()),
            ..Default::default()
        }
    }

    /// Load configuration from an optional `voicebridge.toml` and the environment
    ///
    /// `VOICEBRIDGE_*` variables override file values (e.g.
    /// `VOICEBRIDGE_OUTPUT_DIR`). When no key is configured, `ELEVENLABS_API_KEY`
    /// is used.
    pub fn load() -> Result<Self, config::ConfigError> {
        let mut loaded: Self = config::Config::builder()
            .add_source(config::File::with_name("voicebridge").required(false))
            .add_source(config::Environment::with_prefix("VOICEBRIDGE").try_parsing(true))
            .build()?
            .try_deserialize()?;

        if loaded.api_key().is_none() {
            loaded.api_key = std::env::var(API_KEY_ENV).ok();
        }

        Ok(loaded)
    }

    /// The API key, if one is set and not blank
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.trim().is_empty())
    }

    /// Live when an API key is available, mock otherwise
    #[must_use]
    pub fn mode(&self) -> SynthesisMode {
        if self.api_key().is_some() {
            SynthesisMode::Live
        } else {
            SynthesisMode::Mock
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.trim().is_empty() {
            return Err("Base URL must not be empty".to_string());
        }

        if self.timeout_ms == 0 {
            return Err("Timeout must be greater than 0".to_string());
        }

        if self.max_text_length == 0 {
            return Err("Max text length must be greater than 0".to_string());
        }

        if self.stream_chunk_size == 0 {
            return Err("Stream chunk size must be greater than 0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = SynthesisConfig::default();

        assert!(config.api_key.is_none());
        assert_eq!(config.base_url, "https://api.elevenlabs.io/v1");
        assert_eq!(config.default_model, TtsModel::MonolingualV1);
        assert_eq!(config.multilingual_model, TtsModel::MultilingualV2);
        assert_eq!(config.default_voice, "Rachel");
        assert_eq!(config.output_dir, PathBuf::from("assets/outputs"));
        assert_eq!(config.output_format, AudioFormat::Mp3);
        assert_eq!(config.timeout_ms, 30000);
        assert_eq!(config.max_text_length, 5000);
        assert_eq!(config.stream_chunk_size, 4096);
        assert!(config.use_structured_client);
    }

    #[test]
    fn mode_depends_on_api_key() {
        assert_eq!(SynthesisConfig::default().mode(), SynthesisMode::Mock);
        assert_eq!(SynthesisConfig::test().mode(), SynthesisMode::Live);

        let blank = SynthesisConfig {
            api_key: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(blank.mode(), SynthesisMode::Mock);
    }

    #[test]
    fn validate_succeeds_with_defaults() {
        assert!(SynthesisConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_fails_with_zero_timeout() {
        let mut config = SynthesisConfig::test();
        config.timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_fails_with_zero_chunk_size() {
        let mut config = SynthesisConfig::test();
        config.stream_chunk_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_fails_with_zero_max_length() {
        let mut config = SynthesisConfig::test();
        config.max_text_length = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_deserializes_from_toml() {
        let toml = r#"
            api_key = "xi-test"
            base_url = "http://localhost:9000/v1"
            default_model = "eleven_turbo_v2"
            default_voice = "Bella"
            output_dir = "/tmp/voicebridge"
            output_format = "wav"
            timeout_ms = 60000
            max_text_length = 2500
            stream_chunk_size = 1024
            use_structured_client = false
        "#;

        let config: SynthesisConfig = toml::from_str(toml).unwrap();

        assert_eq!(config.api_key.as_deref(), Some("xi-test"));
        assert_eq!(config.base_url, "http://localhost:9000/v1");
        assert_eq!(config.default_model, TtsModel::TurboV2);
        assert_eq!(config.multilingual_model, TtsModel::MultilingualV2);
        assert_eq!(config.default_voice, "Bella");
        assert_eq!(config.output_dir, PathBuf::from("/tmp/voicebridge"));
        assert_eq!(config.output_format, AudioFormat::Wav);
        assert_eq!(config.timeout_ms, 60000);
        assert_eq!(config.max_text_length, 2500);
        assert_eq!(config.stream_chunk_size, 1024);
        assert!(!config.use_structured_client);
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config: SynthesisConfig = toml::from_str("").unwrap();
        assert_eq!(config.stream_chunk_size, 4096);
        assert_eq!(config.mode(), SynthesisMode::Mock);
    }
}
