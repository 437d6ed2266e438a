//! Types for speech synthesis
//!
//! Contains data structures for synthesis requests, models, voice settings,
//! presets, persisted artifacts and audio metadata.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::SpeechError;
use crate::text::validate_text;

/// Supported audio formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// MP3 format (provider default)
    Mp3,
    /// WAV format (uncompressed)
    Wav,
    /// OGG container
    Ogg,
    /// Opus codec
    Opus,
    /// FLAC format (lossless)
    Flac,
}

impl AudioFormat {
    /// Get the MIME type for this audio format
    #[must_use]
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::Wav => "audio/wav",
            Self::Ogg => "audio/ogg",
            Self::Opus => "audio/opus",
            Self::Flac => "audio/flac",
        }
    }

    /// Get the file extension for this audio format
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
            Self::Ogg => "ogg",
            Self::Opus => "opus",
            Self::Flac => "flac",
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Synthesis models offered by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TtsModel {
    /// English only, highest quality
    #[default]
    #[serde(rename = "eleven_monolingual_v1")]
    MonolingualV1,
    /// First multilingual generation
    #[serde(rename = "eleven_multilingual_v1")]
    MultilingualV1,
    /// Latest multilingual model
    #[serde(rename = "eleven_multilingual_v2")]
    MultilingualV2,
    /// Fastest, lower quality
    #[serde(rename = "eleven_turbo_v2")]
    TurboV2,
}

impl TtsModel {
    /// Every model, in the order they are offered to users
    pub const ALL: [Self; 4] = [
        Self::MonolingualV1,
        Self::MultilingualV1,
        Self::MultilingualV2,
        Self::TurboV2,
    ];

    /// Provider-side model identifier
    #[must_use]
    pub const fn id(&self) -> &'static str {
        match self {
            Self::MonolingualV1 => "eleven_monolingual_v1",
            Self::MultilingualV1 => "eleven_multilingual_v1",
            Self::MultilingualV2 => "eleven_multilingual_v2",
            Self::TurboV2 => "eleven_turbo_v2",
        }
    }

    /// Parse a provider-side model identifier
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|model| model.id() == id)
    }
}

impl fmt::Display for TtsModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Provider tuning parameters, both in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    /// Consistency vs. expressiveness
    pub stability: f32,
    /// How closely to match the original voice
    #[serde(rename = "similarity_boost")]
    pub similarity_boost: f32,
}

impl VoiceSettings {
    /// Create new voice settings
    #[must_use]
    pub const fn new(stability: f32, similarity_boost: f32) -> Self {
        Self {
            stability,
            similarity_boost,
        }
    }

    /// Check that both parameters lie in `[0, 1]`
    pub fn validate(&self) -> Result<(), SpeechError> {
        for (name, value) in [
            ("stability", self.stability),
            ("similarity_boost", self.similarity_boost),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SpeechError::Validation(format!(
                    "{name} must be between 0.0 and 1.0, got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self::new(0.5, 0.75)
    }
}

/// Named voice settings presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VoicePreset {
    /// Calm, consistent delivery
    Stable,
    /// Middle ground
    #[default]
    Balanced,
    /// Livelier, more varied delivery
    Expressive,
}

impl VoicePreset {
    /// Every preset
    pub const ALL: [Self; 3] = [Self::Stable, Self::Balanced, Self::Expressive];

    /// Resolve a preset by name, falling back to `Balanced` for unknown names
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "stable" => Self::Stable,
            "expressive" => Self::Expressive,
            _ => Self::Balanced,
        }
    }

    /// Preset name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Stable => "stable",
            Self::Balanced => "balanced",
            Self::Expressive => "expressive",
        }
    }

    /// Settings behind this preset
    #[must_use]
    pub const fn settings(&self) -> VoiceSettings {
        match self {
            Self::Stable => VoiceSettings::new(0.75, 0.75),
            Self::Balanced => VoiceSettings::new(0.50, 0.75),
            Self::Expressive => VoiceSettings::new(0.30, 0.80),
        }
    }
}

/// A single synthesis request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisRequest {
    /// Text to speak
    pub text: String,
    /// Provider-side voice identifier
    pub voice_id: String,
    /// Tuning parameters
    pub settings: VoiceSettings,
    /// Model to synthesize with
    pub model: TtsModel,
}

impl SynthesisRequest {
    /// Create a request with default settings and model
    #[must_use]
    pub fn new(text: impl Into<String>, voice_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice_id: voice_id.into(),
            settings: VoiceSettings::default(),
            model: TtsModel::default(),
        }
    }

    /// Set the voice settings
    #[must_use]
    pub const fn with_settings(mut self, settings: VoiceSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Set the model
    #[must_use]
    pub const fn with_model(mut self, model: TtsModel) -> Self {
        self.model = model;
        self
    }

    /// Reject the request before any network call if it cannot succeed
    pub fn validate(&self, max_text_length: usize) -> Result<(), SpeechError> {
        let check = validate_text(&self.text, max_text_length);
        if !check.valid {
            return Err(SpeechError::Validation(check.reason));
        }
        if self.voice_id.trim().is_empty() {
            return Err(SpeechError::Validation("Voice ID is empty".to_string()));
        }
        self.settings.validate()
    }
}

/// A persisted audio file produced by a synthesis call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioArtifact {
    /// Location on durable storage
    pub path: PathBuf,
    /// Number of bytes written
    pub byte_length: usize,
}

/// Where a synthesis result should be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactTarget {
    /// Generate a unique name with this prefix under the output directory
    Generated(String),
    /// Write to exactly this path
    Explicit(PathBuf),
}

impl ArtifactTarget {
    /// Target for plain synthesis
    #[must_use]
    pub fn output(path: Option<PathBuf>) -> Self {
        path.map_or_else(|| Self::Generated("output".to_string()), Self::Explicit)
    }
}

/// Metadata read back from an audio file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioInfo {
    /// Duration in seconds
    pub duration: f64,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Channel count
    pub channels: u16,
    /// Codec short name
    pub format: String,
    /// Frames per channel
    pub frame_count: u64,
    /// File size on disk
    pub file_size_bytes: u64,
}
