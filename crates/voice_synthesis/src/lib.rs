//! Voice Synthesis - text-to-speech façade with provider fallback
//!
//! Turns text into persisted audio through ElevenLabs, trying several access
//! paths in order and normalizing whatever comes back into one buffer:
//! - structured client call (`convert`, `generate`, `stream`)
//! - raw REST call with the legacy request body
//!
//! Streaming synthesis hands out a pull-based [`AudioStream`] whose terminal
//! outcome is reported out of band via [`StreamStatus`].
//!
//! # Architecture
//!
//! This crate follows the ports & adapters pattern:
//! - `ports` module defines the traits (ports)
//! - `providers` module contains concrete implementations (adapters)
//! - `strategies` wraps each access path as one step of a fallback chain
//! - `pipeline` orchestrates record → transcribe → translate → synthesize
//!
//! Without an API key, [`build_synthesizer`] returns an offline mock that
//! writes silent WAV files.
//!
//! # Example
//!
//! ```ignore
//! use voice_synthesis::{build_synthesizer, SynthesisConfig, SynthesisRequest};
//!
//! let config = SynthesisConfig::load()?;
//! let synthesizer = build_synthesizer(&config)?;
//!
//! let request = SynthesisRequest::new("Hello, world!", "Rachel");
//! let artifact = synthesizer.synthesize(&request, None).await?;
//! println!("Saved {} bytes to {}", artifact.byte_length, artifact.path.display());
//! ```

pub mod artifact;
pub mod audio_info;
pub mod config;
pub mod error;
pub mod normalizer;
pub mod pipeline;
pub mod ports;
pub mod providers;
pub mod strategies;
pub mod streaming;
pub mod synthesizer;
pub mod text;
pub mod types;

pub use artifact::ArtifactWriter;
pub use audio_info::audio_info;
pub use config::{API_KEY_ENV, SynthesisConfig, SynthesisMode};
pub use error::SpeechError;
pub use normalizer::{AudioContent, ProviderResponse, normalize};
pub use pipeline::{ClonedVoice, PipelineState, SourceKind, TranslationPipeline};
pub use ports::{
    AudioRecorder, ChunkStream, SpeechSynthesizer, StreamingStrategy, StructuredClient,
    SynthesisStrategy, Transcriber, Translator, VoiceCloner, VoiceDescriptor,
};
pub use providers::{
    ElevenLabsClient, MockRecorder, MockSynthesizer, MockTranscriber, MockTranslator,
    MockVoiceCloner, RestClient, build_synthesizer,
};
pub use streaming::{AudioStream, StreamStatus};
pub use synthesizer::VoiceSynthesizer;
pub use text::{TextValidation, estimate_audio_duration, validate_text};
pub use types::{
    ArtifactTarget, AudioArtifact, AudioFormat, AudioInfo, SynthesisRequest, TtsModel,
    VoicePreset, VoiceSettings,
};
