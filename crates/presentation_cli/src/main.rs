//! VoiceBridge CLI
//!
//! Command-line interface for speech synthesis and voice translation.

#![allow(clippy::print_stdout)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use voice_synthesis::{
    MockRecorder, MockTranscriber, MockTranslator, MockVoiceCloner, SpeechSynthesizer,
    StreamStatus, SynthesisConfig, SynthesisRequest, TranslationPipeline, TtsModel, VoicePreset,
    VoiceSettings, VoiceSynthesizer, audio_info, build_synthesizer, estimate_audio_duration,
    validate_text,
};

/// VoiceBridge CLI
#[derive(Parser)]
#[command(name = "voicebridge-cli")]
#[command(author, version, about = "VoiceBridge speech synthesis CLI", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Voice selection and tuning shared by synthesis commands
#[derive(Args, Debug, Clone)]
struct VoiceArgs {
    /// Voice identifier (defaults to the configured voice)
    #[arg(long)]
    voice: Option<String>,

    /// Stability, 0.0 to 1.0
    #[arg(long, default_value_t = 0.5)]
    stability: f32,

    /// Similarity boost, 0.0 to 1.0
    #[arg(long, default_value_t = 0.75)]
    similarity: f32,
}

impl VoiceArgs {
    fn voice_id(&self, config: &SynthesisConfig) -> String {
        self.voice
            .clone()
            .unwrap_or_else(|| config.default_voice.clone())
    }

    const fn settings(&self) -> VoiceSettings {
        VoiceSettings::new(self.stability, self.similarity)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize text to an audio file
    Synthesize {
        /// Text to speak
        text: String,

        #[command(flatten)]
        voice: VoiceArgs,

        /// Model identifier (e.g. eleven_turbo_v2)
        #[arg(short, long)]
        model: Option<String>,

        /// Output file (generated under the output directory if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Synthesize text with the multilingual model
    Multilingual {
        /// Text to speak
        text: String,

        #[command(flatten)]
        voice: VoiceArgs,
    },

    /// Stream synthesized audio into a file
    Stream {
        /// Text to speak
        text: String,

        #[command(flatten)]
        voice: VoiceArgs,

        /// File receiving the streamed chunks
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Synthesize several texts one after another
    ///
    /// Example: voicebridge-cli batch "First line" "Second line"
    /// Example: voicebridge-cli batch --file lines.txt
    Batch {
        /// Texts to speak
        #[arg(required_unless_present = "file")]
        texts: Vec<String>,

        /// Read texts from a file, one per line
        #[arg(short, long)]
        file: Option<PathBuf>,

        #[command(flatten)]
        voice: VoiceArgs,
    },

    /// Synthesize with a named settings preset
    Preset {
        /// Text to speak
        text: String,

        /// Preset name (stable, balanced, expressive)
        #[arg(short, long, default_value = "balanced")]
        preset: String,

        /// Voice identifier (defaults to the configured voice)
        #[arg(long)]
        voice: Option<String>,
    },

    /// Check whether a text can be synthesized
    Validate {
        /// Text to check
        text: String,

        /// Maximum length in characters
        #[arg(long, default_value_t = 5000)]
        max_length: usize,
    },

    /// Estimate how long a text takes to speak
    Estimate {
        /// Text to estimate
        text: String,

        /// Speaking rate in words per minute
        #[arg(long, default_value_t = 150.0)]
        wpm: f64,
    },

    /// Show metadata of an audio file
    Info {
        /// Audio file to inspect
        path: PathBuf,
    },

    /// List available synthesis models
    Models,

    /// List voice settings presets
    Presets,

    /// Record, transcribe, translate and resynthesize speech
    ///
    /// Recording, transcription, translation and cloning use offline mocks.
    Translate {
        /// Target language (ISO 639-1 code)
        #[arg(short, long, default_value = "en")]
        language: String,

        /// Maximum recording length in seconds
        #[arg(short, long, default_value_t = 20)]
        duration: u64,

        /// Clone a voice with this name before translating
        #[arg(long)]
        clone: Option<String>,

        /// Stability, 0.0 to 1.0
        #[arg(long, default_value_t = 0.5)]
        stability: f32,

        /// Similarity boost, 0.0 to 1.0
        #[arg(long, default_value_t = 0.75)]
        similarity: f32,
    },
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Non-empty lines of a batch file
fn batch_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn parse_model(model: Option<&str>, config: &SynthesisConfig) -> anyhow::Result<TtsModel> {
    match model {
        Some(id) => TtsModel::from_id(id).with_context(|| {
            format!(
                "Unknown model '{id}'. Available: {}",
                VoiceSynthesizer::available_models().join(", ")
            )
        }),
        None => Ok(config.default_model),
    }
}

#[tokio::main]
#[allow(clippy::too_many_lines)]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = log_filter_from_verbosity(cli.verbose);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = SynthesisConfig::load().context("Failed to load configuration")?;
    config.validate().map_err(anyhow::Error::msg)?;
    tracing::debug!(
        mode = ?config.mode(),
        output_dir = %config.output_dir.display(),
        "Configuration loaded"
    );

    match cli.command {
        Commands::Synthesize {
            text,
            voice,
            model,
            output,
        } => {
            let synthesizer = build_synthesizer(&config)?;
            let request = SynthesisRequest::new(text, voice.voice_id(&config))
                .with_settings(voice.settings())
                .with_model(parse_model(model.as_deref(), &config)?);

            match synthesizer.synthesize(&request, output).await {
                Ok(artifact) => {
                    println!(
                        "✅ Saved {} bytes to {}",
                        artifact.byte_length,
                        artifact.path.display()
                    );
                },
                Err(e) => {
                    println!("❌ Synthesis failed: {e}");
                    std::process::exit(1);
                },
            }
        },

        Commands::Multilingual { text, voice } => {
            let synthesizer = build_synthesizer(&config)?;
            let request =
                SynthesisRequest::new(text, voice.voice_id(&config)).with_settings(voice.settings());

            match synthesizer.synthesize_multilingual(&request).await {
                Ok(artifact) => println!("🌍 Saved {}", artifact.path.display()),
                Err(e) => {
                    println!("❌ Multilingual synthesis failed: {e}");
                    std::process::exit(1);
                },
            }
        },

        Commands::Stream {
            text,
            voice,
            output,
        } => {
            let synthesizer = build_synthesizer(&config)?;
            let request = SynthesisRequest::new(text, voice.voice_id(&config))
                .with_settings(voice.settings())
                .with_model(synthesizer.default_model());

            let mut stream = synthesizer.synthesize_streaming(&request).await;
            if let StreamStatus::Failed(reason) = stream.status() {
                println!("❌ Streaming failed: {reason}");
                std::process::exit(1);
            }

            if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            let mut file = tokio::fs::File::create(&output).await?;
            let mut chunks = 0usize;
            let mut bytes = 0usize;

            while let Some(chunk) = stream.next().await {
                file.write_all(&chunk).await?;
                chunks += 1;
                bytes += chunk.len();
            }
            file.flush().await?;

            match stream.status() {
                StreamStatus::Failed(reason) => {
                    println!("⚠️  Stream ended early after {bytes} bytes: {reason}");
                    std::process::exit(1);
                },
                _ => println!("📡 Streamed {chunks} chunks ({bytes} bytes) to {}", output.display()),
            }
        },

        Commands::Batch { texts, file, voice } => {
            let texts = match file {
                Some(path) => batch_lines(
                    &tokio::fs::read_to_string(&path)
                        .await
                        .with_context(|| format!("Failed to read {}", path.display()))?,
                ),
                None => texts,
            };

            let synthesizer = build_synthesizer(&config)?;
            let artifacts = synthesizer
                .batch_synthesize(&texts, &voice.voice_id(&config), voice.settings())
                .await;

            println!("📦 Synthesized {}/{} texts:", artifacts.len(), texts.len());
            for artifact in &artifacts {
                println!("   {}", artifact.path.display());
            }
        },

        Commands::Preset {
            text,
            preset,
            voice,
        } => {
            let synthesizer = build_synthesizer(&config)?;
            let voice = voice.unwrap_or_else(|| config.default_voice.clone());
            let resolved = VoicePreset::from_name(&preset);

            match synthesizer
                .synthesize_with_preset(&text, &voice, &preset)
                .await
            {
                Ok(artifact) => {
                    println!("🎚️  Preset '{}' → {}", resolved.name(), artifact.path.display());
                },
                Err(e) => {
                    println!("❌ Synthesis failed: {e}");
                    std::process::exit(1);
                },
            }
        },

        Commands::Validate { text, max_length } => {
            let result = validate_text(&text, max_length);
            if result.valid {
                println!("✅ {}", result.reason);
            } else {
                println!("❌ {}", result.reason);
                std::process::exit(1);
            }
        },

        Commands::Estimate { text, wpm } => {
            let seconds = estimate_audio_duration(&text, wpm);
            println!("⏱️  Estimated duration: {seconds:.1}s");
        },

        Commands::Info { path } => match audio_info(&path) {
            Some(info) => {
                println!("🎵 Audio Info:");
                println!("{}", serde_json::to_string_pretty(&info)?);
            },
            None => {
                println!("❌ Could not read audio info: {}", path.display());
                std::process::exit(1);
            },
        },

        Commands::Models => {
            println!("📦 Available Models:");
            for model in VoiceSynthesizer::available_models() {
                let marker = if model == config.default_model.id() { " (default)" } else { "" };
                println!("   {model}{marker}");
            }
        },

        Commands::Presets => {
            println!("🎚️  Voice Presets:");
            for preset in VoicePreset::ALL {
                let settings = preset.settings();
                println!(
                    "   {:<10} stability={:.2} similarity_boost={:.2}",
                    preset.name(),
                    settings.stability,
                    settings.similarity_boost
                );
            }
        },

        Commands::Translate {
            language,
            duration,
            clone,
            stability,
            similarity,
        } => {
            let synthesizer = build_synthesizer(&config)?;
            let mut pipeline = TranslationPipeline::new(
                Arc::new(MockRecorder::new(config.output_dir.join("recordings"))),
                Arc::new(MockTranscriber),
                Arc::new(MockTranslator),
                Arc::new(MockVoiceCloner),
                synthesizer,
                config.default_voice.clone(),
            );
            let max_duration = Duration::from_secs(duration);

            if let Some(name) = clone {
                let voice = pipeline.clone_voice(&name, max_duration).await?;
                println!("🧬 Cloned voice '{}' ({})", voice.name, voice.id);
            }

            let result = pipeline
                .translate_speech(
                    &language,
                    max_duration,
                    VoiceSettings::new(stability, similarity),
                )
                .await;

            println!("{}", serde_json::to_string_pretty(pipeline.state())?);
            if let Err(e) = result {
                println!("❌ Translation failed: {e}");
                std::process::exit(1);
            }
        },
    }

    Ok(())
}
