//! Text validation and duration estimation

/// Default upper bound on text length, in characters
pub const DEFAULT_MAX_TEXT_LENGTH: usize = 5000;

/// Average speaking rate used for estimates
pub const DEFAULT_WORDS_PER_MINUTE: f64 = 150.0;

/// Outcome of [`validate_text`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextValidation {
    /// Whether the text can be synthesized
    pub valid: bool,
    /// Human-readable explanation
    pub reason: String,
}

impl TextValidation {
    fn ok() -> Self {
        Self {
            valid: true,
            reason: "Text valid".to_string(),
        }
    }

    fn rejected(reason: String) -> Self {
        Self {
            valid: false,
            reason,
        }
    }
}

/// Check whether text is suitable for synthesis
///
/// Empty or whitespace-only text is rejected, as is text longer than
/// `max_length` characters.
#[must_use]
pub fn validate_text(text: &str, max_length: usize) -> TextValidation {
    if text.trim().is_empty() {
        return TextValidation::rejected("Text is empty".to_string());
    }

    let length = text.chars().count();
    if length > max_length {
        return TextValidation::rejected(format!(
            "Text too long ({length} chars). Maximum: {max_length}"
        ));
    }

    TextValidation::ok()
}

/// Estimate how long the spoken text will take, in seconds
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn estimate_audio_duration(text: &str, words_per_minute: f64) -> f64 {
    if words_per_minute <= 0.0 {
        return 0.0;
    }
    let words = text.split_whitespace().count() as f64;
    words / words_per_minute * 60.0
}
