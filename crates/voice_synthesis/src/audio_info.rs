//! Audio file inspection

use std::fs::File;
use std::path::Path;

use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

use crate::error::SpeechError;
use crate::types::AudioInfo;

/// Read basic metadata from an audio file
///
/// Any failure (missing file, unknown container, no audio track) is logged
/// and reported as `None`.
pub fn audio_info(path: impl AsRef<Path>) -> Option<AudioInfo> {
    let path = path.as_ref();
    match probe(path) {
        Ok(info) => {
            debug!(path = %path.display(), duration = info.duration, "Probed audio file");
            Some(info)
        },
        Err(e) => {
            warn!("Could not read audio info for {}: {e}", path.display());
            None
        },
    }
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn probe(path: &Path) -> Result<AudioInfo, SpeechError> {
    let file = File::open(path).map_err(|e| SpeechError::InvalidAudio(e.to_string()))?;
    let file_size_bytes = file
        .metadata()
        .map_err(|e| SpeechError::InvalidAudio(e.to_string()))?
        .len();

    let mss = MediaSourceStream::new(Box::new(file), MediaSourceStreamOptions::default());
    let mut hint = Hint::new();
    let extension = path.extension().and_then(|e| e.to_str());
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| SpeechError::InvalidAudio(e.to_string()))?;

    let track = probed
        .format
        .default_track()
        .ok_or_else(|| SpeechError::InvalidAudio("No audio track found".to_string()))?;
    let params = &track.codec_params;

    let frame_count = params.n_frames.unwrap_or(0);
    let sample_rate = params.sample_rate.unwrap_or(0);
    let duration = match (params.time_base, params.n_frames) {
        (Some(time_base), Some(frames)) => {
            let time = time_base.calc_time(frames);
            time.seconds as f64 + time.frac
        },
        _ if sample_rate > 0 => frame_count as f64 / f64::from(sample_rate),
        _ => 0.0,
    };

    let format = extension.map_or_else(
        || {
            symphonia::default::get_codecs()
                .get_codec(params.codec)
                .map_or_else(|| "unknown".to_string(), |codec| codec.short_name.to_string())
        },
        str::to_ascii_uppercase,
    );

    Ok(AudioInfo {
        duration,
        sample_rate,
        channels: params.channels.map_or(0, |c| c.count() as u16),
        format,
        frame_count,
        file_size_bytes,
    })
}
