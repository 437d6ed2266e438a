//! Artifact persistence
//!
//! Every synthesis result lands in its own file. Generated names combine a
//! category prefix, a timestamp and a random suffix, so concurrent writers
//! sharing the output directory never collide and no locking is needed.

use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::error::SpeechError;
use crate::types::{ArtifactTarget, AudioArtifact, AudioFormat};

/// Writes audio buffers under a managed output directory
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    output_dir: PathBuf,
    format: AudioFormat,
}

impl ArtifactWriter {
    /// Create a writer for the given directory and file format
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>, format: AudioFormat) -> Self {
        Self {
            output_dir: output_dir.into(),
            format,
        }
    }

    /// Directory receiving generated artifacts
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Build a fresh, effectively unique path for the given prefix
    #[must_use]
    pub fn artifact_path(&self, prefix: &str) -> PathBuf {
        self.artifact_path_as(prefix, self.format)
    }

    fn artifact_path_as(&self, prefix: &str, format: AudioFormat) -> PathBuf {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let suffix = Uuid::new_v4().simple().to_string();
        let filename = format!(
            "{prefix}_{timestamp}_{}.{}",
            &suffix[..8],
            format.extension()
        );
        self.output_dir.join(filename)
    }

    /// Resolve a target to a concrete path
    #[must_use]
    pub fn resolve(&self, target: &ArtifactTarget) -> PathBuf {
        self.resolve_as(target, self.format)
    }

    fn resolve_as(&self, target: &ArtifactTarget, format: AudioFormat) -> PathBuf {
        match target {
            ArtifactTarget::Generated(prefix) => self.artifact_path_as(prefix, format),
            ArtifactTarget::Explicit(path) => path.clone(),
        }
    }

    /// Persist `data` to the target, creating the parent directory first
    ///
    /// The file is written exactly once. An explicit path that already exists
    /// is overwritten; generated paths are always fresh.
    pub async fn write(
        &self,
        data: &[u8],
        target: &ArtifactTarget,
    ) -> Result<AudioArtifact, SpeechError> {
        self.write_as(data, target, self.format).await
    }

    /// Persist `data` encoded as `format`
    ///
    /// Generated names take their extension from `format`; explicit paths are
    /// used as given.
    #[instrument(skip(self, data), fields(size = data.len()))]
    pub async fn write_as(
        &self,
        data: &[u8],
        target: &ArtifactTarget,
        format: AudioFormat,
    ) -> Result<AudioArtifact, SpeechError> {
        let path = self.resolve_as(target, format);

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                SpeechError::Persistence(format!(
                    "Failed to create directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        debug!(path = %path.display(), "Writing artifact");
        tokio::fs::write(&path, data).await.map_err(|e| {
            SpeechError::Persistence(format!("Failed to write {}: {e}", path.display()))
        })?;

        info!("Saved audio to {}", path.display());

        Ok(AudioArtifact {
            path,
            byte_length: data.len(),
        })
    }
}
