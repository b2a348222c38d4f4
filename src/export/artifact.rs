//! Serialized model artifact

use crate::error::{HeartError, Result};
use crate::training::{ClassificationMetrics, HeartDiseasePipeline};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::info;

/// Version of the on-disk artifact layout
pub const FORMAT_VERSION: u32 = 1;

/// A fitted pipeline plus the metadata written alongside it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub created_at: DateTime<Utc>,
    /// Version of the crate that wrote the artifact
    pub package_version: String,
    pub pipeline: HeartDiseasePipeline,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ClassificationMetrics>,
}

impl ModelArtifact {
    pub fn new(pipeline: HeartDiseasePipeline, metrics: Option<ClassificationMetrics>) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            created_at: Utc::now(),
            package_version: env!("CARGO_PKG_VERSION").to_string(),
            pipeline,
            metrics,
        }
    }

    /// Write the artifact as pretty JSON, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file = File::create(path).map_err(|e| {
            HeartError::ArtifactError(format!("cannot create {}: {}", path.display(), e))
        })?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;

        info!(path = %path.display(), "Saved model artifact");
        Ok(())
    }

    /// Read an artifact and check it is usable for inference
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            HeartError::ArtifactError(format!("cannot open {}: {}", path.display(), e))
        })?;

        let artifact: ModelArtifact = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| {
                HeartError::ArtifactError(format!("cannot read {}: {}", path.display(), e))
            })?;

        if artifact.format_version != FORMAT_VERSION {
            return Err(HeartError::ArtifactError(format!(
                "{} has format version {}, expected {}",
                path.display(),
                artifact.format_version,
                FORMAT_VERSION
            )));
        }
        if !artifact.pipeline.is_fitted() {
            return Err(HeartError::ArtifactError(format!(
                "{} holds an unfitted pipeline",
                path.display()
            )));
        }

        Ok(artifact)
    }

    pub fn into_pipeline(self) -> HeartDiseasePipeline {
        self.pipeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::{ColumnPreprocessor, PreprocessingConfig};
    use crate::training::LogisticRegression;

    fn unfitted() -> HeartDiseasePipeline {
        HeartDiseasePipeline::new(
            ColumnPreprocessor::new(PreprocessingConfig::new().with_numeric(["Age"])),
            LogisticRegression::default(),
        )
    }

    #[test]
    fn test_unfitted_pipeline_is_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("model.json");
        ModelArtifact::new(unfitted(), None).save(&path).unwrap();
        assert!(path.exists());

        let err = ModelArtifact::load(&path).unwrap_err();
        assert!(matches!(err, HeartError::ArtifactError(_)));
    }

    #[test]
    fn test_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            ModelArtifact::load(&path),
            Err(HeartError::ArtifactError(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(ModelArtifact::load("no/such/model.json").is_err());
    }
}
