//! Model loading and batch scoring

use super::Predictor;
use crate::error::{HeartError, Result};
use crate::export::ModelArtifact;
use polars::prelude::*;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Predicted label column appended by [`score_frame`]
pub const LABEL_COLUMN: &str = "HeartDisease";
/// Probability of the positive class
pub const POSITIVE_COLUMN: &str = "Probability-positive";
/// Probability of the negative class
pub const NEGATIVE_COLUMN: &str = "Probability-negative";

/// Load a model artifact into a shareable predictor
pub fn load_predictor(path: impl AsRef<Path>) -> Result<Arc<dyn Predictor>> {
    let path = path.as_ref();
    let start = Instant::now();
    let artifact = ModelArtifact::load(path)?;

    info!(
        path = %path.display(),
        created_at = %artifact.created_at.to_rfc3339(),
        package_version = %artifact.package_version,
        load_ms = start.elapsed().as_millis() as u64,
        "Loaded model"
    );
    Ok(Arc::new(artifact.into_pipeline()))
}

/// Score every row and append label and probability columns.
///
/// An existing column named like an output column (e.g. the true label) is
/// replaced.
pub fn score_frame(predictor: &dyn Predictor, df: &DataFrame) -> Result<DataFrame> {
    let start = Instant::now();
    let labels = predictor.predict(df)?;
    let proba = predictor.predict_proba(df)?;

    if proba.nrows() != df.height() || proba.ncols() != 2 || labels.len() != df.height() {
        return Err(HeartError::ShapeError {
            expected: format!("{} rows with 2 probabilities", df.height()),
            actual: format!("{} labels, {:?} probabilities", labels.len(), proba.dim()),
        });
    }

    let mut result = df.clone();
    result.with_column(Series::new(
        LABEL_COLUMN.into(),
        labels.iter().map(|&l| l as i64).collect::<Vec<i64>>(),
    ))?;
    result.with_column(Series::new(
        POSITIVE_COLUMN.into(),
        proba.column(1).to_vec(),
    ))?;
    result.with_column(Series::new(
        NEGATIVE_COLUMN.into(),
        proba.column(0).to_vec(),
    ))?;

    info!(
        rows = df.height(),
        positives = labels.iter().filter(|&&l| l == 1).count(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Scored batch"
    );
    Ok(result)
}
