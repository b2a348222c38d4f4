//! Inference
//!
//! The [`Predictor`] trait is the seam between the HTTP layer and the fitted
//! model: the server holds an `Arc<dyn Predictor>` and never looks inside it.

mod engine;

pub use engine::{load_predictor, score_frame, LABEL_COLUMN, NEGATIVE_COLUMN, POSITIVE_COLUMN};

use crate::error::{HeartError, Result};
use crate::explainability::LocalExplanation;
use crate::training::HeartDiseasePipeline;
use ndarray::{Array1, Array2};
use polars::prelude::DataFrame;

/// A fitted binary classifier over raw feature records
pub trait Predictor: Send + Sync {
    /// Predicted labels, one per row
    fn predict(&self, x: &DataFrame) -> Result<Array1<u8>>;

    /// Class probabilities, shape `(rows, 2)`, columns `[P(0), P(1)]`
    fn predict_proba(&self, x: &DataFrame) -> Result<Array2<f64>>;

    /// Per-feature contributions, one explanation per row
    fn explain(&self, _x: &DataFrame) -> Result<Vec<LocalExplanation>> {
        Err(HeartError::Unsupported(
            "this model does not provide explanations".to_string(),
        ))
    }
}

impl Predictor for HeartDiseasePipeline {
    fn predict(&self, x: &DataFrame) -> Result<Array1<u8>> {
        HeartDiseasePipeline::predict(self, x)
    }

    fn predict_proba(&self, x: &DataFrame) -> Result<Array2<f64>> {
        HeartDiseasePipeline::predict_proba(self, x)
    }

    fn explain(&self, x: &DataFrame) -> Result<Vec<LocalExplanation>> {
        HeartDiseasePipeline::explain(self, x)
    }
}
