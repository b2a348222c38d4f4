//! Classification metrics

use super::pipeline::HeartDiseasePipeline;
use crate::error::{HeartError, Result};
use ndarray::Array1;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Evaluation metrics for the positive class (label 1).
///
/// Serialized as the flat `metrics.json` object of a training run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub recall: f64,
    pub precision: f64,
    pub f1_score: f64,
}

impl ClassificationMetrics {
    /// Compute metrics from true and predicted labels.
    /// Zero denominators yield 0.0.
    pub fn compute(y_true: &Array1<u8>, y_pred: &Array1<u8>) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(HeartError::ShapeError {
                expected: format!("{} predictions", y_true.len()),
                actual: format!("{} predictions", y_pred.len()),
            });
        }

        let (tp, fp, tn, fn_) = confusion_counts(y_true, y_pred);
        let total = y_true.len();

        let ratio = |num: usize, den: usize| if den > 0 { num as f64 / den as f64 } else { 0.0 };
        let accuracy = ratio(tp + tn, total);
        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        let f1_score = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Ok(Self {
            accuracy,
            recall,
            precision,
            f1_score,
        })
    }
}

/// (true positives, false positives, true negatives, false negatives)
fn confusion_counts(y_true: &Array1<u8>, y_pred: &Array1<u8>) -> (usize, usize, usize, usize) {
    y_true
        .iter()
        .zip(y_pred.iter())
        .fold((0, 0, 0, 0), |(tp, fp, tn, fn_), (&t, &p)| match (t, p) {
            (1, 1) => (tp + 1, fp, tn, fn_),
            (0, 1) => (tp, fp + 1, tn, fn_),
            (1, _) => (tp, fp, tn, fn_ + 1),
            _ => (tp, fp, tn + 1, fn_),
        })
}

/// Score a fitted pipeline on held-out data
pub fn evaluate(
    model: &HeartDiseasePipeline,
    x_test: &DataFrame,
    y_test: &Array1<u8>,
) -> Result<ClassificationMetrics> {
    let y_pred = model.predict(x_test)?;
    let metrics = ClassificationMetrics::compute(y_test, &y_pred)?;

    info!(
        accuracy = metrics.accuracy,
        recall = metrics.recall,
        precision = metrics.precision,
        f1_score = metrics.f1_score,
        n_samples = y_test.len(),
        "Evaluated model"
    );

    Ok(metrics)
}
