//! Preprocessing + classifier pipeline

use super::linear_models::LogisticRegression;
use crate::config::TrainConfig;
use crate::error::{HeartError, Result};
use crate::explainability::{explain_linear, LocalExplanation};
use crate::preprocessing::{ColumnPreprocessor, OutputFeature};
use ndarray::{Array1, Array2, Axis};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Fitted preprocessing chain feeding a logistic regression.
///
/// This is the unit persisted in a model artifact: everything needed to turn a
/// raw record into a prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartDiseasePipeline {
    preprocessor: ColumnPreprocessor,
    classifier: LogisticRegression,
}

/// Assemble an unfitted pipeline from the configuration
pub fn build_pipeline(config: &TrainConfig) -> HeartDiseasePipeline {
    HeartDiseasePipeline::new(
        ColumnPreprocessor::new(config.processing.clone()),
        LogisticRegression::new(config.classifier.clone()),
    )
}

impl HeartDiseasePipeline {
    pub fn new(preprocessor: ColumnPreprocessor, classifier: LogisticRegression) -> Self {
        Self {
            preprocessor,
            classifier,
        }
    }

    pub fn preprocessor(&self) -> &ColumnPreprocessor {
        &self.preprocessor
    }

    pub fn classifier(&self) -> &LogisticRegression {
        &self.classifier
    }

    pub fn is_fitted(&self) -> bool {
        self.preprocessor.is_fitted() && self.classifier.is_fitted()
    }

    /// Input columns the pipeline reads, numeric first
    pub fn input_features(&self) -> Vec<String> {
        self.preprocessor.config().feature_columns().cloned().collect()
    }

    /// Columns of the design matrix seen by the classifier
    pub fn output_features(&self) -> &[OutputFeature] {
        self.preprocessor.output_features()
    }

    /// Fit the preprocessing chain and the classifier
    pub fn fit(&mut self, x: &DataFrame, y: &Array1<u8>) -> Result<&mut Self> {
        if x.height() != y.len() {
            return Err(HeartError::ShapeError {
                expected: format!("{} labels", x.height()),
                actual: format!("{} labels", y.len()),
            });
        }

        let design = self.preprocessor.fit_transform(x)?;
        self.classifier.fit(&design, y)?;

        info!(
            n_samples = design.nrows(),
            n_features = design.ncols(),
            n_iter = self.classifier.n_iter,
            converged = self.classifier.converged,
            "Fitted pipeline"
        );
        Ok(self)
    }

    /// Predicted labels (0 or 1)
    pub fn predict(&self, x: &DataFrame) -> Result<Array1<u8>> {
        let design = self.preprocessor.transform(x)?;
        self.classifier.predict(&design)
    }

    /// Class probabilities, one row per record: `[P(0), P(1)]`
    pub fn predict_proba(&self, x: &DataFrame) -> Result<Array2<f64>> {
        let design = self.preprocessor.transform(x)?;
        let positive = self.classifier.predict_proba(&design)?;
        let negative = positive.mapv(|p| 1.0 - p);
        Ok(ndarray::stack(
            Axis(1),
            &[negative.view(), positive.view()],
        )?)
    }

    /// Log-odds contributions per input feature, one explanation per record
    pub fn explain(&self, x: &DataFrame) -> Result<Vec<LocalExplanation>> {
        let design = self.preprocessor.transform(x)?;
        explain_linear(
            &self.classifier,
            self.preprocessor.output_features(),
            &self.input_features(),
            &design,
        )
    }
}
