//! Local explanations (additive feature contributions)

use crate::error::{HeartError, Result};
use crate::preprocessing::OutputFeature;
use crate::training::LogisticRegression;
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Contribution of one input feature to a prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureContribution {
    pub feature_name: String,
    /// Log-odds contribution relative to the training mean
    pub contribution: f64,
}

/// Local explanation for a single prediction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalExplanation {
    /// Row index in the explained batch
    pub instance_index: usize,
    /// Log-odds at the training mean
    pub base_value: f64,
    /// Log-odds of this instance
    pub prediction: f64,
    /// One entry per input feature, in input order
    pub contributions: Vec<FeatureContribution>,
}

impl LocalExplanation {
    /// Get sum of contributions; equals `prediction - base_value`
    pub fn sum_contributions(&self) -> f64 {
        self.contributions.iter().map(|c| c.contribution).sum()
    }

    /// Get sorted contributions (by absolute value, descending)
    pub fn sorted_contributions(&self) -> Vec<&FeatureContribution> {
        let mut sorted: Vec<&FeatureContribution> = self.contributions.iter().collect();
        sorted.sort_by(|a, b| {
            b.contribution
                .abs()
                .partial_cmp(&a.contribution.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        sorted
    }

    /// Feature name to contribution
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        self.contributions
            .iter()
            .map(|c| (c.feature_name.clone(), c.contribution))
            .collect()
    }
}

/// Explain every row of a design matrix under a fitted logistic regression.
///
/// `features` describes the design columns; `inputs` lists the input features
/// the contributions are aggregated onto.
pub fn explain_linear(
    model: &LogisticRegression,
    features: &[OutputFeature],
    inputs: &[String],
    design: &Array2<f64>,
) -> Result<Vec<LocalExplanation>> {
    if features.len() != design.ncols() {
        return Err(HeartError::ShapeError {
            expected: format!("{} design columns", features.len()),
            actual: format!("{} design columns", design.ncols()),
        });
    }

    let slots = features
        .iter()
        .map(|f| {
            inputs
                .iter()
                .position(|name| *name == f.source)
                .ok_or_else(|| HeartError::FeatureNotFound(f.source.clone()))
        })
        .collect::<Result<Vec<usize>>>()?;

    let means = model
        .feature_means
        .as_ref()
        .ok_or(HeartError::ModelNotFitted)?;
    let base_value = model.decision_function(&means.view().insert_axis(Axis(0)).to_owned())?[0];
    let log_odds = model.decision_function(design)?;

    design
        .rows()
        .into_iter()
        .enumerate()
        .map(|(idx, row)| {
            let per_column = model.contributions(row)?;
            let mut totals = vec![0.0; inputs.len()];
            for (value, &slot) in per_column.iter().zip(slots.iter()) {
                totals[slot] += value;
            }

            Ok(LocalExplanation {
                instance_index: idx,
                base_value,
                prediction: log_odds[idx],
                contributions: inputs
                    .iter()
                    .zip(totals)
                    .map(|(name, contribution)| FeatureContribution {
                        feature_name: name.clone(),
                        contribution,
                    })
                    .collect(),
            })
        })
        .collect()
}
