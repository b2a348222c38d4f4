//! Column-group preprocessing pipeline

use super::{
    config::PreprocessingConfig,
    encoder::OneHotEncoder,
    imputer::{ImputeStrategy, SimpleImputer},
    scaler::StandardScaler,
    select_as,
    zero_imputer::ZeroImputer,
};
use crate::error::{HeartError, Result};
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One column of the design matrix and the input column it is derived from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputFeature {
    pub name: String,
    pub source: String,
}

/// Routes configured column groups through their branches and assembles the
/// numeric design matrix.
///
/// Numeric branch: zero-as-missing, median imputation with indicators, standard
/// scaling. Categorical branch: most frequent imputation, one-hot encoding with
/// the first category dropped. Output columns are the numeric branch followed by
/// the categorical branch; columns outside both groups are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnPreprocessor {
    config: PreprocessingConfig,
    zero_imputer: ZeroImputer,
    numeric_imputer: SimpleImputer,
    scaler: StandardScaler,
    categorical_imputer: SimpleImputer,
    encoder: OneHotEncoder,
    output_features: Vec<OutputFeature>,
    is_fitted: bool,
}

impl ColumnPreprocessor {
    pub fn new(config: PreprocessingConfig) -> Self {
        Self {
            zero_imputer: ZeroImputer::new(config.missing_vals_cols.clone()),
            numeric_imputer: SimpleImputer::new(ImputeStrategy::Median).with_indicator(true),
            scaler: StandardScaler::new(),
            categorical_imputer: SimpleImputer::new(ImputeStrategy::MostFrequent),
            encoder: OneHotEncoder::new(true),
            output_features: Vec::new(),
            is_fitted: false,
            config,
        }
    }

    pub fn config(&self) -> &PreprocessingConfig {
        &self.config
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// Columns of the design matrix, in order
    pub fn output_features(&self) -> &[OutputFeature] {
        &self.output_features
    }

    /// Names of the design matrix columns, in order
    pub fn feature_names(&self) -> Vec<String> {
        self.output_features.iter().map(|f| f.name.clone()).collect()
    }

    /// Fit every branch on the training frame
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        let numeric = &self.config.num_features;
        let categorical = &self.config.cat_features;
        let mut output_features = Vec::new();

        if !numeric.is_empty() {
            let frame = select_as(df, numeric, &DataType::Float64)?;
            let frame = self.zero_imputer.transform(&frame)?;
            let imputed = self.numeric_imputer.fit_transform(&frame, numeric)?;
            let columns = self.numeric_imputer.output_columns();
            self.scaler.fit(&imputed, &columns)?;

            for name in numeric {
                output_features.push(OutputFeature {
                    name: name.clone(),
                    source: name.clone(),
                });
            }
            for name in self.numeric_imputer.indicator_columns() {
                output_features.push(OutputFeature {
                    name: SimpleImputer::indicator_name(name),
                    source: name.clone(),
                });
            }
        }

        if !categorical.is_empty() {
            let frame = select_as(df, categorical, &DataType::String)?;
            let imputed = self.categorical_imputer.fit_transform(&frame, categorical)?;
            self.encoder.fit(&imputed, categorical)?;

            output_features.extend(
                self.encoder
                    .feature_names()
                    .into_iter()
                    .map(|(name, source)| OutputFeature { name, source }),
            );
        }

        debug!(
            n_rows = df.height(),
            n_features = output_features.len(),
            indicators = ?self.numeric_imputer.indicator_columns(),
            "Fitted column preprocessor"
        );

        self.output_features = output_features;
        self.is_fitted = true;
        Ok(self)
    }

    /// Transform a frame into the design matrix
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(HeartError::ModelNotFitted);
        }

        let mut parts: Vec<DataFrame> = Vec::with_capacity(2);

        if !self.config.num_features.is_empty() {
            let frame = select_as(df, &self.config.num_features, &DataType::Float64)?;
            let frame = self.zero_imputer.transform(&frame)?;
            let imputed = self.numeric_imputer.transform(&frame)?;
            parts.push(self.scaler.transform(&imputed)?);
        }

        if !self.config.cat_features.is_empty() {
            let frame = select_as(df, &self.config.cat_features, &DataType::String)?;
            let imputed = self.categorical_imputer.transform(&frame)?;
            parts.push(self.encoder.transform(&imputed)?);
        }

        let columns = self
            .output_features
            .iter()
            .map(|feature| {
                let part = parts
                    .iter()
                    .find(|p| p.column(&feature.name).is_ok())
                    .ok_or_else(|| HeartError::FeatureNotFound(feature.name.clone()))?;
                column_values(part, &feature.name)
            })
            .collect::<Result<Vec<Vec<f64>>>>()?;

        let n_rows = df.height();
        Ok(Array2::from_shape_fn((n_rows, columns.len()), |(r, c)| {
            columns[c][r]
        }))
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<Array2<f64>> {
        self.fit(df)?;
        self.transform(df)
    }
}

fn column_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let ca = df
        .column(name)
        .map_err(|_| HeartError::FeatureNotFound(name.to_string()))?
        .f64()?;
    ca.into_iter()
        .map(|v| {
            v.ok_or_else(|| {
                HeartError::PreprocessingError(format!("missing value left in `{}`", name))
            })
        })
        .collect()
}
