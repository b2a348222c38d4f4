//! Standard scaling

use super::numeric_column;
use crate::error::{HeartError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Parameters for one fitted column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ScalerParams {
    column: String,
    mean: f64,
    scale: f64,
}

/// Z-score scaler: `(x - mean) / std`.
///
/// Uses the population standard deviation (ddof = 0). A column with zero
/// variance gets a scale of 1, so it is only centered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandardScaler {
    params: Vec<ScalerParams>,
    is_fitted: bool,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit the scaler to the data
    pub fn fit(&mut self, df: &DataFrame, columns: &[String]) -> Result<&mut Self> {
        self.params = columns
            .iter()
            .map(|name| {
                let ca = numeric_column(df, name)?;
                let mean = ca.mean().unwrap_or(0.0);
                let std = ca.std(0).unwrap_or(0.0);
                Ok(ScalerParams {
                    column: name.clone(),
                    mean,
                    scale: if std == 0.0 || !std.is_finite() { 1.0 } else { std },
                })
            })
            .collect::<Result<Vec<_>>>()?;

        self.is_fitted = true;
        Ok(self)
    }

    /// Transform the data.
    /// Builds all replacement columns first, then applies them in a single pass.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(HeartError::ModelNotFitted);
        }

        let replacements = self
            .params
            .iter()
            .map(|params| {
                let ca = numeric_column(df, &params.column)?;
                let scaled: Float64Chunked = ca
                    .into_iter()
                    .map(|opt| opt.map(|v| (v - params.mean) / params.scale))
                    .collect();
                Ok(scaled.with_name(params.column.as_str().into()).into_series())
            })
            .collect::<Result<Vec<Series>>>()?;

        let mut result = df.clone();
        for scaled in replacements {
            result.with_column(scaled)?;
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[String]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    /// Fitted mean of `column`
    pub fn mean(&self, column: &str) -> Option<f64> {
        self.find(column).map(|p| p.mean)
    }

    /// Fitted scale of `column`
    pub fn scale(&self, column: &str) -> Option<f64> {
        self.find(column).map(|p| p.scale)
    }

    fn find(&self, column: &str) -> Option<&ScalerParams> {
        self.params.iter().find(|p| p.column == column)
    }
}
