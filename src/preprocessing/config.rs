//! Preprocessing configuration

use crate::error::{HeartError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Column groups routed through the preprocessing branches.
///
/// The lists are supplied by the configuration file; nothing is inferred from
/// column dtypes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreprocessingConfig {
    /// Numeric columns in which an exact `0` means "not measured"
    #[serde(default)]
    pub missing_vals_cols: Vec<String>,

    /// Numeric columns: median imputation, then standard scaling
    #[serde(default)]
    pub num_features: Vec<String>,

    /// Categorical columns: most frequent imputation, then one-hot encoding
    #[serde(default)]
    pub cat_features: Vec<String>,
}

impl PreprocessingConfig {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the numeric columns
    pub fn with_numeric<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.num_features = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method to set the categorical columns
    pub fn with_categorical<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.cat_features = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method to set the zero-as-missing columns
    pub fn with_zero_as_missing<S: Into<String>>(
        mut self,
        columns: impl IntoIterator<Item = S>,
    ) -> Self {
        self.missing_vals_cols = columns.into_iter().map(Into::into).collect();
        self
    }

    /// All feature columns, numeric first
    pub fn feature_columns(&self) -> impl Iterator<Item = &String> {
        self.num_features.iter().chain(self.cat_features.iter())
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_features.is_empty() && self.cat_features.is_empty() {
            return Err(HeartError::ConfigError(
                "processing lists no numeric or categorical features".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for column in self.feature_columns() {
            if !seen.insert(column) {
                return Err(HeartError::ConfigError(format!(
                    "column `{}` is listed more than once in processing",
                    column
                )));
            }
        }

        for column in &self.missing_vals_cols {
            if !self.num_features.contains(column) {
                return Err(HeartError::ConfigError(format!(
                    "missing_vals_cols entry `{}` is not a numeric feature",
                    column
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_pattern() {
        let config = PreprocessingConfig::new()
            .with_numeric(["Age", "Cholesterol"])
            .with_categorical(["Sex"])
            .with_zero_as_missing(["Cholesterol"]);

        assert_eq!(config.num_features.len(), 2);
        assert_eq!(config.cat_features, vec!["Sex"]);
        assert!(config.validate().is_ok());
        assert_eq!(config.feature_columns().count(), 3);
    }

    #[test]
    fn test_empty_config_is_invalid() {
        assert!(PreprocessingConfig::default().validate().is_err());
    }

    #[test]
    fn test_duplicate_column_is_invalid() {
        let config = PreprocessingConfig::new()
            .with_numeric(["Age"])
            .with_categorical(["Age"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_column_must_be_numeric() {
        let config = PreprocessingConfig::new()
            .with_numeric(["Age"])
            .with_categorical(["Sex"])
            .with_zero_as_missing(["Sex"]);
        assert!(config.validate().is_err());
    }
}
