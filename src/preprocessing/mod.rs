//! Feature preprocessing
//!
//! Column-group preprocessing in front of the classifier:
//! - Zero-as-missing substitution for selected numeric columns
//! - Missing value imputation (median with missing indicators, most frequent)
//! - Standard scaling of numeric features
//! - One-hot encoding of categorical features (first category dropped)
//!
//! Each transformer is fitted on a polars `DataFrame` and keeps its fitted
//! parameters serializable so the whole chain can live inside a model artifact.

mod config;
mod encoder;
mod imputer;
mod pipeline;
mod scaler;
mod zero_imputer;

pub use config::PreprocessingConfig;
pub use encoder::OneHotEncoder;
pub use imputer::{ImputeStrategy, SimpleImputer};
pub use pipeline::{ColumnPreprocessor, OutputFeature};
pub use scaler::StandardScaler;
pub use zero_imputer::ZeroImputer;

use crate::error::{HeartError, Result};
use polars::prelude::*;

/// Read a column as `Float64`, casting integer columns.
///
/// Values that cannot be read as numbers are an error, not nulls.
pub(crate) fn numeric_column(df: &DataFrame, name: &str) -> Result<Float64Chunked> {
    let column = df
        .column(name)
        .map_err(|_| HeartError::FeatureNotFound(name.to_string()))?;
    let casted = column
        .strict_cast(&DataType::Float64)
        .map_err(|e| HeartError::DataError(format!("column `{}`: {}", name, e)))?;
    Ok(casted.f64()?.clone())
}

/// Read a column as strings, casting non-string columns
pub(crate) fn string_column(df: &DataFrame, name: &str) -> Result<StringChunked> {
    let column = df
        .column(name)
        .map_err(|_| HeartError::FeatureNotFound(name.to_string()))?;
    let casted = column.cast(&DataType::String)?;
    Ok(casted.str()?.clone())
}

/// Select `columns` from `df`, casting each to `dtype`. A value the cast
/// cannot represent fails instead of becoming null.
pub(crate) fn select_as(df: &DataFrame, columns: &[String], dtype: &DataType) -> Result<DataFrame> {
    let selected = columns
        .iter()
        .map(|name| {
            let column = df
                .column(name)
                .map_err(|_| HeartError::FeatureNotFound(name.clone()))?;
            column
                .strict_cast(dtype)
                .map_err(|e| HeartError::DataError(format!("column `{}`: {}", name, e)))
        })
        .collect::<Result<Vec<Column>>>()?;

    Ok(DataFrame::new(selected)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_column_casts_integers() {
        let df = df!("a" => &[1i64, 2, 3]).unwrap();
        let ca = numeric_column(&df, "a").unwrap();
        assert_eq!(ca.get(2), Some(3.0));
    }

    #[test]
    fn test_string_column_casts_integers() {
        let df = df!("a" => &[0i64, 1]).unwrap();
        let ca = string_column(&df, "a").unwrap();
        assert_eq!(ca.get(1), Some("1"));
    }

    #[test]
    fn test_select_as_parses_numeric_text() {
        let df = df!("a" => &[Some("1.5"), None, Some("3")]).unwrap();
        let selected = select_as(&df, &["a".to_string()], &DataType::Float64).unwrap();
        let ca = selected.column("a").unwrap().f64().unwrap().clone();
        assert_eq!(ca.get(0), Some(1.5));
        assert_eq!(ca.get(1), None);
        assert_eq!(ca.get(2), Some(3.0));
    }

    #[test]
    fn test_malformed_numbers_are_rejected() {
        let df = df!("Cholesterol" => &["230", "NA", "abc"]).unwrap();

        let result = select_as(&df, &["Cholesterol".to_string()], &DataType::Float64);
        assert!(matches!(result, Err(HeartError::DataError(msg)) if msg.contains("Cholesterol")));
        assert!(matches!(
            numeric_column(&df, "Cholesterol"),
            Err(HeartError::DataError(_))
        ));
    }

    #[test]
    fn test_missing_column() {
        let df = df!("a" => &[1.0]).unwrap();
        assert!(matches!(
            numeric_column(&df, "b"),
            Err(HeartError::FeatureNotFound(name)) if name == "b"
        ));
    }
}
