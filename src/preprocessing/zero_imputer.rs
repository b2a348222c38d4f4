//! Zero-as-missing substitution

use super::numeric_column;
use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Marks exact zeros as missing in selected numeric columns.
///
/// Some clinical measurements (serum cholesterol, resting blood pressure) are
/// recorded as `0` when they were not taken. Turning those into nulls lets the
/// downstream median imputer fill them and flag them with an indicator.
/// Stateless: there is nothing to fit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZeroImputer {
    columns: Vec<String>,
}

impl ZeroImputer {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    /// Replace `0` with null in the configured columns; other columns pass through
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut result = df.clone();

        for name in &self.columns {
            let ca = numeric_column(df, name)?;
            let replaced: Float64Chunked = ca
                .into_iter()
                .map(|opt| opt.filter(|v| *v != 0.0))
                .collect();
            result.with_column(replaced.with_name(name.as_str().into()).into_series())?;
        }

        Ok(result)
    }
}
