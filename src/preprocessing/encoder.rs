//! One-hot encoding of categorical columns

use super::string_column;
use crate::error::{HeartError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Categories seen for one column during fit, sorted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ColumnCategories {
    column: String,
    categories: Vec<String>,
}

impl ColumnCategories {
    /// Categories that produce an output column
    fn encoded(&self, drop_first: bool) -> &[String] {
        if drop_first && !self.categories.is_empty() {
            &self.categories[1..]
        } else {
            &self.categories
        }
    }
}

/// One-hot encoder.
///
/// Categories are sorted lexicographically per column. With `drop_first`, the
/// first category becomes the reference level and gets no output column.
/// Values unseen at fit time encode as all zeros for that column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneHotEncoder {
    drop_first: bool,
    columns: Vec<ColumnCategories>,
    is_fitted: bool,
}

impl Default for OneHotEncoder {
    fn default() -> Self {
        Self::new(true)
    }
}

impl OneHotEncoder {
    pub fn new(drop_first: bool) -> Self {
        Self {
            drop_first,
            columns: Vec::new(),
            is_fitted: false,
        }
    }

    /// Fit the encoder to the data
    pub fn fit(&mut self, df: &DataFrame, columns: &[String]) -> Result<&mut Self> {
        self.columns = columns
            .iter()
            .map(|name| {
                let ca = string_column(df, name)?;
                let categories: BTreeSet<&str> = ca.into_iter().flatten().collect();
                Ok(ColumnCategories {
                    column: name.clone(),
                    categories: categories.into_iter().map(str::to_string).collect(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        self.is_fitted = true;
        Ok(self)
    }

    /// Sorted categories learned for `column`
    pub fn categories(&self, column: &str) -> Option<&[String]> {
        self.columns
            .iter()
            .find(|c| c.column == column)
            .map(|c| c.categories.as_slice())
    }

    /// Output column names paired with the input column they come from
    pub fn feature_names(&self) -> Vec<(String, String)> {
        self.columns
            .iter()
            .flat_map(|c| {
                c.encoded(self.drop_first)
                    .iter()
                    .map(move |cat| (format!("{}_{}", c.column, cat), c.column.clone()))
            })
            .collect()
    }

    /// Encode the fitted columns into a frame holding only the indicator columns
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(HeartError::ModelNotFitted);
        }

        let mut encoded: Vec<Column> = Vec::new();
        for column in &self.columns {
            let ca = string_column(df, &column.column)?;
            for category in column.encoded(self.drop_first) {
                let values: Float64Chunked = ca
                    .into_iter()
                    .map(|v| Some(if v == Some(category.as_str()) { 1.0 } else { 0.0 }))
                    .collect();
                let name = format!("{}_{}", column.column, category);
                encoded.push(values.with_name(name.into()).into_series().into());
            }
        }

        if encoded.is_empty() {
            return Ok(DataFrame::empty());
        }
        Ok(DataFrame::new(encoded)?)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[String]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }
}
