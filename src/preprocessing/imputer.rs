//! Missing value imputation strategies

use super::{numeric_column, string_column};
use crate::error::{HeartError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// Strategy for imputing missing values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImputeStrategy {
    /// Replace with the median of the observed values (numeric only)
    Median,
    /// Replace with the most frequent observed value; ties go to the smallest value
    MostFrequent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum ImputeValue {
    Numeric(f64),
    Text(String),
}

/// Column-wise imputer with optional missing indicators.
///
/// With `add_indicator`, every column that contained missing values at fit time
/// gets a companion `missingindicator_<column>` column (1.0 where the input was
/// missing, 0.0 otherwise). Columns without missing values at fit time get none,
/// even if later inputs are missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleImputer {
    strategy: ImputeStrategy,
    add_indicator: bool,
    columns: Vec<String>,
    fill_values: HashMap<String, ImputeValue>,
    indicator_columns: Vec<String>,
    is_fitted: bool,
}

impl SimpleImputer {
    /// Create a new imputer with the specified strategy
    pub fn new(strategy: ImputeStrategy) -> Self {
        Self {
            strategy,
            add_indicator: false,
            columns: Vec::new(),
            fill_values: HashMap::new(),
            indicator_columns: Vec::new(),
            is_fitted: false,
        }
    }

    /// Append missing indicators after the imputed columns
    pub fn with_indicator(mut self, add_indicator: bool) -> Self {
        self.add_indicator = add_indicator;
        self
    }

    /// Name of the indicator column for `column`
    pub fn indicator_name(column: &str) -> String {
        format!("missingindicator_{}", column)
    }

    /// Columns that received an indicator during fit
    pub fn indicator_columns(&self) -> &[String] {
        &self.indicator_columns
    }

    /// Output column names: imputed columns, then indicators
    pub fn output_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .cloned()
            .chain(self.indicator_columns.iter().map(|c| Self::indicator_name(c)))
            .collect()
    }

    /// Fill value learned for a numeric column
    pub fn numeric_fill(&self, column: &str) -> Option<f64> {
        match self.fill_values.get(column) {
            Some(ImputeValue::Numeric(v)) => Some(*v),
            _ => None,
        }
    }

    /// Fill value learned for a categorical column
    pub fn text_fill(&self, column: &str) -> Option<&str> {
        match self.fill_values.get(column) {
            Some(ImputeValue::Text(v)) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Fit the imputer to the data
    pub fn fit(&mut self, df: &DataFrame, columns: &[String]) -> Result<&mut Self> {
        self.columns = columns.to_vec();
        self.fill_values.clear();
        self.indicator_columns.clear();

        for name in columns {
            let column = df
                .column(name)
                .map_err(|_| HeartError::FeatureNotFound(name.clone()))?;

            if self.add_indicator && column.null_count() > 0 {
                self.indicator_columns.push(name.clone());
            }

            let fill_value = match self.strategy {
                ImputeStrategy::Median => {
                    let median = numeric_column(df, name)?.median().unwrap_or_else(|| {
                        warn!(column = %name, "No observed values, imputing 0.0");
                        0.0
                    });
                    ImputeValue::Numeric(median)
                }
                ImputeStrategy::MostFrequent => {
                    let mode = most_frequent(&string_column(df, name)?).unwrap_or_else(|| {
                        warn!(column = %name, "No observed values, imputing empty string");
                        String::new()
                    });
                    ImputeValue::Text(mode)
                }
            };
            self.fill_values.insert(name.clone(), fill_value);
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Transform the data by imputing missing values and appending indicators
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(HeartError::ModelNotFitted);
        }

        let mut result = df.clone();

        for name in &self.indicator_columns {
            let column = df
                .column(name)
                .map_err(|_| HeartError::FeatureNotFound(name.clone()))?;
            let indicator: Float64Chunked = column
                .is_null()
                .into_iter()
                .map(|missing| Some(if missing.unwrap_or(false) { 1.0 } else { 0.0 }))
                .collect();
            result.with_column(
                indicator
                    .with_name(Self::indicator_name(name).into())
                    .into_series(),
            )?;
        }

        for name in &self.columns {
            let filled = match self.fill_values.get(name) {
                Some(ImputeValue::Numeric(val)) => {
                    let ca = numeric_column(df, name)?;
                    let filled: Float64Chunked = ca
                        .into_iter()
                        .map(|opt| Some(opt.unwrap_or(*val)))
                        .collect();
                    filled.with_name(name.as_str().into()).into_series()
                }
                Some(ImputeValue::Text(val)) => {
                    let ca = string_column(df, name)?;
                    let filled: StringChunked = ca
                        .into_iter()
                        .map(|opt| Some(opt.unwrap_or(val.as_str()).to_string()))
                        .collect();
                    filled.with_name(name.as_str().into()).into_series()
                }
                None => return Err(HeartError::ModelNotFitted),
            };
            result.with_column(filled)?;
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[String]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }
}

/// Most frequent non-null value; ties resolve to the lexicographically smallest
fn most_frequent(ca: &StringChunked) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for val in ca.into_iter().flatten() {
        *counts.entry(val).or_insert(0) += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for (val, count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((val, count));
        }
    }
    best.map(|(val, _)| val.to_string())
}
