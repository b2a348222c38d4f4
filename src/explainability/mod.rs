//! Model explainability
//!
//! Additive per-feature explanations of single predictions. For the linear
//! classifier these are exact: each design column contributes
//! `coefficient * (value - training mean)` to the log-odds, and the columns
//! derived from one input feature (indicator, one-hot levels) are summed back
//! onto that feature.

mod local_explanations;

pub use local_explanations::{explain_linear, FeatureContribution, LocalExplanation};
