//! Heart disease prediction
//!
//! Trains a binary classifier predicting heart disease from tabular
//! clinical features and serves it over HTTP.
//!
//! # Modules
//!
//! - [`config`] - Training configuration tree with `key.path=value` overrides
//! - [`preprocessing`] - Imputation, scaling and one-hot encoding
//! - [`training`] - Train/test split, logistic regression, evaluation
//! - [`explainability`] - Per-feature contributions of a linear model
//! - [`export`] - Model artifacts and run directories
//! - [`inference`] - Loading artifacts and batch scoring
//! - [`server`] - HTTP prediction service
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;
pub mod config;

// Core ML modules
pub mod preprocessing;
pub mod training;
pub mod inference;
pub mod explainability;

// Persistence
pub mod export;
pub mod utils;

// Services
pub mod server;
pub mod cli;

pub use error::{HeartError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{HeartError, Result};
    pub use crate::config::TrainConfig;
    pub use crate::preprocessing::{ColumnPreprocessor, PreprocessingConfig};
    pub use crate::training::{
        run_training, train_and_evaluate, ClassificationMetrics, HeartDiseasePipeline,
        LogisticRegression, LogisticRegressionConfig,
    };
    pub use crate::inference::{load_predictor, score_frame, Predictor};
    pub use crate::explainability::LocalExplanation;
    pub use crate::export::ModelArtifact;
    pub use crate::server::{HeartDiseaseRecord, ServerConfig};
}
