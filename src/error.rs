//! Error types for training and inference

use thiserror::Error;

/// Result type alias for library operations
pub type Result<T> = std::result::Result<T, HeartError>;

/// Main error type of the crate
#[derive(Error, Debug)]
pub enum HeartError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Preprocessing error: {0}")]
    PreprocessingError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Artifact error: {0}")]
    ArtifactError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Computation error: {0}")]
    ComputationError(String),

    #[error("Not supported: {0}")]
    Unsupported(String),
}

impl From<polars::error::PolarsError> for HeartError {
    fn from(err: polars::error::PolarsError) -> Self {
        HeartError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for HeartError {
    fn from(err: serde_json::Error) -> Self {
        HeartError::SerializationError(err.to_string())
    }
}

impl From<toml::de::Error> for HeartError {
    fn from(err: toml::de::Error) -> Self {
        HeartError::ConfigError(err.to_string())
    }
}

impl From<toml::ser::Error> for HeartError {
    fn from(err: toml::ser::Error) -> Self {
        HeartError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for HeartError {
    fn from(err: ndarray::ShapeError) -> Self {
        HeartError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
