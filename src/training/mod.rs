//! Model training module
//!
//! Provides the heart disease training flow:
//! - Seeded train/test split with binary label validation
//! - L2-regularized logistic regression (Newton's method)
//! - The preprocessing + classifier pipeline persisted in artifacts
//! - Positive-class evaluation metrics
//! - The end-to-end run that writes a timestamped run directory

mod engine;
mod metrics;
mod pipeline;
pub mod linear_models;
pub mod split;

pub use engine::{run_training, train_and_evaluate, TrainingOutcome, TrainingRun};
pub use linear_models::{LogisticRegression, LogisticRegressionConfig};
pub use metrics::{evaluate, ClassificationMetrics};
pub use pipeline::{build_pipeline, HeartDiseasePipeline};
pub use split::{extract_labels, split_data, train_test_split_indices, TrainTestSplit};
