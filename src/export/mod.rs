//! Model persistence and promotion
//!
//! - JSON model artifacts carrying the fitted pipeline and its metrics
//! - Timestamped training run directories
//! - Export of a run's model to the serving location

mod artifact;
mod runs;

pub use artifact::{ModelArtifact, FORMAT_VERSION};
pub use runs::{create_run_dir, export_run, latest_run, CONFIG_FILE, METRICS_FILE, MODEL_FILE};
