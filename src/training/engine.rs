//! Training flow: load, split, fit, evaluate, persist

use super::metrics::{evaluate, ClassificationMetrics};
use super::pipeline::{build_pipeline, HeartDiseasePipeline};
use super::split::split_data;
use crate::config::TrainConfig;
use crate::error::Result;
use crate::export::{create_run_dir, ModelArtifact, CONFIG_FILE, METRICS_FILE, MODEL_FILE};
use crate::utils::load_data;
use chrono::Local;
use polars::prelude::DataFrame;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// Fitted pipeline and its test-set evaluation
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub pipeline: HeartDiseasePipeline,
    pub metrics: ClassificationMetrics,
    pub n_train: usize,
    pub n_test: usize,
}

/// Files written by one training invocation
#[derive(Debug, Clone)]
pub struct TrainingRun {
    pub run_dir: PathBuf,
    pub model_path: PathBuf,
    pub metrics_path: PathBuf,
    pub metrics: ClassificationMetrics,
    pub n_train: usize,
    pub n_test: usize,
    pub elapsed_secs: f64,
}

/// Split an in-memory dataset, fit the configured pipeline and evaluate it
pub fn train_and_evaluate(config: &TrainConfig, df: &DataFrame) -> Result<TrainingOutcome> {
    let split = split_data(&config.modeling, df)?;

    let mut pipeline = build_pipeline(config);
    pipeline.fit(&split.x_train, &split.y_train)?;

    let metrics = evaluate(&pipeline, &split.x_test, &split.y_test)?;

    Ok(TrainingOutcome {
        pipeline,
        metrics,
        n_train: split.y_train.len(),
        n_test: split.y_test.len(),
    })
}

/// Run the whole training flow and write a fresh run directory
pub fn run_training(config: &TrainConfig) -> Result<TrainingRun> {
    let start = Instant::now();
    config.validate()?;

    let df = load_data(&config.raw_data.path)?;
    let outcome = train_and_evaluate(config, &df)?;

    let run_dir = create_run_dir(&config.output.dir, &Local::now())?;
    let model_path = run_dir.join(MODEL_FILE);
    let metrics_path = run_dir.join(METRICS_FILE);

    ModelArtifact::new(outcome.pipeline, Some(outcome.metrics)).save(&model_path)?;
    fs::write(&metrics_path, serde_json::to_string_pretty(&outcome.metrics)?)?;
    fs::write(run_dir.join(CONFIG_FILE), config.to_toml_string()?)?;

    let elapsed_secs = start.elapsed().as_secs_f64();
    info!(
        run_dir = %run_dir.display(),
        elapsed_secs,
        "Training run complete"
    );

    Ok(TrainingRun {
        run_dir,
        model_path,
        metrics_path,
        metrics: outcome.metrics,
        n_train: outcome.n_train,
        n_test: outcome.n_test,
        elapsed_secs,
    })
}
