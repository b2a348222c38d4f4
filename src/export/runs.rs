//! Training run directories and model promotion

use super::artifact::ModelArtifact;
use crate::error::{HeartError, Result};
use chrono::{DateTime, TimeZone};
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Fitted pipeline of a run
pub const MODEL_FILE: &str = "model.json";
/// Test-set metrics of a run
pub const METRICS_FILE: &str = "metrics.json";
/// Resolved configuration of a run
pub const CONFIG_FILE: &str = "config.toml";

/// Create `<root>/<YYYY-MM-DD>/<HH-MM-SS>/` for a run started at `now`.
///
/// A second run within the same second gets a numeric suffix.
pub fn create_run_dir<Tz>(root: impl AsRef<Path>, now: &DateTime<Tz>) -> Result<PathBuf>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let day_dir = root.as_ref().join(now.format("%Y-%m-%d").to_string());
    let time = now.format("%H-%M-%S").to_string();
    fs::create_dir_all(&day_dir)?;

    let mut candidate = day_dir.join(&time);
    let mut suffix = 1;
    while candidate.exists() {
        candidate = day_dir.join(format!("{}_{}", time, suffix));
        suffix += 1;
    }
    fs::create_dir(&candidate)?;
    Ok(candidate)
}

fn sorted_subdirs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_dir())
        .collect::<Vec<_>>();
    dirs.sort();
    Ok(dirs)
}

/// Most recent run under `root` that contains a model
pub fn latest_run(root: impl AsRef<Path>) -> Result<PathBuf> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(HeartError::ArtifactError(format!(
            "no training runs found: {} does not exist",
            root.display()
        )));
    }

    for day in sorted_subdirs(root)?.into_iter().rev() {
        for run in sorted_subdirs(&day)?.into_iter().rev() {
            if run.join(MODEL_FILE).is_file() {
                return Ok(run);
            }
        }
    }

    Err(HeartError::ArtifactError(format!(
        "no training run with a {} under {}",
        MODEL_FILE,
        root.display()
    )))
}

/// Copy a run's model to the serving location after checking it loads.
///
/// With `run = None`, the most recent run under `runs_root` is used. Returns
/// the run directory that was exported.
pub fn export_run(
    run: Option<&Path>,
    runs_root: impl AsRef<Path>,
    destination: impl AsRef<Path>,
) -> Result<PathBuf> {
    let run_dir = match run {
        Some(dir) => dir.to_path_buf(),
        None => latest_run(runs_root)?,
    };
    let source = run_dir.join(MODEL_FILE);

    let artifact = ModelArtifact::load(&source)?;
    artifact.save(destination.as_ref())?;

    info!(
        run = %run_dir.display(),
        destination = %destination.as_ref().display(),
        "Exported model"
    );
    Ok(run_dir)
}
