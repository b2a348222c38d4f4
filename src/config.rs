//! Training configuration tree
//!
//! The tree is read from a TOML file (`conf/config.toml` by default) and can be
//! adjusted from the command line with dotted `key.path=value` overrides, e.g.
//! `modeling.test_size=0.3` or `processing.cat_features=["Sex"]`.

use crate::error::{HeartError, Result};
use crate::preprocessing::PreprocessingConfig;
use crate::training::LogisticRegressionConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "conf/config.toml";

/// Location of the raw dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDataConfig {
    pub path: PathBuf,
}

/// Target column and train/test split parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelingConfig {
    #[serde(default = "default_target")]
    pub target: String,
    #[serde(default = "default_test_size")]
    pub test_size: f64,
    /// Seed for the split. `None` draws from OS entropy.
    #[serde(default)]
    pub random_state: Option<u64>,
}

fn default_target() -> String {
    "HeartDisease".to_string()
}

fn default_test_size() -> f64 {
    0.2
}

impl Default for ModelingConfig {
    fn default() -> Self {
        Self {
            target: default_target(),
            test_size: default_test_size(),
            random_state: Some(42),
        }
    }
}

/// Where training runs and the served model live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Root of the timestamped run directories
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    /// Destination of `export`, and the default model path of `serve`
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("outputs")
}

fn default_model_path() -> PathBuf {
    PathBuf::from("models/model.json")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            model_path: default_model_path(),
        }
    }
}

/// Complete configuration of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    pub raw_data: RawDataConfig,
    pub processing: PreprocessingConfig,
    #[serde(default)]
    pub modeling: ModelingConfig,
    #[serde(default)]
    pub classifier: LogisticRegressionConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl TrainConfig {
    /// Load a configuration file without overrides
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::load(path, &[])
    }

    /// Load a configuration file and apply `key.path=value` overrides in order
    pub fn load(path: impl AsRef<Path>, overrides: &[String]) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            HeartError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content, overrides)
    }

    /// Parse a configuration from TOML text and apply overrides
    pub fn from_toml_str(content: &str, overrides: &[String]) -> Result<Self> {
        let mut table: toml::Table = toml::from_str(content)?;
        for expr in overrides {
            apply_override(&mut table, expr)?;
        }

        let config: TrainConfig = toml::Value::Table(table).try_into()?;
        config.validate()?;
        Ok(config)
    }

    /// Render the resolved configuration, used for the run directory snapshot
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        if self.raw_data.path.as_os_str().is_empty() {
            return Err(HeartError::ConfigError("raw_data.path is empty".to_string()));
        }

        self.processing.validate()?;

        let target = &self.modeling.target;
        if target.is_empty() {
            return Err(HeartError::ConfigError("modeling.target is empty".to_string()));
        }
        let features: HashSet<&String> = self.processing.feature_columns().collect();
        if features.contains(target) {
            return Err(HeartError::ConfigError(format!(
                "target column `{}` is also listed as a feature",
                target
            )));
        }

        let test_size = self.modeling.test_size;
        if !(test_size > 0.0 && test_size < 1.0) {
            return Err(HeartError::ConfigError(format!(
                "modeling.test_size must be in (0, 1), got {}",
                test_size
            )));
        }

        self.classifier.validate()
    }
}

/// Apply one `key.path=value` expression to a TOML table.
///
/// The value is parsed as a TOML value when possible (`0.3`, `true`, `["a", "b"]`),
/// otherwise it is taken as a bare string (`data/heart.csv`).
pub fn apply_override(table: &mut toml::Table, expr: &str) -> Result<()> {
    let (key, raw) = expr.split_once('=').ok_or_else(|| {
        HeartError::ConfigError(format!("override `{}` is not of the form key=value", expr))
    })?;
    let key = key.trim();
    let parts: Vec<&str> = key.split('.').map(str::trim).collect();
    if key.is_empty() || parts.iter().any(|p| p.is_empty()) {
        return Err(HeartError::ConfigError(format!("invalid override key `{}`", key)));
    }

    let (last, parents) = parts
        .split_last()
        .ok_or_else(|| HeartError::ConfigError(format!("invalid override key `{}`", key)))?;

    let mut current = table;
    for part in parents {
        let entry = current
            .entry(part.to_string())
            .or_insert(toml::Value::Table(toml::Table::new()));
        current = match entry {
            toml::Value::Table(inner) => inner,
            _ => {
                return Err(HeartError::ConfigError(format!(
                    "`{}` in override `{}` is not a table",
                    part, key
                )))
            }
        };
    }

    current.insert(last.to_string(), parse_override_value(raw.trim()));
    Ok(())
}

fn parse_override_value(raw: &str) -> toml::Value {
    toml::from_str::<toml::Table>(&format!("value = {}", raw))
        .ok()
        .and_then(|mut t| t.remove("value"))
        .unwrap_or_else(|| toml::Value::String(raw.to_string()))
}
