//! Application state management

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::error;

use crate::inference::{load_predictor, Predictor};

/// Application state shared across handlers.
///
/// The model is loaded once at startup and only read afterwards.
pub struct AppState {
    pub model: Option<Arc<dyn Predictor>>,
    pub model_path: Option<PathBuf>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// State serving an already loaded model
    pub fn with_model(model: Arc<dyn Predictor>) -> Self {
        Self {
            model: Some(model),
            model_path: None,
            started_at: Utc::now(),
        }
    }

    /// State without a model; health reports unavailable
    pub fn unloaded() -> Self {
        Self {
            model: None,
            model_path: None,
            started_at: Utc::now(),
        }
    }

    /// Load the model at `path`. A load failure is logged and leaves the
    /// state without a model.
    pub fn load_from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let model = match load_predictor(path) {
            Ok(model) => Some(model),
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to load model, serving as unhealthy");
                None
            }
        };

        Self {
            model,
            model_path: Some(path.to_path_buf()),
            started_at: Utc::now(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.model.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_file_leaves_state_unloaded() {
        let state = AppState::load_from_path("no/such/model.json");
        assert!(!state.is_ready());
        assert_eq!(state.model_path, Some(PathBuf::from("no/such/model.json")));
    }

    #[test]
    fn test_unloaded() {
        assert!(!AppState::unloaded().is_ready());
    }
}
