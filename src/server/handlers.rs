//! HTTP request handlers

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::inference::Predictor;

use super::error::{Result, ServerError};
use super::extract::ValidatedRecord;
use super::schema::HeartDiseaseRecord;
use super::state::AppState;

/// Body of a successful prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    #[serde(rename = "HeartDisease")]
    pub heart_disease: u8,
    #[serde(rename = "Probability-positive")]
    pub probability_positive: f64,
    #[serde(rename = "Probability-negative")]
    pub probability_negative: f64,
}

fn loaded_model(state: &AppState) -> Result<&Arc<dyn Predictor>> {
    state.model.as_ref().ok_or(ServerError::ModelNotLoaded)
}

/// Liveness: 200 only when a model is in memory
pub async fn health_check(State(state): State<Arc<AppState>>) -> Response {
    if state.is_ready() {
        let uptime = chrono::Utc::now().signed_duration_since(state.started_at);
        (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "ok",
                "version": env!("CARGO_PKG_VERSION"),
                "uptime_secs": uptime.num_seconds(),
            })),
        )
            .into_response()
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({
                "status": "unavailable",
                "detail": "Model not loaded",
            })),
        )
            .into_response()
    }
}

/// Predict the label and class probabilities of one record
pub async fn predict(
    State(state): State<Arc<AppState>>,
    ValidatedRecord(record): ValidatedRecord,
) -> Result<Json<PredictionResponse>> {
    let model = loaded_model(&state)?;
    let df = HeartDiseaseRecord::to_dataframe(std::slice::from_ref(&record))?;

    let labels = model.predict(&df)?;
    let proba = model.predict_proba(&df)?;

    let heart_disease = *labels
        .get(0)
        .ok_or_else(|| ServerError::Internal("model returned no label".to_string()))?;
    if proba.nrows() < 1 || proba.ncols() != 2 {
        return Err(ServerError::Internal(format!(
            "model returned probabilities of shape {:?}",
            proba.dim()
        )));
    }

    let response = PredictionResponse {
        heart_disease,
        probability_positive: proba[[0, 1]],
        probability_negative: proba[[0, 0]],
    };
    debug!(
        label = response.heart_disease,
        probability = response.probability_positive,
        "Prediction served"
    );
    Ok(Json(response))
}

/// Per-feature log-odds contributions for one record
pub async fn explain(
    State(state): State<Arc<AppState>>,
    ValidatedRecord(record): ValidatedRecord,
) -> Result<Json<BTreeMap<String, f64>>> {
    let model = loaded_model(&state)?;
    let df = HeartDiseaseRecord::to_dataframe(std::slice::from_ref(&record))?;

    let explanation = model
        .explain(&df)?
        .into_iter()
        .next()
        .ok_or_else(|| ServerError::Internal("model returned no explanation".to_string()))?;

    Ok(Json(explanation.to_map()))
}
