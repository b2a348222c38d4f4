//! Error types for the server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use super::schema::FieldError;
use crate::error::HeartError;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Request validation failed ({} errors)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Model not loaded")]
    ModelNotLoaded,

    #[error("Not supported: {0}")]
    Unsupported(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<HeartError> for ServerError {
    fn from(err: HeartError) -> Self {
        match err {
            HeartError::Unsupported(msg) => ServerError::Unsupported(msg),
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ServerError::Validation(errors) => {
                tracing::debug!(errors = errors.len(), "Rejected invalid record");
                (StatusCode::UNPROCESSABLE_ENTITY, json!(errors))
            }
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!(msg)),
            ServerError::ModelNotLoaded => (
                StatusCode::SERVICE_UNAVAILABLE,
                json!("Model not loaded"),
            ),
            ServerError::Unsupported(msg) => (StatusCode::NOT_IMPLEMENTED, json!(msg)),
            ServerError::Internal(msg) => {
                tracing::error!(detail = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!("An internal error occurred"),
                )
            }
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
