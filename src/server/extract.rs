//! Request extractors

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};

use super::error::ServerError;
use super::schema::{FieldError, HeartDiseaseRecord};

/// A request body that passed record validation
#[derive(Debug, Clone)]
pub struct ValidatedRecord(pub HeartDiseaseRecord);

#[axum::async_trait]
impl<S> FromRequest<S> for ValidatedRecord
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ServerError::BadRequest(e.body_text()))?;

        let value: serde_json::Value = serde_json::from_slice(&bytes).map_err(|e| {
            ServerError::Validation(vec![FieldError::body(
                format!("JSON decode error: {}", e),
                "json_invalid",
            )])
        })?;

        HeartDiseaseRecord::from_json(&value)
            .map(ValidatedRecord)
            .map_err(ServerError::Validation)
    }
}
