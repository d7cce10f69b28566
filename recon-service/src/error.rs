//! Service error handling

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use thiserror::Error;

/// Result type for service operations
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Service errors
///
/// Ingestion failures map to client errors so a broken upload is never
/// mistaken for an empty-but-valid reconciliation window.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Bad request (unparseable window, unknown status filter)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Ingestion failed
    #[error("Ingestion failed: {0}")]
    Ingest(#[from] recon_ingest::IngestError),

    /// Core error
    #[error("Reconciliation error: {0}")]
    Core(#[from] recon_core::Error),

    /// Alerting/reporting failed
    #[error("Alerting error: {0}")]
    Alert(#[from] recon_alerts::AlertError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServiceError::BadRequest(_) | ServiceError::Ingest(_) => StatusCode::BAD_REQUEST,
            ServiceError::Core(_) | ServiceError::Alert(_) | ServiceError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(serde_json::json!({
            "error": self.to_string(),
            "timestamp": Utc::now(),
        }));

        (status, body).into_response()
    }
}
