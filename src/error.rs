use axum::http::StatusCode;
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

/// Standard error type for the EMS backend.
///
/// Error bodies use the flat `{"error": "..."}` shape the admin UI expects,
/// so `BadRequest` and `Unauthorized` carry the exact client-facing message.
#[derive(Debug, Error)]
pub enum EmsError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl EmsError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            EmsError::BadRequest(_) => StatusCode::BAD_REQUEST,
            EmsError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            EmsError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            EmsError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl axum::response::IntoResponse for EmsError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("request failed: {}", self);
        }
        (status, axum::Json(json!({ "error": self.to_string() }))).into_response()
    }
}
