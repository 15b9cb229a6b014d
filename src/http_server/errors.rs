//! HTTP error mapping
//!
//! Malformed input is the caller's fault (400); everything else surfaces
//! as 500 with the most specific message available. Ledger reverts carry
//! their domain reason verbatim, so a failed delete reports e.g.
//! "Hostel does not exist" rather than a generic failure string.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::reconcile::SyncError;

/// HTTP-layer error
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Sync(#[from] SyncError),
}

impl ApiError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::Sync(SyncError::InvalidInput(message.into()))
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Sync(SyncError::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            ApiError::Sync(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self {
            error: err.to_string(),
            code: err.status_code().as_u16(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::from(&self));
        (status, body).into_response()
    }
}
