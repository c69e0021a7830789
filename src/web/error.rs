//! HTTP error responses

use super::pages;
use crate::domain::ClinicError;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

/// Errors a handler can end with
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            WebError::NotFound(detail) => {
                tracing::debug!(detail, "Not found");
                (StatusCode::NOT_FOUND, "The requested page was not found.".to_string())
            }
            WebError::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail.clone()),
            WebError::Internal(detail) => {
                crate::log_error_with_context!(detail, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };
        (status, Html(pages::error_page(status, &message))).into_response()
    }
}

impl From<ClinicError> for WebError {
    fn from(err: ClinicError) -> Self {
        match err {
            ClinicError::NotFound(detail) => WebError::NotFound(detail),
            ClinicError::Validation(detail) => WebError::BadRequest(detail),
            ClinicError::Conflict(kind) => WebError::BadRequest(kind.message().to_string()),
            other => WebError::Internal(other.to_string()),
        }
    }
}
