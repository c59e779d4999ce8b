//! Error responses for the HTTP API
//!
//! Every failure is rendered as `{"error": {"code": ..., "message": ...}}`.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use roster_core::ErrorCode;
use serde::Serialize;
use thiserror::Error;

/// Errors returned by request handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed body, missing field or bad query string
    #[error("{0}")]
    BadRequest(String),

    /// The request outlived `server.request_timeout`
    #[error("request exceeded {}ms deadline", .0.as_millis())]
    Timeout(Duration),

    #[error(transparent)]
    Domain(#[from] roster_core::Error),
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    code: &'a str,
    message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
}

/// HTTP status for a domain error code
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::TeamExists => StatusCode::BAD_REQUEST,
        ErrorCode::PrExists
        | ErrorCode::PrMerged
        | ErrorCode::NotAssigned
        | ErrorCode::NoCandidate
        | ErrorCode::UserExists => StatusCode::CONFLICT,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", m.clone()),
            ApiError::Timeout(_) => {
                tracing::warn!(error = %self, "Request timed out");
                (StatusCode::SERVICE_UNAVAILABLE, "TIMEOUT", self.to_string())
            }
            ApiError::Domain(err) => match err.code() {
                Some(code) => {
                    tracing::warn!(code = %code, error = %err, "Request rejected");
                    (status_for(code), code.as_str(), err.to_string())
                }
                None if matches!(err, roster_core::Error::Cancelled) => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "CANCELLED",
                    err.to_string(),
                ),
                None => {
                    tracing::error!(error = %err, "Request failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL",
                        "internal error".to_string(),
                    )
                }
            },
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}
