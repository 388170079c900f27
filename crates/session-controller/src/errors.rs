//! Session Controller error types.
//!
//! State-machine and membership violations are typed outcomes that callers
//! branch on; nothing here is used as control flow elsewhere. Every rejected
//! action carries a reason usable for a user-facing message. Internal detail
//! is logged server-side and a generic message is returned to the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Session Controller error type.
///
/// Maps to HTTP status codes:
/// - NotFound: 404
/// - MeetingClosed, MeetingCancelled: 410 Gone (terminal; clients redirect
///   away rather than retrying)
/// - InvalidPassword: 401 (recoverable; clients re-prompt)
/// - PermissionDenied: 403
/// - TokenIssuanceFailed: 503 (transient; retryable without re-joining)
/// - BadRequest: 400, Conflict: 409, Internal: 500
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("This meeting has ended")]
    MeetingClosed,

    #[error("This meeting was cancelled")]
    MeetingCancelled,

    #[error("Incorrect meeting password")]
    InvalidPassword,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Token issuance failed: {0}")]
    TokenIssuanceFailed(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error")]
    Internal,
}

impl SessionError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            SessionError::NotFound(_) => 404,
            SessionError::MeetingClosed | SessionError::MeetingCancelled => 410,
            SessionError::Unauthenticated(_) | SessionError::InvalidPassword => 401,
            SessionError::PermissionDenied(_) => 403,
            SessionError::TokenIssuanceFailed(_) => 503,
            SessionError::BadRequest(_) => 400,
            SessionError::Conflict(_) => 409,
            SessionError::Internal => 500,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            SessionError::NotFound(resource) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", resource.clone())
            }
            SessionError::Unauthenticated(reason) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", reason.clone())
            }
            SessionError::MeetingClosed => (
                StatusCode::GONE,
                "MEETING_CLOSED",
                "This meeting has ended".to_string(),
            ),
            SessionError::MeetingCancelled => (
                StatusCode::GONE,
                "MEETING_CANCELLED",
                "This meeting was cancelled".to_string(),
            ),
            SessionError::InvalidPassword => (
                StatusCode::UNAUTHORIZED,
                "INVALID_PASSWORD",
                "Incorrect meeting password".to_string(),
            ),
            SessionError::PermissionDenied(reason) => {
                (StatusCode::FORBIDDEN, "PERMISSION_DENIED", reason.clone())
            }
            SessionError::TokenIssuanceFailed(reason) => {
                // Log actual reason server-side, return generic message
                tracing::warn!(target: "sc.tokens", reason = %reason, "Token issuance failed");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "TOKEN_ISSUANCE_FAILED",
                    "Could not issue a session credential. Please retry.".to_string(),
                )
            }
            SessionError::BadRequest(reason) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", reason.clone())
            }
            SessionError::Conflict(reason) => (StatusCode::CONFLICT, "CONFLICT", reason.clone()),
            SessionError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            ),
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(error_response)).into_response()
    }
}
