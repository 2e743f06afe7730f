//! Error taxonomy for the HTTP boundary
//!
//! Every failure class maps to a fixed, non-descriptive public message.
//! The real cause is recorded through tracing only; no internal detail or
//! stack information is ever reflected to the caller.

use axum::{
    http::{header::RETRY_AFTER, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouterError {
    /// Malformed or unsafe request input; the detail is logged, not echoed.
    #[error("invalid request: {0}")]
    Validation(&'static str),

    /// The client identity is over its abuse threshold.
    #[error("rate limit exceeded")]
    RateLimited { retry_after: u64 },

    /// The delegated asset store has nothing under the requested path.
    #[error("asset not found")]
    AssetNotFound,

    /// Anything unexpected. Cause goes to the log, never to the body.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for RouterError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(detail) => {
                tracing::debug!("rejected request: {}", detail);
                (StatusCode::BAD_REQUEST, "Invalid search request").into_response()
            }
            Self::RateLimited { retry_after } => (
                StatusCode::TOO_MANY_REQUESTS,
                [(RETRY_AFTER, retry_after.to_string())],
                "Too many requests",
            )
                .into_response(),
            Self::AssetNotFound => (StatusCode::NOT_FOUND, "Not found").into_response(),
            Self::Internal(cause) => {
                tracing::error!("internal error: {:#}", cause);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}
