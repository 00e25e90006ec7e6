//! API error types and responses.
//!
//! Every rejection is answered with a `text/plain` body carrying the reason.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use shardgate_auth::AuthError;
use shardgate_core::CoreError;
use shardgate_queue::QueueError;

/// API error type that implements `IntoResponse`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed input.
    #[error("{0}")]
    BadRequest(String),

    /// Missing, malformed or invalid token.
    #[error("{0}")]
    Unauthorized(String),

    /// No handler for the target queue.
    #[error("{0}")]
    NotFound(String),

    /// The backend did not answer in time.
    #[error("{0}")]
    Timeout(String),

    /// A failure reported by the backend, passed through unchanged.
    #[error("{message}")]
    Backend {
        /// Backend-chosen status.
        status: StatusCode,
        /// Backend-chosen message.
        message: String,
    },

    /// The backend could not be reached.
    #[error("{0}")]
    BadGateway(String),

    /// Internal server error.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Get the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
            Self::Backend { status, .. } => *status,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err.http_status_code() {
            400 => Self::BadRequest(err.to_string()),
            401 => Self::Unauthorized(err.to_string()),
            _ => {
                tracing::error!(error = %err, "Account service failure");
                match err {
                    AuthError::AccountWrite(_) | AuthError::Store(_) => {
                        Self::Internal(err.to_string())
                    }
                    _ => Self::Internal("internal error".to_string()),
                }
            }
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<QueueError> for ApiError {
    fn from(err: QueueError) -> Self {
        match err {
            QueueError::Backend { status, message } => Self::Backend {
                status: StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                message,
            },
            QueueError::Timeout(_) => Self::Timeout(err.to_string()),
            QueueError::NoHandler(_) => Self::NotFound(err.to_string()),
            QueueError::Transport(_) => Self::BadGateway(err.to_string()),
        }
    }
}
