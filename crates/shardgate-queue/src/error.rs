//! Queue error types.

use std::time::Duration;

use thiserror::Error;

/// A result type using `QueueError`.
pub type Result<T> = std::result::Result<T, QueueError>;

/// Errors that can occur while dispatching to a queue.
#[derive(Debug, Clone, Error)]
pub enum QueueError {
    /// The backend handled the request and reported a failure.
    #[error("{message}")]
    Backend {
        /// Status code chosen by the backend.
        status: u16,
        /// Message chosen by the backend.
        message: String,
    },

    /// No reply arrived within the bound.
    #[error("Request Timeout: no reply within {}ms", .0.as_millis())]
    Timeout(Duration),

    /// No handler is registered for the queue id.
    #[error("no handler registered for queue {0}")]
    NoHandler(String),

    /// The backend could not be reached.
    #[error("queue transport failure: {0}")]
    Transport(String),
}

impl QueueError {
    /// Shorthand for a backend-reported failure.
    #[must_use]
    pub fn backend(status: u16, message: impl Into<String>) -> Self {
        Self::Backend {
            status,
            message: message.into(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::Backend { status, .. } => *status,
            Self::Timeout(_) => 408,
            Self::NoHandler(_) => 404,
            Self::Transport(_) => 502,
        }
    }
}
