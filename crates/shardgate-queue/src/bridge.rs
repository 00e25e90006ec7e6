//! Bounded wait on a queue backend.
//!
//! The bridge makes exactly one backend call per request and never retries:
//! queue handlers are not assumed to be idempotent. A call that outlives the
//! timeout is abandoned from the caller's side, but the backend may still
//! complete it.

use std::sync::Arc;
use std::time::Duration;

use crate::backend::QueueBackend;
use crate::error::{QueueError, Result};
use crate::types::{Request, Response};

/// Default bound on a single dispatch.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Dispatches requests to a backend with a bounded wait.
pub struct Bridge<B: ?Sized> {
    backend: Arc<B>,
    timeout: Duration,
}

impl<B: ?Sized> Clone for Bridge<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            timeout: self.timeout,
        }
    }
}

impl<B> Bridge<B>
where
    B: QueueBackend + ?Sized,
{
    /// Create a bridge with [`DEFAULT_TIMEOUT`].
    #[must_use]
    pub fn new(backend: Arc<B>) -> Self {
        Self::with_timeout(backend, DEFAULT_TIMEOUT)
    }

    /// Create a bridge with an explicit timeout.
    #[must_use]
    pub fn with_timeout(backend: Arc<B>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    /// The dispatch bound.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Submit `request` and wait at most [`Bridge::timeout`] for the reply.
    ///
    /// # Errors
    ///
    /// Returns `QueueError::Timeout` if no reply arrives in time, and the
    /// backend's own error unchanged otherwise.
    pub async fn dispatch(&self, request: Request) -> Result<Response> {
        let queue_id = request.queue_id.clone();
        let partition = request.partition_number;

        match tokio::time::timeout(self.timeout, self.backend.invoke(request)).await {
            Ok(Ok(response)) => {
                tracing::debug!(
                    queue_id = %queue_id,
                    partition,
                    status = response.status_code,
                    "Dispatch completed"
                );
                Ok(response)
            }
            Ok(Err(err)) => {
                tracing::warn!(
                    queue_id = %queue_id,
                    partition,
                    error = %err,
                    "Queue backend failure"
                );
                Err(err)
            }
            Err(_) => {
                tracing::warn!(
                    queue_id = %queue_id,
                    partition,
                    timeout_ms = self.timeout.as_millis(),
                    "Dispatch timed out"
                );
                Err(QueueError::Timeout(self.timeout))
            }
        }
    }
}
