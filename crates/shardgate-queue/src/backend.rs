//! The queue backend seam.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Request, Response};

/// Something that can answer a normalized request.
///
/// Implementations may take arbitrarily long; callers bound the wait with
/// [`crate::Bridge`].
#[async_trait]
pub trait QueueBackend: Send + Sync {
    /// Deliver `request` and wait for its reply.
    ///
    /// # Errors
    ///
    /// Returns a `QueueError` if the queue is unknown, unreachable, or the
    /// handler reports a failure.
    async fn invoke(&self, request: Request) -> Result<Response>;
}

#[async_trait]
impl<T: QueueBackend + ?Sized> QueueBackend for Arc<T> {
    async fn invoke(&self, request: Request) -> Result<Response> {
        (**self).invoke(request).await
    }
}
