//! Response deadline.
//!
//! Requests still running when the write timeout elapses are dropped and
//! answered with a `408` carrying the same text the bridge uses for a
//! stalled backend.

use std::time::Duration;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use shardgate_queue::QueueError;

use crate::error::ApiError;

/// Middleware bounding the whole request by `limit`.
pub async fn write_deadline(State(limit): State<Duration>, req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    match tokio::time::timeout(limit, next.run(req)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(%method, %path, limit = ?limit, "Write timeout elapsed");
            ApiError::from(QueueError::Timeout(limit)).into_response()
        }
    }
}
