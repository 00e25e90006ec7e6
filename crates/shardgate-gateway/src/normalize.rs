//! Request normalization.
//!
//! Turns the pieces of an HTTP request into a transport-agnostic
//! [`shardgate_queue::Request`].

use axum::body::Body;
use axum::http;
use futures::StreamExt;

use shardgate_core::Route;
use shardgate_queue::{Method, QueryMap, Request};

use crate::auth::AuthUser;
use crate::error::ApiError;

/// Attachment key carrying the authenticated subject id.
pub const USER_ATTACHMENT: &str = "user";

/// Map an HTTP verb onto the queue method table.
///
/// # Errors
///
/// Returns `BadRequest` for verbs outside `GET`, `POST`, `PUT` and `PATCH`.
pub fn map_method(method: &http::Method) -> Result<Method, ApiError> {
    match *method {
        http::Method::GET => Ok(Method::Get),
        http::Method::POST => Ok(Method::Post),
        http::Method::PUT => Ok(Method::Put),
        http::Method::PATCH => Ok(Method::Patch),
        _ => Err(ApiError::BadRequest(format!("unsupported method {method}"))),
    }
}

/// Collect query pairs into a multi-map, keeping repeated values in order.
#[must_use]
pub fn query_map(pairs: Vec<(String, String)>) -> QueryMap {
    let mut query = QueryMap::new();
    for (key, value) in pairs {
        query.entry(key).or_default().push(value);
    }
    query
}

/// Drain a request body into memory.
///
/// # Errors
///
/// Returns `BadRequest` naming the bytes read so far if the stream fails.
pub async fn read_body(body: Body) -> Result<Vec<u8>, ApiError> {
    let mut stream = body.into_data_stream();
    let mut buf = Vec::new();
    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(bytes) => buf.extend_from_slice(&bytes),
            Err(err) => {
                tracing::debug!(error = %err, read = buf.len(), "Body read failed");
                return Err(ApiError::BadRequest(format!(
                    "can't read request body: {}",
                    String::from_utf8_lossy(&buf)
                )));
            }
        }
    }
    Ok(buf)
}

/// Build the queue request for a resolved route.
#[must_use]
pub fn build_request(
    method: Method,
    route: &Route,
    query: QueryMap,
    body: Vec<u8>,
    user: &AuthUser,
) -> Request {
    Request::for_route(method, route)
        .with_query(query)
        .with_body(body)
        .with_attachment(USER_ATTACHMENT, user.subject.to_string())
}
