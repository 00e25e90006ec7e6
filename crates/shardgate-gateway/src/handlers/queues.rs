//! Queue dispatch endpoints.
//!
//! Path variables are resolved against the partition table, the request is
//! normalized and handed to the bridge, and the backend's reply is written
//! back verbatim.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{self, header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use shardgate_core::RouteVars;
use shardgate_queue::QueueBackend;
use shardgate_store::AccountStore;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::normalize;
use crate::state::GatewayState;

/// Raw query pairs in arrival order.
type QueryPairs = Query<Vec<(String, String)>>;

const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// List the registered queue aliases.
///
/// ```text
/// GET /
///
/// Response: 200 OK
/// ["air-bo", "air-bo-view", "manifest"]
/// ```
pub async fn list_queues<B, S>(State(state): State<Arc<GatewayState<B, S>>>) -> Json<Vec<String>>
where
    B: QueueBackend + ?Sized + 'static,
    S: AccountStore + ?Sized + 'static,
{
    Json(
        state
            .resolver
            .table()
            .aliases()
            .map(str::to_string)
            .collect(),
    )
}

/// `/{alias}/{segment}`.
///
/// For a partitioned alias the segment is the dividend (the help route).
/// For a no-party alias it is the resource.
pub async fn dispatch_short<B, S>(
    State(state): State<Arc<GatewayState<B, S>>>,
    Path((alias, segment)): Path<(String, String)>,
    method: http::Method,
    user: AuthUser,
    Query(query): QueryPairs,
    body: Body,
) -> Result<Response, ApiError>
where
    B: QueueBackend + ?Sized + 'static,
    S: AccountStore + ?Sized + 'static,
{
    let vars = if state.resolver.table().partition_count(&alias) > 0 {
        RouteVars::help(alias, segment)
    } else {
        RouteVars::no_party(alias, segment)
    };
    dispatch(&state, vars, &method, &user, query, body).await
}

/// `/{alias}/{dividend}/{resource}`.
pub async fn dispatch_resource<B, S>(
    State(state): State<Arc<GatewayState<B, S>>>,
    Path((alias, dividend, resource)): Path<(String, String, String)>,
    method: http::Method,
    user: AuthUser,
    Query(query): QueryPairs,
    body: Body,
) -> Result<Response, ApiError>
where
    B: QueueBackend + ?Sized + 'static,
    S: AccountStore + ?Sized + 'static,
{
    let vars = RouteVars::partitioned(alias, dividend, resource);
    dispatch(&state, vars, &method, &user, query, body).await
}

/// `/{alias}/{dividend}/{resource}/{id}`.
pub async fn dispatch_item<B, S>(
    State(state): State<Arc<GatewayState<B, S>>>,
    Path((alias, dividend, resource, id)): Path<(String, String, String, String)>,
    method: http::Method,
    user: AuthUser,
    Query(query): QueryPairs,
    body: Body,
) -> Result<Response, ApiError>
where
    B: QueueBackend + ?Sized + 'static,
    S: AccountStore + ?Sized + 'static,
{
    let vars = RouteVars::partitioned(alias, dividend, resource).with_resource_id(id);
    dispatch(&state, vars, &method, &user, query, body).await
}

async fn dispatch<B, S>(
    state: &GatewayState<B, S>,
    vars: RouteVars,
    method: &http::Method,
    user: &AuthUser,
    query: Vec<(String, String)>,
    body: Body,
) -> Result<Response, ApiError>
where
    B: QueueBackend + ?Sized,
    S: AccountStore + ?Sized,
{
    let method = normalize::map_method(method)?;
    let route = state.resolver.resolve(&vars)?;
    let body = normalize::read_body(body).await?;
    let request =
        normalize::build_request(method, &route, normalize::query_map(query), body, user);

    let reply = state.bridge.dispatch(request).await?;
    Ok(into_http(reply))
}

/// Write a backend reply onto an HTTP response.
fn into_http(reply: shardgate_queue::Response) -> Response {
    let status = StatusCode::from_u16(reply.status_code).unwrap_or_else(|_| {
        tracing::warn!(status = reply.status_code, "Backend returned an invalid status");
        StatusCode::BAD_GATEWAY
    });
    let content_type = reply
        .content_type
        .as_deref()
        .and_then(|ct| HeaderValue::from_str(ct).ok())
        .unwrap_or(HeaderValue::from_static(DEFAULT_CONTENT_TYPE));

    (status, [(header::CONTENT_TYPE, content_type)], reply.payload).into_response()
}
