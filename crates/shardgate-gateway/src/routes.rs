//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;

use axum::handler::Handler;
use axum::middleware;
use axum::routing::{get, post, MethodRouter};
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use shardgate_queue::QueueBackend;
use shardgate_store::AccountStore;

use crate::auth;
use crate::cors;
use crate::deadline;
use crate::handlers::{accounts, queues};
use crate::state::GatewayState;

/// Create the gateway router with all routes and middleware.
///
/// Every route is served both at the root and under `/api`.
///
/// # Routes
///
/// ## Public
/// - `POST /user/new` - Register, answers `{token, exp}`
/// - `POST /user/login` - Log in, answers `{token, exp}`
/// - `OPTIONS *` - CORS preflight, empty `200`
///
/// ## Authenticated
/// - `GET /` - Queue aliases
/// - `GET|POST|PUT|PATCH /:alias/:dividend` - Partition help
/// - `GET|POST|PUT|PATCH /:alias/:resource` - No-party dispatch
/// - `GET|POST|PUT|PATCH /:alias/:dividend/:resource` - Partitioned dispatch
/// - `GET|POST|PUT|PATCH /:alias/:dividend/:resource/:id` - Partitioned item
pub fn create_router<B, S>(state: GatewayState<B, S>) -> Router
where
    B: QueueBackend + ?Sized + 'static,
    S: AccountStore + ?Sized + 'static,
{
    let max_body_bytes = state.config.max_body_bytes;
    let write_timeout = state.config.write_timeout();
    let state = Arc::new(state);

    let api = api_routes::<B, S>();

    Router::new()
        .merge(api.clone())
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth::require_token::<B, S>,
        ))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(middleware::from_fn_with_state(
            write_timeout,
            deadline::write_deadline,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(cors::cors))
        .with_state(state)
}

fn api_routes<B, S>() -> Router<Arc<GatewayState<B, S>>>
where
    B: QueueBackend + ?Sized + 'static,
    S: AccountStore + ?Sized + 'static,
{
    Router::new()
        .route("/", get(queues::list_queues::<B, S>))
        .route("/user/new", post(accounts::register::<B, S>))
        .route("/user/login", post(accounts::login::<B, S>))
        .route("/:alias/:segment", dispatch(queues::dispatch_short::<B, S>))
        .route(
            "/:alias/:dividend/:resource",
            dispatch(queues::dispatch_resource::<B, S>),
        )
        .route(
            "/:alias/:dividend/:resource/:id",
            dispatch(queues::dispatch_item::<B, S>),
        )
}

/// Route the four dispatchable verbs to `handler`.
fn dispatch<H, T, St>(handler: H) -> MethodRouter<St>
where
    H: Handler<T, St>,
    T: 'static,
    St: Clone + Send + Sync + 'static,
{
    get(handler.clone())
        .post(handler.clone())
        .put(handler.clone())
        .patch(handler)
}
