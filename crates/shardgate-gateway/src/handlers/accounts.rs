//! Registration and login.
//!
//! Both endpoints sit outside the token gate and answer `{token, exp}`.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;

use shardgate_auth::{Credentials, TokenResponse};
use shardgate_queue::QueueBackend;
use shardgate_store::AccountStore;

use crate::error::ApiError;
use crate::state::GatewayState;

/// Decode a credentials body; any JSON error is reported as `invalid request`.
fn credentials(body: &[u8]) -> Result<Credentials, ApiError> {
    serde_json::from_slice(body).map_err(|err| {
        tracing::debug!(error = %err, "Rejected credentials body");
        ApiError::BadRequest("invalid request".to_string())
    })
}

/// Register a new account.
///
/// ```text
/// POST /user/new
/// {"login": "ann", "password": "secret1"}
///
/// Response: 200 OK
/// {"token": "eyJ...", "exp": 1700259200}
/// ```
pub async fn register<B, S>(
    State(state): State<Arc<GatewayState<B, S>>>,
    body: Bytes,
) -> Result<Json<TokenResponse>, ApiError>
where
    B: QueueBackend + ?Sized + 'static,
    S: AccountStore + ?Sized + 'static,
{
    let credentials = credentials(&body)?;
    let token = state.accounts.register(credentials).await?;
    Ok(Json(token))
}

/// Log in to an existing account.
pub async fn login<B, S>(
    State(state): State<Arc<GatewayState<B, S>>>,
    body: Bytes,
) -> Result<Json<TokenResponse>, ApiError>
where
    B: QueueBackend + ?Sized + 'static,
    S: AccountStore + ?Sized + 'static,
{
    let credentials = credentials(&body)?;
    let token = state.accounts.login(credentials).await?;
    Ok(Json(token))
}
