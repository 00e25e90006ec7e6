//! The bearer-token gate.
//!
//! Every route except registration and login requires
//! `Authorization: Bearer <token>`. A verified token leaves an [`AuthUser`]
//! in the request extensions for the handlers below.

use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::{header, Method};
use axum::middleware::Next;
use axum::response::Response;

use shardgate_auth::{AuthError, Claims};
use shardgate_queue::QueueBackend;
use shardgate_store::AccountStore;

use crate::error::ApiError;
use crate::state::GatewayState;

/// Paths served without a token.
pub const EXEMPT_PATHS: [&str; 4] = ["/user/new", "/user/login", "/api/user/new", "/api/user/login"];

/// The caller behind a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    /// Subject id from the token.
    pub subject: u64,
    /// Token id.
    pub token_id: String,
}

impl AuthUser {
    /// Create an `AuthUser` from verified claims.
    #[must_use]
    pub fn from_claims(claims: Claims) -> Self {
        Self {
            subject: claims.subject,
            token_id: claims.jti,
        }
    }
}

/// Returns `true` if `path` bypasses the gate.
#[must_use]
pub fn is_exempt(method: &Method, path: &str) -> bool {
    method == Method::OPTIONS || EXEMPT_PATHS.contains(&path)
}

/// Extract the token from an `Authorization` header value.
///
/// # Errors
///
/// Returns `MalformedHeader` unless the value is exactly two space-separated
/// parts, the first being `Bearer`.
pub fn bearer_token(value: &str) -> Result<&str, AuthError> {
    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) => Ok(token),
        _ => Err(AuthError::MalformedHeader),
    }
}

/// Middleware enforcing the token gate.
///
/// # Errors
///
/// Returns `401` with the gate's reason when the token is missing or invalid.
pub async fn require_token<B, S>(
    State(state): State<Arc<GatewayState<B, S>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError>
where
    B: QueueBackend + ?Sized + 'static,
    S: AccountStore + ?Sized + 'static,
{
    if is_exempt(req.method(), req.uri().path()) {
        return Ok(next.run(req).await);
    }

    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::MalformedHeader)?;
    let token = bearer_token(value)?;

    let user = AuthUser::from_claims(state.accounts.issuer().verify(token)?);
    tracing::debug!(
        subject = user.subject,
        token_id = %user.token_id,
        "Authorized request"
    );

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

#[axum::async_trait]
impl<St> FromRequestParts<St> for AuthUser
where
    St: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &St) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(|| AuthError::MissingToken.into())
    }
}
