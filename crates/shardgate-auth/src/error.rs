//! Authentication error types.
//!
//! The display strings of the client-facing variants are the exact bodies
//! returned over HTTP.

use thiserror::Error;

use shardgate_store::StoreError;

/// A result type using `AuthError`.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors that can occur during registration, login or token verification.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Registration without a password.
    #[error("Password is required")]
    PasswordRequired,

    /// Registration with a password under the minimum length.
    #[error("Password should be longer than 6 symbols")]
    PasswordTooShort,

    /// Registration or login without a login.
    #[error("Login is required")]
    LoginRequired,

    /// An account already exists under the requested login.
    #[error("Login address already in use")]
    LoginInUse,

    /// No account exists under the supplied login.
    #[error("Login address not found")]
    LoginNotFound,

    /// The password does not match the stored hash.
    #[error("Invalid login credentials. Please try again")]
    InvalidCredentials,

    /// No `Authorization` header on a protected request.
    #[error("missing auth token")]
    MissingToken,

    /// The `Authorization` header is not of the form `Bearer <token>`.
    #[error("Invalid/Malformed auth token")]
    MalformedHeader,

    /// The token does not parse or its signature does not verify.
    #[error("Malformed authentication token")]
    MalformedToken,

    /// The signature verifies but the claims are expired or incomplete.
    #[error("Token is not valid")]
    TokenInvalid,

    /// The account record could not be written.
    #[error("Can't put account to KV")]
    AccountWrite(#[source] StoreError),

    /// The account store could not be read.
    #[error("Can't get account from KV")]
    Store(#[from] StoreError),

    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    Hashing(String),

    /// Token signing failed.
    #[error("token signing failed: {0}")]
    Signing(String),

    /// The signing secret is missing or empty.
    #[error("signing secret not configured: {0}")]
    MissingSecret(String),
}

impl AuthError {
    /// Returns `true` for errors caused by the server rather than the caller.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::AccountWrite(_)
                | Self::Store(_)
                | Self::Hashing(_)
                | Self::Signing(_)
                | Self::MissingSecret(_)
        )
    }

    /// Returns the appropriate HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::PasswordRequired
            | Self::PasswordTooShort
            | Self::LoginRequired
            | Self::LoginInUse
            | Self::LoginNotFound
            | Self::InvalidCredentials => 400,
            Self::MissingToken | Self::MalformedHeader | Self::MalformedToken | Self::TokenInvalid => {
                401
            }
            Self::AccountWrite(_)
            | Self::Store(_)
            | Self::Hashing(_)
            | Self::Signing(_)
            | Self::MissingSecret(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_errors_are_bad_requests() {
        assert_eq!(AuthError::PasswordTooShort.http_status_code(), 400);
        assert_eq!(AuthError::LoginInUse.http_status_code(), 400);
        assert_eq!(AuthError::InvalidCredentials.http_status_code(), 400);
    }

    #[test]
    fn gate_errors_are_unauthorized() {
        assert_eq!(AuthError::MissingToken.http_status_code(), 401);
        assert_eq!(AuthError::MalformedHeader.http_status_code(), 401);
        assert_eq!(AuthError::MalformedToken.http_status_code(), 401);
        assert_eq!(AuthError::TokenInvalid.http_status_code(), 401);
    }

    #[test]
    fn storage_errors_hide_details() {
        let err = AuthError::AccountWrite(StoreError::Database("disk full".into()));
        assert_eq!(err.http_status_code(), 500);
        assert!(err.is_internal());
        assert_eq!(err.to_string(), "Can't put account to KV");
    }

    #[test]
    fn messages_match_wire_text() {
        assert_eq!(
            AuthError::PasswordTooShort.to_string(),
            "Password should be longer than 6 symbols"
        );
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "Invalid login credentials. Please try again"
        );
    }
}
