//! Token authentication for shardgate.
//!
//! This crate owns everything behind the gateway's auth gate:
//!
//! - password policy and Argon2 hashing
//! - HS256 token minting and verification with a 72-hour lifetime
//! - the [`SubjectPolicy`] deciding what subject id a token carries
//! - [`AccountService`], which registers accounts and logs them in
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use shardgate_auth::{AccountService, AuthConfig, Credentials};
//! use shardgate_store::MemoryStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AuthConfig::from_env("SHARDGATE_JWT_SECRET")?;
//! let accounts = AccountService::new(
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(config.issuer()),
//!     config.subject_policy,
//! );
//!
//! let token = accounts.register(Credentials::new("alice", "s3cret!")).await?;
//! let claims = accounts.issuer().verify(&token.token)?;
//! println!("subject {}", claims.subject);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod accounts;
pub mod error;
pub mod jwt;
pub mod password;
pub mod subject;

use std::fmt;

use chrono::Duration;

pub use accounts::{AccountService, Credentials};
pub use error::{AuthError, Result};
pub use jwt::{Claims, TokenIssuer, TokenResponse, TOKEN_TTL_HOURS};
pub use subject::SubjectPolicy;

/// Default name of the environment variable holding the signing secret.
pub const DEFAULT_SECRET_ENV: &str = "SHARDGATE_JWT_SECRET";

/// Configuration for token minting.
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC signing secret.
    pub secret: String,
    /// Token lifetime.
    pub token_ttl: Duration,
    /// Source of the token subject id.
    pub subject_policy: SubjectPolicy,
}

impl AuthConfig {
    /// Build a configuration around `secret` with the default lifetime.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingSecret` if `secret` is empty.
    pub fn new(secret: impl Into<String>) -> Result<Self> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(AuthError::MissingSecret("empty secret".to_string()));
        }
        Ok(Self {
            secret,
            token_ttl: Duration::hours(TOKEN_TTL_HOURS),
            subject_policy: SubjectPolicy::default(),
        })
    }

    /// Read the signing secret from the environment variable `var`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingSecret` if the variable is unset or empty.
    pub fn from_env(var: &str) -> Result<Self> {
        let secret = std::env::var(var).map_err(|_| AuthError::MissingSecret(var.to_string()))?;
        Self::new(secret).map_err(|_| AuthError::MissingSecret(var.to_string()))
    }

    /// Set the subject policy.
    #[must_use]
    pub fn with_subject_policy(mut self, policy: SubjectPolicy) -> Self {
        self.subject_policy = policy;
        self
    }

    /// Build the token issuer for this configuration.
    #[must_use]
    pub fn issuer(&self) -> TokenIssuer {
        TokenIssuer::new(self.secret.as_bytes(), self.token_ttl)
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("subject_policy", &self.subject_policy)
            .finish()
    }
}
