//! HS256 token minting and verification.
//!
//! Tokens are stateless: there is no revocation list, and a token stays
//! valid until its `exp` second is reached.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AuthError, Result};

/// Token lifetime in hours.
pub const TOKEN_TTL_HOURS: i64 = 72;

/// Claims carried by a shardgate token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject id, see [`crate::SubjectPolicy`].
    #[serde(rename = "UserId")]
    pub subject: u64,
    /// Expiry as a unix timestamp in seconds.
    pub exp: i64,
    /// Unique token id.
    pub jti: String,
}

/// Claims as they arrive, before completeness is checked.
#[derive(Debug, Deserialize)]
struct RawClaims {
    #[serde(rename = "UserId")]
    subject: Option<u64>,
    exp: Option<i64>,
    #[serde(default)]
    jti: String,
}

/// The body returned by registration and login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The signed token.
    pub token: String,
    /// Expiry as a unix timestamp in seconds.
    pub exp: i64,
}

/// Mints and verifies tokens with a shared HMAC secret.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    /// Create an issuer for `secret` with the given token lifetime.
    #[must_use]
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Token lifetime.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mint a token for `subject` expiring one TTL from now.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Signing` if encoding fails.
    pub fn mint(&self, subject: u64) -> Result<TokenResponse> {
        self.mint_at(subject, Utc::now())
    }

    /// Mint a token as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Signing` if encoding fails.
    pub fn mint_at(&self, subject: u64, now: DateTime<Utc>) -> Result<TokenResponse> {
        let claims = Claims {
            subject,
            exp: (now + self.ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Signing(e.to_string()))?;

        Ok(TokenResponse {
            token,
            exp: claims.exp,
        })
    }

    /// Verify a token against the current time.
    ///
    /// # Errors
    ///
    /// See [`TokenIssuer::verify_at`].
    pub fn verify(&self, token: &str) -> Result<Claims> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// Returns `MalformedToken` if the token does not decode or its signature
    /// does not match, and `TokenInvalid` if the claims are incomplete or
    /// `now` is at or past `exp`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below against the injected clock, without leeway.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let raw = decode::<RawClaims>(token, &self.decoding, &validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "Token rejected");
                AuthError::MalformedToken
            })?
            .claims;

        let (Some(subject), Some(exp)) = (raw.subject, raw.exp) else {
            return Err(AuthError::TokenInvalid);
        };
        if now.timestamp() >= exp {
            return Err(AuthError::TokenInvalid);
        }

        Ok(Claims {
            subject,
            exp,
            jti: raw.jti,
        })
    }
}
