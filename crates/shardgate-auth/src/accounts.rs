//! Account registration and login.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use shardgate_store::{Account, AccountStore};

use crate::error::{AuthError, Result};
use crate::jwt::{TokenIssuer, TokenResponse};
use crate::password;
use crate::subject::SubjectPolicy;

/// Login and password as posted by the client.
#[derive(Clone, Default, Deserialize)]
pub struct Credentials {
    /// Account login.
    #[serde(default)]
    pub login: String,
    /// Plaintext password.
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    /// Build credentials from a login and a password.
    #[must_use]
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Registers accounts and logs them in, minting a token on success.
///
/// The existence check in [`AccountService::register`] and the following
/// write are separate store calls. Two concurrent registrations of the same
/// login can both pass the check, and the later write wins.
pub struct AccountService<S: ?Sized> {
    store: Arc<S>,
    issuer: Arc<TokenIssuer>,
    policy: SubjectPolicy,
}

impl<S: ?Sized> Clone for AccountService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            issuer: Arc::clone(&self.issuer),
            policy: self.policy,
        }
    }
}

impl<S> AccountService<S>
where
    S: AccountStore + ?Sized,
{
    /// Create a service over `store`, minting with `issuer`.
    #[must_use]
    pub fn new(store: Arc<S>, issuer: Arc<TokenIssuer>, policy: SubjectPolicy) -> Self {
        Self {
            store,
            issuer,
            policy,
        }
    }

    /// The issuer used to mint and verify tokens.
    #[must_use]
    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    /// The active subject policy.
    #[must_use]
    pub const fn policy(&self) -> SubjectPolicy {
        self.policy
    }

    /// Register a new account and mint its first token.
    ///
    /// # Errors
    ///
    /// Returns a policy error for a bad password, `LoginInUse` if the login
    /// exists, and `AccountWrite` if the record cannot be stored.
    pub async fn register(&self, credentials: Credentials) -> Result<TokenResponse> {
        password::check_policy(&credentials.password)?;
        if credentials.login.is_empty() {
            return Err(AuthError::LoginRequired);
        }

        if self.store.get_account(&credentials.login)?.is_some() {
            return Err(AuthError::LoginInUse);
        }

        let plaintext = credentials.password;
        let hash = tokio::task::spawn_blocking(move || password::hash_password(&plaintext))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))??;

        let account = Account::new(credentials.login, hash);
        self.store
            .put_account(&account)
            .map_err(AuthError::AccountWrite)?;

        tracing::info!(login = %account.login, "Account registered");
        self.mint_for(&account.login)
    }

    /// Check credentials and mint a fresh token.
    ///
    /// # Errors
    ///
    /// Returns `LoginNotFound` for an unknown or empty login and
    /// `InvalidCredentials` if the password does not match.
    pub async fn login(&self, credentials: Credentials) -> Result<TokenResponse> {
        // Empty logins can never be stored, so they are simply unknown.
        if credentials.login.is_empty() {
            return Err(AuthError::LoginNotFound);
        }

        let account = self
            .store
            .get_account(&credentials.login)?
            .ok_or(AuthError::LoginNotFound)?;

        let plaintext = credentials.password;
        let stored = account.password_hash;
        let matches =
            tokio::task::spawn_blocking(move || password::verify_password(&plaintext, &stored))
                .await
                .map_err(|e| AuthError::Hashing(e.to_string()))?;

        if !matches {
            tracing::debug!(login = %account.login, "Password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        self.mint_for(&account.login)
    }

    fn mint_for(&self, login: &str) -> Result<TokenResponse> {
        self.issuer.mint(self.policy.subject_for(login))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use shardgate_store::MemoryStore;

    use crate::jwt::TOKEN_TTL_HOURS;

    fn service(policy: SubjectPolicy) -> AccountService<MemoryStore> {
        let issuer = Arc::new(TokenIssuer::new(
            b"test-secret",
            Duration::hours(TOKEN_TTL_HOURS),
        ));
        AccountService::new(Arc::new(MemoryStore::new()), issuer, policy)
    }

    #[tokio::test]
    async fn short_password_rejected() {
        let svc = service(SubjectPolicy::RandomNonce);
        let err = svc
            .register(Credentials::new("alice", "abc"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Password should be longer than 6 symbols");
    }

    #[tokio::test]
    async fn register_returns_72_hour_token() {
        let svc = service(SubjectPolicy::RandomNonce);
        let before = Utc::now().timestamp();
        let resp = svc
            .register(Credentials::new("alice", "abcdef"))
            .await
            .unwrap();

        let expected = before + 72 * 3600;
        assert!((resp.exp - expected).abs() <= 2);
        assert!(svc.issuer().verify(&resp.token).is_ok());
    }

    #[tokio::test]
    async fn duplicate_login_rejected() {
        let svc = service(SubjectPolicy::RandomNonce);
        svc.register(Credentials::new("alice", "abcdef"))
            .await
            .unwrap();
        let err = svc
            .register(Credentials::new("alice", "ghijkl"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::LoginInUse));
    }

    #[tokio::test]
    async fn stored_password_is_hashed() {
        let store = Arc::new(MemoryStore::new());
        let issuer = Arc::new(TokenIssuer::new(b"s", Duration::hours(1)));
        let svc = AccountService::new(Arc::clone(&store), issuer, SubjectPolicy::default());
        svc.register(Credentials::new("alice", "abcdef"))
            .await
            .unwrap();

        let account = store.get_account("alice").unwrap().unwrap();
        assert_ne!(account.password_hash, "abcdef");
    }

    #[tokio::test]
    async fn login_outcomes() {
        let svc = service(SubjectPolicy::RandomNonce);
        let first = svc
            .register(Credentials::new("alice", "abcdef"))
            .await
            .unwrap();

        let err = svc
            .login(Credentials::new("bob", "abcdef"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Login address not found");

        let err = svc.login(Credentials::new("", "abcdef")).await.unwrap_err();
        assert!(matches!(err, AuthError::LoginNotFound));

        let err = svc
            .login(Credentials::new("alice", "wrong-password"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid login credentials. Please try again");

        let fresh = svc
            .login(Credentials::new("alice", "abcdef"))
            .await
            .unwrap();
        assert_ne!(fresh.token, first.token);
    }

    #[tokio::test]
    async fn stable_policy_keeps_subject() {
        let svc = service(SubjectPolicy::StableAccountId);
        let a = svc
            .register(Credentials::new("alice", "abcdef"))
            .await
            .unwrap();
        let b = svc
            .login(Credentials::new("alice", "abcdef"))
            .await
            .unwrap();

        let ca = svc.issuer().verify(&a.token).unwrap();
        let cb = svc.issuer().verify(&b.token).unwrap();
        assert_eq!(ca.subject, cb.subject);
        assert_ne!(ca.jti, cb.jti);
    }

    #[test]
    fn debug_redacts_password() {
        let rendered = format!("{:?}", Credentials::new("alice", "hunter22"));
        assert!(!rendered.contains("hunter22"));
    }
}
