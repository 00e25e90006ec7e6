//! Domain types stored in the database.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An account record.
///
/// Created on registration, read on every login, never deleted by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique login, used as the store key.
    pub login: String,
    /// Salted password hash in PHC string format.
    pub password_hash: String,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Create an account record stamped with the current time.
    #[must_use]
    pub fn new(login: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password_hash: password_hash.into(),
            created_at: Utc::now(),
        }
    }
}
