//! Column families and key encoding.

use crate::error::{Result, StoreError};

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Account records, keyed by login.
    pub const ACCOUNTS: &str = "accounts";

    /// Settings documents, keyed by prefix.
    pub const SETTINGS: &str = "settings";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![cf::ACCOUNTS, cf::SETTINGS]
}

/// Encode an account key (the login bytes).
///
/// # Errors
///
/// Returns `StoreError::InvalidKey` for an empty login.
pub fn account_key(login: &str) -> Result<Vec<u8>> {
    non_empty(login, "login")
}

/// Encode a settings key (the prefix bytes).
///
/// # Errors
///
/// Returns `StoreError::InvalidKey` for an empty prefix.
pub fn settings_key(prefix: &str) -> Result<Vec<u8>> {
    non_empty(prefix, "settings prefix")
}

fn non_empty(value: &str, what: &str) -> Result<Vec<u8>> {
    if value.is_empty() {
        return Err(StoreError::InvalidKey(format!("{what} must not be empty")));
    }
    Ok(value.as_bytes().to_vec())
}
