//! Store errors.

use thiserror::Error;

/// Result alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Failures of the account and settings store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A login or settings prefix was empty.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// A column family the schema requires is missing from the database.
    #[error("missing column family {0}")]
    MissingColumnFamily(&'static str),

    /// The storage engine failed.
    #[error("database error: {0}")]
    Database(String),

    /// A record or settings document could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<rocksdb::Error> for StoreError {
    fn from(err: rocksdb::Error) -> Self {
        Self::Database(err.into_string())
    }
}
