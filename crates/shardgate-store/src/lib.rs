//! Account and settings storage for shardgate.
//!
//! The gateway treats its configuration store as an external collaborator
//! reached through two narrow traits:
//!
//! - [`AccountStore`]: account records keyed by login
//! - [`ConfigStore`]: opaque settings documents keyed by prefix (`router`, `queues`)
//!
//! Two implementations are provided: [`RocksStore`] for a persistent local
//! store and [`MemoryStore`] for ephemeral deployments and tests.
//!
//! # Example
//!
//! ```no_run
//! use shardgate_store::{AccountStore, RocksStore};
//!
//! let store = RocksStore::open("/tmp/shardgate-db").unwrap();
//! let account = store.get_account("alice@example.com").unwrap();
//! assert!(account.is_none());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod memory;
pub mod rocks;
pub mod schema;
pub mod settings;
pub mod types;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use rocks::RocksStore;
pub use settings::{load_or_put, put_settings};
pub use types::Account;

/// Account persistence.
///
/// `get_account` followed by `put_account` is not atomic; callers that check
/// for existence before writing race with concurrent writers.
pub trait AccountStore: Send + Sync {
    /// Get an account by login.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_account(&self, login: &str) -> Result<Option<Account>>;

    /// Insert or overwrite an account record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_account(&self, account: &Account) -> Result<()>;
}

/// Settings persistence, one serialized document per prefix.
pub trait ConfigStore: Send + Sync {
    /// Get the raw settings document stored under `prefix`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_config(&self, prefix: &str) -> Result<Option<Vec<u8>>>;

    /// Store a raw settings document under `prefix`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_config(&self, prefix: &str, value: &[u8]) -> Result<()>;
}

/// A store that holds both accounts and settings.
pub trait Store: AccountStore + ConfigStore {}

impl<T: AccountStore + ConfigStore> Store for T {}
