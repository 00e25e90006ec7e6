//! `RocksDB` storage implementation.
//!
//! Accounts are CBOR-encoded; settings documents are stored as the caller
//! hands them over (JSON, see [`crate::settings`]).

use std::path::Path;
use std::sync::Arc;

use rocksdb::{BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, MultiThreaded, Options};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, StoreError};
use crate::schema::{account_key, all_column_families, cf, settings_key};
use crate::types::Account;
use crate::{AccountStore, ConfigStore};

type Db = DBWithThreadMode<MultiThreaded>;

/// Account and settings store on a local `RocksDB` directory.
pub struct RocksStore {
    db: Arc<Db>,
}

impl RocksStore {
    /// Open the database at `path`, creating it and its column families on
    /// first use.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if `RocksDB` refuses to open the path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        let families = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()));
        let db = Db::open_cf_descriptors(&db_opts, path.as_ref(), families)?;

        tracing::debug!(path = %path.as_ref().display(), "Opened RocksDB store");
        Ok(Self { db: Arc::new(db) })
    }

    fn family(&self, name: &'static str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or(StoreError::MissingColumnFamily(name))
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    ciborium::into_writer(value, &mut out).map_err(|e| StoreError::Serialization(e.to_string()))?;
    Ok(out)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    ciborium::from_reader(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
}

impl AccountStore for RocksStore {
    fn get_account(&self, login: &str) -> Result<Option<Account>> {
        let key = account_key(login)?;
        let family = self.family(cf::ACCOUNTS)?;

        match self.db.get_pinned_cf(&family, key)? {
            Some(bytes) => decode(&bytes).map(Some),
            None => Ok(None),
        }
    }

    fn put_account(&self, account: &Account) -> Result<()> {
        let key = account_key(&account.login)?;
        let family = self.family(cf::ACCOUNTS)?;
        self.db.put_cf(&family, key, encode(account)?)?;
        Ok(())
    }
}

impl ConfigStore for RocksStore {
    fn get_config(&self, prefix: &str) -> Result<Option<Vec<u8>>> {
        let key = settings_key(prefix)?;
        let family = self.family(cf::SETTINGS)?;
        Ok(self.db.get_cf(&family, key)?)
    }

    fn put_config(&self, prefix: &str, value: &[u8]) -> Result<()> {
        let key = settings_key(prefix)?;
        let family = self.family(cf::SETTINGS)?;
        self.db.put_cf(&family, key, value)?;
        Ok(())
    }
}
