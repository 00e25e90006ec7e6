//! In-memory storage implementation.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::Result;
use crate::schema::{account_key, settings_key};
use crate::types::Account;
use crate::{AccountStore, ConfigStore};

/// A process-local store. Contents are lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    accounts: RwLock<HashMap<String, Account>>,
    settings: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts.
    #[must_use]
    pub fn account_count(&self) -> usize {
        self.accounts.read().len()
    }
}

impl AccountStore for MemoryStore {
    fn get_account(&self, login: &str) -> Result<Option<Account>> {
        account_key(login)?;
        Ok(self.accounts.read().get(login).cloned())
    }

    fn put_account(&self, account: &Account) -> Result<()> {
        account_key(&account.login)?;
        self.accounts
            .write()
            .insert(account.login.clone(), account.clone());
        Ok(())
    }
}

impl ConfigStore for MemoryStore {
    fn get_config(&self, prefix: &str) -> Result<Option<Vec<u8>>> {
        settings_key(prefix)?;
        Ok(self.settings.read().get(prefix).cloned())
    }

    fn put_config(&self, prefix: &str, value: &[u8]) -> Result<()> {
        settings_key(prefix)?;
        self.settings
            .write()
            .insert(prefix.to_string(), value.to_vec());
        Ok(())
    }
}
