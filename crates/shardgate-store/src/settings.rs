//! Typed settings on top of [`ConfigStore`].
//!
//! Settings are stored as JSON so operators can inspect them with any tool.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, StoreError};
use crate::ConfigStore;

/// Load the settings stored under `prefix`, or store and return `default()`
/// when nothing is there yet.
///
/// Stored settings take precedence over the supplied defaults.
///
/// # Errors
///
/// Returns an error if the store fails or the stored document does not
/// deserialize into `T`.
pub fn load_or_put<S, T, F>(store: &S, prefix: &str, default: F) -> Result<T>
where
    S: ConfigStore + ?Sized,
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> T,
{
    if let Some(raw) = store.get_config(prefix)? {
        let settings =
            serde_json::from_slice(&raw).map_err(|e| StoreError::Serialization(e.to_string()))?;
        tracing::debug!(prefix, "Loaded settings from store");
        return Ok(settings);
    }

    tracing::info!(prefix, "No stored settings found, using defaults");
    let settings = default();
    put_settings(store, prefix, &settings)?;
    Ok(settings)
}

/// Serialize `settings` and store them under `prefix`.
///
/// # Errors
///
/// Returns an error if serialization or the store write fails.
pub fn put_settings<S, T>(store: &S, prefix: &str, settings: &T) -> Result<()>
where
    S: ConfigStore + ?Sized,
    T: Serialize,
{
    let raw = serde_json::to_vec(settings).map_err(|e| StoreError::Serialization(e.to_string()))?;
    store.put_config(prefix, &raw)
}
