//! Storage
//!
//! String-keyed JSON persistence. The storefront keeps each collection under its own key
//! and rewrites the whole collection on every mutation.

use std::rc::Rc;

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::warn;

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Storage keys used by the storefront.
pub mod keys {
    /// Custom cart collection
    pub const CART_CUSTOM: &str = "atelier_cart_custom";

    /// Catalog cart collection
    pub const CART_CATALOG: &str = "atelier_cart_catalog";

    /// Order log
    pub const ORDERS: &str = "atelier_orders";

    /// Store settings
    pub const SETTINGS: &str = "atelier_settings";
}

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backend IO failure
    #[error("storage IO failed for key {key}: {source}")]
    Io {
        /// Key being accessed
        key: String,
        /// Underlying error
        source: std::io::Error,
    },

    /// Stored value could not be decoded or a value could not be encoded
    #[error("invalid JSON for key {key}: {source}")]
    Json {
        /// Key being accessed
        key: String,
        /// Underlying error
        source: serde_json::Error,
    },

    /// Key is not usable by the backend
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// Backend refused the write
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// A synchronous string key-value store.
///
/// Writes are assumed durable once they return.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore {
    /// Read the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Rc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Decode the JSON value stored under `key`.
///
/// # Errors
///
/// Returns an error if the backend fails or the value is not valid JSON for `T`.
pub fn load_json<T, S>(store: &S, key: &str) -> Result<Option<T>, StorageError>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };

    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StorageError::Json {
            key: key.to_string(),
            source,
        })
}

/// Encode `value` as JSON and store it under `key`.
///
/// # Errors
///
/// Returns an error if encoding or the backend write fails.
pub fn save_json<T, S>(store: &S, key: &str, value: &T) -> Result<(), StorageError>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(value).map_err(|source| StorageError::Json {
        key: key.to_string(),
        source,
    })?;

    store.set(key, &raw)
}

/// Decode the JSON value stored under `key`, recovering with `T::default()`.
///
/// Missing keys are silent; unreadable or corrupt values are logged.
pub fn load_or_default<T, S>(store: &S, key: &str) -> T
where
    T: DeserializeOwned + Default,
    S: KeyValueStore + ?Sized,
{
    match load_json(store, key) {
        Ok(Some(value)) => value,
        Ok(None) => T::default(),
        Err(err) => {
            warn!(key, %err, "stored value unreadable, starting empty");

            T::default()
        }
    }
}
