//! Durable key/value storage for store snapshots.
//!
//! Both stores write a JSON projection of their state into a [`StorageArea`]
//! after every mutation and read it back once when they are opened. The trait
//! mirrors the browser's `localStorage` surface (`getItem`, `setItem`,
//! `removeItem`) so that any backend offering string values per key fits.
//!
//! # Backends
//!
//! - [`MemoryStorage`] - in-process map with an optional byte quota (tests,
//!   private sessions)
//! - [`FileStorage`] - one JSON file per key under a directory
//!
//! # Snapshot format
//!
//! Values are wrapped in an envelope carrying a schema version:
//!
//! ```json
//! {"state": {"sessionId": "session_1700000000000_k3j9x0abc", "cartItems": []}, "version": 0}
//! ```

use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Errors raised by storage backends.
///
/// Stores never swallow these: a failed save is returned to the caller of
/// the mutating operation.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Writing the value would exceed the backend's byte quota.
    #[error("storage quota of {quota} bytes exceeded while writing '{key}'")]
    QuotaExceeded {
        /// Key being written.
        key: String,
        /// Configured quota in bytes.
        quota: usize,
    },

    /// Key cannot be mapped onto the backend.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

/// A string key/value area with `localStorage` semantics.
pub trait StorageArea {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend rejects the write.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be modified.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: StorageArea + ?Sized> StorageArea for &T {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }
}

impl<T: StorageArea + ?Sized> StorageArea for Rc<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }
}

/// Versioned wrapper written around every snapshot.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    state: T,
    #[serde(default)]
    version: u32,
}

/// Borrowing twin of [`Envelope`] used on the write path.
#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    state: &'a T,
    version: u32,
}

/// Encode `state` and write it under `key`.
///
/// # Errors
///
/// Returns `StorageError` if encoding fails or the backend rejects the write.
pub fn save_snapshot<T: Serialize>(
    storage: &impl StorageArea,
    key: &str,
    version: u32,
    state: &T,
) -> Result<(), StorageError> {
    let json = serde_json::to_string(&EnvelopeRef { state, version })?;
    storage.set_item(key, &json)
}

/// Read and decode the snapshot stored under `key`.
///
/// Returns `Ok(None)` when nothing is stored, when the stored value is not a
/// decodable envelope, or when it was written by a newer schema version than
/// `max_version`. Undecodable snapshots are logged and then treated as absent
/// so that the caller starts from defaults.
///
/// # Errors
///
/// Returns `StorageError` only if the backend itself cannot be read.
pub fn load_snapshot<T: DeserializeOwned>(
    storage: &impl StorageArea,
    key: &str,
    max_version: u32,
) -> Result<Option<T>, StorageError> {
    let Some(raw) = storage.get_item(key)? else {
        return Ok(None);
    };

    match serde_json::from_str::<Envelope<T>>(&raw) {
        Ok(envelope) if envelope.version > max_version => {
            tracing::warn!(
                key,
                version = envelope.version,
                max_version,
                "Discarding snapshot written by a newer version"
            );
            Ok(None)
        }
        Ok(envelope) => Ok(Some(envelope.state)),
        Err(e) => {
            tracing::warn!(key, error = %e, "Discarding unreadable snapshot");
            Ok(None)
        }
    }
}

/// Decode one snapshot field, falling back to `T::default()` when the stored
/// value has an incompatible shape.
///
/// Meant for `#[serde(default, deserialize_with = "crate::storage::or_default")]`
/// on snapshot fields, so that one bad field does not discard the rest of the
/// snapshot.
///
/// # Errors
///
/// Returns an error only if the input is not well-formed.
pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Replacing incompatible snapshot field with its default");
        T::default()
    }))
}
