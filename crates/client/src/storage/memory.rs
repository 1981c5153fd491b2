//! In-memory storage backend.

use std::cell::RefCell;
use std::collections::HashMap;

use super::{StorageArea, StorageError};

/// A `localStorage` stand-in kept entirely in process memory.
///
/// Share one instance between stores (or between two instances of the same
/// store to simulate a page reload) through `Rc<MemoryStorage>` or `&MemoryStorage`.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    /// Create an empty, unbounded storage area.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty storage area that rejects writes once the combined
    /// size of all keys and values would exceed `quota` bytes.
    #[must_use]
    pub fn with_quota(quota: usize) -> Self {
        Self {
            items: RefCell::new(HashMap::new()),
            quota: Some(quota),
        }
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Combined size in bytes of all keys and values, excluding `skip`.
    fn used_bytes(&self, skip: &str) -> usize {
        self.items
            .borrow()
            .iter()
            .filter(|(k, _)| k.as_str() != skip)
            .fold(0usize, |acc, (k, v)| acc.saturating_add(entry_size(k, v)))
    }
}

fn entry_size(key: &str, value: &str) -> usize {
    key.len().saturating_add(value.len())
}

impl StorageArea for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota {
            if self.used_bytes(key).saturating_add(entry_size(key, value)) > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_owned(),
                    quota,
                });
            }
        }
        self.items
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}
