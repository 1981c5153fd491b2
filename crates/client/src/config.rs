//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `MARKETPLACE_STORAGE_DIR` - Directory holding store snapshots (default: `.marketplace`)
//! - `MARKETPLACE_STORAGE_QUOTA_BYTES` - Byte quota across all snapshots (default: unlimited)
//! - `MARKETPLACE_SESSION_KEY` - Storage key of the session snapshot (default: `marketplace-session`)
//! - `MARKETPLACE_DRAFT_KEY` - Storage key of the product draft snapshot (default: `product-form-storage`)

use std::path::PathBuf;

use thiserror::Error;

use crate::storage::{FileStorage, StorageError};
use crate::stores::{PRODUCT_DRAFT_STORAGE_KEY, SESSION_STORAGE_KEY};

const DEFAULT_STORAGE_DIR: &str = ".marketplace";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Directory holding store snapshots
    pub storage_dir: PathBuf,
    /// Optional byte quota across all snapshots
    pub storage_quota: Option<usize>,
    /// Storage key of the session snapshot
    pub session_key: String,
    /// Storage key of the product draft snapshot
    pub draft_key: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            storage_quota: None,
            session_key: SESSION_STORAGE_KEY.to_string(),
            draft_key: PRODUCT_DRAFT_STORAGE_KEY.to_string(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let storage_dir = PathBuf::from(get_or_default(
            &lookup,
            "MARKETPLACE_STORAGE_DIR",
            DEFAULT_STORAGE_DIR,
        ));
        let storage_quota = lookup("MARKETPLACE_STORAGE_QUOTA_BYTES")
            .map(|raw| parse_quota(&raw))
            .transpose()?;
        let session_key = get_or_default(&lookup, "MARKETPLACE_SESSION_KEY", SESSION_STORAGE_KEY);
        let draft_key = get_or_default(&lookup, "MARKETPLACE_DRAFT_KEY", PRODUCT_DRAFT_STORAGE_KEY);

        if session_key == draft_key {
            return Err(ConfigError::InvalidEnvVar(
                "MARKETPLACE_DRAFT_KEY".to_string(),
                "must differ from MARKETPLACE_SESSION_KEY".to_string(),
            ));
        }

        Ok(Self {
            storage_dir,
            storage_quota,
            session_key,
            draft_key,
        })
    }

    /// Open the file-backed storage described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the storage directory cannot be created.
    pub fn open_storage(&self) -> Result<FileStorage, StorageError> {
        let storage = FileStorage::open(&self.storage_dir)?;
        Ok(match self.storage_quota {
            Some(quota) => storage.with_quota(quota),
            None => storage,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a variable with a default value, treating blank values as unset.
fn get_or_default(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_quota(raw: &str) -> Result<usize, ConfigError> {
    let invalid = |reason: String| {
        ConfigError::InvalidEnvVar("MARKETPLACE_STORAGE_QUOTA_BYTES".to_string(), reason)
    };
    match raw.trim().parse::<usize>() {
        Ok(0) => Err(invalid("must be greater than zero".to_string())),
        Ok(quota) => Ok(quota),
        Err(e) => Err(invalid(e.to_string())),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.session_key, "marketplace-session");
        assert_eq!(config.draft_key, "product-form-storage");
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("MARKETPLACE_STORAGE_DIR", "/tmp/mp"),
            ("MARKETPLACE_STORAGE_QUOTA_BYTES", "5242880"),
            ("MARKETPLACE_SESSION_KEY", "s"),
            ("MARKETPLACE_DRAFT_KEY", "d"),
        ]))
        .unwrap();
        assert_eq!(config.storage_dir, PathBuf::from("/tmp/mp"));
        assert_eq!(config.storage_quota, Some(5_242_880));
        assert_eq!(config.session_key, "s");
        assert_eq!(config.draft_key, "d");
    }

    #[test]
    fn test_invalid_quota() {
        for raw in ["0", "-1", "lots"] {
            let result =
                ClientConfig::from_lookup(lookup(&[("MARKETPLACE_STORAGE_QUOTA_BYTES", raw)]));
            assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
        }
    }

    #[test]
    fn test_keys_must_differ() {
        let result = ClientConfig::from_lookup(lookup(&[
            ("MARKETPLACE_SESSION_KEY", "same"),
            ("MARKETPLACE_DRAFT_KEY", "same"),
        ]));
        assert!(result.is_err());
    }
}
