//! Unified error type for callers driving both stores.
//!
//! Store operations return their narrow error (`StorageError`, `DraftError`);
//! binaries that mix stores, config and file access convert into
//! [`ClientError`] with `?`.

use thiserror::Error;

use crate::config::ConfigError;
use crate::models::DraftError;
use crate::storage::StorageError;

/// Client-level error type.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Persisting or reading a snapshot failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Draft cannot be submitted yet.
    #[error("Draft error: {0}")]
    Draft(#[from] DraftError),

    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// A file to attach could not be read.
    #[error("Attachment error: {0}")]
    Attachment(#[from] std::io::Error),
}

/// Result type alias for `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;
