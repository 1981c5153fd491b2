//! Command implementations.

use marketplace_client::ClientError;
use marketplace_client::config::{ClientConfig, ConfigError};
use marketplace_client::models::DraftError;
use marketplace_client::storage::{FileStorage, StorageError};
use marketplace_client::stores::{ProductDraftStore, SessionStore};
use serde::Serialize;
use thiserror::Error;

pub mod draft;
pub mod session;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Store, config or attachment failure.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Output could not be encoded.
    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}

impl From<StorageError> for CliError {
    fn from(e: StorageError) -> Self {
        Self::Client(e.into())
    }
}

impl From<DraftError> for CliError {
    fn from(e: DraftError) -> Self {
        Self::Client(e.into())
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::Client(e.into())
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::Client(e.into())
    }
}

/// Configuration and storage shared by all commands.
pub struct Context {
    config: ClientConfig,
    storage: FileStorage,
}

impl Context {
    /// Load configuration and open the storage directory.
    ///
    /// # Errors
    ///
    /// Returns `CliError` if configuration is invalid or the directory
    /// cannot be created.
    pub fn from_env() -> Result<Self, CliError> {
        let config = ClientConfig::from_env()?;
        let storage = config.open_storage()?;
        tracing::debug!(dir = %storage.dir().display(), "Using storage directory");
        Ok(Self { config, storage })
    }

    fn session_store(&self) -> Result<SessionStore<&FileStorage>, StorageError> {
        SessionStore::open_with_key(&self.storage, &self.config.session_key)
    }

    fn draft_store(&self) -> Result<ProductDraftStore<&FileStorage>, StorageError> {
        ProductDraftStore::open_with_key(&self.storage, &self.config.draft_key)
    }
}

/// Print a value as pretty JSON on stdout.
#[allow(clippy::print_stdout)]
fn print_json(value: &impl Serialize) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
