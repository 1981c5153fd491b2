//! Directory-backed storage backend.
//!
//! Each key is stored as `<dir>/<key>.json`. Writes go to a temporary file
//! first and are then renamed over the target so a crash mid-write never
//! leaves a truncated snapshot behind.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{StorageArea, StorageError};

const EXTENSION: &str = "json";

/// Durable storage rooted at a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
    quota: Option<usize>,
}

impl FileStorage {
    /// Open (creating if needed) a storage directory.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        tracing::debug!(dir = %dir.display(), "Opened file storage");
        Ok(Self { dir, quota: None })
    }

    /// Limit the combined size of all stored values to `quota` bytes.
    #[must_use]
    pub const fn with_quota(mut self, quota: usize) -> Self {
        self.quota = Some(quota);
        self
    }

    /// The directory holding the snapshots.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_owned()));
        }
        Ok(self.dir.join(format!("{key}.{EXTENSION}")))
    }

    /// Bytes used by every stored value except the one at `skip`.
    fn used_bytes(&self, skip: &Path) -> Result<usize, StorageError> {
        let mut total = 0usize;
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path == skip || path.extension().is_none_or(|ext| ext != EXTENSION) {
                continue;
            }
            let len = fs::metadata(&path)?.len();
            total = total.saturating_add(usize::try_from(len).unwrap_or(usize::MAX));
        }
        Ok(total)
    }
}

impl StorageArea for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;

        if let Some(quota) = self.quota {
            if self.used_bytes(&path)?.saturating_add(value.len()) > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_owned(),
                    quota,
                });
            }
        }

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "marketplace-file-storage-{name}-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_round_trip_and_remove() {
        let dir = temp_dir("round-trip");
        let storage = FileStorage::open(&dir).unwrap();

        assert!(storage.get_item("marketplace-session").unwrap().is_none());
        storage.set_item("marketplace-session", "{}").unwrap();
        assert_eq!(
            storage.get_item("marketplace-session").unwrap().as_deref(),
            Some("{}")
        );
        assert!(dir.join("marketplace-session.json").exists());

        storage.remove_item("marketplace-session").unwrap();
        assert!(storage.get_item("marketplace-session").unwrap().is_none());
        storage.remove_item("marketplace-session").unwrap();

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let dir = temp_dir("keys");
        let storage = FileStorage::open(&dir).unwrap();

        for key in ["", "../escape", "a/b", ".hidden"] {
            assert!(matches!(
                storage.set_item(key, "x"),
                Err(StorageError::InvalidKey(_))
            ));
        }

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_quota() {
        let dir = temp_dir("quota");
        let storage = FileStorage::open(&dir).unwrap().with_quota(8);

        storage.set_item("a", "12345").unwrap();
        assert!(matches!(
            storage.set_item("b", "1234"),
            Err(StorageError::QuotaExceeded { quota: 8, .. })
        ));
        // Replacing a value does not count its previous size
        storage.set_item("a", "12345678").unwrap();

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_failed_rename_cleans_up_temp_file() {
        let dir = temp_dir("rename");
        let storage = FileStorage::open(&dir).unwrap();

        // A non-empty directory where the snapshot file should go
        let blocked = dir.join("blocked.json");
        fs::create_dir_all(blocked.join("inner")).unwrap();

        assert!(matches!(
            storage.set_item("blocked", "{}"),
            Err(StorageError::Io(_))
        ));
        assert!(!dir.join("blocked.json.tmp").exists());

        fs::remove_dir_all(&dir).unwrap();
    }
}
