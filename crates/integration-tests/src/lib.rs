//! Integration tests for the marketplace client stores.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p marketplace-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `session_reload` - Session/cart state across simulated page reloads
//! - `product_draft_reload` - Draft persistence, file shadows and discard
//! - `login_flow` - Pending-sync handshake with a stand-in auth collaborator
//! - `file_storage` - Both stores sharing one on-disk storage directory

use std::path::PathBuf;

use marketplace_client::models::AttachedFile;

/// A fresh directory path under the system temp dir, cleared of leftovers.
#[must_use]
pub fn temp_storage_dir(test_name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "marketplace-it-{test_name}-{}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

/// An in-memory PDF-ish product file.
#[must_use]
pub fn product_file(name: &str, size: usize) -> AttachedFile {
    AttachedFile::new(name, Some("application/pdf".to_string()), vec![0u8; size])
}

/// An in-memory PNG-ish image.
#[must_use]
pub fn image_file(name: &str, size: usize) -> AttachedFile {
    AttachedFile::new(name, Some("image/png".to_string()), vec![0u8; size])
}
