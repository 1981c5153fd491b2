//! Multi-step vendor product draft.
//!
//! Holds the product-creation wizard's [`Draft`] across reloads. Live file
//! handles cannot be persisted, so the snapshot carries only their metadata
//! shadows; a rehydrated draft remembers "a file named X of size Y was
//! attached" but needs the file picked again before submission.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use marketplace_core::{CategoryId, FileMetadata, LicenseType, Price};

use crate::models::{
    Draft, DraftError, DraftUpdate, FileSlot, LAST_STEP, ProductSubmission, STEP_BASIC_INFO,
};
use crate::storage::{StorageArea, StorageError, load_snapshot, or_default, save_snapshot};

/// Default storage key of the draft snapshot.
pub const PRODUCT_DRAFT_STORAGE_KEY: &str = "product-form-storage";

/// Schema version written with the draft snapshot.
const SNAPSHOT_VERSION: u32 = 0;

/// Persisted projection of a [`Draft`].
///
/// File slots are written as `null`/`[]` and ignored on read. A field of the
/// wrong type reads back as its default without affecting the others.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct DraftSnapshot {
    #[serde(deserialize_with = "or_default")]
    name: String,
    #[serde(deserialize_with = "or_default")]
    description: String,
    #[serde(deserialize_with = "or_default")]
    price: Price,
    #[serde(deserialize_with = "or_default")]
    original_price: Option<Price>,
    #[serde(deserialize_with = "or_default")]
    discount_percentage: Option<u8>,
    #[serde(deserialize_with = "or_default")]
    category_id: CategoryId,
    #[serde(deserialize_with = "or_default")]
    requirements: String,
    #[serde(deserialize_with = "or_default")]
    instructions: String,
    #[serde(deserialize_with = "or_default")]
    license_type: LicenseType,
    #[serde(deserialize_with = "or_default")]
    license_duration: Option<u32>,
    #[serde(deserialize_with = "or_default")]
    download_limit: Option<u32>,
    #[serde(deserialize_with = "or_default")]
    tags: Vec<String>,
    #[serde(deserialize_with = "or_default")]
    features: Vec<String>,
    #[serde(deserialize_with = "or_default")]
    is_link: bool,
    #[serde(deserialize_with = "or_default")]
    link_url: String,
    file: Option<serde_json::Value>,
    thumbnail: Option<serde_json::Value>,
    preview: Option<serde_json::Value>,
    images: Vec<serde_json::Value>,
    #[serde(deserialize_with = "or_default")]
    file_metadata: Option<FileMetadata>,
    #[serde(deserialize_with = "or_default")]
    thumbnail_metadata: Option<FileMetadata>,
    #[serde(deserialize_with = "or_default")]
    preview_metadata: Option<FileMetadata>,
    #[serde(deserialize_with = "or_default")]
    images_metadata: Vec<FileMetadata>,
}

impl From<&Draft> for DraftSnapshot {
    fn from(draft: &Draft) -> Self {
        Self {
            name: draft.name.clone(),
            description: draft.description.clone(),
            price: draft.price,
            original_price: draft.original_price,
            discount_percentage: draft.discount_percentage,
            category_id: draft.category_id.clone(),
            requirements: draft.requirements.clone(),
            instructions: draft.instructions.clone(),
            license_type: draft.license_type,
            license_duration: draft.license_duration,
            download_limit: draft.download_limit,
            tags: draft.tags.clone(),
            features: draft.features.clone(),
            is_link: draft.is_link,
            link_url: draft.link_url.clone(),
            file: None,
            thumbnail: None,
            preview: None,
            images: Vec::new(),
            file_metadata: draft.file_metadata.clone(),
            thumbnail_metadata: draft.thumbnail_metadata.clone(),
            preview_metadata: draft.preview_metadata.clone(),
            images_metadata: draft.images_metadata.clone(),
        }
    }
}

impl From<DraftSnapshot> for Draft {
    fn from(snapshot: DraftSnapshot) -> Self {
        Self {
            name: snapshot.name,
            description: snapshot.description,
            price: snapshot.price,
            original_price: snapshot.original_price,
            discount_percentage: snapshot.discount_percentage,
            category_id: snapshot.category_id,
            requirements: snapshot.requirements,
            instructions: snapshot.instructions,
            license_type: snapshot.license_type,
            license_duration: snapshot.license_duration,
            download_limit: snapshot.download_limit,
            tags: snapshot.tags,
            features: snapshot.features,
            is_link: snapshot.is_link,
            link_url: snapshot.link_url,
            file: None,
            thumbnail: None,
            preview: None,
            images: Vec::new(),
            file_metadata: snapshot.file_metadata,
            thumbnail_metadata: snapshot.thumbnail_metadata,
            preview_metadata: snapshot.preview_metadata,
            images_metadata: snapshot.images_metadata,
        }
    }
}

/// Product draft store bound to a storage backend.
#[derive(Debug)]
pub struct ProductDraftStore<S> {
    storage: S,
    key: String,
    draft: Draft,
    current_step: u8,
}

impl<S: StorageArea> ProductDraftStore<S> {
    /// Open the store under the default key, rehydrating any snapshot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if storage cannot be read.
    pub fn open(storage: S) -> Result<Self, StorageError> {
        Self::open_with_key(storage, PRODUCT_DRAFT_STORAGE_KEY)
    }

    /// Open the store under a custom storage key.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if storage cannot be read.
    pub fn open_with_key(storage: S, key: impl AsRef<str>) -> Result<Self, StorageError> {
        let mut store = Self {
            storage,
            key: key.as_ref().to_owned(),
            draft: Draft::default(),
            current_step: STEP_BASIC_INFO,
        };
        store.reload()?;
        Ok(store)
    }

    /// Re-read the snapshot, replacing in-memory state and dropping any live
    /// file handles. The wizard returns to the first step.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if storage cannot be read.
    pub fn reload(&mut self) -> Result<(), StorageError> {
        let snapshot: Option<DraftSnapshot> =
            load_snapshot(&self.storage, &self.key, SNAPSHOT_VERSION)?;
        self.draft = snapshot.map(Draft::from).unwrap_or_default();
        self.current_step = STEP_BASIC_INFO;

        let detached = self.draft.detached_slots();
        if !detached.is_empty() {
            tracing::debug!(?detached, "Draft rehydrated without live files");
        }
        Ok(())
    }

    /// The current draft.
    #[must_use]
    pub const fn draft(&self) -> &Draft {
        &self.draft
    }

    /// The storage backend.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Merge `update` into the draft and persist it.
    ///
    /// File slots present in the update get their metadata recomputed in the
    /// same step.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be written. The draft
    /// has already been updated in memory at that point.
    pub fn update_form_data(&mut self, update: DraftUpdate) -> Result<(), StorageError> {
        self.draft.apply(update);
        self.persist()
    }

    /// Whether `step` validates against the current draft.
    #[must_use]
    pub fn is_step_valid(&self, step: u8) -> bool {
        self.draft.is_step_valid(step)
    }

    /// Restore defaults in memory. The stored snapshot stays until the next
    /// mutation overwrites it.
    pub fn reset_form(&mut self) {
        tracing::debug!("Reset draft form");
        self.draft = Draft::default();
        self.current_step = STEP_BASIC_INFO;
    }

    /// Erase the stored snapshot and restore defaults in memory.
    ///
    /// Used when a draft is abandoned or was submitted successfully.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be removed.
    #[instrument(skip(self))]
    pub fn clear_persisted_data(&mut self) -> Result<(), StorageError> {
        self.storage.remove_item(&self.key)?;
        self.reset_form();
        tracing::info!("Discarded product draft");
        Ok(())
    }

    // =========================================================================
    // Wizard navigation
    // =========================================================================

    /// The wizard step being edited, starting at 1.
    #[must_use]
    pub const fn current_step(&self) -> u8 {
        self.current_step
    }

    /// Advance one step if the current one validates.
    pub fn next_step(&mut self) -> bool {
        if self.current_step >= LAST_STEP || !self.is_step_valid(self.current_step) {
            return false;
        }
        self.current_step += 1;
        true
    }

    /// Go back one step.
    pub fn previous_step(&mut self) -> bool {
        if self.current_step <= STEP_BASIC_INFO {
            return false;
        }
        self.current_step -= 1;
        true
    }

    /// Jump to `step`. Going back is always allowed; going forward requires
    /// every step in between to validate.
    pub fn go_to_step(&mut self, step: u8) -> bool {
        if !(STEP_BASIC_INFO..=LAST_STEP).contains(&step) {
            return false;
        }
        if step > self.current_step && !(self.current_step..step).all(|s| self.is_step_valid(s)) {
            return false;
        }
        self.current_step = step;
        true
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Whether any previously attached file must be picked again.
    #[must_use]
    pub fn needs_file_reattachment(&self) -> bool {
        !self.draft.detached_slots().is_empty()
    }

    /// Slots whose file must be picked again.
    #[must_use]
    pub fn detached_slots(&self) -> Vec<FileSlot> {
        self.draft.detached_slots()
    }

    /// Assemble the payload for the product submission API.
    ///
    /// # Errors
    ///
    /// Returns `DraftError` if a step is incomplete or a required file is
    /// only known by its metadata.
    pub fn submission(&self) -> Result<ProductSubmission, DraftError> {
        self.draft.to_submission()
    }

    fn persist(&self) -> Result<(), StorageError> {
        let snapshot = DraftSnapshot::from(&self.draft);
        save_snapshot(&self.storage, &self.key, SNAPSHOT_VERSION, &snapshot)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::{AttachedFile, STEP_DELIVERY, STEP_REVIEW};
    use crate::storage::MemoryStorage;

    fn pdf() -> AttachedFile {
        AttachedFile::new("guide.pdf", Some("application/pdf".into()), vec![7u8; 2048])
    }

    fn png() -> AttachedFile {
        AttachedFile::new("cover.png", Some("image/png".into()), vec![1u8; 32])
    }

    fn basic_info() -> DraftUpdate {
        DraftUpdate::new()
            .name("Guide")
            .description("x")
            .price(Price::from(100))
            .category_id(CategoryId::new("c1"))
    }

    #[test]
    fn test_update_persists_metadata_not_files() {
        let storage = MemoryStorage::new();
        let mut store = ProductDraftStore::open(&storage).unwrap();
        store
            .update_form_data(basic_info().file(Some(pdf())).thumbnail(Some(png())))
            .unwrap();

        let raw = storage.get_item(PRODUCT_DRAFT_STORAGE_KEY).unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let state = &json["state"];
        assert_eq!(state["name"], "Guide");
        assert_eq!(state["categoryId"], "c1");
        assert_eq!(state["licenseType"], "SINGLE_USE");
        assert!(state["file"].is_null());
        assert!(state["thumbnail"].is_null());
        assert_eq!(state["images"], serde_json::json!([]));
        assert_eq!(state["fileMetadata"]["name"], "guide.pdf");
        assert_eq!(state["fileMetadata"]["size"], 2048);
        assert_eq!(state["fileMetadata"]["type"], "application/pdf");
        assert!(state["previewMetadata"].is_null());
    }

    #[test]
    fn test_rehydrated_draft_needs_files() {
        let storage = MemoryStorage::new();
        let mut store = ProductDraftStore::open(&storage).unwrap();
        store
            .update_form_data(basic_info().file(Some(pdf())).thumbnail(Some(png())))
            .unwrap();
        assert!(!store.needs_file_reattachment());

        let reloaded = ProductDraftStore::open(&storage).unwrap();
        assert_eq!(reloaded.draft().name, "Guide");
        assert!(reloaded.draft().file.is_none());
        assert!(reloaded.draft().thumbnail.is_none());
        assert_eq!(reloaded.draft().file_metadata.as_ref().unwrap().size, 2048);
        assert!(reloaded.needs_file_reattachment());
        assert_eq!(
            reloaded.detached_slots(),
            vec![FileSlot::File, FileSlot::Thumbnail]
        );
        // Metadata alone still satisfies the step gate
        assert!(reloaded.is_step_valid(STEP_DELIVERY));
        assert_eq!(
            reloaded.submission(),
            Err(DraftError::MissingFile(FileSlot::File))
        );
    }

    #[test]
    fn test_reset_form_keeps_snapshot() {
        let storage = MemoryStorage::new();
        let mut store = ProductDraftStore::open(&storage).unwrap();
        store.update_form_data(basic_info()).unwrap();

        store.reset_form();
        assert_eq!(store.draft(), &Draft::default());
        assert!(storage.get_item(PRODUCT_DRAFT_STORAGE_KEY).unwrap().is_some());

        store.reload().unwrap();
        assert_eq!(store.draft().name, "Guide");
    }

    #[test]
    fn test_clear_persisted_data() {
        let storage = MemoryStorage::new();
        let mut store = ProductDraftStore::open(&storage).unwrap();
        store
            .update_form_data(basic_info().thumbnail(Some(png())))
            .unwrap();

        store.clear_persisted_data().unwrap();
        assert_eq!(store.draft(), &Draft::default());
        assert!(storage.get_item(PRODUCT_DRAFT_STORAGE_KEY).unwrap().is_none());

        let reloaded = ProductDraftStore::open(&storage).unwrap();
        assert_eq!(reloaded.draft(), &Draft::default());
        assert!(reloaded.draft().thumbnail_metadata.is_none());
    }

    #[test]
    fn test_wizard_navigation() {
        let mut store = ProductDraftStore::open(MemoryStorage::new()).unwrap();
        assert_eq!(store.current_step(), STEP_BASIC_INFO);
        assert!(!store.next_step());
        assert!(!store.go_to_step(STEP_REVIEW));

        store.update_form_data(basic_info()).unwrap();
        assert!(store.next_step());
        assert_eq!(store.current_step(), STEP_DELIVERY);
        assert!(!store.next_step());

        store
            .update_form_data(
                DraftUpdate::new()
                    .is_link(true)
                    .link_url("https://x.com/a")
                    .thumbnail(Some(png())),
            )
            .unwrap();
        assert!(store.next_step());
        assert_eq!(store.current_step(), STEP_REVIEW);
        assert!(!store.next_step());

        assert!(store.go_to_step(STEP_BASIC_INFO));
        assert!(!store.previous_step());
        assert!(store.go_to_step(STEP_REVIEW));
        assert!(!store.go_to_step(4));
        assert!(store.previous_step());
        assert_eq!(store.current_step(), STEP_DELIVERY);
    }

    #[test]
    fn test_incompatible_field_keeps_rest_of_draft() {
        let storage = MemoryStorage::new();
        storage
            .set_item(
                PRODUCT_DRAFT_STORAGE_KEY,
                r#"{"state":{"name":"Guide","description":"x","price":"100","categoryId":"c1","discountPercentage":12.5,"tags":"pdf","licenseType":"LIFETIME","thumbnailMetadata":{"name":"cover.png","size":32}},"version":0}"#,
            )
            .unwrap();
        let store = ProductDraftStore::open(&storage).unwrap();
        let draft = store.draft();
        assert_eq!(draft.name, "Guide");
        assert_eq!(draft.price, Price::from(100));
        assert_eq!(draft.discount_percentage, None);
        assert!(draft.tags.is_empty());
        assert_eq!(draft.license_type, LicenseType::SingleUse);
        assert_eq!(draft.thumbnail_metadata.as_ref().unwrap().size, 32);
        assert!(store.is_step_valid(STEP_BASIC_INFO));
    }

    #[test]
    fn test_quota_failure_keeps_memory_update() {
        let storage = MemoryStorage::with_quota(64);
        let mut store = ProductDraftStore::open(&storage).unwrap();
        let result = store.update_form_data(basic_info());
        assert!(matches!(result, Err(StorageError::QuotaExceeded { .. })));
        assert_eq!(store.draft().name, "Guide");
    }
}
