//! Integration tests for product draft persistence.

use marketplace_client::models::{
    Draft, DraftError, DraftUpdate, FileSlot, STEP_BASIC_INFO, STEP_DELIVERY, STEP_REVIEW,
};
use marketplace_client::storage::{MemoryStorage, StorageArea};
use marketplace_client::stores::{PRODUCT_DRAFT_STORAGE_KEY, ProductDraftStore};
use marketplace_core::{CategoryId, LicenseType, Price};
use marketplace_integration_tests::{image_file, product_file};

fn complete_basic_info() -> DraftUpdate {
    DraftUpdate::new()
        .name("Guide")
        .description("x")
        .price(Price::from(100))
        .category_id(CategoryId::new("c1"))
}

#[test]
fn test_scalar_fields_survive_reload() {
    let storage = MemoryStorage::new();
    let mut store = ProductDraftStore::open(&storage).unwrap();
    store
        .update_form_data(
            complete_basic_info()
                .original_price(Some(Price::from(150)))
                .license_type(LicenseType::TimeLimited)
                .license_duration(Some(30))
                .download_limit(Some(5))
                .tags(vec!["pdf".into(), "guide".into()])
                .features(vec!["Lifetime updates".into()])
                .requirements("A PDF reader")
                .instructions("Download and open"),
        )
        .unwrap();

    let reloaded = ProductDraftStore::open(&storage).unwrap();
    let draft = reloaded.draft();
    assert_eq!(draft.name, "Guide");
    assert_eq!(draft.price, Price::from(100));
    assert_eq!(draft.original_price, Some(Price::from(150)));
    assert_eq!(draft.license_type, LicenseType::TimeLimited);
    assert_eq!(draft.license_duration, Some(30));
    assert_eq!(draft.download_limit, Some(5));
    assert_eq!(draft.tags, vec!["pdf".to_string(), "guide".to_string()]);
    assert_eq!(draft.features, vec!["Lifetime updates".to_string()]);
    assert_eq!(draft.requirements, "A PDF reader");
    assert_eq!(draft.effective_discount_percentage(), Some(33));
    assert!(reloaded.is_step_valid(STEP_BASIC_INFO));
}

#[test]
fn test_file_slots_reload_as_metadata_only() {
    let storage = MemoryStorage::new();
    let mut store = ProductDraftStore::open(&storage).unwrap();
    store
        .update_form_data(
            complete_basic_info()
                .file(Some(product_file("guide.pdf", 4096)))
                .thumbnail(Some(image_file("thumb.png", 128)))
                .preview(Some(image_file("preview.png", 256)))
                .images(vec![image_file("a.png", 10), image_file("b.png", 20)]),
        )
        .unwrap();

    let reloaded = ProductDraftStore::open(&storage).unwrap();
    let draft = reloaded.draft();
    assert!(draft.file.is_none());
    assert!(draft.thumbnail.is_none());
    assert!(draft.preview.is_none());
    assert!(draft.images.is_empty());

    let file_meta = draft.file_metadata.as_ref().unwrap();
    assert_eq!(file_meta.name, "guide.pdf");
    assert_eq!(file_meta.size, 4096);
    assert_eq!(file_meta.mime_type.as_deref(), Some("application/pdf"));
    assert_eq!(draft.preview_metadata.as_ref().unwrap().size, 256);
    assert_eq!(draft.images_metadata.len(), 2);

    assert_eq!(
        reloaded.detached_slots(),
        vec![
            FileSlot::File,
            FileSlot::Thumbnail,
            FileSlot::Preview,
            FileSlot::Images
        ]
    );
}

#[test]
fn test_reattaching_files_enables_submission() {
    let storage = MemoryStorage::new();
    let mut store = ProductDraftStore::open(&storage).unwrap();
    store
        .update_form_data(
            complete_basic_info()
                .file(Some(product_file("guide.pdf", 64)))
                .thumbnail(Some(image_file("thumb.png", 8))),
        )
        .unwrap();

    let mut reloaded = ProductDraftStore::open(&storage).unwrap();
    assert_eq!(
        reloaded.submission(),
        Err(DraftError::MissingFile(FileSlot::File))
    );

    reloaded
        .update_form_data(DraftUpdate::new().file(Some(product_file("guide.pdf", 64))))
        .unwrap();
    assert_eq!(
        reloaded.submission(),
        Err(DraftError::MissingFile(FileSlot::Thumbnail))
    );

    reloaded
        .update_form_data(DraftUpdate::new().thumbnail(Some(image_file("thumb.png", 8))))
        .unwrap();
    let submission = reloaded.submission().unwrap();
    assert_eq!(submission.name, "Guide");
    assert_eq!(submission.thumbnail.name(), "thumb.png");
    assert!(!reloaded.needs_file_reattachment());
}

#[test]
fn test_clearing_file_slot_clears_stored_metadata() {
    let storage = MemoryStorage::new();
    let mut store = ProductDraftStore::open(&storage).unwrap();
    store
        .update_form_data(DraftUpdate::new().file(Some(product_file("guide.pdf", 64))))
        .unwrap();
    store.update_form_data(DraftUpdate::new().file(None)).unwrap();

    let raw = storage.get_item(PRODUCT_DRAFT_STORAGE_KEY).unwrap().unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(json["state"]["fileMetadata"].is_null());

    let reloaded = ProductDraftStore::open(&storage).unwrap();
    assert!(reloaded.draft().file_metadata.is_none());
}

#[test]
fn test_clear_persisted_data_then_reload_is_default() {
    let storage = MemoryStorage::new();
    let mut store = ProductDraftStore::open(&storage).unwrap();
    store
        .update_form_data(
            complete_basic_info()
                .is_link(true)
                .link_url("https://x.com/a")
                .thumbnail(Some(image_file("thumb.png", 8))),
        )
        .unwrap();
    assert!(store.is_step_valid(STEP_DELIVERY));

    store.clear_persisted_data().unwrap();

    let reloaded = ProductDraftStore::open(&storage).unwrap();
    assert_eq!(reloaded.draft(), &Draft::default());
    assert!(reloaded.draft().file_metadata.is_none());
    assert!(reloaded.draft().thumbnail_metadata.is_none());
    assert!(reloaded.draft().preview_metadata.is_none());
    assert!(!reloaded.needs_file_reattachment());
}

#[test]
fn test_reset_form_is_overwritten_by_next_mutation() {
    let storage = MemoryStorage::new();
    let mut store = ProductDraftStore::open(&storage).unwrap();
    store.update_form_data(complete_basic_info()).unwrap();

    store.reset_form();
    store
        .update_form_data(DraftUpdate::new().name("Second draft"))
        .unwrap();

    let reloaded = ProductDraftStore::open(&storage).unwrap();
    assert_eq!(reloaded.draft().name, "Second draft");
    assert!(reloaded.draft().description.is_empty());
    assert!(!reloaded.is_step_valid(STEP_BASIC_INFO));
}

#[test]
fn test_numeric_price_in_snapshot_is_accepted() {
    let storage = MemoryStorage::new();
    storage
        .set_item(
            PRODUCT_DRAFT_STORAGE_KEY,
            r#"{"state":{"name":"Guide","description":"x","price":100,"categoryId":"c1","licenseType":"UNLIMITED"},"version":0}"#,
        )
        .unwrap();

    let store = ProductDraftStore::open(&storage).unwrap();
    assert_eq!(store.draft().price, Price::from(100));
    assert_eq!(store.draft().license_type, LicenseType::Unlimited);
    assert!(store.is_step_valid(STEP_BASIC_INFO));
    assert!(store.is_step_valid(STEP_REVIEW));
}

#[test]
fn test_reload_returns_wizard_to_first_step() {
    let storage = MemoryStorage::new();
    let mut store = ProductDraftStore::open(&storage).unwrap();
    store.update_form_data(complete_basic_info()).unwrap();
    assert!(store.next_step());

    let reloaded = ProductDraftStore::open(&storage).unwrap();
    assert_eq!(reloaded.current_step(), STEP_BASIC_INFO);
}
