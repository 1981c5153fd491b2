//! Domain models held by the client stores.

pub mod cart;
pub mod draft;

pub use cart::{CartItem, SyncPayload};
pub use draft::{
    AttachedFile, Delivery, Draft, DraftError, DraftUpdate, FileSlot, LAST_STEP,
    ProductSubmission, STEP_BASIC_INFO, STEP_DELIVERY, STEP_REVIEW, derive_all_metadata,
    derive_metadata,
};
