//! The two client-side state stores.
//!
//! Both are explicitly constructed around a [`StorageArea`](crate::storage::StorageArea)
//! and persist after every mutation. Neither talks to the network.

pub mod product_draft;
pub mod session;

pub use product_draft::{PRODUCT_DRAFT_STORAGE_KEY, ProductDraftStore};
pub use session::{SESSION_STORAGE_KEY, SessionStore, generate_session_id};
