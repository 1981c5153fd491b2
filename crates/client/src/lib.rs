//! Marketplace client state library.
//!
//! This crate holds the self-contained state of the marketplace web client:
//!
//! - [`stores::SessionStore`] - anonymous session ID, wishlist, cart, vendor
//!   mode and the pending-sync flag used to merge local state after login
//! - [`stores::ProductDraftStore`] - the vendor's multi-step product draft,
//!   with metadata shadows for attached files and step-gated navigation
//!
//! Both persist a JSON snapshot into a [`storage::StorageArea`] after every
//! mutation and rehydrate on open. HTTP clients, routing and rendering are
//! callers of this crate, not part of it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod models;
pub mod storage;
pub mod stores;

pub use error::{ClientError, Result};
