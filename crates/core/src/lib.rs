//! Marketplace Core - Shared types library.
//!
//! This crate provides common types used across the marketplace client components:
//! - `client` - Session/cart and product draft stores with durable snapshots
//! - `cli` - Command-line driver for inspecting and mutating the stores
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, license kinds, and file metadata

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
