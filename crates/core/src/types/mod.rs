//! Core types for the marketplace client.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod file;
pub mod id;
pub mod license;
pub mod price;

pub use file::FileMetadata;
pub use id::*;
pub use license::LicenseType;
pub use price::{Price, PriceError};
