//! Cart and wishlist types held by the session store.

use serde::{Deserialize, Serialize};

use marketplace_core::{ProductId, SessionId};

/// A locally held cart line.
///
/// Lines are unique by `product_id` and always carry a quantity of at least 1.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Product this line refers to.
    pub product_id: ProductId,
    /// Number of units, never zero.
    pub quantity: u32,
}

impl CartItem {
    /// Create a cart line.
    #[must_use]
    pub const fn new(product_id: ProductId, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

/// Local state handed to the server cart/wishlist API after login.
///
/// Produced by [`SessionStore::sync_payload`](crate::stores::SessionStore::sync_payload)
/// while the pending-sync flag is set. The wire format of the actual
/// reconciliation call belongs to the API client, not to this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPayload {
    /// Anonymous session the local state was collected under.
    pub session_id: SessionId,
    /// Wishlist entries in insertion order.
    pub saved_items: Vec<ProductId>,
    /// Cart lines in insertion order.
    pub cart_items: Vec<CartItem>,
}

impl SyncPayload {
    /// Whether there is nothing to merge.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.saved_items.is_empty() && self.cart_items.is_empty()
    }
}
