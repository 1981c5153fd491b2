//! Anonymous session, wishlist and cart state.
//!
//! The session store holds everything a shopper accumulates before logging
//! in. The authentication collaborator drives its lifecycle:
//!
//! 1. On login it calls [`SessionStore::mark_pending_sync`], reads
//!    [`SessionStore::sync_payload`], merges it into the server cart and
//!    wishlist, then calls [`SessionStore::clear_pending_sync`].
//! 2. It calls [`SessionStore::set_vendor_status`] from the authenticated
//!    role. Vendors cannot add to their own cart or wishlist.
//! 3. On logout it calls [`SessionStore::generate_new_session`] so the next
//!    anonymous visitor starts empty.
//!
//! Every mutation writes a snapshot before returning.

use rand::Rng;
use rand::distr::Alphanumeric;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use marketplace_core::{ProductId, SessionId};

use crate::models::{CartItem, SyncPayload};
use crate::storage::{StorageArea, StorageError, load_snapshot, or_default, save_snapshot};

/// Default storage key of the session snapshot.
pub const SESSION_STORAGE_KEY: &str = "marketplace-session";

/// Schema version written with the session snapshot.
const SNAPSHOT_VERSION: u32 = 0;

/// Length of the random part of a session ID.
const SESSION_SUFFIX_LEN: usize = 9;

/// Generate an anonymous session ID: `session_<unix millis>_<9 alphanumerics>`.
///
/// Unique with overwhelming probability within one client. This is a
/// correlation token, not a credential.
#[must_use]
pub fn generate_session_id() -> SessionId {
    let suffix: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(SESSION_SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    SessionId::new(format!(
        "session_{}_{suffix}",
        chrono::Utc::now().timestamp_millis()
    ))
}

/// Persisted projection of the session store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionState {
    session_id: SessionId,
    saved_items: Vec<ProductId>,
    cart_items: Vec<CartItem>,
    is_pending_sync: bool,
    is_vendor: bool,
}

impl SessionState {
    fn fresh() -> Self {
        Self {
            session_id: generate_session_id(),
            saved_items: Vec::new(),
            cart_items: Vec::new(),
            is_pending_sync: false,
            is_vendor: false,
        }
    }
}

/// Lenient read-side twin of [`SessionState`]: every field may be missing or
/// of the wrong type.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct StoredSession {
    #[serde(deserialize_with = "or_default")]
    session_id: Option<SessionId>,
    #[serde(deserialize_with = "or_default")]
    saved_items: Vec<ProductId>,
    #[serde(deserialize_with = "or_default")]
    cart_items: Vec<CartItem>,
    #[serde(deserialize_with = "or_default")]
    is_pending_sync: bool,
    #[serde(deserialize_with = "or_default")]
    is_vendor: bool,
}

impl From<StoredSession> for SessionState {
    fn from(stored: StoredSession) -> Self {
        let session_id = stored
            .session_id
            .filter(|id| !id.is_blank())
            .unwrap_or_else(generate_session_id);

        // Zero-quantity lines cannot be produced by the store; drop any that
        // were written by hand.
        let cart_items = stored
            .cart_items
            .into_iter()
            .filter(|line| line.quantity > 0)
            .collect();

        Self {
            session_id,
            saved_items: stored.saved_items,
            cart_items,
            is_pending_sync: stored.is_pending_sync,
            is_vendor: stored.is_vendor,
        }
    }
}

/// Session/cart store bound to a storage backend.
#[derive(Debug)]
pub struct SessionStore<S> {
    storage: S,
    key: String,
    state: SessionState,
}

impl<S: StorageArea> SessionStore<S> {
    /// Open the store under the default key, rehydrating any snapshot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if storage cannot be read, or if a freshly
    /// generated session cannot be written.
    pub fn open(storage: S) -> Result<Self, StorageError> {
        Self::open_with_key(storage, SESSION_STORAGE_KEY)
    }

    /// Open the store under a custom storage key.
    ///
    /// When no snapshot exists a new session is generated and persisted
    /// immediately, so the anonymous ID is stable across reloads.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if storage cannot be read or written.
    #[instrument(skip(storage, key), fields(key = %key.as_ref()))]
    pub fn open_with_key(storage: S, key: impl AsRef<str>) -> Result<Self, StorageError> {
        let key = key.as_ref().to_owned();
        let stored: Option<StoredSession> = load_snapshot(&storage, &key, SNAPSHOT_VERSION)?;

        let mut store = Self {
            storage,
            key,
            state: SessionState::fresh(),
        };
        match stored {
            Some(stored) => {
                store.state = stored.into();
                tracing::debug!(session_id = %store.state.session_id, "Rehydrated session");
            }
            None => {
                tracing::debug!(session_id = %store.state.session_id, "Started new session");
                store.persist()?;
            }
        }
        Ok(store)
    }

    /// Re-read the snapshot from storage, replacing in-memory state.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if storage cannot be read or written.
    pub fn reload(&mut self) -> Result<(), StorageError> {
        let stored: Option<StoredSession> =
            load_snapshot(&self.storage, &self.key, SNAPSHOT_VERSION)?;
        match stored {
            Some(stored) => {
                self.state = stored.into();
                Ok(())
            }
            None => {
                self.state = SessionState::fresh();
                self.persist()
            }
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Current anonymous session ID.
    #[must_use]
    pub const fn session_id(&self) -> &SessionId {
        &self.state.session_id
    }

    /// Wishlist entries in insertion order.
    #[must_use]
    pub fn saved_items(&self) -> &[ProductId] {
        &self.state.saved_items
    }

    /// Cart lines in insertion order.
    #[must_use]
    pub fn cart_items(&self) -> &[CartItem] {
        &self.state.cart_items
    }

    /// Whether local state awaits a server merge.
    #[must_use]
    pub const fn is_pending_sync(&self) -> bool {
        self.state.is_pending_sync
    }

    /// Whether buyer actions are suppressed.
    #[must_use]
    pub const fn is_vendor(&self) -> bool {
        self.state.is_vendor
    }

    /// Whether `product_id` is on the wishlist.
    #[must_use]
    pub fn is_saved(&self, product_id: &ProductId) -> bool {
        self.state.saved_items.contains(product_id)
    }

    /// Quantity of `product_id` in the cart, if present.
    #[must_use]
    pub fn cart_quantity(&self, product_id: &ProductId) -> Option<u32> {
        self.line(product_id).map(|line| line.quantity)
    }

    /// Total units across all cart lines.
    #[must_use]
    pub fn cart_item_count(&self) -> u32 {
        self.state
            .cart_items
            .iter()
            .fold(0u32, |acc, line| acc.saturating_add(line.quantity))
    }

    /// Local state to merge into the server, while a sync is pending.
    #[must_use]
    pub fn sync_payload(&self) -> Option<SyncPayload> {
        self.state.is_pending_sync.then(|| SyncPayload {
            session_id: self.state.session_id.clone(),
            saved_items: self.state.saved_items.clone(),
            cart_items: self.state.cart_items.clone(),
        })
    }

    /// The storage backend.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    // =========================================================================
    // Wishlist
    // =========================================================================

    /// Add `product_id` to the wishlist unless it is already there.
    ///
    /// Does nothing for vendors.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be written.
    pub fn add_saved_item(&mut self, product_id: ProductId) -> Result<(), StorageError> {
        if self.state.is_vendor {
            tracing::debug!(%product_id, "Ignoring saved item for vendor");
            return Ok(());
        }
        if !self.state.saved_items.contains(&product_id) {
            tracing::debug!(%product_id, "Saved item");
            self.state.saved_items.push(product_id);
        }
        self.persist()
    }

    /// Remove `product_id` from the wishlist if present.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be written.
    pub fn remove_saved_item(&mut self, product_id: &ProductId) -> Result<(), StorageError> {
        self.state.saved_items.retain(|id| id != product_id);
        self.persist()
    }

    /// Empty the wishlist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be written.
    pub fn clear_saved_items(&mut self) -> Result<(), StorageError> {
        self.state.saved_items.clear();
        self.persist()
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Add `quantity` units of `product_id`, accumulating onto an existing line.
    ///
    /// Does nothing for vendors or when `quantity` is zero.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be written.
    pub fn add_cart_item(
        &mut self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), StorageError> {
        if self.state.is_vendor {
            tracing::debug!(%product_id, "Ignoring cart item for vendor");
            return Ok(());
        }
        if quantity == 0 {
            return Ok(());
        }

        if let Some(line) = self.line_mut(&product_id) {
            line.quantity = line.quantity.saturating_add(quantity);
            tracing::debug!(%product_id, quantity = line.quantity, "Increased cart line");
        } else {
            tracing::debug!(%product_id, quantity, "Added cart line");
            self.state
                .cart_items
                .push(CartItem::new(product_id, quantity));
        }
        self.persist()
    }

    /// Remove the line for `product_id` if present.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be written.
    pub fn remove_cart_item(&mut self, product_id: &ProductId) -> Result<(), StorageError> {
        self.state
            .cart_items
            .retain(|line| &line.product_id != product_id);
        self.persist()
    }

    /// Set the quantity of an existing line.
    ///
    /// A quantity of zero or less removes the line. Absent products are left
    /// absent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be written.
    pub fn update_cart_quantity(
        &mut self,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<(), StorageError> {
        let Ok(quantity @ 1..) = u32::try_from(quantity.clamp(0, i64::from(u32::MAX))) else {
            return self.remove_cart_item(product_id);
        };
        if let Some(line) = self.line_mut(product_id) {
            line.quantity = quantity;
        }
        self.persist()
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be written.
    pub fn clear_cart(&mut self) -> Result<(), StorageError> {
        self.state.cart_items.clear();
        self.persist()
    }

    /// Empty both the wishlist and the cart.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be written.
    pub fn clear_all(&mut self) -> Result<(), StorageError> {
        self.state.saved_items.clear();
        self.state.cart_items.clear();
        self.persist()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Flag local state as awaiting a server merge.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be written.
    pub fn mark_pending_sync(&mut self) -> Result<(), StorageError> {
        self.state.is_pending_sync = true;
        self.persist()
    }

    /// Flag the server merge as done.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be written.
    pub fn clear_pending_sync(&mut self) -> Result<(), StorageError> {
        self.state.is_pending_sync = false;
        self.persist()
    }

    /// Start a new, empty anonymous session.
    ///
    /// The new ID always differs from the previous one. The vendor flag is
    /// left as is.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be written.
    #[instrument(skip(self), fields(previous = %self.state.session_id))]
    pub fn generate_new_session(&mut self) -> Result<(), StorageError> {
        let mut session_id = generate_session_id();
        while session_id == self.state.session_id {
            session_id = generate_session_id();
        }
        tracing::info!(%session_id, "Generated new session");

        self.state.session_id = session_id;
        self.state.saved_items.clear();
        self.state.cart_items.clear();
        self.state.is_pending_sync = false;
        self.persist()
    }

    /// Enable or disable vendor mode. Existing cart and wishlist are kept.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be written.
    pub fn set_vendor_status(&mut self, is_vendor: bool) -> Result<(), StorageError> {
        tracing::debug!(is_vendor, "Set vendor status");
        self.state.is_vendor = is_vendor;
        self.persist()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn line(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.state
            .cart_items
            .iter()
            .find(|line| &line.product_id == product_id)
    }

    fn line_mut(&mut self, product_id: &ProductId) -> Option<&mut CartItem> {
        self.state
            .cart_items
            .iter_mut()
            .find(|line| &line.product_id == product_id)
    }

    fn persist(&self) -> Result<(), StorageError> {
        save_snapshot(&self.storage, &self.key, SNAPSHOT_VERSION, &self.state)
    }
}
