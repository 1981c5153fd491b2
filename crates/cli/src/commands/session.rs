//! Session, wishlist and cart commands.
//!
//! # Usage
//!
//! ```bash
//! mp-cli session show
//! mp-cli session vendor            # enable vendor mode
//! mp-cli session vendor --off      # back to buyer mode
//! mp-cli saved add prod_1
//! mp-cli cart update prod_1 -1     # <= 0 removes the line
//! ```

use clap::Subcommand;
use serde::Serialize;

use marketplace_client::models::CartItem;
use marketplace_client::storage::StorageArea;
use marketplace_client::stores::SessionStore;
use marketplace_core::{ProductId, SessionId};

use super::{CliError, Context, print_json};

#[derive(Subcommand)]
pub enum SessionAction {
    /// Print the session, wishlist and cart
    Show,
    /// Start a new, empty anonymous session (as on logout)
    New,
    /// Enable or disable vendor mode
    Vendor {
        /// Disable vendor mode instead of enabling it
        #[arg(long)]
        off: bool,
    },
    /// Flag local state for a server merge (as on login)
    MarkSync,
    /// Flag the server merge as done
    ClearSync,
    /// Print the payload for the server merge, if one is pending
    Payload,
}

#[derive(Subcommand)]
pub enum SavedAction {
    /// Save a product
    Add { product_id: String },
    /// Remove a saved product
    Remove { product_id: String },
    /// Remove all saved products
    Clear,
}

#[derive(Subcommand)]
pub enum CartAction {
    /// Add units of a product
    Add {
        product_id: String,
        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a product's line
    Remove { product_id: String },
    /// Set a line's quantity (zero or less removes it)
    Update {
        product_id: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Empty the cart
    Clear,
    /// Empty the cart and the saved items
    ClearAll,
}

/// JSON view of the session store.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionView<'a> {
    session_id: &'a SessionId,
    saved_items: &'a [ProductId],
    cart_items: &'a [CartItem],
    cart_item_count: u32,
    is_pending_sync: bool,
    is_vendor: bool,
}

impl<'a, S: StorageArea> From<&'a SessionStore<S>> for SessionView<'a> {
    fn from(store: &'a SessionStore<S>) -> Self {
        Self {
            session_id: store.session_id(),
            saved_items: store.saved_items(),
            cart_items: store.cart_items(),
            cart_item_count: store.cart_item_count(),
            is_pending_sync: store.is_pending_sync(),
            is_vendor: store.is_vendor(),
        }
    }
}

/// Run a `session` subcommand.
///
/// # Errors
///
/// Returns `CliError` if the store cannot be opened or persisted.
pub fn session(ctx: &Context, action: SessionAction) -> Result<(), CliError> {
    let mut store = ctx.session_store()?;
    match action {
        SessionAction::Show => {}
        SessionAction::New => store.generate_new_session()?,
        SessionAction::Vendor { off } => store.set_vendor_status(!off)?,
        SessionAction::MarkSync => store.mark_pending_sync()?,
        SessionAction::ClearSync => store.clear_pending_sync()?,
        SessionAction::Payload => {
            return match store.sync_payload() {
                Some(payload) => print_json(&payload),
                None => {
                    tracing::info!("No sync pending");
                    Ok(())
                }
            };
        }
    }
    print_json(&SessionView::from(&store))
}

/// Run a `saved` subcommand.
///
/// # Errors
///
/// Returns `CliError` if the store cannot be opened or persisted.
pub fn saved(ctx: &Context, action: SavedAction) -> Result<(), CliError> {
    let mut store = ctx.session_store()?;
    match action {
        SavedAction::Add { product_id } => {
            if store.is_vendor() {
                tracing::warn!("Vendor mode is on; saved items are unchanged");
            }
            store.add_saved_item(ProductId::new(product_id))?;
        }
        SavedAction::Remove { product_id } => {
            store.remove_saved_item(&ProductId::new(product_id))?;
        }
        SavedAction::Clear => store.clear_saved_items()?,
    }
    print_json(&SessionView::from(&store))
}

/// Run a `cart` subcommand.
///
/// # Errors
///
/// Returns `CliError` if the store cannot be opened or persisted.
pub fn cart(ctx: &Context, action: CartAction) -> Result<(), CliError> {
    let mut store = ctx.session_store()?;
    match action {
        CartAction::Add {
            product_id,
            quantity,
        } => {
            if store.is_vendor() {
                tracing::warn!("Vendor mode is on; cart is unchanged");
            }
            store.add_cart_item(ProductId::new(product_id), quantity)?;
        }
        CartAction::Remove { product_id } => {
            store.remove_cart_item(&ProductId::new(product_id))?;
        }
        CartAction::Update {
            product_id,
            quantity,
        } => {
            store.update_cart_quantity(&ProductId::new(product_id), quantity)?;
        }
        CartAction::Clear => store.clear_cart()?,
        CartAction::ClearAll => store.clear_all()?,
    }
    print_json(&SessionView::from(&store))
}
