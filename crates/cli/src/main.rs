//! Marketplace CLI - Inspect and drive the client stores from a terminal.
//!
//! Every invocation opens the stores from the configured storage directory,
//! applies one operation and exits, which makes each run behave like a page
//! reload: persisted state comes back, live file handles do not.
//!
//! # Usage
//!
//! ```bash
//! # Show the anonymous session, wishlist and cart
//! mp-cli session show
//!
//! # Add two units to the cart, then mark the cart for server merge
//! mp-cli cart add prod_123 -q 2
//! mp-cli session mark-sync
//! mp-cli session payload
//!
//! # Fill the product draft and check the wizard gates
//! mp-cli draft set --name "Guide" --description "A guide" --price 19.99 --category c1
//! mp-cli draft attach thumbnail ./cover.png
//! mp-cli draft validate
//! ```
//!
//! # Commands
//!
//! - `session` - Session lifecycle, vendor mode and pending sync
//! - `saved` - Wishlist entries
//! - `cart` - Cart lines
//! - `draft` - Product draft fields, files, validation and discard
//!
//! # Environment Variables
//!
//! See [`marketplace_client::config`] (`MARKETPLACE_STORAGE_DIR` and friends).
//! `RUST_LOG` controls log output (stderr, default `info`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

use commands::draft::DraftAction;
use commands::session::{CartAction, SavedAction, SessionAction};

#[derive(Parser)]
#[command(name = "mp-cli")]
#[command(author, version, about = "Marketplace client state tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Anonymous session lifecycle
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
    /// Manage saved items (wishlist)
    Saved {
        #[command(subcommand)]
        action: SavedAction,
    },
    /// Manage cart lines
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage the vendor product draft
    Draft {
        #[command(subcommand)]
        action: DraftAction,
    },
}

fn main() {
    // Logs go to stderr so that stdout stays machine-readable JSON
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), commands::CliError> {
    let ctx = commands::Context::from_env()?;
    match cli.command {
        Commands::Session { action } => commands::session::session(&ctx, action),
        Commands::Saved { action } => commands::session::saved(&ctx, action),
        Commands::Cart { action } => commands::session::cart(&ctx, action),
        Commands::Draft { action } => commands::draft::draft(&ctx, action),
    }
}
