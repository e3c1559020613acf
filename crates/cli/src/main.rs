//! Marketplace CLI - the storefront in a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Log in (password can also come from MARKETPLACE_PASSWORD)
//! mp login --email john.doe@example.com --password hunter2
//!
//! # Browse
//! mp products --search lamp --sort price_asc
//! mp product 42
//!
//! # Manage the cart
//! mp cart add 42 --quantity 2
//! mp cart inc 42
//! mp cart show
//!
//! # Follow a path directly
//! mp open /products/42
//! ```
//!
//! # Commands
//!
//! - `login` / `logout` - Manage the stored credential
//! - `products` - List products with optional filters
//! - `product` - Show one product
//! - `cart` - Show and change the cart
//! - `open` - Navigate to a route path

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::Write;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use marketplace_core::{Price, ProductId, ProductSort};
use marketplace_storefront::{ProductQuery, Storefront, StorefrontConfig};
use secrecy::SecretString;

mod commands;
mod telemetry;
mod views;

use commands::CliError;

#[derive(Parser)]
#[command(name = "mp")]
#[command(author, version, about = "Marketplace storefront in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and load your cart
    Login {
        /// Account email address
        #[arg(short, long, env = "MARKETPLACE_EMAIL")]
        email: String,

        /// Account password
        #[arg(short, long, env = "MARKETPLACE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Log out and forget the stored credential
    Logout,
    /// List products
    Products {
        /// Only products matching this text
        #[arg(short, long)]
        search: Option<String>,

        /// Sort order (`price_asc`, `price_desc`, `rating`, `newest`)
        #[arg(long)]
        sort: Option<ProductSort>,

        /// Only featured products
        #[arg(long)]
        featured: bool,

        /// Minimum price
        #[arg(long)]
        min_price: Option<Price>,

        /// Maximum price
        #[arg(long)]
        max_price: Option<Price>,
    },
    /// Show a product
    Product {
        /// Product ID
        id: ProductId,
    },
    /// Show or change the cart
    Cart {
        #[command(subcommand)]
        action: Option<CartAction>,
    },
    /// Navigate to a path such as `/products/42`
    Open {
        /// Route path
        path: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add a product
    Add {
        /// Product ID
        product_id: ProductId,

        /// Quantity, limited to the available stock
        #[arg(short, long, default_value_t = 1)]
        quantity: i64,
    },
    /// Set the quantity of a line
    Set {
        /// Product ID
        product_id: ProductId,

        /// New quantity, limited to `[1, stock]`
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Increase a line's quantity by one
    Inc {
        /// Product ID
        product_id: ProductId,
    },
    /// Decrease a line's quantity by one
    Dec {
        /// Product ID
        product_id: ProductId,
    },
    /// Remove a line
    Remove {
        /// Product ID
        product_id: ProductId,
    },
    /// Remove every line
    Clear,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            report(&CliError::from(e));
            return ExitCode::FAILURE;
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = telemetry::init_sentry(&config);
    telemetry::init_tracing();

    match run(cli, config).await {
        Ok(page) => {
            let _ = writeln!(std::io::stdout().lock(), "{page}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Command failed");
            report(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<String, CliError> {
    let storefront = Storefront::open(config).map_err(CliError::Client)?;

    match cli.command {
        Commands::Login { email, password } => {
            commands::auth::login(&storefront, &email, &SecretString::from(password)).await
        }
        Commands::Logout => commands::auth::logout(&storefront).await,
        Commands::Products {
            search,
            sort,
            featured,
            min_price,
            max_price,
        } => {
            let query = ProductQuery {
                search,
                sort,
                featured: featured.then_some(true),
                min_price,
                max_price,
            };
            commands::products::list(&storefront, &query).await
        }
        Commands::Product { id } => commands::products::show(&storefront, &id).await,
        Commands::Cart { action } => match action.unwrap_or(CartAction::Show) {
            CartAction::Show => commands::cart::show(&storefront).await,
            CartAction::Add {
                product_id,
                quantity,
            } => commands::cart::add(&storefront, &product_id, quantity).await,
            CartAction::Set {
                product_id,
                quantity,
            } => commands::cart::set(&storefront, &product_id, quantity).await,
            CartAction::Inc { product_id } => {
                commands::cart::increment(&storefront, &product_id).await
            }
            CartAction::Dec { product_id } => {
                commands::cart::decrement(&storefront, &product_id).await
            }
            CartAction::Remove { product_id } => {
                commands::cart::remove(&storefront, &product_id).await
            }
            CartAction::Clear => commands::cart::clear(&storefront).await,
        },
        Commands::Open { path } => commands::open(&storefront, &path).await,
    }
}

/// Print an error and its retry hint to stderr.
fn report(error: &CliError) {
    let mut stderr = std::io::stderr().lock();
    let _ = writeln!(stderr, "Error: {error}");
    if let Some(hint) = error.hint() {
        let _ = writeln!(stderr, "{hint}");
    }
}
