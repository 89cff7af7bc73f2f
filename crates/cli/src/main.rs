//! TechVerse CLI - Drive the storefront cart from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Add two units of a product to the current cart
//! tv-cli cart add --id 12 --name "16GB DDR4" --slug ram-16gb --price 3499.00 -q 2
//!
//! # Log in; the guest cart is discarded and the user's own cart is loaded
//! tv-cli session login -e asha@example.in -p hunter22
//!
//! # Place one order for the whole cart
//! tv-cli checkout --address 3
//! ```
//!
//! # Commands
//!
//! - `cart` - Show and edit the active cart
//! - `session` - Login, logout, session check and manual identity switching
//! - `checkout` - Place a bulk order for the cart
//! - `storage` - Inspect the durable store

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use techverse_core::{AddressId, ProductId};
use techverse_storefront::config::StorefrontConfig;
use techverse_storefront::error::Result;

mod commands;

#[derive(Parser)]
#[command(name = "tv-cli")]
#[command(author, version, about = "TechVerse storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show and edit the active cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage the signed-in identity
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
    /// Place an order for everything in the cart
    Checkout {
        /// Saved delivery address ID
        #[arg(short, long)]
        address: AddressId,
    },
    /// Inspect the durable store
    Storage {
        #[command(subcommand)]
        action: StorageAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// List lines and totals
    Show,
    /// Add a product (accumulates onto an existing line)
    Add {
        #[command(flatten)]
        product: commands::cart::ProductArgs,

        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a product's line
    Remove {
        /// Product ID
        product_id: ProductId,
    },
    /// Set a line's quantity (zero or less removes it)
    Update {
        /// Product ID
        product_id: ProductId,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum SessionAction {
    /// Log in against the backend
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long, env = "TECHVERSE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Log out and reset to an empty guest cart
    Logout,
    /// Ask the backend who the stored token belongs to
    Verify,
    /// Switch the cart to a user without contacting the backend
    Set {
        /// User ID
        user_id: String,
    },
    /// Switch the cart to the guest without contacting the backend
    Guest,
    /// Show the active identity
    Whoami,
}

#[derive(Subcommand)]
enum StorageAction {
    /// Summarize every stored cart slot
    Dump,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt::init();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(2);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "techverse_cli=info,techverse_storefront=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli, config).await {
        e.report();
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<()> {
    let mut ctx = commands::Context::open(config)?;

    match cli.command {
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&ctx),
            CartAction::Add { product, quantity } => {
                commands::cart::add(&mut ctx, product, quantity)?;
            }
            CartAction::Remove { product_id } => commands::cart::remove(&mut ctx, product_id)?,
            CartAction::Update {
                product_id,
                quantity,
            } => commands::cart::update(&mut ctx, product_id, quantity)?,
            CartAction::Clear => commands::cart::clear(&mut ctx)?,
        },
        Commands::Session { action } => match action {
            SessionAction::Login { email, password } => {
                commands::session::login(&mut ctx, &email, &password).await?;
            }
            SessionAction::Logout => commands::session::logout(&mut ctx).await?,
            SessionAction::Verify => commands::session::verify(&mut ctx).await?,
            SessionAction::Set { user_id } => commands::session::set(&mut ctx, Some(&user_id))?,
            SessionAction::Guest => commands::session::set(&mut ctx, None)?,
            SessionAction::Whoami => commands::session::whoami(&ctx),
        },
        Commands::Checkout { address } => commands::checkout::run(&mut ctx, address).await?,
        Commands::Storage { action } => match action {
            StorageAction::Dump => commands::storage::dump(&ctx),
        },
    }
    Ok(())
}
