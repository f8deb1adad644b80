//! QKart CLI - browse the catalog and manage a cart from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # List and search the catalog
//! qkart products
//! qkart search yonex
//!
//! # Type queries line by line; results follow the debounced search
//! qkart browse
//!
//! # Log in and keep the session in the environment
//! eval "$(qkart login -u crio.do)"
//!
//! # Cart operations
//! qkart cart add KCRwjF7lN97HnEaY --qty 2
//! qkart cart set KCRwjF7lN97HnEaY 0
//! qkart cart show
//! qkart checkout
//! ```
//!
//! # Environment Variables
//!
//! - `QKART_BACKEND_URL` - REST backend base URL (required)
//! - `QKART_TOKEN`, `QKART_USERNAME`, `QKART_BALANCE` - session written by `login`
//! - `QKART_PASSWORD` - password for `login`/`register` when not passed as a flag
//! - `RUST_LOG` - log filter (logs go to stderr)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use qkart_storefront::config::StorefrontConfig;
use qkart_storefront::models::NoticeSink;
use qkart_storefront::state::Storefront;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

use commands::CliError;

#[derive(Parser)]
#[command(name = "qkart")]
#[command(author, version, about = "QKart storefront from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the full catalog
    Products,
    /// Search the catalog once
    Search {
        /// Text to search for
        query: String,
    },
    /// Read queries from stdin and show debounced search results
    Browse,
    /// Log in and print the session as shell exports
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long, env = "QKART_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(short, long)]
        username: String,

        #[arg(short, long, env = "QKART_PASSWORD", hide_env_values = true)]
        password: String,

        /// Repeat the password
        #[arg(short, long)]
        confirm: String,
    },
    /// Inspect or change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Show the order summary for the current cart
    Checkout,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart contents and total
    Show,
    /// Add a product that is not yet in the cart
    Add {
        /// Product id
        product_id: String,

        #[arg(short, long, default_value_t = 1)]
        qty: u32,
    },
    /// Set the quantity of a product (0 removes it)
    Set {
        /// Product id
        product_id: String,

        /// New quantity
        qty: u32,
    },
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
            sample_rate: config.sentry_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
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

fn init_tracing() {
    // Defaults to warn so stdout stays readable
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "qkart_cli=warn,qkart_storefront=warn".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            output::fatal(&e);
            return ExitCode::FAILURE;
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    let (notices, receiver) = NoticeSink::channel();
    let printer = output::spawn_notice_printer(receiver);

    let result = match Storefront::new(config, notices) {
        Ok(storefront) => run(cli, &storefront).await,
        Err(e) => Err(CliError::Setup(e)),
    };

    // Dropping the storefront closes the notice channel; wait for the tail.
    if printer.await.is_err() {
        tracing::warn!("Notice printer stopped unexpectedly");
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = %e, "Command failed");
            if !e.is_reported() {
                output::fatal(&e);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, storefront: &Storefront) -> Result<(), CliError> {
    match cli.command {
        Commands::Products => commands::catalog::products(storefront).await,
        Commands::Search { query } => commands::catalog::search(storefront, &query).await,
        Commands::Browse => commands::catalog::browse(storefront).await,
        Commands::Login { username, password } => {
            commands::auth::login(storefront, username, password).await
        }
        Commands::Register {
            username,
            password,
            confirm,
        } => commands::auth::register(storefront, username, password, confirm).await,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(storefront).await,
            CartAction::Add { product_id, qty } => {
                commands::cart::add(storefront, product_id.into(), qty).await
            }
            CartAction::Set { product_id, qty } => {
                commands::cart::set(storefront, product_id.into(), qty).await
            }
        },
        Commands::Checkout => commands::cart::checkout(storefront).await,
    }
}
