//! Command implementations.

pub mod auth;
pub mod cart;
pub mod catalog;

use rust_decimal::Decimal;
use thiserror::Error;

use qkart_storefront::backend::ApiError;
use qkart_storefront::config::ConfigError;
use qkart_storefront::models::Session;
use qkart_storefront::models::session::keys;
use qkart_storefront::services::{AuthError, CartError};

/// Errors that end a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The HTTP client could not be built.
    #[error("could not set up the backend client: {0}")]
    Setup(ApiError),

    /// The session variables are present but unusable.
    #[error("invalid session in environment: {0}")]
    Session(String),

    /// Reading input failed.
    #[error("input error: {0}")]
    Io(#[from] std::io::Error),

    /// A catalog call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A cart action was refused or failed.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Login or registration was refused or failed.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl CliError {
    /// Whether the shopper has already seen this error as a notice.
    #[must_use]
    pub const fn is_reported(&self) -> bool {
        matches!(self, Self::Api(_) | Self::Cart(_) | Self::Auth(_))
    }
}

/// Read the session that `qkart login` exported.
///
/// No token means an anonymous session. A missing balance reads as zero.
///
/// # Errors
///
/// Returns `CliError::Session` if the token is blank or the balance is not
/// a number.
pub fn session_from_env() -> Result<Session, CliError> {
    let Ok(token) = std::env::var(keys::TOKEN) else {
        return Ok(Session::Anonymous);
    };
    session_from_parts(
        token,
        std::env::var(keys::USERNAME).ok(),
        std::env::var(keys::BALANCE).ok(),
    )
}

fn session_from_parts(
    token: String,
    username: Option<String>,
    balance: Option<String>,
) -> Result<Session, CliError> {
    if token.trim().is_empty() {
        return Err(CliError::Session(format!("{} is empty", keys::TOKEN)));
    }

    let balance = match balance {
        Some(raw) => raw
            .trim()
            .parse::<Decimal>()
            .map_err(|e| CliError::Session(format!("{}: {e}", keys::BALANCE)))?,
        None => Decimal::ZERO,
    };

    Ok(Session::authenticated(
        token,
        username.unwrap_or_default(),
        balance,
    ))
}
