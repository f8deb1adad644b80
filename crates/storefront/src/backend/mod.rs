//! QKart REST backend client.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP with `reqwest`
//! - The backend is the source of truth for the cart - NO local merge; every
//!   mutation response replaces the local record set wholesale
//! - Wire shapes live in [`types`] and are converted into validated
//!   `qkart_core` types on ingress; a body that does not fit is reported as
//!   [`ApiError::Malformed`] rather than leaking half-filled values
//!
//! # Endpoints
//!
//! | Operation | Method/Path | Auth |
//! |---|---|---|
//! | List catalog | `GET /products` | none |
//! | Search catalog | `GET /products/search?value=` | none |
//! | Fetch cart | `GET /cart` | bearer |
//! | Upsert cart item | `POST /cart` | bearer |
//! | Login | `POST /auth/login` | none |
//! | Register | `POST /auth/register` | none |
//!
//! # Example
//!
//! ```rust,ignore
//! use qkart_storefront::backend::BackendClient;
//!
//! let client = BackendClient::new(&config.backend)?;
//! let catalog = client.list_products().await?;
//! let records = client.upsert_cart_item(&token, &catalog[0].id, 1).await?;
//! ```

mod client;
mod conversions;
pub mod types;

pub use client::BackendClient;
pub use types::LoginResponse;

use reqwest::StatusCode;
use thiserror::Error;

/// Generic text shown when the backend cannot be reached or answers
/// with something other than a structured client error.
pub const SERVICE_UNREACHABLE: &str =
    "Something went wrong. Check that the backend is running, reachable and returns valid JSON.";

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure: connection refused, timeout, TLS, ...
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Structured client error (4xx other than 404) with a server message.
    #[error("Rejected ({status}): {message}")]
    Rejected {
        /// Response status.
        status: StatusCode,
        /// Human-readable message from the response body.
        message: String,
    },

    /// The backend answered 404.
    #[error("Not found: {}", .message.as_deref().unwrap_or("(no message)"))]
    NotFound {
        /// Message from the response body, if any.
        message: Option<String>,
    },

    /// 5xx, or a 4xx without a usable message body.
    #[error("Server error ({status}): {}", .message.as_deref().unwrap_or("(no message)"))]
    Server {
        /// Response status.
        status: StatusCode,
        /// Message from the response body, if any.
        message: Option<String>,
    },

    /// A success response whose body does not match the expected schema.
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// An endpoint URL could not be built from the configured base URL.
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// The message a user should see for this error.
    ///
    /// Structured client errors surface the server's text verbatim; every
    /// other failure collapses to [`SERVICE_UNREACHABLE`].
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::Rejected { message, .. }
            | Self::NotFound {
                message: Some(message),
            } => message.as_str(),
            _ => SERVICE_UNREACHABLE,
        }
    }

    /// Whether this is a structured client error rather than an outage.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Rejected { .. } | Self::NotFound { .. })
    }

    /// Server-supplied message carried by a 5xx response, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Server { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}
