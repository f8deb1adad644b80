//! Wire types for the QKart REST API.
//!
//! These mirror the JSON the backend sends and accepts. Incoming shapes are
//! converted into `qkart_core` types by the conversions module before they
//! reach the rest of the crate.

use rust_decimal::Decimal;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use qkart_core::ProductId;

/// A catalog product as returned by `GET /products`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductDto {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub category: String,
    pub cost: Decimal,
    pub rating: f32,
    pub image: String,
}

/// A cart line as returned by `GET /cart` and `POST /cart`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartRecordDto {
    pub product_id: String,
    pub qty: u32,
}

/// Body of `POST /cart`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartUpsertRequest<'a> {
    pub product_id: &'a ProductId,
    pub qty: u32,
}

/// Body of `POST /auth/login` and `POST /auth/register`.
#[derive(Serialize)]
pub struct CredentialsRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Raw body of a successful `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginResponseDto {
    #[serde(default)]
    pub success: bool,
    pub token: Option<String>,
    pub username: Option<String>,
    pub balance: Option<Decimal>,
    pub message: Option<String>,
}

/// Raw body of a successful `POST /auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterResponseDto {
    #[serde(default)]
    pub success: bool,
    pub message: Option<String>,
}

/// Error body the backend attaches to non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub message: Option<String>,
}

/// Validated result of a login call.
///
/// Implements `Debug` manually to redact the token.
pub struct LoginResponse {
    /// Bearer token for authenticated calls.
    pub token: SecretString,
    /// Canonical username as stored by the backend.
    pub username: String,
    /// Wallet balance.
    pub balance: Decimal,
}

impl std::fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResponse")
            .field("token", &"[REDACTED]")
            .field("username", &self.username)
            .field("balance", &self.balance)
            .finish()
    }
}
