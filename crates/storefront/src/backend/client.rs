//! HTTP client for the QKart REST API.

use std::sync::Arc;

use reqwest::{RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use qkart_core::{CartRecord, Product, ProductId};

use crate::config::BackendConfig;

use super::ApiError;
use super::conversions::{
    convert_cart_records, convert_login_response, convert_products, convert_register_response,
};
use super::types::{
    CartRecordDto, CartUpsertRequest, CredentialsRequest, ErrorBody, LoginResponse,
    LoginResponseDto, ProductDto, RegisterResponseDto,
};

/// Maximum number of body characters written to logs.
const LOG_BODY_CHARS: usize = 500;

// =============================================================================
// BackendClient
// =============================================================================

/// Client for the QKart REST backend.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                base_url: config.base_url.clone(),
            }),
        })
    }

    /// The configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Send a request and return the status and raw body of a 2xx response.
    async fn send_raw(&self, request: RequestBuilder) -> Result<(StatusCode, String), ApiError> {
        let response = request.send().await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            let err = classify_failure(status, &body);
            if err.is_client_error() {
                debug!(status = %status, error = %err, "Backend rejected request");
            } else {
                tracing::error!(
                    status = %status,
                    body = %truncate(&body),
                    "Backend returned non-success status"
                );
            }
            return Err(err);
        }

        Ok((status, body))
    }

    /// Send a request and decode a 2xx JSON body into `T`.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let (_, body) = self.send_raw(request).await?;
        decode(&body)
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Fetch the full catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is malformed.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        let url = self.endpoint("products")?;
        let dtos: Vec<ProductDto> = self.send(self.inner.client.get(url)).await?;
        let products = convert_products(dtos)?;
        debug!(count = products.len(), "Fetched catalog");
        Ok(products)
    }

    /// Search the catalog by name or category.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when nothing matches, otherwise an
    /// error if the request fails or the body is malformed.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn search_products(&self, query: &str) -> Result<Vec<Product>, ApiError> {
        let mut url = self.endpoint("products/search")?;
        url.query_pairs_mut().append_pair("value", query);
        let dtos: Vec<ProductDto> = self.send(self.inner.client.get(url)).await?;
        let products = convert_products(dtos)?;
        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Fetch the authenticated user's cart records.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is malformed.
    #[instrument(skip(self, token))]
    pub async fn fetch_cart(&self, token: &SecretString) -> Result<Vec<CartRecord>, ApiError> {
        let url = self.endpoint("cart")?;
        let request = self
            .inner
            .client
            .get(url)
            .bearer_auth(token.expose_secret());
        let dtos: Vec<CartRecordDto> = self.send(request).await?;
        convert_cart_records(dtos)
    }

    /// Set the quantity of one product in the cart and return the full cart.
    ///
    /// A quantity of `0` is sent unchanged; the backend removes the line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is malformed.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn upsert_cart_item(
        &self,
        token: &SecretString,
        product_id: &ProductId,
        qty: u32,
    ) -> Result<Vec<CartRecord>, ApiError> {
        let url = self.endpoint("cart")?;
        let request = self
            .inner
            .client
            .post(url)
            .bearer_auth(token.expose_secret())
            .json(&CartUpsertRequest { product_id, qty });
        let dtos: Vec<CartRecordDto> = self.send(request).await?;
        convert_cart_records(dtos)
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] for bad credentials, otherwise an error
    /// if the request fails or the body is malformed.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<LoginResponse, ApiError> {
        let url = self.endpoint("auth/login")?;
        let request = self.inner.client.post(url).json(&CredentialsRequest {
            username,
            password: password.expose_secret(),
        });
        let (status, body) = self.send_raw(request).await?;
        let dto: LoginResponseDto = decode(&body)?;
        convert_login_response(status, dto)
    }

    /// Create a new account.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] if the username is taken, otherwise an
    /// error if the request fails or the body is malformed.
    #[instrument(skip(self, password))]
    pub async fn register(&self, username: &str, password: &SecretString) -> Result<(), ApiError> {
        let url = self.endpoint("auth/register")?;
        let request = self.inner.client.post(url).json(&CredentialsRequest {
            username,
            password: password.expose_secret(),
        });
        let (status, body) = self.send_raw(request).await?;
        let dto: RegisterResponseDto = decode(&body)?;
        convert_register_response(status, dto)
    }
}

// =============================================================================
// Response handling
// =============================================================================

/// Decode a JSON body, reporting schema mismatches as [`ApiError::Malformed`].
fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %truncate(body),
            "Failed to parse backend response"
        );
        ApiError::Malformed(e.to_string())
    })
}

/// Map a non-2xx response onto the error taxonomy.
///
/// 404 is reported on its own; other 4xx responses count as structured only
/// when the body carries a non-empty `message`.
fn classify_failure(status: StatusCode, body: &str) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty());

    if status == StatusCode::NOT_FOUND {
        return ApiError::NotFound { message };
    }

    match message {
        Some(message) if status.is_client_error() => ApiError::Rejected { status, message },
        message => ApiError::Server { status, message },
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(LOG_BODY_CHARS).collect()
}
