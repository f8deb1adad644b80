//! Storefront state shared across flows.

use std::sync::Arc;

use crate::backend::{ApiError, BackendClient};
use crate::config::StorefrontConfig;
use crate::models::{NoticeSink, Session};
use crate::services::{AuthService, CartFlow, Catalog, SearchBox};

/// Entry point tying the configuration, backend client and catalog together.
///
/// This struct is cheaply cloneable via `Arc`. Per-session flows are built
/// from it with [`Storefront::cart`]; the session is always passed in.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: StorefrontConfig,
    client: BackendClient,
    catalog: Catalog,
    notices: NoticeSink,
}

impl Storefront {
    /// Create the storefront state.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: StorefrontConfig, notices: NoticeSink) -> Result<Self, ApiError> {
        let client = BackendClient::new(&config.backend)?;
        let catalog = Catalog::new(client.clone(), notices.clone());

        Ok(Self {
            inner: Arc::new(StorefrontInner {
                config,
                client,
                catalog,
                notices,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the backend client.
    #[must_use]
    pub fn client(&self) -> &BackendClient {
        &self.inner.client
    }

    /// Get a reference to the shared catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get a reference to the notice sink.
    #[must_use]
    pub fn notices(&self) -> &NoticeSink {
        &self.inner.notices
    }

    /// Build a cart flow for `session`.
    #[must_use]
    pub fn cart(&self, session: Session) -> CartFlow {
        CartFlow::new(
            self.inner.client.clone(),
            session,
            self.inner.catalog.clone(),
            self.inner.notices.clone(),
        )
    }

    /// Build a search box using the configured quiet period.
    #[must_use]
    pub fn search_box(&self) -> SearchBox {
        SearchBox::new(self.inner.catalog.clone(), self.inner.config.search_debounce)
    }

    /// Build the authentication service.
    #[must_use]
    pub fn auth(&self) -> AuthService {
        AuthService::new(self.inner.client.clone(), self.inner.notices.clone())
    }
}
