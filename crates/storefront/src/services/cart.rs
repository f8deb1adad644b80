//! Cart mutation flow.
//!
//! The backend owns the cart. Locally we keep only the last record set the
//! backend sent us; display items are re-derived from it with
//! [`qkart_core::project`] against the current catalog, so a catalog reload
//! is reflected without another cart call.
//!
//! Every mutation is stamped when issued. A response is applied only if its
//! stamp is newer than the last applied one, so when two requests overlap
//! (a double-click on "+") the older response can never overwrite the newer.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, instrument};

use qkart_core::{
    CartItem, CartRecord, OrderSummary, ProductId, contains_product, project, total_value,
};

use crate::backend::{ApiError, BackendClient};
use crate::error::{add_breadcrumb, api_error_notice, report_api_error};
use crate::models::notice::messages;
use crate::models::{Notice, NoticeSink, Session};

use super::catalog::Catalog;

/// Reasons a cart action did not go through.
#[derive(Debug, Error)]
pub enum CartError {
    /// The shopper is not logged in.
    #[error("login required")]
    LoginRequired,

    /// Add was requested for a product already in the cart.
    #[error("product {0} is already in the cart")]
    AlreadyInCart(ProductId),

    /// The backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl CartError {
    /// The notice shown to the shopper for this error.
    #[must_use]
    pub fn notice(&self) -> Notice {
        match self {
            Self::LoginRequired => Notice::error(messages::LOGIN_REQUIRED),
            Self::AlreadyInCart(_) => Notice::warning(messages::ALREADY_IN_CART),
            Self::Api(err) => api_error_notice(err, messages::CART_UNAVAILABLE),
        }
    }
}

/// Published cart state.
#[derive(Debug, Clone, Default)]
pub struct CartSnapshot {
    /// Records as last returned by the backend.
    pub records: Vec<CartRecord>,
    /// Stamp of the request that produced `records`.
    applied_seq: u64,
}

/// Cart operations for one session.
///
/// This struct is cheaply cloneable via `Arc`; clones share state.
#[derive(Clone)]
pub struct CartFlow {
    inner: Arc<CartFlowInner>,
}

struct CartFlowInner {
    client: BackendClient,
    session: Session,
    catalog: Catalog,
    notices: NoticeSink,
    state: watch::Sender<CartSnapshot>,
    next_seq: AtomicU64,
}

impl CartFlow {
    /// Create a cart flow with an empty cart.
    #[must_use]
    pub fn new(
        client: BackendClient,
        session: Session,
        catalog: Catalog,
        notices: NoticeSink,
    ) -> Self {
        let (state, _) = watch::channel(CartSnapshot::default());
        Self {
            inner: Arc::new(CartFlowInner {
                client,
                session,
                catalog,
                notices,
                state,
                next_seq: AtomicU64::new(0),
            }),
        }
    }

    /// The session this flow acts for.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    fn next_seq(&self) -> u64 {
        self.inner.next_seq.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Fetch the cart from the backend and publish it.
    ///
    /// Anonymous sessions publish an empty cart without a call. On failure
    /// an empty cart is published and a notice asks the shopper to retry;
    /// catalog browsing is unaffected.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Api`] if the fetch failed.
    #[instrument(skip(self), fields(user = self.session().username()))]
    pub async fn load(&self) -> Result<(), CartError> {
        let seq = self.next_seq();
        let Some(token) = self.inner.session.token() else {
            self.apply(seq, Vec::new());
            return Ok(());
        };

        match self.inner.client.fetch_cart(token).await {
            Ok(records) => {
                debug!(lines = records.len(), "Cart loaded");
                self.apply(seq, records);
                Ok(())
            }
            Err(err) => {
                self.apply(seq, Vec::new());
                Err(self.fail("cart.load", err))
            }
        }
    }

    /// Add a product that is not yet in the cart.
    ///
    /// Products already in the cart are refused locally with a warning:
    /// quantity changes go through [`CartFlow::update_quantity`].
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LoginRequired`] for anonymous sessions,
    /// [`CartError::AlreadyInCart`] for duplicates, and [`CartError::Api`]
    /// if the backend call failed. No network call is made for the first two.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add(&self, product_id: &ProductId, qty: u32) -> Result<(), CartError> {
        let token = self.require_token()?;

        if contains_product(&self.items(), product_id) {
            let err = CartError::AlreadyInCart(product_id.clone());
            self.inner.notices.emit(err.notice());
            return Err(err);
        }

        add_breadcrumb(
            "cart",
            "Add to cart",
            Some(&[("product_id", product_id.as_str())]),
        );
        self.upsert(token, product_id, qty).await
    }

    /// Add a single unit of a product.
    ///
    /// # Errors
    ///
    /// See [`CartError`].
    pub async fn add_one(&self, product_id: &ProductId) -> Result<(), CartError> {
        self.add(product_id, 1).await
    }

    /// Set the quantity of a product in the cart.
    ///
    /// `qty == 0` is forwarded to the backend unchanged, which removes the
    /// line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LoginRequired`] for anonymous sessions and
    /// [`CartError::Api`] if the backend call failed.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn update_quantity(&self, product_id: &ProductId, qty: u32) -> Result<(), CartError> {
        let token = self.require_token()?;
        add_breadcrumb(
            "cart",
            "Update quantity",
            Some(&[("product_id", product_id.as_str())]),
        );
        self.upsert(token, product_id, qty).await
    }

    /// Increase the quantity of a line already in the cart by one.
    ///
    /// # Errors
    ///
    /// See [`CartFlow::update_quantity`].
    pub async fn increment(&self, product_id: &ProductId) -> Result<(), CartError> {
        let qty = self.quantity_of(product_id).saturating_add(1);
        self.update_quantity(product_id, qty).await
    }

    /// Decrease the quantity of a line by one; reaching zero removes it.
    ///
    /// # Errors
    ///
    /// See [`CartFlow::update_quantity`].
    pub async fn decrement(&self, product_id: &ProductId) -> Result<(), CartError> {
        let qty = self.quantity_of(product_id).saturating_sub(1);
        self.update_quantity(product_id, qty).await
    }

    async fn upsert(
        &self,
        token: &SecretString,
        product_id: &ProductId,
        qty: u32,
    ) -> Result<(), CartError> {
        let seq = self.next_seq();
        match self
            .inner
            .client
            .upsert_cart_item(token, product_id, qty)
            .await
        {
            Ok(records) => {
                self.apply(seq, records);
                Ok(())
            }
            Err(err) => Err(self.fail("cart.upsert", err)),
        }
    }

    fn require_token(&self) -> Result<&SecretString, CartError> {
        self.inner.session.token().ok_or_else(|| {
            let err = CartError::LoginRequired;
            self.inner.notices.emit(err.notice());
            err
        })
    }

    fn fail(&self, operation: &str, err: ApiError) -> CartError {
        report_api_error(operation, &err);
        let err = CartError::Api(err);
        self.inner.notices.emit(err.notice());
        err
    }

    /// Replace the record set if `seq` is newer than the last applied one.
    fn apply(&self, seq: u64, records: Vec<CartRecord>) -> bool {
        self.inner.state.send_if_modified(|snapshot| {
            if seq <= snapshot.applied_seq {
                debug!(seq, applied = snapshot.applied_seq, "Discarding stale cart response");
                return false;
            }
            snapshot.records = records;
            snapshot.applied_seq = seq;
            true
        })
    }

    /// Records as last returned by the backend.
    #[must_use]
    pub fn records(&self) -> Vec<CartRecord> {
        self.inner.state.borrow().records.clone()
    }

    /// Display items: records joined with the current catalog.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        let catalog = self.inner.catalog.products();
        project(&self.inner.state.borrow().records, &catalog)
    }

    /// Quantity of `product_id` in the cart, `0` if absent.
    #[must_use]
    pub fn quantity_of(&self, product_id: &ProductId) -> u32 {
        self.inner
            .state
            .borrow()
            .records
            .iter()
            .find(|r| &r.product_id == product_id)
            .map_or(0, |r| r.qty)
    }

    /// Total value of the displayed items.
    #[must_use]
    pub fn total(&self) -> Decimal {
        total_value(&self.items())
    }

    /// Checkout summary of the displayed items.
    #[must_use]
    pub fn summary(&self) -> OrderSummary {
        OrderSummary::from_items(&self.items())
    }

    /// Subscribe to record set changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.inner.state.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;
    use crate::models::NoticeLevel;

    #[test]
    fn test_login_required_notice() {
        let notice = CartError::LoginRequired.notice();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, messages::LOGIN_REQUIRED);
    }

    #[test]
    fn test_duplicate_notice_is_warning() {
        let notice = CartError::AlreadyInCart(ProductId::new("p1")).notice();
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert_eq!(notice.message, messages::ALREADY_IN_CART);
    }

    #[test]
    fn test_api_notice_taxonomy() {
        let rejected = CartError::Api(ApiError::Rejected {
            status: StatusCode::BAD_REQUEST,
            message: "Product doesn't exist".to_string(),
        });
        assert_eq!(rejected.notice().message, "Product doesn't exist");

        let outage = CartError::Api(ApiError::Server {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: None,
        });
        assert_eq!(outage.notice().message, messages::CART_UNAVAILABLE);
    }
}
