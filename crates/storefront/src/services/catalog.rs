//! Catalog store.
//!
//! Holds the full product list fetched from `GET /products` and the list
//! currently on display, which a search narrows. Both are published through
//! a `tokio::sync::watch` channel so a front-end can re-render on change.
//!
//! The two lists are stamped separately. A load always lands in `products`
//! unless a newer load beat it; only `displayed` is contested between loads
//! and searches, and the most recently issued request wins it.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::{debug, instrument};

use qkart_core::{Product, ProductId};

use crate::backend::{ApiError, BackendClient, SERVICE_UNREACHABLE};
use crate::error::report_api_error;
use crate::models::{Notice, NoticeSink};

/// Published catalog state.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    /// Every product from the last successful catalog load.
    pub products: Vec<Product>,
    /// Products currently on display (full catalog or search results).
    pub displayed: Vec<Product>,
    /// Query behind `displayed`, `None` for the unfiltered catalog.
    pub query: Option<String>,
    /// Stamp of the load that produced `products`.
    products_seq: u64,
    /// Stamp of the load or search that produced `displayed`.
    displayed_seq: u64,
}

/// Shared handle to the catalog.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct Catalog {
    inner: Arc<CatalogInner>,
}

struct CatalogInner {
    client: BackendClient,
    notices: NoticeSink,
    state: watch::Sender<CatalogSnapshot>,
    next_seq: AtomicU64,
}

impl Catalog {
    /// Create an empty catalog backed by `client`.
    #[must_use]
    pub fn new(client: BackendClient, notices: NoticeSink) -> Self {
        let (state, _) = watch::channel(CatalogSnapshot::default());
        Self {
            inner: Arc::new(CatalogInner {
                client,
                notices,
                state,
                next_seq: AtomicU64::new(0),
            }),
        }
    }

    fn next_seq(&self) -> u64 {
        self.inner.next_seq.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Fetch the full catalog and display it.
    ///
    /// On failure the catalog is emptied and an error notice is emitted.
    /// A successful load always updates the full catalog, even when a search
    /// issued after it has already answered; that search result stays on
    /// display.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`ApiError`] after publishing the fallback.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<usize, ApiError> {
        let seq = self.next_seq();
        match self.inner.client.list_products().await {
            Ok(products) => {
                let count = products.len();
                self.apply_catalog(seq, products);
                Ok(count)
            }
            Err(err) => {
                report_api_error("catalog.load", &err);
                self.apply_catalog(seq, Vec::new());
                self.inner
                    .notices
                    .emit(Notice::error(notice_text(&err)));
                Err(err)
            }
        }
    }

    /// Search the catalog and display the matches.
    ///
    /// - matches: displayed list becomes the matches
    /// - 404: displayed list becomes empty (not an error)
    /// - any other failure: displayed list reverts to the full catalog and
    ///   an error notice is emitted
    ///
    /// A response is discarded if a newer load or search already replaced
    /// the display. The full catalog is never touched by a search.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`ApiError`] for failures other than 404.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn search(&self, query: &str) -> Result<usize, ApiError> {
        let seq = self.next_seq();
        match self.inner.client.search_products(query).await {
            Ok(found) => {
                let count = found.len();
                self.apply_display(seq, |snapshot| {
                    snapshot.displayed = found;
                    snapshot.query = Some(query.to_string());
                });
                Ok(count)
            }
            Err(ApiError::NotFound { .. }) => {
                debug!("No products matched");
                self.apply_display(seq, |snapshot| {
                    snapshot.displayed.clear();
                    snapshot.query = Some(query.to_string());
                });
                Ok(0)
            }
            Err(err) => {
                report_api_error("catalog.search", &err);
                self.apply_display(seq, |snapshot| {
                    snapshot.displayed.clone_from(&snapshot.products);
                    snapshot.query = None;
                });
                self.inner
                    .notices
                    .emit(Notice::error(notice_text(&err)));
                Err(err)
            }
        }
    }

    /// Store a load result.
    ///
    /// `products` is replaced unless a newer load already landed. The
    /// display follows when no newer search has been issued, or when it is
    /// showing the unfiltered catalog anyway.
    fn apply_catalog(&self, seq: u64, products: Vec<Product>) -> bool {
        self.inner.state.send_if_modified(|snapshot| {
            if seq <= snapshot.products_seq {
                debug!(seq, applied = snapshot.products_seq, "Discarding stale catalog load");
                return false;
            }
            if seq > snapshot.displayed_seq || snapshot.query.is_none() {
                snapshot.displayed.clone_from(&products);
                snapshot.query = None;
                snapshot.displayed_seq = snapshot.displayed_seq.max(seq);
            }
            snapshot.products = products;
            snapshot.products_seq = seq;
            true
        })
    }

    /// Apply a search outcome to the display if `seq` is the newest.
    fn apply_display(&self, seq: u64, update: impl FnOnce(&mut CatalogSnapshot)) -> bool {
        self.inner.state.send_if_modified(|snapshot| {
            if seq <= snapshot.displayed_seq {
                debug!(seq, applied = snapshot.displayed_seq, "Discarding stale search response");
                return false;
            }
            update(snapshot);
            snapshot.displayed_seq = seq;
            true
        })
    }

    /// Every product from the last catalog load.
    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        self.inner.state.borrow().products.clone()
    }

    /// Products currently on display.
    #[must_use]
    pub fn displayed(&self) -> Vec<Product> {
        self.inner.state.borrow().displayed.clone()
    }

    /// Look up a product by id in the full catalog.
    #[must_use]
    pub fn find(&self, id: &ProductId) -> Option<Product> {
        self.inner
            .state
            .borrow()
            .products
            .iter()
            .find(|p| &p.id == id)
            .cloned()
    }

    /// Current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> CatalogSnapshot {
        self.inner.state.borrow().clone()
    }

    /// Subscribe to catalog changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CatalogSnapshot> {
        self.inner.state.subscribe()
    }
}

/// Notice text for a catalog failure.
///
/// Unlike cart calls, a catalog 5xx that carries a message shows it.
fn notice_text(err: &ApiError) -> &str {
    if err.is_client_error() {
        err.user_message()
    } else {
        err.server_message().unwrap_or(SERVICE_UNREACHABLE)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use reqwest::StatusCode;
    use rust_decimal::Decimal;

    use super::*;
    use crate::config::StorefrontConfig;
    use qkart_core::Rating;

    fn catalog() -> Catalog {
        let config = StorefrontConfig::for_backend("http://127.0.0.1:9/api/v1").unwrap();
        let client = BackendClient::new(&config.backend).unwrap();
        Catalog::new(client, NoticeSink::discard())
    }

    fn product(id: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            category: "Sports".to_string(),
            cost: Decimal::from(10),
            rating: Rating::new(4.0).unwrap(),
            image: String::new(),
        }
    }

    #[test]
    fn test_slow_load_keeps_catalog_behind_newer_search() {
        let catalog = catalog();
        let load = catalog.next_seq();
        let search = catalog.next_seq();

        catalog.apply_display(search, |snapshot| {
            snapshot.displayed.clear();
            snapshot.query = Some("zzz".to_string());
        });
        catalog.apply_catalog(load, vec![product("p1"), product("p2")]);

        assert_eq!(catalog.products().len(), 2);
        assert!(catalog.displayed().is_empty());
        assert_eq!(catalog.snapshot().query.as_deref(), Some("zzz"));
        assert!(catalog.find(&ProductId::new("p1")).is_some());
    }

    #[test]
    fn test_slow_load_fills_reverted_display() {
        let catalog = catalog();
        let load = catalog.next_seq();
        let search = catalog.next_seq();

        // Failed search falls back to the (still empty) full catalog.
        catalog.apply_display(search, |snapshot| {
            snapshot.displayed.clone_from(&snapshot.products);
            snapshot.query = None;
        });
        catalog.apply_catalog(load, vec![product("p1")]);

        assert_eq!(catalog.displayed().len(), 1);
    }

    #[test]
    fn test_older_load_never_replaces_newer_load() {
        let catalog = catalog();
        let older = catalog.next_seq();
        let newer = catalog.next_seq();

        catalog.apply_catalog(newer, vec![product("new")]);
        assert!(!catalog.apply_catalog(older, vec![product("old")]));

        assert_eq!(catalog.products()[0].id.as_str(), "new");
        assert_eq!(catalog.displayed()[0].id.as_str(), "new");
    }

    #[test]
    fn test_older_search_never_replaces_newer_search() {
        let catalog = catalog();
        catalog.apply_catalog(catalog.next_seq(), vec![product("p1"), product("p2")]);
        let older = catalog.next_seq();
        let newer = catalog.next_seq();

        catalog.apply_display(newer, |snapshot| {
            snapshot.displayed = vec![product("p2")];
            snapshot.query = Some("two".to_string());
        });
        assert!(!catalog.apply_display(older, |snapshot| {
            snapshot.displayed = vec![product("p1")];
            snapshot.query = Some("one".to_string());
        }));

        assert_eq!(catalog.snapshot().query.as_deref(), Some("two"));
        assert_eq!(catalog.products().len(), 2);
    }

    #[test]
    fn test_notice_text_prefers_server_message() {
        let err = ApiError::Server {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: Some("Search index unavailable".to_string()),
        };
        assert_eq!(notice_text(&err), "Search index unavailable");
    }

    #[test]
    fn test_notice_text_generic_for_transport() {
        let err = ApiError::Malformed("eof".to_string());
        assert_eq!(notice_text(&err), SERVICE_UNREACHABLE);
    }

    #[test]
    fn test_notice_text_client_error() {
        let err = ApiError::Rejected {
            status: StatusCode::BAD_REQUEST,
            message: "Invalid search".to_string(),
        };
        assert_eq!(notice_text(&err), "Invalid search");
    }
}
