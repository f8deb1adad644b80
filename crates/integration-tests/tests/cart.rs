//! Cart flows against the mock backend.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use axum::http::Method;
use rust_decimal::Decimal;
use serde_json::json;

use qkart_core::ProductId;
use qkart_integration_tests::MockBackend;
use qkart_storefront::backend::ApiError;
use qkart_storefront::models::notice::messages;
use qkart_storefront::models::{NoticeLevel, Session};
use qkart_storefront::services::CartError;

const BASKETBALL: &str = "KCRwjF7lN97HnEaY";
const RACQUET: &str = "upLK9JbQ4rMhTwt4";
const DUFFLE: &str = "BW0jAAeDJmlZCF8i";

// =============================================================================
// Load and projection
// =============================================================================

#[tokio::test]
async fn test_load_projects_records_in_backend_order() {
    let backend = MockBackend::start().await;
    let session = backend.logged_in("crio.do", &[(RACQUET, 2), (BASKETBALL, 1)]);
    let (storefront, _notices) = backend.storefront();
    storefront.catalog().load().await.unwrap();

    let cart = storefront.cart(session);
    cart.load().await.unwrap();

    let items = cart.items();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].product_id.as_str(), RACQUET);
    assert_eq!(items[0].name, "YONEX Smash Badminton Racquet");
    assert_eq!(items[0].qty, 2);
    assert_eq!(items[1].product_id.as_str(), BASKETBALL);

    assert_eq!(cart.total(), Decimal::from(248));
    let summary = cart.summary();
    assert_eq!(summary.product_count, 2);
    assert_eq!(summary.total, Decimal::from(248));
    assert!(summary.is_affordable(cart.session().user().unwrap().balance));
}

#[tokio::test]
async fn test_records_without_catalog_entry_are_hidden() {
    let backend = MockBackend::start().await;
    let session = backend.logged_in("crio.do", &[("retired-product", 3), (DUFFLE, 1)]);
    let (storefront, _notices) = backend.storefront();
    storefront.catalog().load().await.unwrap();

    let cart = storefront.cart(session);
    cart.load().await.unwrap();

    assert_eq!(cart.records().len(), 2);
    assert_eq!(cart.items().len(), 1);
    assert_eq!(cart.total(), Decimal::from(150));
}

#[tokio::test]
async fn test_cart_before_catalog_is_empty() {
    let backend = MockBackend::start().await;
    let session = backend.logged_in("crio.do", &[(DUFFLE, 1)]);
    let (storefront, _notices) = backend.storefront();

    let cart = storefront.cart(session);
    cart.load().await.unwrap();
    assert!(cart.items().is_empty());

    // Items appear once the catalog arrives, without another cart call.
    storefront.catalog().load().await.unwrap();
    assert_eq!(cart.items().len(), 1);
    assert_eq!(backend.count(&Method::GET, "/cart"), 1);
}

#[tokio::test]
async fn test_unavailable_cart_keeps_catalog() {
    let backend = MockBackend::start().await;
    let session = backend.logged_in("crio.do", &[(DUFFLE, 1)]);
    backend.set_cart_unavailable(true);
    let (storefront, mut notices) = backend.storefront();
    storefront.catalog().load().await.unwrap();

    let cart = storefront.cart(session);
    let err = cart.load().await.unwrap_err();
    assert!(matches!(err, CartError::Api(ApiError::Server { .. })));
    assert!(cart.items().is_empty());
    assert_eq!(storefront.catalog().displayed().len(), 4);

    let notice = notices.try_recv().unwrap();
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(notice.message, messages::CART_UNAVAILABLE);
}

// =============================================================================
// Local refusals
// =============================================================================

#[tokio::test]
async fn test_anonymous_cart_makes_no_calls() {
    let backend = MockBackend::start().await;
    let (storefront, mut notices) = backend.storefront();
    storefront.catalog().load().await.unwrap();

    let cart = storefront.cart(Session::Anonymous);
    cart.load().await.unwrap();
    assert!(cart.items().is_empty());

    let err = cart.add_one(&ProductId::new(BASKETBALL)).await.unwrap_err();
    assert!(matches!(err, CartError::LoginRequired));

    let notice = notices.try_recv().unwrap();
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(notice.message, messages::LOGIN_REQUIRED);

    assert_eq!(backend.count(&Method::GET, "/cart"), 0);
    assert_eq!(backend.count(&Method::POST, "/cart"), 0);
}

#[tokio::test]
async fn test_duplicate_add_is_refused_locally() {
    let backend = MockBackend::start().await;
    let session = backend.logged_in("crio.do", &[(BASKETBALL, 1)]);
    let (storefront, mut notices) = backend.storefront();
    storefront.catalog().load().await.unwrap();
    let cart = storefront.cart(session);
    cart.load().await.unwrap();

    let err = cart.add_one(&ProductId::new(BASKETBALL)).await.unwrap_err();
    assert!(matches!(err, CartError::AlreadyInCart(ref id) if id.as_str() == BASKETBALL));

    let notice = notices.try_recv().unwrap();
    assert_eq!(notice.level, NoticeLevel::Warning);
    assert_eq!(notice.message, messages::ALREADY_IN_CART);

    assert_eq!(backend.count(&Method::POST, "/cart"), 0);
    assert_eq!(cart.quantity_of(&ProductId::new(BASKETBALL)), 1);
}

// =============================================================================
// Mutations
// =============================================================================

#[tokio::test]
async fn test_add_sends_product_and_quantity() {
    let backend = MockBackend::start().await;
    let session = backend.logged_in("crio.do", &[]);
    let (storefront, _notices) = backend.storefront();
    storefront.catalog().load().await.unwrap();
    let cart = storefront.cart(session);
    cart.load().await.unwrap();

    cart.add(&ProductId::new(RACQUET), 3).await.unwrap();

    let request = backend.requests().pop().unwrap();
    assert_eq!(request.body, Some(json!({ "productId": RACQUET, "qty": 3 })));
    assert_eq!(cart.quantity_of(&ProductId::new(RACQUET)), 3);
    assert_eq!(cart.total(), Decimal::from(300));
    assert_eq!(backend.cart_of("crio.do"), vec![(RACQUET.to_string(), 3)]);
}

#[tokio::test]
async fn test_zero_quantity_is_forwarded_and_removes_line() {
    let backend = MockBackend::start().await;
    let session = backend.logged_in("crio.do", &[(BASKETBALL, 2), (DUFFLE, 1)]);
    let (storefront, _notices) = backend.storefront();
    storefront.catalog().load().await.unwrap();
    let cart = storefront.cart(session);
    cart.load().await.unwrap();

    cart.update_quantity(&ProductId::new(BASKETBALL), 0)
        .await
        .unwrap();

    let request = backend.requests().pop().unwrap();
    assert_eq!(request.body, Some(json!({ "productId": BASKETBALL, "qty": 0 })));
    assert_eq!(cart.items().len(), 1);
    assert_eq!(cart.items()[0].product_id.as_str(), DUFFLE);
}

#[tokio::test]
async fn test_increment_and_decrement() {
    let backend = MockBackend::start().await;
    let session = backend.logged_in("crio.do", &[(BASKETBALL, 1)]);
    let (storefront, _notices) = backend.storefront();
    storefront.catalog().load().await.unwrap();
    let cart = storefront.cart(session);
    cart.load().await.unwrap();
    let id = ProductId::new(BASKETBALL);

    cart.increment(&id).await.unwrap();
    assert_eq!(cart.quantity_of(&id), 2);

    cart.decrement(&id).await.unwrap();
    cart.decrement(&id).await.unwrap();
    assert_eq!(cart.quantity_of(&id), 0);
    assert!(cart.items().is_empty());
}

#[tokio::test]
async fn test_backend_rejection_shows_its_message() {
    let backend = MockBackend::start().await;
    let session = backend.logged_in("crio.do", &[]);
    let (storefront, mut notices) = backend.storefront();
    storefront.catalog().load().await.unwrap();
    let cart = storefront.cart(session);
    cart.load().await.unwrap();

    let err = cart
        .add_one(&ProductId::new("no-such-product"))
        .await
        .unwrap_err();
    assert!(matches!(err, CartError::Api(ApiError::Rejected { .. })));
    assert_eq!(notices.try_recv().unwrap().message, "Product doesn't exist");
}

#[tokio::test]
async fn test_expired_token_shows_backend_message() {
    let backend = MockBackend::start().await;
    let (storefront, mut notices) = backend.storefront();
    storefront.catalog().load().await.unwrap();

    let stale = Session::authenticated("revoked", "crio.do", Decimal::ZERO);
    let cart = storefront.cart(stale);
    cart.load().await.unwrap_err();

    assert_eq!(
        notices.try_recv().unwrap().message,
        qkart_integration_tests::UNAUTHORIZED_MESSAGE
    );
}

#[tokio::test]
async fn test_stale_response_does_not_overwrite_newer() {
    let backend = MockBackend::start().await;
    let session = backend.logged_in("crio.do", &[(BASKETBALL, 1)]);
    let (storefront, _notices) = backend.storefront();
    storefront.catalog().load().await.unwrap();
    let cart = storefront.cart(session);
    cart.load().await.unwrap();
    let id = ProductId::new(BASKETBALL);

    backend.delay_next_upsert(Duration::from_millis(400));
    let slow = cart.update_quantity(&id, 2);
    let fast = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        cart.update_quantity(&id, 5).await
    };
    let (slow, fast) = tokio::join!(slow, fast);
    slow.unwrap();
    fast.unwrap();

    assert_eq!(cart.quantity_of(&id), 5);
    assert_eq!(backend.cart_of("crio.do"), vec![(BASKETBALL.to_string(), 5)]);
}
