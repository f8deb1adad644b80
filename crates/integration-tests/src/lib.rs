//! Integration test support for the QKart storefront.
//!
//! [`MockBackend`] serves the REST contract of the QKart backend on an
//! ephemeral local port, records every request it sees and lets tests bend
//! its behavior (search failures, slow cart responses, malformed bodies).
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p qkart-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use qkart_storefront::config::StorefrontConfig;
use qkart_storefront::models::{NoticeReceiver, NoticeSink, Session};
use qkart_storefront::state::Storefront;

/// Message the backend sends for cart calls without a valid token.
pub const UNAUTHORIZED_MESSAGE: &str = "Protected route, Oauth2 Bearer token not found";

/// Balance credited to every mock account.
pub const STARTING_BALANCE: u32 = 5000;

/// A request as seen by the mock backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    /// Path below the API prefix, e.g. `/cart`.
    pub path: String,
    pub query: HashMap<String, String>,
    pub body: Option<Value>,
}

/// How `GET /products/search` answers.
#[derive(Debug, Clone)]
pub enum SearchReply {
    /// Case-insensitive match on name or category; 404 when nothing matches.
    Filter,
    /// Always 500, optionally with a message.
    ServerError(Option<String>),
}

struct MockState {
    products: Vec<Value>,
    products_body: Option<String>,
    search: SearchReply,
    users: HashMap<String, String>,
    carts: HashMap<String, Vec<(String, u32)>>,
    cart_unavailable: bool,
    products_delays: Vec<Duration>,
    upsert_delays: Vec<Duration>,
    requests: Vec<RecordedRequest>,
}

type Shared = Arc<Mutex<MockState>>;

/// In-process stand-in for the QKart REST backend.
pub struct MockBackend {
    addr: SocketAddr,
    state: Shared,
    handle: JoinHandle<()>,
}

impl MockBackend {
    /// Start a backend serving [`fixture_products`] with no accounts.
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(MockState {
            products: fixture_products(),
            products_body: None,
            search: SearchReply::Filter,
            users: HashMap::new(),
            carts: HashMap::new(),
            cart_unavailable: false,
            products_delays: Vec::new(),
            upsert_delays: Vec::new(),
            requests: Vec::new(),
        }));

        let api = Router::new()
            .route("/products", get(list_products))
            .route("/products/search", get(search_products))
            .route("/cart", get(fetch_cart).post(upsert_cart))
            .route("/auth/login", post(login))
            .route("/auth/register", post(register))
            .with_state(Arc::clone(&state));
        let app = Router::new().nest("/api/v1", api);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    /// Base URL including the API prefix.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/api/v1", self.addr)
    }

    /// Configuration pointing at this backend with the given quiet period.
    #[must_use]
    pub fn config(&self, search_debounce: Duration) -> StorefrontConfig {
        let mut config = StorefrontConfig::for_backend(&self.base_url()).unwrap();
        config.search_debounce = search_debounce;
        config.backend.request_timeout = Duration::from_secs(5);
        config
    }

    /// A storefront wired to this backend plus the notice receiver.
    #[must_use]
    pub fn storefront(&self) -> (Storefront, NoticeReceiver) {
        let (notices, receiver) = NoticeSink::channel();
        let storefront =
            Storefront::new(self.config(Duration::from_millis(200)), notices).unwrap();
        (storefront, receiver)
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    /// Create an account.
    pub fn add_user(&self, username: &str, password: &str) {
        self.lock()
            .users
            .insert(username.to_string(), password.to_string());
    }

    /// Create an account with a cart and return a session for it.
    #[must_use]
    pub fn logged_in(&self, username: &str, cart: &[(&str, u32)]) -> Session {
        self.add_user(username, "password123");
        self.lock().carts.insert(
            token_for(username),
            cart.iter().map(|(id, qty)| ((*id).to_string(), *qty)).collect(),
        );
        Session::authenticated(
            token_for(username),
            username,
            rust_decimal::Decimal::from(STARTING_BALANCE),
        )
    }

    /// Server-side cart of `username` as `(productId, qty)` pairs.
    #[must_use]
    pub fn cart_of(&self, username: &str) -> Vec<(String, u32)> {
        self.lock()
            .carts
            .get(&token_for(username))
            .cloned()
            .unwrap_or_default()
    }

    pub fn set_search_reply(&self, reply: SearchReply) {
        self.lock().search = reply;
    }

    /// Serve `body` verbatim with status 200 from `GET /products`.
    pub fn set_products_body(&self, body: &str) {
        self.lock().products_body = Some(body.to_string());
    }

    /// Make `GET /cart` answer 500 without a message.
    pub fn set_cart_unavailable(&self, unavailable: bool) {
        self.lock().cart_unavailable = unavailable;
    }

    /// Hold the next `GET /products` response back for `delay`.
    pub fn delay_next_products(&self, delay: Duration) {
        self.lock().products_delays.push(delay);
    }

    /// Hold the next `POST /cart` response back for `delay` after applying it.
    pub fn delay_next_upsert(&self, delay: Duration) {
        self.lock().upsert_delays.push(delay);
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// Number of requests received for `method` and `path`.
    #[must_use]
    pub fn count(&self, method: &Method, path: &str) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|r| &r.method == method && r.path == path)
            .count()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Bearer token the mock issues for `username`.
#[must_use]
pub fn token_for(username: &str) -> String {
    format!("token-{username}")
}

/// Catalog served by a fresh [`MockBackend`].
#[must_use]
pub fn fixture_products() -> Vec<Value> {
    vec![
        product("KCRwjF7lN97HnEaY", "Basketball", "Sports", 48, 5),
        product("BW0jAAeDJmlZCF8i", "Tan Leatherette Weekender Duffle", "Fashion", 150, 4),
        product("upLK9JbQ4rMhTwt4", "YONEX Smash Badminton Racquet", "Sports", 100, 5),
        product("a4sLtEcMpzabRyfx", "Atomberg 1200 mm Ceiling Fan", "Home & Kitchen", 200, 3),
    ]
}

fn product(id: &str, name: &str, category: &str, cost: u32, rating: u32) -> Value {
    json!({
        "_id": id,
        "name": name,
        "category": category,
        "cost": cost,
        "rating": rating,
        "image": format!("https://crio-directus-assets.s3.ap-south-1.amazonaws.com/{id}.png"),
    })
}

// =============================================================================
// Handlers
// =============================================================================

fn record<'a>(
    state: &'a Shared,
    method: Method,
    path: &str,
    query: HashMap<String, String>,
    body: Option<Value>,
) -> MutexGuard<'a, MockState> {
    let mut guard = state.lock().unwrap();
    guard.requests.push(RecordedRequest {
        method,
        path: path.to_string(),
        query,
        body,
    });
    guard
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "success": false, "message": message }))).into_response()
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

fn cart_body(cart: &[(String, u32)]) -> Value {
    Value::Array(
        cart.iter()
            .map(|(id, qty)| json!({ "productId": id, "qty": qty }))
            .collect(),
    )
}

async fn list_products(State(state): State<Shared>) -> Response {
    let (delay, reply) = {
        let mut guard = record(&state, Method::GET, "/products", HashMap::new(), None);
        let delay = take_delay(&mut guard.products_delays);
        let reply = match &guard.products_body {
            Some(raw) => (StatusCode::OK, raw.clone()).into_response(),
            None => Json(Value::Array(guard.products.clone())).into_response(),
        };
        (delay, reply)
    };

    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    reply
}

fn take_delay(delays: &mut Vec<Duration>) -> Option<Duration> {
    if delays.is_empty() {
        None
    } else {
        Some(delays.remove(0))
    }
}

async fn search_products(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let needle = query.get("value").cloned().unwrap_or_default().to_lowercase();
    let guard = record(&state, Method::GET, "/products/search", query, None);

    match &guard.search {
        SearchReply::ServerError(Some(message)) => {
            error(StatusCode::INTERNAL_SERVER_ERROR, message)
        }
        SearchReply::ServerError(None) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        SearchReply::Filter => {
            let matches: Vec<Value> = guard
                .products
                .iter()
                .filter(|p| {
                    ["name", "category"].iter().any(|field| {
                        p[field]
                            .as_str()
                            .is_some_and(|v| v.to_lowercase().contains(&needle))
                    })
                })
                .cloned()
                .collect();
            if matches.is_empty() {
                (StatusCode::NOT_FOUND, Json(json!([]))).into_response()
            } else {
                Json(Value::Array(matches)).into_response()
            }
        }
    }
}

async fn fetch_cart(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let guard = record(&state, Method::GET, "/cart", HashMap::new(), None);
    if guard.cart_unavailable {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    match bearer(&headers).and_then(|t| guard.carts.get(&t)) {
        Some(cart) => Json(cart_body(cart)).into_response(),
        None => error(StatusCode::UNAUTHORIZED, UNAUTHORIZED_MESSAGE),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertBody {
    product_id: String,
    qty: u32,
}

async fn upsert_cart(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let (delay, reply) = {
        let mut guard = record(&state, Method::POST, "/cart", HashMap::new(), Some(body.clone()));
        let delay = take_delay(&mut guard.upsert_delays);
        (delay, apply_upsert(&mut guard, &headers, body))
    };

    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    reply
}

fn apply_upsert(state: &mut MockState, headers: &HeaderMap, body: Value) -> Response {
    let Some(token) = bearer(headers).filter(|t| state.carts.contains_key(t)) else {
        return error(StatusCode::UNAUTHORIZED, UNAUTHORIZED_MESSAGE);
    };
    let Ok(UpsertBody { product_id, qty }) = serde_json::from_value(body) else {
        return error(StatusCode::BAD_REQUEST, "Invalid request body");
    };
    if !state.products.iter().any(|p| p["_id"] == product_id.as_str()) {
        return error(StatusCode::BAD_REQUEST, "Product doesn't exist");
    }

    let cart = state.carts.entry(token).or_default();
    if qty == 0 {
        cart.retain(|(id, _)| *id != product_id);
    } else if let Some(line) = cart.iter_mut().find(|(id, _)| *id == product_id) {
        line.1 = qty;
    } else {
        cart.push((product_id, qty));
    }
    Json(cart_body(cart)).into_response()
}

#[derive(Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut guard = record(&state, Method::POST, "/auth/login", HashMap::new(), Some(body.clone()));
    let Ok(Credentials { username, password }) = serde_json::from_value(body) else {
        return error(StatusCode::BAD_REQUEST, "Invalid request body");
    };

    let stored = guard.users.get(&username).cloned();
    match stored {
        None => error(StatusCode::BAD_REQUEST, "Username does not exist"),
        Some(stored) if stored != password => {
            error(StatusCode::BAD_REQUEST, "Password is incorrect")
        }
        Some(_) => {
            guard.carts.entry(token_for(&username)).or_default();
            let body = json!({
                "success": true,
                "token": token_for(&username),
                "username": username,
                "balance": STARTING_BALANCE,
            });
            (StatusCode::CREATED, Json(body)).into_response()
        }
    }
}

async fn register(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut guard = record(
        &state,
        Method::POST,
        "/auth/register",
        HashMap::new(),
        Some(body.clone()),
    );
    let Ok(Credentials { username, password }) = serde_json::from_value(body) else {
        return error(StatusCode::BAD_REQUEST, "Invalid request body");
    };

    if guard.users.contains_key(&username) {
        return error(StatusCode::BAD_REQUEST, "Username is already taken");
    }
    guard.carts.insert(token_for(&username), Vec::new());
    guard.users.insert(username, password);
    (StatusCode::CREATED, Json(json!({ "success": true }))).into_response()
}
