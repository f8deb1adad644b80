//! Storefront flows.
//!
//! # Services
//!
//! - `catalog` - product list and search results
//! - `search` - debounced search input
//! - `cart` - cart load and mutations against the backend
//! - `auth` - login, registration and logout
//!
//! Every service reports shopper-visible outcomes through a
//! [`NoticeSink`](crate::models::NoticeSink) in addition to its return value.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod search;

pub use auth::{AuthError, AuthService, LoginForm, RegisterForm, ValidationError};
pub use cart::{CartError, CartFlow, CartSnapshot};
pub use catalog::{Catalog, CatalogSnapshot};
pub use search::{Debouncer, SearchBox};
