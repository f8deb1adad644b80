//! Core types for the QKart storefront.
//!
//! This module provides type-safe wrappers for catalog and cart concepts
//! together with the pure functions that derive display data from them.

pub mod cart;
pub mod id;
pub mod order;
pub mod product;

pub use cart::{CartItem, CartRecord, contains_product, project, total_value};
pub use id::ProductId;
pub use order::OrderSummary;
pub use product::{Product, ProductError, Rating, RatingError};
