//! QKart Core - Shared types library.
//!
//! This crate provides the types used across all QKart components:
//! - `storefront` - REST client, cart and catalog flows
//! - `cli` - Command-line front-end
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product ids, catalog products, cart records and items,
//!   the cart projection and order totals

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
