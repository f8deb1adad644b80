//! QKart storefront library.
//!
//! Talks to the QKart REST backend and implements the shopper-facing flows:
//! catalog browsing with debounced search, the cart, and login/registration.
//! Front-ends (the `qkart` CLI, tests) drive it through [`state::Storefront`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
