//! Catalog product types.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// Errors produced when a product snapshot violates catalog invariants.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ProductError {
    /// The product has an empty identifier.
    #[error("product id cannot be empty")]
    EmptyId,
    /// The cost is below zero.
    #[error("product {id} has negative cost {cost}")]
    NegativeCost {
        /// Offending product.
        id: ProductId,
        /// Cost reported by the backend.
        cost: Decimal,
    },
    /// The rating is outside `0..=5`.
    #[error("product {id}: {source}")]
    Rating {
        /// Offending product.
        id: ProductId,
        /// Underlying rating error.
        source: RatingError,
    },
}

/// Errors that can occur when constructing a [`Rating`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum RatingError {
    /// The value is NaN or infinite.
    #[error("rating must be a finite number")]
    NotFinite,
    /// The value is outside the star range.
    #[error("rating must be between {min} and {max} (got {value})")]
    OutOfRange {
        /// Lowest allowed rating.
        min: f32,
        /// Highest allowed rating.
        max: f32,
        /// Rejected value.
        value: f32,
    },
}

/// A star rating between 0 and 5 inclusive.
///
/// ```
/// use qkart_core::Rating;
///
/// assert!(Rating::new(4.5).is_ok());
/// assert!(Rating::new(5.5).is_err());
/// assert!(Rating::new(f32::NAN).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Rating(f32);

impl Rating {
    /// Lowest possible rating.
    pub const MIN: f32 = 0.0;
    /// Highest possible rating.
    pub const MAX: f32 = 5.0;

    /// Create a rating, rejecting values outside `0..=5`.
    ///
    /// # Errors
    ///
    /// Returns [`RatingError`] if `value` is not finite or out of range.
    pub fn new(value: f32) -> Result<Self, RatingError> {
        if !value.is_finite() {
            return Err(RatingError::NotFinite);
        }
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(RatingError::OutOfRange {
                min: Self::MIN,
                max: Self::MAX,
                value,
            });
        }
        Ok(Self(value))
    }

    /// Returns the raw star value.
    #[must_use]
    pub const fn value(self) -> f32 {
        self.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

/// A product as listed in the catalog.
///
/// Snapshots are immutable once fetched; the cart never owns them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Backend identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Category label used for search.
    pub category: String,
    /// Unit price in the store currency.
    pub cost: Decimal,
    /// Average customer rating.
    pub rating: Rating,
    /// Image URL.
    pub image: String,
}

impl Product {
    /// Check the catalog invariants that the type system cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError`] for an empty id or a negative cost.
    pub fn validate(&self) -> Result<(), ProductError> {
        if self.id.as_str().is_empty() {
            return Err(ProductError::EmptyId);
        }
        if self.cost.is_sign_negative() && !self.cost.is_zero() {
            return Err(ProductError::NegativeCost {
                id: self.id.clone(),
                cost: self.cost,
            });
        }
        Ok(())
    }
}
