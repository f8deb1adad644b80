//! Order summary shown at checkout.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::cart::{CartItem, total_value};

/// Checkout totals derived from the current cart items.
///
/// Shipping is free; the total equals the subtotal until a shipping policy
/// exists on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    /// Number of distinct products in the cart.
    pub product_count: usize,
    /// Sum of line totals.
    pub subtotal: Decimal,
    /// Shipping charge.
    pub shipping: Decimal,
    /// Amount due.
    pub total: Decimal,
}

impl OrderSummary {
    /// Build a summary from cart items.
    #[must_use]
    pub fn from_items(items: &[CartItem]) -> Self {
        let subtotal = total_value(items);
        let shipping = Decimal::ZERO;
        Self {
            product_count: items.len(),
            subtotal,
            shipping,
            total: subtotal + shipping,
        }
    }

    /// Whether the given wallet balance covers the total.
    #[must_use]
    pub fn is_affordable(&self, balance: Decimal) -> bool {
        balance >= self.total
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{CartRecord, Product, ProductId, Rating, project};

    fn items() -> Vec<CartItem> {
        let catalog = vec![
            Product {
                id: ProductId::new("a"),
                name: "Smart Watch".to_string(),
                category: "Electronics".to_string(),
                cost: Decimal::from(50),
                rating: Rating::new(4.0).unwrap(),
                image: String::new(),
            },
            Product {
                id: ProductId::new("b"),
                name: "Basketball".to_string(),
                category: "Sports".to_string(),
                cost: Decimal::from(48),
                rating: Rating::new(5.0).unwrap(),
                image: String::new(),
            },
        ];
        project(
            &[CartRecord::new("a", 2), CartRecord::new("b", 1)],
            &catalog,
        )
    }

    #[test]
    fn test_summary_counts_products_not_units() {
        let summary = OrderSummary::from_items(&items());
        assert_eq!(summary.product_count, 2);
        assert_eq!(summary.subtotal, Decimal::from(148));
        assert_eq!(summary.shipping, Decimal::ZERO);
        assert_eq!(summary.total, Decimal::from(148));
    }

    #[test]
    fn test_summary_empty_cart() {
        let summary = OrderSummary::from_items(&[]);
        assert_eq!(summary.product_count, 0);
        assert_eq!(summary.total, Decimal::ZERO);
    }

    #[test]
    fn test_affordability() {
        let summary = OrderSummary::from_items(&items());
        assert!(summary.is_affordable(Decimal::from(5000)));
        assert!(summary.is_affordable(Decimal::from(148)));
        assert!(!summary.is_affordable(Decimal::from(100)));
    }
}
