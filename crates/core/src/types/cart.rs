//! Cart records, denormalized cart items, and the join between them.
//!
//! The backend stores a cart as a sparse list of `(productId, qty)` pairs.
//! Everything the storefront displays is derived by joining those records
//! against the current catalog snapshot with [`project`], and valued with
//! [`total_value`]. Both functions are pure and cheap enough to rerun on
//! every change of either input.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::product::{Product, Rating};

/// A server-side cart line: one product and how many of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartRecord {
    /// Product being purchased.
    pub product_id: ProductId,
    /// Quantity held in the cart.
    pub qty: u32,
}

impl CartRecord {
    /// Create a new cart record.
    #[must_use]
    pub fn new(product_id: impl Into<ProductId>, qty: u32) -> Self {
        Self {
            product_id: product_id.into(),
            qty,
        }
    }
}

/// A cart line joined with its catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    pub category: String,
    pub cost: Decimal,
    pub rating: Rating,
    pub image: String,
    pub qty: u32,
}

impl CartItem {
    /// Join a record with the product it refers to.
    #[must_use]
    pub fn from_parts(record: &CartRecord, product: &Product) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            category: product.category.clone(),
            cost: product.cost,
            rating: product.rating,
            image: product.image.clone(),
            qty: record.qty,
        }
    }

    /// `cost * qty` for this line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.cost * Decimal::from(self.qty)
    }
}

/// Join cart records against the catalog.
///
/// An empty catalog means "not loaded yet" and yields an empty cart rather
/// than an error. Records whose product is missing from the catalog are
/// dropped with a warning. Output order follows `records`.
#[must_use]
pub fn project(records: &[CartRecord], catalog: &[Product]) -> Vec<CartItem> {
    if catalog.is_empty() {
        return Vec::new();
    }

    let by_id: HashMap<&ProductId, &Product> = catalog.iter().map(|p| (&p.id, p)).collect();

    records
        .iter()
        .filter_map(|record| {
            let Some(product) = by_id.get(&record.product_id) else {
                tracing::warn!(
                    product_id = %record.product_id,
                    qty = record.qty,
                    "Cart record references a product missing from the catalog, dropping it"
                );
                return None;
            };
            Some(CartItem::from_parts(record, product))
        })
        .collect()
}

/// Total value of the given cart items (`Σ cost × qty`).
#[must_use]
pub fn total_value(items: &[CartItem]) -> Decimal {
    items.iter().map(CartItem::line_total).sum()
}

/// Whether `items` already holds a line for `product_id`.
#[must_use]
pub fn contains_product(items: &[CartItem], product_id: &ProductId) -> bool {
    items.iter().any(|item| &item.product_id == product_id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: &str, cost: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            category: "Electronics".to_string(),
            cost: Decimal::from(cost),
            rating: Rating::new(5.0).unwrap(),
            image: format!("https://cdn.example.com/{id}.png"),
        }
    }

    fn catalog() -> Vec<Product> {
        vec![product("p1", 10), product("p2", 25), product("p3", 120)]
    }

    #[test]
    fn test_project_empty_records() {
        assert!(project(&[], &catalog()).is_empty());
    }

    #[test]
    fn test_project_empty_catalog_is_not_ready() {
        let records = vec![CartRecord::new("p1", 2)];
        assert!(project(&records, &[]).is_empty());
    }

    #[test]
    fn test_project_single_item_scenario() {
        let items = project(&[CartRecord::new("p1", 3)], &[product("p1", 10)]);

        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.product_id, ProductId::new("p1"));
        assert_eq!(item.qty, 3);
        assert_eq!(item.cost, Decimal::from(10));
        assert_eq!(item.name, "Product p1");
        assert_eq!(total_value(&items), Decimal::from(30));
    }

    #[test]
    fn test_project_drops_orphans() {
        let records = vec![
            CartRecord::new("p1", 1),
            CartRecord::new("px", 1),
            CartRecord::new("p3", 2),
        ];
        let items = project(&records, &catalog());

        assert_eq!(items.len(), 2);
        assert!(!contains_product(&items, &ProductId::new("px")));
        assert_eq!(total_value(&items), Decimal::from(250));
    }

    #[test]
    fn test_project_preserves_record_order() {
        let records = vec![
            CartRecord::new("p3", 1),
            CartRecord::new("p1", 1),
            CartRecord::new("p2", 1),
        ];
        let ids: Vec<_> = project(&records, &catalog())
            .into_iter()
            .map(|i| i.product_id.into_inner())
            .collect();
        assert_eq!(ids, vec!["p3", "p1", "p2"]);
    }

    #[test]
    fn test_project_length_bounded_by_records() {
        let records = vec![
            CartRecord::new("p1", 1),
            CartRecord::new("p2", 4),
            CartRecord::new("nope", 1),
        ];
        let items = project(&records, &catalog());
        assert!(items.len() <= records.len());

        let resolvable = &records[..2];
        assert_eq!(project(resolvable, &catalog()).len(), resolvable.len());
    }

    #[test]
    fn test_project_is_idempotent() {
        let records = vec![CartRecord::new("p2", 2), CartRecord::new("p1", 7)];
        let catalog = catalog();
        assert_eq!(project(&records, &catalog), project(&records, &catalog));
    }

    #[test]
    fn test_total_value_empty() {
        assert_eq!(total_value(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_total_value_additive() {
        let catalog = catalog();
        let a = project(&[CartRecord::new("p1", 2)], &catalog);
        let b = project(&[CartRecord::new("p2", 3), CartRecord::new("p3", 1)], &catalog);
        let both: Vec<_> = a.iter().chain(b.iter()).cloned().collect();

        assert_eq!(total_value(&both), total_value(&a) + total_value(&b));
    }

    #[test]
    fn test_total_value_fractional_costs() {
        let mut p = product("p1", 0);
        p.cost = Decimal::new(1999, 2);
        let items = project(&[CartRecord::new("p1", 3)], &[p]);
        assert_eq!(total_value(&items), Decimal::new(5997, 2));
    }

    #[test]
    fn test_cart_record_wire_shape() {
        let record: CartRecord =
            serde_json::from_str(r#"{"productId":"p1","qty":3}"#).unwrap();
        assert_eq!(record, CartRecord::new("p1", 3));
    }
}
