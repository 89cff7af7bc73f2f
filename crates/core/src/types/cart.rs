//! Cart line items.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::product::ProductSnapshot;

/// One line of a cart: a product snapshot and how many of it.
///
/// A stored line always has `quantity >= 1`. Code that would bring a line to
/// zero removes it instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub product: ProductSnapshot,
    pub quantity: u32,
}

impl CartLineItem {
    /// Create a new line.
    #[must_use]
    pub const fn new(product: ProductSnapshot, quantity: u32) -> Self {
        Self { product, quantity }
    }

    /// Unit price times quantity, or `None` if the price string is invalid
    /// or the multiplication overflows.
    #[must_use]
    pub fn line_total(&self) -> Option<Decimal> {
        self.product
            .unit_price()?
            .checked_mul(Decimal::from(self.quantity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CategoryRef, ProductId};

    fn snapshot(price: &str) -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::new(5),
            name: "SSD 1TB".to_string(),
            slug: "ssd-1tb".to_string(),
            price: price.to_string(),
            image: String::new(),
            category: CategoryRef {
                name: "Storage".to_string(),
            },
        }
    }

    #[test]
    fn test_line_total() {
        let line = CartLineItem::new(snapshot("10.50"), 2);
        assert_eq!(line.line_total(), Some(Decimal::new(2100, 2)));
    }

    #[test]
    fn test_line_total_invalid_price() {
        let line = CartLineItem::new(snapshot("n/a"), 2);
        assert_eq!(line.line_total(), None);
    }
}
