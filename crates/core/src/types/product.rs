//! Product snapshots carried inside cart lines.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::id::ProductId;
use super::price::{CurrencyCode, Price};

/// Category name attached to a product snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CategoryRef {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// A copy of the catalog fields a cart line needs, taken when the product
/// is added.
///
/// The snapshot is never refreshed from the catalog. `price` stays the
/// decimal string the backend sent so the stored cart round-trips exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub price: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: CategoryRef,
}

/// Read an explicit `null` the same as a missing field. The backend sends
/// `"image": null` for products without a picture.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl ProductSnapshot {
    /// Parsed unit price, or `None` if the stored string is not a valid
    /// non-negative decimal.
    #[must_use]
    pub fn unit_price(&self) -> Option<Decimal> {
        Price::parse(&self.price, CurrencyCode::default())
            .ok()
            .map(|price| price.amount)
    }
}
