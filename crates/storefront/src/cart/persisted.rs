//! Serialized form of every identity's cart.
//!
//! One blob lives under [`STORAGE_KEY`]:
//!
//! ```json
//! {
//!   "state": {
//!     "userCarts": { "guest": [], "42": [{ "product": {...}, "quantity": 2 }] },
//!     "currentUserId": "42"
//!   },
//!   "version": 1
//! }
//! ```
//!
//! Blobs written before the envelope existed (the bare `state` object) are
//! still read and treated as version 0.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use techverse_core::CartLineItem;
use tracing::warn;

use super::CartError;
use super::identity::GUEST_SLOT;
use crate::storage::KeyValueStore;

/// Storage key holding the cart blob.
pub const STORAGE_KEY: &str = "cart-storage";

/// Current blob schema version.
pub const SCHEMA_VERSION: u64 = 1;

/// Slot map plus the identity that was active when it was written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedCart {
    #[serde(default, deserialize_with = "deserialize_slots")]
    pub user_carts: BTreeMap<String, Vec<CartLineItem>>,
    #[serde(default)]
    pub current_user_id: Option<String>,
}

/// Decode the slot map one line at a time.
///
/// A line that does not decode, or has a zero quantity, is dropped with a
/// warning. A slot that is not a list is dropped whole. Everything else in
/// the map survives, so a single bad line never costs another identity its
/// cart.
fn deserialize_slots<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, Vec<CartLineItem>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, serde_json::Value>>::deserialize(deserializer)?;

    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(slot, value)| {
            let serde_json::Value::Array(lines) = value else {
                warn!(%slot, "Dropping stored cart slot that is not a list");
                return None;
            };

            let items = lines
                .into_iter()
                .filter_map(|line| match serde_json::from_value::<CartLineItem>(line) {
                    Ok(item) if item.quantity > 0 => Some(item),
                    Ok(item) => {
                        warn!(%slot, product_id = %item.product.id, "Dropping stored cart line with zero quantity");
                        None
                    }
                    Err(e) => {
                        warn!(%slot, error = %e, "Dropping unreadable stored cart line");
                        None
                    }
                })
                .collect();
            Some((slot, items))
        })
        .collect())
}

#[derive(Serialize)]
struct Envelope<'a> {
    state: &'a PersistedCart,
    version: u64,
}

impl PersistedCart {
    /// Read the blob from `store`.
    ///
    /// Never fails: a missing key, a read error, malformed JSON or a blob from
    /// a newer schema all come back as an empty slot map.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        let raw = match store.read(STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::default(),
            Err(e) => {
                warn!(error = %e, "Failed to read stored cart, starting empty");
                return Self::default();
            }
        };

        Self::parse(&raw).unwrap_or_else(|reason| {
            warn!(%reason, "Discarding stored cart");
            Self::default()
        })
    }

    /// Decode a stored blob, accepting both the envelope and the bare record.
    ///
    /// # Errors
    ///
    /// Returns a description of why the blob was rejected.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let mut value: serde_json::Value =
            serde_json::from_str(raw).map_err(|e| format!("malformed JSON: {e}"))?;

        let version = value
            .get("version")
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(0);
        if version > SCHEMA_VERSION {
            return Err(format!(
                "schema version {version} is newer than supported version {SCHEMA_VERSION}"
            ));
        }

        let container = if value.get("state").is_some() {
            value["state"].take()
        } else {
            value
        };

        serde_json::from_value(container).map_err(|e| format!("invalid cart state: {e}"))
    }

    /// Serialize into the current envelope format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&Envelope {
            state: self,
            version: SCHEMA_VERSION,
        })
    }

    /// Write the blob to `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the store write fails.
    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<(), CartError> {
        let json = self.to_json()?;
        store.write(STORAGE_KEY, &json)?;
        Ok(())
    }

    /// Items stored for `key`, empty if the slot was never written.
    #[must_use]
    pub fn slot(&self, key: &str) -> &[CartLineItem] {
        self.user_carts.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Replace the items stored for `key`, creating the slot if needed.
    pub fn set_slot(&mut self, key: &str, items: Vec<CartLineItem>) {
        self.user_carts.insert(key.to_owned(), items);
    }

    /// Empty the guest slot.
    pub fn clear_guest(&mut self) {
        self.set_slot(GUEST_SLOT, Vec::new());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use techverse_core::{CategoryRef, ProductId, ProductSnapshot};

    fn line(id: i32, quantity: u32) -> CartLineItem {
        CartLineItem::new(
            ProductSnapshot {
                id: ProductId::new(id),
                name: format!("Product {id}"),
                slug: format!("product-{id}"),
                price: "10.00".to_string(),
                image: String::new(),
                category: CategoryRef {
                    name: "Parts".to_string(),
                },
            },
            quantity,
        )
    }

    #[test]
    fn test_missing_key_loads_empty() {
        let store = MemoryStore::new();
        assert_eq!(PersistedCart::load(&store), PersistedCart::default());
    }

    #[test]
    fn test_malformed_json_loads_empty() {
        let mut store = MemoryStore::new();
        store.write(STORAGE_KEY, "{not json").unwrap();
        assert_eq!(PersistedCart::load(&store), PersistedCart::default());
    }

    #[test]
    fn test_newer_schema_loads_empty() {
        let mut store = MemoryStore::new();
        store
            .write(
                STORAGE_KEY,
                r#"{"state":{"userCarts":{},"currentUserId":"9"},"version":99}"#,
            )
            .unwrap();
        assert_eq!(PersistedCart::load(&store), PersistedCart::default());
    }

    #[test]
    fn test_parse_bare_record() {
        let parsed = PersistedCart::parse(r#"{"userCarts":{"guest":[]},"currentUserId":null}"#)
            .unwrap();
        assert!(parsed.user_carts.contains_key("guest"));
        assert_eq!(parsed.current_user_id, None);
    }

    #[test]
    fn test_parse_versionless_envelope() {
        let raw = r#"{"state":{"currentUserId":"42"}}"#;
        let parsed = PersistedCart::parse(raw).unwrap();
        assert_eq!(parsed.current_user_id.as_deref(), Some("42"));
        assert!(parsed.user_carts.is_empty());
    }

    #[test]
    fn test_save_writes_envelope() {
        let mut store = MemoryStore::new();
        let mut cart = PersistedCart::default();
        cart.set_slot("7", vec![line(1, 2)]);
        cart.current_user_id = Some("7".to_string());
        cart.save(&mut store).unwrap();

        let raw = store.read(STORAGE_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["state"]["currentUserId"], "7");
        assert_eq!(value["state"]["userCarts"]["7"][0]["quantity"], 2);
        assert_eq!(value["state"]["userCarts"]["7"][0]["product"]["price"], "10.00");

        assert_eq!(PersistedCart::load(&store), cart);
    }

    #[test]
    fn test_bad_line_in_one_slot_keeps_other_slots() {
        let raw = r#"{
            "state": {
                "userCarts": {
                    "7": [{
                        "product": {"id": 1, "name": "Mouse", "slug": "mouse", "price": "499.00"},
                        "quantity": 1
                    }],
                    "9": [
                        {
                            "product": {"id": 2, "name": "Pad", "slug": "pad", "price": "99.00", "image": null},
                            "quantity": 2
                        },
                        {"product": {"id": 3}, "quantity": 1},
                        {
                            "product": {"id": 4, "name": "Hub", "slug": "hub", "price": "799.00"},
                            "quantity": 0
                        }
                    ],
                    "11": "not a list"
                },
                "currentUserId": "7"
            },
            "version": 1
        }"#;

        let persisted = PersistedCart::parse(raw).unwrap();
        assert_eq!(persisted.current_user_id.as_deref(), Some("7"));
        assert_eq!(persisted.slot("7").len(), 1);

        let nine = persisted.slot("9");
        assert_eq!(nine.len(), 1);
        assert_eq!(nine[0].product.id, ProductId::new(2));
        assert!(nine[0].product.image.is_empty());

        assert!(!persisted.user_carts.contains_key("11"));
    }

    #[test]
    fn test_null_user_carts_loads_empty_map() {
        let persisted =
            PersistedCart::parse(r#"{"state":{"userCarts":null,"currentUserId":null},"version":1}"#)
                .unwrap();
        assert!(persisted.user_carts.is_empty());
    }

    #[test]
    fn test_slot_defaults_to_empty() {
        let cart = PersistedCart::default();
        assert!(cart.slot("missing").is_empty());
    }

    #[test]
    fn test_clear_guest_creates_empty_slot() {
        let mut cart = PersistedCart::default();
        cart.set_slot(GUEST_SLOT, vec![line(1, 1)]);
        cart.clear_guest();
        assert_eq!(cart.user_carts.get(GUEST_SLOT).map(Vec::len), Some(0));
    }
}
