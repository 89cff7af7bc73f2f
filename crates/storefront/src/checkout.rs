//! Turning the cart into an order.
//!
//! The backend takes the whole cart as one bulk order addressed to a saved
//! delivery address. The cart is cleared only once the backend has accepted
//! the order, so a failed checkout leaves it intact for a retry.

use techverse_core::{AddressId, CartLineItem};
use thiserror::Error;
use tracing::{info, instrument};

use crate::api::{ApiClient, ApiError, BulkOrderItem, BulkOrderRequest, OrderSummary};
use crate::cart::{CartEngine, CartError};
use crate::storage::KeyValueStore;

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing to order.
    #[error("cart is empty")]
    EmptyCart,

    /// Guests cannot place orders.
    #[error("login required to place an order")]
    NotLoggedIn,

    /// Backend rejected or failed the order.
    #[error("order failed: {0}")]
    Api(#[from] ApiError),

    /// Order was placed but the cart could not be cleared.
    #[error("order placed but cart not cleared: {0}")]
    Cart(#[from] CartError),
}

impl BulkOrderRequest {
    /// Build the order body for `items`, one entry per cart line.
    ///
    /// # Errors
    ///
    /// Returns `EmptyCart` if there are no lines.
    pub fn from_cart(address_id: AddressId, items: &[CartLineItem]) -> Result<Self, CheckoutError> {
        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        Ok(Self {
            address_id,
            items: items
                .iter()
                .map(|line| BulkOrderItem {
                    product_slug: line.product.slug.clone(),
                    quantity: line.quantity,
                })
                .collect(),
        })
    }
}

/// Place an order for everything in `cart` and empty it on success.
///
/// # Errors
///
/// Returns an error if the cart is empty, the owner is a guest, the backend
/// rejects the order, or the emptied cart cannot be written.
#[instrument(skip(cart, api), fields(identity = %cart.identity()))]
pub async fn place_order<S: KeyValueStore>(
    cart: &mut CartEngine<S>,
    api: &ApiClient,
    address_id: AddressId,
) -> Result<OrderSummary, CheckoutError> {
    if cart.current_user().is_none() {
        return Err(CheckoutError::NotLoggedIn);
    }

    let request = BulkOrderRequest::from_cart(address_id, cart.items())?;
    let order = api.create_bulk_order(&request).await?;

    info!(order_id = %order.id, total = %cart.formatted_total(), "Order placed");
    cart.clear_cart()?;

    Ok(order)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use crate::storage::MemoryStore;
    use techverse_core::{CategoryRef, ProductId, ProductSnapshot};

    fn product(id: i32, slug: &str) -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::new(id),
            name: slug.to_uppercase(),
            slug: slug.to_string(),
            price: "499.00".to_string(),
            image: String::new(),
            category: CategoryRef {
                name: "Accessories".to_string(),
            },
        }
    }

    #[test]
    fn test_from_cart_maps_lines_in_order() {
        let items = vec![
            CartLineItem::new(product(2, "hdmi-cable"), 3),
            CartLineItem::new(product(1, "mouse"), 1),
        ];
        let request = BulkOrderRequest::from_cart(AddressId::new(5), &items).unwrap();

        assert_eq!(request.address_id, AddressId::new(5));
        assert_eq!(
            request.items,
            vec![
                BulkOrderItem {
                    product_slug: "hdmi-cable".to_string(),
                    quantity: 3,
                },
                BulkOrderItem {
                    product_slug: "mouse".to_string(),
                    quantity: 1,
                },
            ]
        );
    }

    #[test]
    fn test_from_cart_empty() {
        assert!(matches!(
            BulkOrderRequest::from_cart(AddressId::new(1), &[]),
            Err(CheckoutError::EmptyCart)
        ));
    }

    #[tokio::test]
    async fn test_guest_cannot_checkout() {
        let api = ApiClient::new(&ApiConfig::new("http://127.0.0.1:9").unwrap()).unwrap();
        let mut cart = CartEngine::load(MemoryStore::new());
        cart.add_to_cart(product(1, "mouse"), 1).unwrap();

        let err = place_order(&mut cart, &api, AddressId::new(1)).await.unwrap_err();
        assert!(matches!(err, CheckoutError::NotLoggedIn));
        assert_eq!(cart.line_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_cart_cannot_checkout() {
        let api = ApiClient::new(&ApiConfig::new("http://127.0.0.1:9").unwrap()).unwrap();
        let mut cart = CartEngine::load(MemoryStore::new());
        cart.set_current_user(Some("4")).unwrap();

        let err = place_order(&mut cart, &api, AddressId::new(1)).await.unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
    }

    #[tokio::test]
    async fn test_missing_token_keeps_cart() {
        let api = ApiClient::new(&ApiConfig::new("http://127.0.0.1:9").unwrap()).unwrap();
        let mut cart = CartEngine::load(MemoryStore::new());
        cart.set_current_user(Some("4")).unwrap();
        cart.add_to_cart(product(1, "mouse"), 2).unwrap();

        let err = place_order(&mut cart, &api, AddressId::new(1)).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Api(ApiError::Unauthorized(_))));
        assert_eq!(cart.total_items(), 2);
    }
}
