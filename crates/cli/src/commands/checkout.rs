//! Checkout command.

use tracing::info;

use techverse_core::AddressId;
use techverse_storefront::checkout::place_order;
use techverse_storefront::error::{Result, add_breadcrumb};

use super::Context;

/// Place one order for the whole cart.
///
/// # Errors
///
/// Returns an error if the cart is empty, the session is a guest, or the
/// backend rejects the order.
pub async fn run(ctx: &mut Context, address: AddressId) -> Result<()> {
    let api = ctx.api()?;
    let total = ctx.cart.formatted_total();
    let order = place_order(&mut ctx.cart, &api, address).await?;

    let order_id = order.id.to_string();
    add_breadcrumb("checkout", "Order placed", Some(&[("order_id", order_id.as_str())]));

    info!("Order #{order_id} placed for {total}");
    if let Some(status) = order.status {
        info!("Status: {status}");
    }
    Ok(())
}
