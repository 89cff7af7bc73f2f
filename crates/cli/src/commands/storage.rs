//! Storage inspection commands.

use tracing::info;

use techverse_storefront::cart::{PersistedCart, STORAGE_KEY};

use super::Context;

/// Summarize every cart slot in the durable store.
pub fn dump(ctx: &Context) {
    let persisted = PersistedCart::load(ctx.cart.store());

    info!("Data directory: {}", ctx.cart.store().dir().display());
    info!(
        "Key {STORAGE_KEY}: current user {}",
        persisted.current_user_id.as_deref().unwrap_or("(guest)")
    );

    if persisted.user_carts.is_empty() {
        info!("  (no slots)");
        return;
    }

    for (slot, items) in &persisted.user_carts {
        let units: u64 = items.iter().map(|line| u64::from(line.quantity)).sum();
        info!("  {slot:<12} {} lines, {units} items", items.len());
    }
}
