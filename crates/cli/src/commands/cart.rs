//! Cart commands.

use clap::Args;
use tracing::info;

use techverse_core::{CategoryRef, CurrencyCode, Price, ProductId, ProductSnapshot};
use techverse_storefront::error::{AppError, Result, add_breadcrumb};

use super::Context;

/// Product fields captured into the cart line.
#[derive(Debug, Args)]
pub struct ProductArgs {
    /// Product ID
    #[arg(long)]
    pub id: ProductId,

    /// Display name
    #[arg(long)]
    pub name: String,

    /// URL slug (used when ordering)
    #[arg(long)]
    pub slug: String,

    /// Unit price as a decimal string, e.g. 3499.00
    #[arg(long)]
    pub price: String,

    /// Image URL
    #[arg(long, default_value = "")]
    pub image: String,

    /// Category name
    #[arg(long, default_value = "")]
    pub category: String,
}

impl TryFrom<ProductArgs> for ProductSnapshot {
    type Error = AppError;

    fn try_from(args: ProductArgs) -> Result<Self> {
        Price::parse(&args.price, CurrencyCode::default())
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        if args.slug.trim().is_empty() {
            return Err(AppError::BadRequest("slug cannot be empty".to_string()));
        }

        Ok(Self {
            id: args.id,
            name: args.name,
            slug: args.slug,
            price: args.price.trim().to_owned(),
            image: args.image,
            category: CategoryRef {
                name: args.category,
            },
        })
    }
}

/// Log every line and the totals.
pub fn show(ctx: &Context) {
    let cart = &ctx.cart;

    info!("Cart for {}", cart.identity());
    if cart.is_empty() {
        info!("  (empty)");
        return;
    }

    for line in cart.items() {
        let line_total = line.line_total().map_or_else(
            || "unpriced".to_string(),
            |amount| Price::new(amount, CurrencyCode::default()).display(),
        );
        info!(
            "  #{:<6} {:<32} x{:<4} {}",
            line.product.id.to_string(),
            line.product.name,
            line.quantity,
            line_total
        );
    }
    info!("Items: {}", cart.total_items());
    info!("Total: {}", cart.formatted_total());
}

/// Add a product.
///
/// # Errors
///
/// Returns an error if the product fields are invalid or the cart cannot be
/// written.
pub fn add(ctx: &mut Context, product: ProductArgs, quantity: u32) -> Result<()> {
    if quantity == 0 {
        return Err(AppError::BadRequest("quantity must be at least 1".to_string()));
    }

    let product = ProductSnapshot::try_from(product)?;
    let product_id = product.id.to_string();
    ctx.cart.add_to_cart(product, quantity)?;
    add_breadcrumb("cart", "Added product", Some(&[("product_id", product_id.as_str())]));

    info!(
        "Added {quantity} of product {product_id}; cart now holds {} items",
        ctx.cart.total_items()
    );
    Ok(())
}

/// Remove a product's line.
///
/// # Errors
///
/// Returns an error if the cart cannot be written.
pub fn remove(ctx: &mut Context, product_id: ProductId) -> Result<()> {
    ctx.cart.remove_from_cart(product_id)?;
    info!("Removed product {product_id}");
    Ok(())
}

/// Set a line's quantity.
///
/// # Errors
///
/// Returns an error if the cart cannot be written.
pub fn update(ctx: &mut Context, product_id: ProductId, quantity: i64) -> Result<()> {
    ctx.cart.update_quantity(product_id, quantity)?;
    info!(
        "Product {product_id} quantity set; cart now holds {} items",
        ctx.cart.total_items()
    );
    Ok(())
}

/// Empty the cart.
///
/// # Errors
///
/// Returns an error if the cart cannot be written.
pub fn clear(ctx: &mut Context) -> Result<()> {
    ctx.cart.clear_cart()?;
    info!("Cart cleared");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn args(price: &str, slug: &str) -> ProductArgs {
        ProductArgs {
            id: ProductId::new(12),
            name: "16GB DDR4".to_string(),
            slug: slug.to_string(),
            price: price.to_string(),
            image: String::new(),
            category: "Memory".to_string(),
        }
    }

    #[test]
    fn test_product_args_into_snapshot() {
        let product = ProductSnapshot::try_from(args(" 3499.00 ", "ram-16gb")).unwrap();
        assert_eq!(product.price, "3499.00");
        assert_eq!(product.category.name, "Memory");
    }

    #[test]
    fn test_product_args_rejects_bad_price() {
        assert!(matches!(
            ProductSnapshot::try_from(args("cheap", "ram-16gb")),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_product_args_rejects_empty_slug() {
        assert!(matches!(
            ProductSnapshot::try_from(args("10", " ")),
            Err(AppError::BadRequest(_))
        ));
    }
}
