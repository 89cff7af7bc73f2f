//! Session commands.
//!
//! Login, logout and verify talk to the backend and then hand the cart a
//! sequenced identity change. `set` switches the cart directly.

use tracing::{info, warn};

use techverse_storefront::api::ApiError;
use techverse_storefront::error::{Result, add_breadcrumb, clear_sentry_user, set_sentry_user};

use super::Context;

/// Log in and switch the cart to the user's slot.
///
/// # Errors
///
/// Returns an error if the credentials are rejected, the backend is
/// unreachable, or the tokens or cart cannot be written.
pub async fn login(ctx: &mut Context, email: &str, password: &str) -> Result<()> {
    let api = ctx.api()?;
    let response = api.login(email, password).await?;

    ctx.save_tokens(&response.access, response.refresh.as_deref())?;

    let user = response.user;
    let change = ctx.notifier.logged_in(user.id);
    ctx.cart.apply_identity(&change)?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    add_breadcrumb("session", "Logged in", None);

    info!(
        "Logged in as {} ({}); cart holds {} items",
        user.email,
        user.id,
        ctx.cart.total_items()
    );
    if user.is_technician() {
        info!("Account has the technician role");
    }
    Ok(())
}

/// Log out locally and reset to an empty guest cart.
///
/// The backend call is best effort: an expired or unreachable session still
/// logs out locally.
///
/// # Errors
///
/// Returns an error if the tokens or cart cannot be written.
pub async fn logout(ctx: &mut Context) -> Result<()> {
    match ctx.api() {
        Ok(api) if api.has_token() => {
            if let Err(e) = api.logout().await {
                warn!(error = %e, "Backend logout failed, continuing locally");
            }
        }
        Ok(_) => {}
        Err(e) => warn!(error = %e, "Skipping backend logout"),
    }

    ctx.clear_tokens()?;
    let change = ctx.notifier.logged_out();
    ctx.cart.apply_identity(&change)?;
    clear_sentry_user();
    add_breadcrumb("session", "Logged out", None);

    info!("Logged out; cart is now {}", ctx.cart.identity());
    Ok(())
}

/// Ask the backend who the stored token belongs to and align the cart.
///
/// A rejected token is dropped and the cart falls back to the guest. Other
/// failures leave the identity untouched.
///
/// # Errors
///
/// Returns an error if the backend is unreachable or the cart cannot be
/// written.
pub async fn verify(ctx: &mut Context) -> Result<()> {
    let api = ctx.api()?;
    if !api.has_token() {
        info!("No stored token; cart is {}", ctx.cart.identity());
        return Ok(());
    }

    let ticket = ctx.notifier.begin_verify();
    let change = match api.current_user().await {
        Ok(user) => {
            set_sentry_user(&user.id, Some(user.email.as_str()));
            info!("Session valid for {} ({})", user.email, user.id);
            ticket.resolve(Some(user.id))
        }
        Err(ApiError::Unauthorized(reason)) => {
            warn!(%reason, "Stored session rejected");
            ctx.clear_tokens()?;
            clear_sentry_user();
            ticket.resolve(None)
        }
        Err(e) => return Err(e.into()),
    };

    if ctx.cart.apply_identity(&change)? {
        info!("Cart switched to {}", ctx.cart.identity());
    }
    Ok(())
}

/// Switch the cart to `user_id`, or to the guest for `None`.
///
/// # Errors
///
/// Returns an error if the cart cannot be written.
pub fn set(ctx: &mut Context, user_id: Option<&str>) -> Result<()> {
    let user_id = user_id.map(str::trim).filter(|id| !id.is_empty());
    ctx.cart.set_current_user(user_id)?;
    info!(
        "Cart is now {} with {} items",
        ctx.cart.identity(),
        ctx.cart.total_items()
    );
    Ok(())
}

/// Log the active identity.
pub fn whoami(ctx: &Context) {
    match ctx.cart.current_user() {
        Some(user_id) => info!("Signed in as user {user_id}"),
        None => info!("Browsing as guest"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use techverse_core::{CategoryRef, ProductId, ProductSnapshot};
    use techverse_storefront::cart::CartError;
    use techverse_storefront::error::AppError;

    use super::*;
    use crate::commands::tests::context;

    fn mouse() -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::new(1),
            name: "Gaming Mouse".to_string(),
            slug: "gaming-mouse".to_string(),
            price: "1299.00".to_string(),
            image: String::new(),
            category: CategoryRef::default(),
        }
    }

    #[test]
    fn test_set_guest_named_user_rejected() {
        let (mut ctx, dir) = context();
        ctx.cart.add_to_cart(mouse(), 1).unwrap();

        let err = set(&mut ctx, Some("guest")).unwrap_err();
        assert!(matches!(err, AppError::Cart(CartError::ReservedUserId(_))));
        assert!(ctx.cart.current_user().is_none());
        assert_eq!(ctx.cart.total_items(), 1);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_set_blank_user_means_guest() {
        let (mut ctx, dir) = context();
        set(&mut ctx, Some("42")).unwrap();
        assert_eq!(ctx.cart.current_user(), Some("42"));

        set(&mut ctx, Some("  ")).unwrap();
        assert!(ctx.cart.current_user().is_none());

        let _ = std::fs::remove_dir_all(dir);
    }
}
