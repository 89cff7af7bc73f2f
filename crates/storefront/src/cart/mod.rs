//! Per-identity shopping cart.
//!
//! [`CartEngine`] owns the live cart and keeps it in step with a durable
//! slot map keyed by identity (`"guest"` or a user ID). Every mutation is
//! written through immediately.
//!
//! # Identity changes
//!
//! Carts are never merged across identities:
//!
//! | Transition | Guest slot | Live cart |
//! |---|---|---|
//! | guest → user | cleared | user's stored slot |
//! | user → guest | cleared | empty |
//! | user → user | untouched | new user's stored slot |
//!
//! Setting the identity that is already active does nothing at all.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut cart = CartEngine::load(FileStore::open(".techverse")?);
//! cart.add_to_cart(product, 2)?;
//! cart.set_current_user(Some("42"))?;
//! println!("{} items, {}", cart.total_items(), cart.formatted_total());
//! ```

mod identity;
mod persisted;

pub use identity::{CartIdentity, GUEST_SLOT, Transition};
pub use persisted::{PersistedCart, SCHEMA_VERSION, STORAGE_KEY};

use rust_decimal::Decimal;
use techverse_core::{CartLineItem, CurrencyCode, Price, ProductId, ProductSnapshot};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::session::IdentityChange;
use crate::storage::{KeyValueStore, StorageError};

/// Errors that can occur when persisting the cart.
///
/// Reads never fail. Writing the blob back can, and so can switching to a
/// user ID that would share the guest slot.
#[derive(Debug, Error)]
pub enum CartError {
    /// The durable store rejected the write.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The cart could not be serialized.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The user ID collides with the guest slot key.
    #[error("user ID {0:?} is reserved for the guest cart")]
    ReservedUserId(String),
}

/// The live cart for the active identity, backed by a durable store.
#[derive(Debug)]
pub struct CartEngine<S> {
    store: S,
    identity: CartIdentity,
    items: Vec<CartLineItem>,
    is_open: bool,
    last_sequence: Option<u64>,
}

impl<S: KeyValueStore> CartEngine<S> {
    /// Rehydrate from `store`.
    ///
    /// Restores the identity that was active when the blob was last written
    /// and that identity's items. Nothing is written. If the stored identity
    /// is out of date, the next [`set_current_user`](Self::set_current_user)
    /// corrects it.
    #[instrument(skip(store))]
    pub fn load(store: S) -> Self {
        let persisted = PersistedCart::load(&store);
        let identity = CartIdentity::from_user_id(
            persisted
                .current_user_id
                .as_deref()
                .filter(|id| *id != GUEST_SLOT),
        );
        let items = persisted.slot(identity.slot_key()).to_vec();

        info!(identity = %identity, lines = items.len(), "Cart rehydrated");

        Self {
            store,
            identity,
            items,
            is_open: false,
            last_sequence: None,
        }
    }

    /// Make `user_id` (or the guest, for `None`) the cart owner.
    ///
    /// A no-op when that identity is already active. Otherwise applies the
    /// isolation policy for the transition, loads the new owner's items,
    /// closes the cart and writes the slot map back.
    ///
    /// # Errors
    ///
    /// Returns `ReservedUserId` for a user ID equal to the guest slot key,
    /// leaving the cart untouched. Otherwise returns an error if the slot map
    /// cannot be written. The in-memory switch has already happened by then.
    #[instrument(skip(self), fields(from = %self.identity))]
    pub fn set_current_user(&mut self, user_id: Option<&str>) -> Result<(), CartError> {
        if let Some(id @ GUEST_SLOT) = user_id {
            return Err(CartError::ReservedUserId(id.to_owned()));
        }

        let next = CartIdentity::from_user_id(user_id);
        let Some(transition) = Transition::between(&self.identity, &next) else {
            debug!("Identity unchanged, skipping cart switch");
            return Ok(());
        };

        let mut persisted = PersistedCart::load(&self.store);

        // The outgoing user's slot keeps whatever they had; a guest cart is
        // never carried over.
        if let CartIdentity::User(id) = &self.identity {
            persisted.set_slot(id, self.items.clone());
        }

        let mut items = persisted.slot(next.slot_key()).to_vec();
        if transition.clears_guest_slot() {
            persisted.clear_guest();
        }
        if transition == Transition::UserToGuest {
            items.clear();
        }

        info!(
            ?transition,
            to = %next,
            lines = items.len(),
            "Switching cart owner"
        );

        self.identity = next;
        self.items = items;
        self.is_open = false;

        persisted.set_slot(self.identity.slot_key(), self.items.clone());
        persisted.current_user_id = self.identity.user_id().map(str::to_owned);
        persisted.save(&mut self.store)
    }

    /// Alias of [`set_current_user`](Self::set_current_user), used by logout
    /// paths.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot map cannot be written.
    pub fn switch_user(&mut self, user_id: Option<&str>) -> Result<(), CartError> {
        self.set_current_user(user_id)
    }

    /// Apply a sequenced identity change.
    ///
    /// Changes that are not newer than the last one applied are ignored and
    /// `Ok(false)` is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot map cannot be written.
    pub fn apply_identity(&mut self, change: &IdentityChange) -> Result<bool, CartError> {
        if self
            .last_sequence
            .is_some_and(|last| change.sequence <= last)
        {
            debug!(
                sequence = change.sequence,
                last = ?self.last_sequence,
                event = %change.event,
                "Ignoring stale identity change"
            );
            return Ok(false);
        }

        self.last_sequence = Some(change.sequence);
        self.set_current_user(change.identity.as_deref())?;
        Ok(true)
    }

    /// Add `quantity` of `product`.
    ///
    /// An existing line for the same product accumulates; otherwise a line is
    /// appended. A quantity of zero does nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be written.
    #[instrument(skip(self, product), fields(product_id = %product.id, identity = %self.identity))]
    pub fn add_to_cart(&mut self, product: ProductSnapshot, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Ok(());
        }

        match self.line_mut(product.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.items.push(CartLineItem::new(product, quantity)),
        }

        self.persist()
    }

    /// Remove the line for `product_id`. Missing lines are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be written.
    #[instrument(skip(self), fields(identity = %self.identity))]
    pub fn remove_from_cart(&mut self, product_id: ProductId) -> Result<(), CartError> {
        let before = self.items.len();
        self.items.retain(|line| line.product.id != product_id);

        if self.items.len() == before {
            return Ok(());
        }
        self.persist()
    }

    /// Set the quantity of an existing line.
    ///
    /// Zero or negative removes the line. Products not in the cart are
    /// ignored; this never creates a line.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be written.
    #[instrument(skip(self), fields(identity = %self.identity))]
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: i64) -> Result<(), CartError> {
        if quantity <= 0 {
            return self.remove_from_cart(product_id);
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        let Some(line) = self.line_mut(product_id) else {
            return Ok(());
        };
        line.quantity = quantity;

        self.persist()
    }

    /// Empty the active identity's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be written.
    #[instrument(skip(self), fields(identity = %self.identity))]
    pub fn clear_cart(&mut self) -> Result<(), CartError> {
        self.items.clear();
        self.persist()
    }

    /// Show the cart drawer. Not persisted.
    pub const fn open_cart(&mut self) {
        self.is_open = true;
    }

    /// Hide the cart drawer. Not persisted.
    pub const fn close_cart(&mut self) {
        self.is_open = false;
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Sum of unit price times quantity over all lines.
    ///
    /// Lines whose price string does not parse count as zero.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.items
            .iter()
            .filter_map(|line| {
                let total = line.line_total();
                if total.is_none() {
                    warn!(
                        product_id = %line.product.id,
                        price = %line.product.price,
                        "Unpriceable cart line excluded from total"
                    );
                }
                total
            })
            .fold(Decimal::ZERO, |acc, amount| {
                acc.checked_add(amount).unwrap_or(Decimal::MAX)
            })
    }

    /// Total price formatted for display, e.g. `"₹26.00"`.
    #[must_use]
    pub fn formatted_total(&self) -> String {
        Price::new(self.total_price(), CurrencyCode::default()).display()
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether the cart drawer is open.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.is_open
    }

    /// The active identity.
    #[must_use]
    pub const fn identity(&self) -> &CartIdentity {
        &self.identity
    }

    /// The active user ID, or `None` for a guest.
    #[must_use]
    pub fn current_user(&self) -> Option<&str> {
        self.identity.user_id()
    }

    /// The backing store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Drop the engine and hand back its store.
    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }

    fn line_mut(&mut self, product_id: ProductId) -> Option<&mut CartLineItem> {
        self.items
            .iter_mut()
            .find(|line| line.product.id == product_id)
    }

    /// Write the active slot back, keeping every other slot as stored.
    fn persist(&mut self) -> Result<(), CartError> {
        let mut persisted = PersistedCart::load(&self.store);
        persisted.set_slot(self.identity.slot_key(), self.items.clone());
        persisted.current_user_id = self.identity.user_id().map(str::to_owned);
        persisted.save(&mut self.store)
    }
}
