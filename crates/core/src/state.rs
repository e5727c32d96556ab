//! Client state container.
//!
//! [`ClientState`] owns the visitor's [`Cart`] and [`Session`] and writes
//! every mutation through to a [`KeyValueStore`]. It is loaded once per
//! request and handed to whatever needs to read or change the state.

use tracing::{debug, warn};

use crate::cart::{Cart, CartEntry, ClearOutcome};
use crate::session::Session;
use crate::store::{KeyValueStore, StoreError, keys};
use crate::types::{DisplayName, ProductId};

/// Errors while persisting client state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to encode cart: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Cart and session mirrored to a per-visitor store.
#[derive(Debug)]
pub struct ClientState<S> {
    store: S,
    cart: Cart,
    session: Session,
}

impl<S> ClientState<S> {
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Release the underlying store.
    pub fn into_store(self) -> S {
        self.store
    }
}

impl<S: KeyValueStore> ClientState<S> {
    /// Load cart and session from `store`.
    ///
    /// A stored cart that fails to decode, or a blank stored user, is logged,
    /// removed from the store and replaced with the empty default.
    ///
    /// # Errors
    ///
    /// Returns an error if the store itself fails.
    pub async fn load(store: S) -> Result<Self, StateError> {
        let cart = match store.get(keys::CART).await? {
            None => Cart::new(),
            Some(raw) => match Cart::from_json(&raw) {
                Ok(cart) => cart,
                Err(e) => {
                    warn!(error = %e, "Discarding malformed stored cart");
                    store.remove(keys::CART).await?;
                    Cart::new()
                }
            },
        };

        let session = match store.get(keys::USER).await? {
            None => Session::anonymous(),
            Some(raw) => match DisplayName::parse(&raw) {
                Ok(user) => Session::signed_in(user),
                Err(e) => {
                    warn!(error = %e, "Discarding malformed stored user");
                    store.remove(keys::USER).await?;
                    Session::anonymous()
                }
            },
        };

        Ok(Self {
            store,
            cart,
            session,
        })
    }

    /// Append a cart entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub async fn add_to_cart(&mut self, entry: CartEntry) -> Result<(), StateError> {
        debug!(product_id = %entry.product_id, "Adding cart entry");
        self.cart.add(entry);
        self.persist_cart().await
    }

    /// Remove every entry for `product_id`. Writes only if something was
    /// removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub async fn remove_from_cart(&mut self, product_id: &ProductId) -> Result<usize, StateError> {
        let removed = self.cart.remove(product_id);
        if removed > 0 {
            self.persist_cart().await?;
        }
        Ok(removed)
    }

    /// Record a quantity. Values below 1 are ignored and nothing is written.
    ///
    /// A quantity for a product that is not in the cart is kept for this
    /// request only: the stored cart has no place for it, so nothing is
    /// written.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub async fn set_quantity(
        &mut self,
        product_id: &ProductId,
        value: i64,
    ) -> Result<bool, StateError> {
        let changed = self.cart.set_quantity(product_id, value);
        if changed && self.cart.contains(product_id) {
            self.persist_cart().await?;
        }
        Ok(changed)
    }

    /// Clear the cart after asking `confirm`.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub async fn clear_cart(
        &mut self,
        confirm: impl FnOnce() -> bool + Send,
    ) -> Result<ClearOutcome, StateError> {
        let outcome = self.cart.clear(confirm);
        if outcome == ClearOutcome::Cleared {
            self.persist_cart().await?;
        }
        Ok(outcome)
    }

    /// Start a session for `user`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store write fails.
    pub async fn sign_in(&mut self, user: DisplayName) -> Result<(), StateError> {
        self.store
            .set(keys::USER, user.as_str().to_string())
            .await?;
        self.session = Session::signed_in(user);
        Ok(())
    }

    /// End the session. The cart is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the store write fails.
    pub async fn sign_out(&mut self) -> Result<(), StateError> {
        self.store.remove(keys::USER).await?;
        self.session = Session::anonymous();
        Ok(())
    }

    async fn persist_cart(&self) -> Result<(), StateError> {
        let json = self.cart.to_json()?;
        self.store.set(keys::CART, json).await?;
        Ok(())
    }
}
