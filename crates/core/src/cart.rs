//! Cart entries, quantities and totals.
//!
//! # Model
//!
//! A cart is an ordered list of product snapshots plus a side mapping from
//! product ID to quantity. The two are deliberately independent:
//!
//! - Adding a product that is already in the cart appends a second entry,
//!   it does not increment the quantity.
//! - Entries that share a product ID share one quantity.
//!
//! # Stored form
//!
//! The cart is stored as a JSON array of entries, each carrying the quantity
//! recorded for its product. Quantities for products with no entries are
//! not stored.
//!
//! ```json
//! [{"productId":"a","name":"Lamp","image":"","description":"","unitPrice":"100","quantity":2}]
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::product::Product;
use crate::types::{Price, ProductId};

/// Quantity used for entries whose product has no recorded quantity.
pub const DEFAULT_QUANTITY: u32 = 1;

/// A product snapshot taken when it was added to the cart.
///
/// Never re-fetched, so it can go stale if the catalog changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartEntry {
    pub product_id: ProductId,
    pub name: String,
    pub image: String,
    pub description: String,
    pub unit_price: Price,
}

impl CartEntry {
    /// Snapshot a catalog product.
    #[must_use]
    pub fn snapshot(product: &Product) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            image: product.image.clone(),
            description: product.description.clone(),
            unit_price: product.price,
        }
    }
}

/// Result of [`Cart::clear`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    /// Nothing to clear; confirmation was not requested.
    AlreadyEmpty,
    /// The visitor said no.
    Declined,
    /// All entries were removed.
    Cleared,
}

/// Errors decoding a stored cart.
#[derive(Debug, thiserror::Error)]
pub enum CartDecodeError {
    /// Not valid JSON, or an entry has a missing/invalid field.
    #[error("invalid cart JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A stored quantity is below the minimum.
    #[error("entry {product_id} has quantity 0")]
    ZeroQuantity { product_id: ProductId },
}

/// Wire form of one cart entry.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredEntry {
    product_id: ProductId,
    name: String,
    #[serde(default)]
    image: String,
    #[serde(default)]
    description: String,
    unit_price: Price,
    #[serde(default = "default_quantity")]
    quantity: u32,
}

const fn default_quantity() -> u32 {
    DEFAULT_QUANTITY
}

/// The visitor's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    entries: Vec<CartEntry>,
    quantities: HashMap<ProductId, u32>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries in the order they were added.
    #[must_use]
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    /// Entries paired with their quantity.
    pub fn lines(&self) -> impl Iterator<Item = (&CartEntry, u32)> {
        self.entries
            .iter()
            .map(|entry| (entry, self.quantity(&entry.product_id)))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries (not the sum of quantities).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether any entry is for `product_id`.
    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.entries
            .iter()
            .any(|entry| &entry.product_id == product_id)
    }

    /// Append an entry. Never merges with an existing entry.
    pub fn add(&mut self, entry: CartEntry) {
        self.entries.push(entry);
    }

    /// Remove every entry for `product_id`, returning how many were removed.
    ///
    /// The recorded quantity is forgotten as well.
    pub fn remove(&mut self, product_id: &ProductId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| &entry.product_id != product_id);
        self.quantities.remove(product_id);
        before - self.entries.len()
    }

    /// Record a quantity for `product_id`.
    ///
    /// Values below 1 are ignored. Returns whether the recorded quantity
    /// changed. A quantity for a product with no entries applies to entries
    /// added later, but is not part of the stored form.
    pub fn set_quantity(&mut self, product_id: &ProductId, value: i64) -> bool {
        let Ok(quantity) = u32::try_from(value) else {
            return false;
        };
        if quantity < DEFAULT_QUANTITY {
            return false;
        }
        self.quantities.insert(product_id.clone(), quantity) != Some(quantity)
    }

    /// Quantity recorded for `product_id`, 1 if none.
    #[must_use]
    pub fn quantity(&self, product_id: &ProductId) -> u32 {
        self.quantities
            .get(product_id)
            .copied()
            .unwrap_or(DEFAULT_QUANTITY)
    }

    /// Empty the cart after asking `confirm`.
    ///
    /// An empty cart returns [`ClearOutcome::AlreadyEmpty`] without calling
    /// `confirm`.
    pub fn clear(&mut self, confirm: impl FnOnce() -> bool) -> ClearOutcome {
        if self.entries.is_empty() {
            return ClearOutcome::AlreadyEmpty;
        }
        if !confirm() {
            return ClearOutcome::Declined;
        }
        self.entries.clear();
        self.quantities.clear();
        ClearOutcome::Cleared
    }

    /// `unit_price × quantity` for one entry.
    #[must_use]
    pub fn item_total(&self, entry: &CartEntry) -> Price {
        entry.unit_price.times(self.quantity(&entry.product_id))
    }

    /// Sum of all item totals.
    #[must_use]
    pub fn total(&self) -> Price {
        self.entries
            .iter()
            .map(|entry| self.item_total(entry))
            .sum()
    }

    /// 18% of the total.
    #[must_use]
    pub fn tax(&self) -> Price {
        self.total().tax()
    }

    /// Total including tax.
    #[must_use]
    pub fn grand_total(&self) -> Price {
        self.total().with_tax()
    }

    /// Sum of quantities over all entries.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.entries
            .iter()
            .map(|entry| self.quantity(&entry.product_id))
            .fold(0, u32::saturating_add)
    }

    /// Encode for storage.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let stored: Vec<StoredEntry> = self
            .lines()
            .map(|(entry, quantity)| StoredEntry {
                product_id: entry.product_id.clone(),
                name: entry.name.clone(),
                image: entry.image.clone(),
                description: entry.description.clone(),
                unit_price: entry.unit_price,
                quantity,
            })
            .collect();
        serde_json::to_string(&stored)
    }

    /// Decode and validate a stored cart.
    ///
    /// When entries sharing a product ID disagree on quantity, the last one
    /// wins.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed, an entry has an empty ID or
    /// negative price, or a quantity is zero.
    pub fn from_json(raw: &str) -> Result<Self, CartDecodeError> {
        let stored: Vec<StoredEntry> = serde_json::from_str(raw)?;
        let mut cart = Self::new();

        for entry in stored {
            if entry.quantity < DEFAULT_QUANTITY {
                return Err(CartDecodeError::ZeroQuantity {
                    product_id: entry.product_id,
                });
            }
            cart.quantities
                .insert(entry.product_id.clone(), entry.quantity);
            cart.entries.push(CartEntry {
                product_id: entry.product_id,
                name: entry.name,
                image: entry.image,
                description: entry.description,
                unit_price: entry.unit_price,
            });
        }

        Ok(cart)
    }
}
