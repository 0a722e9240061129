//! # Cart Slice
//!
//! Local mirror of the user's persisted cart entries.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Command              Remote call              Slice change             │
//! │  ───────              ───────────              ────────────             │
//! │  add_to_cart ───────► put_cart_entry ────────► upsert(entry)           │
//! │  remove_from_cart ──► remove_cart_entry ─────► remove(product_id)      │
//! │  clear_cart ────────► clear_cart ────────────► clear()                 │
//! │  sign in ───────────► fetch_cart ────────────► replace(entries)        │
//! │                                                                         │
//! │  check_add() runs before the remote call, so limits are enforced       │
//! │  before anything is written.                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use storefront_core::{
    CartEntry, CoreError, CoreResult, Money, MAX_CART_ITEMS, MAX_ITEM_QUANTITY,
};

/// Cart entries, unique by `product_id`.
///
/// ## Invariants
/// - Adding a product already in the cart replaces its entry
/// - At most `MAX_CART_ITEMS` entries
/// - Each quantity in `1..=MAX_ITEM_QUANTITY`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSlice {
    pub entries: Vec<CartEntry>,
}

impl CartSlice {
    /// Checks that `entry` can be stored without breaking the limits.
    pub fn check_add(&self, entry: &CartEntry) -> CoreResult<()> {
        if entry.quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: entry.quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        let is_new = !self.contains(&entry.product_id);
        if is_new && self.entries.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }
        Ok(())
    }

    pub fn upsert(&mut self, entry: CartEntry) {
        match self
            .entries
            .iter_mut()
            .find(|e| e.product_id == entry.product_id)
        {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Returns whether the product was in the cart.
    pub fn remove(&mut self, product_id: &str) -> bool {
        let initial_len = self.entries.len();
        self.entries.retain(|e| e.product_id != product_id);
        self.entries.len() != initial_len
    }

    pub fn replace(&mut self, entries: Vec<CartEntry>) {
        self.entries = entries;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.entries.iter().any(|e| e.product_id == product_id)
    }

    pub fn item_count(&self) -> usize {
        self.entries.len()
    }

    pub fn total_quantity(&self) -> i64 {
        self.entries.iter().map(|e| e.quantity).sum()
    }

    /// Sum of frozen line prices.
    pub fn subtotal(&self) -> Money {
        self.entries.iter().map(CartEntry::line_total).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Cart totals summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub item_count: usize,
    pub total_quantity: i64,
    pub subtotal: Money,
}

impl From<&CartSlice> for CartTotals {
    fn from(cart: &CartSlice) -> Self {
        CartTotals {
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            subtotal: cart.subtotal(),
        }
    }
}
