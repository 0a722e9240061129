//! # Cart Repository
//!
//! One user's cart entries in `users/{uid}/cart`, keyed by product id, so
//! adding a product that is already in the cart replaces its entry.

use tracing::debug;

use crate::error::DbResult;
use crate::repository::document::DocumentRepository;
use storefront_core::CartEntry;

#[derive(Debug, Clone)]
pub struct CartRepository {
    docs: DocumentRepository,
}

impl CartRepository {
    pub fn collection_for(uid: &str) -> String {
        format!("users/{uid}/cart")
    }

    pub fn new(docs: DocumentRepository) -> Self {
        CartRepository { docs }
    }

    pub async fn put(&self, entry: &CartEntry) -> DbResult<()> {
        debug!(
            collection = %self.docs.collection(),
            product_id = %entry.product_id,
            quantity = entry.quantity,
            "Saving cart entry"
        );
        self.docs.put(&entry.product_id, entry).await
    }

    pub async fn list(&self) -> DbResult<Vec<CartEntry>> {
        self.docs.list().await
    }

    /// Returns whether the product was in the cart.
    pub async fn remove(&self, product_id: &str) -> DbResult<bool> {
        self.docs.delete(product_id).await
    }

    pub async fn clear(&self) -> DbResult<u64> {
        self.docs.clear().await
    }
}
