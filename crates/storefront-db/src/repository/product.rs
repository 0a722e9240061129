//! # Product Repository
//!
//! The catalog lives in the `products` collection. The app loads it whole
//! and filters in memory, so there is no search here.

use tracing::debug;

use crate::error::DbResult;
use crate::repository::document::DocumentRepository;
use storefront_core::Product;

/// Repository for catalog documents.
///
/// ## Usage
/// ```rust,ignore
/// let catalog = db.products().list().await?;
/// let one = db.products().get_by_id("p-1").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    docs: DocumentRepository,
}

impl ProductRepository {
    pub const COLLECTION: &'static str = "products";

    pub fn new(docs: DocumentRepository) -> Self {
        ProductRepository { docs }
    }

    /// Every product in catalog (insertion) order. Soft-deleted products
    /// are included.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products: Vec<Product> = self.docs.list().await?;
        debug!(count = products.len(), "Loaded catalog");
        Ok(products)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        self.docs.get(id).await
    }

    /// Stores a new product under its own id.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, name = %product.name, "Inserting product");
        self.docs.insert(&product.id, product).await
    }

    pub async fn count(&self) -> DbResult<i64> {
        self.docs.count().await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
