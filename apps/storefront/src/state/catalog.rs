//! # Catalog Slice
//!
//! The in-memory catalog every browsing view filters.
//!
//! ## Fetch Ordering
//! ```text
//! begin_fetch() → seq 1 ─────────────── slow ──────────────► loaded(1) ✗ dropped
//! begin_fetch() → seq 2 ──── fast ────► loaded(2) ✓ applied
//!
//! A response is applied only if its seq is newer than the last applied
//! one, so a slow stale fetch never overwrites newer data.
//! ```

use tracing::debug;

use storefront_core::Product;

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSlice {
    pub products: Vec<Product>,
    pub loading: bool,
    pub error: Option<String>,
    issued_seq: u64,
    applied_seq: u64,
}

impl Default for CatalogSlice {
    fn default() -> Self {
        CatalogSlice {
            products: Vec::new(),
            loading: true,
            error: None,
            issued_seq: 0,
            applied_seq: 0,
        }
    }
}

impl CatalogSlice {
    /// Issues the sequence number for a new fetch.
    pub fn begin_fetch(&mut self) -> u64 {
        self.issued_seq += 1;
        self.loading = true;
        self.issued_seq
    }

    /// Applies a successful fetch. Returns false if it was stale.
    pub fn apply_loaded(&mut self, seq: u64, products: Vec<Product>) -> bool {
        if !self.accept(seq) {
            return false;
        }
        self.products = products;
        self.error = None;
        true
    }

    /// Records a failed fetch. Stale failures are ignored too; the
    /// catalog keeps its last good contents.
    pub fn apply_failed(&mut self, seq: u64, message: String) -> bool {
        if !self.accept(seq) {
            return false;
        }
        self.error = Some(message);
        true
    }

    /// Adds a product created in this session without a refetch.
    pub fn push(&mut self, product: Product) {
        self.products.push(product);
    }

    pub fn find(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    fn accept(&mut self, seq: u64) -> bool {
        if seq <= self.applied_seq {
            debug!(seq, applied = self.applied_seq, "Dropping stale catalog response");
            return false;
        }
        self.applied_seq = seq;
        // Still loading while a newer request is outstanding
        self.loading = self.applied_seq < self.issued_seq;
        true
    }
}
