//! # Catalog Commands
//!
//! ## Load Flow
//! ```text
//! load_catalog ──► store.begin_catalog_fetch() → seq
//!                        │
//!                        ▼
//!                  remote.fetch_catalog()
//!                        │
//!          ┌─────────────┴──────────────┐
//!          ▼                            ▼
//!   CatalogLoaded { seq }        CatalogFailed { seq }
//!          │                            │
//!          └── applied only if seq is newer than the last applied one
//! ```

use std::time::Instant;

use tracing::{debug, info};

use storefront_core::Product;

use crate::error::{AppError, AppResult};
use crate::state::Action;
use crate::Storefront;

/// Fetches the whole catalog into the store.
///
/// ## Returns
/// Number of products fetched. A response overtaken by a newer fetch is
/// still reported here, but never reaches the store.
pub async fn load_catalog(app: &Storefront) -> AppResult<usize> {
    let start = Instant::now();
    let seq = app.store.begin_catalog_fetch();
    debug!(seq, "load_catalog command");

    match app.remote.fetch_catalog().await {
        Ok(products) => {
            let count = products.len();
            app.store.dispatch(Action::CatalogLoaded { seq, products });
            info!(
                seq,
                count,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Catalog loaded"
            );
            Ok(count)
        }
        Err(e) => {
            let err = AppError::from(e);
            app.store.dispatch(Action::CatalogFailed {
                seq,
                message: err.message.clone(),
            });
            Err(app.report("Failed to load products: ", err))
        }
    }
}

/// Looks a product up in the loaded catalog, falling back to the remote
/// store for ids the catalog hasn't seen.
pub async fn get_product(app: &Storefront, id: &str) -> AppResult<Product> {
    if let Some(product) = app.store.with_state(|s| s.catalog.find(id).cloned()) {
        return Ok(product);
    }

    app.remote
        .fetch_product(id)
        .await?
        .ok_or_else(|| AppError::not_found("Product", id))
}
