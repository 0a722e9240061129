//! # Cart Commands
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌──────────┐  add_to_cart   ┌──────────┐  clear_cart   ┌──────────┐   │
//! │  │  Empty   │───────────────►│ In Cart  │──────────────►│  Empty   │   │
//! │  └──────────┘                └──────────┘               └──────────┘   │
//! │                                  │   ▲                                  │
//! │                                  └───┘                                  │
//! │                      add_to_cart (replaces the entry)                   │
//! │                      remove_from_cart                                   │
//! │                                                                         │
//! │  Limits are checked against the store before anything is written.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::Serialize;
use tracing::debug;

use storefront_core::validation::validate_quantity;
use storefront_core::{CartEntry, ValidationError};

use crate::commands::catalog::get_product;
use crate::error::AppResult;
use crate::state::{Action, CartTotals};
use crate::Storefront;

/// Cart entries with totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub entries: Vec<CartEntry>,
    pub totals: CartTotals,
}

fn cart_response(app: &Storefront) -> CartResponse {
    app.store.with_state(|s| CartResponse {
        entries: s.cart.entries.clone(),
        totals: CartTotals::from(&s.cart),
    })
}

pub fn get_cart(app: &Storefront) -> CartResponse {
    cart_response(app)
}

/// Puts a product in the cart at its current effective price.
///
/// ## Behavior
/// - A product already in the cart has its entry replaced
/// - Products with sizes need one of them picked
pub async fn add_to_cart(
    app: &Storefront,
    product_id: &str,
    quantity: i64,
    size: Option<&str>,
) -> AppResult<CartResponse> {
    debug!(product_id = %product_id, quantity, "add_to_cart command");
    let session = app.require_session()?;
    validate_quantity(quantity)?;

    let product = get_product(app, product_id).await?;
    let size = match size.map(str::trim).filter(|s| !s.is_empty()) {
        Some(size) => match product.find_size(size) {
            Some(offered) => Some(offered.to_string()),
            None => {
                return Err(ValidationError::NotAllowed {
                    field: "Size".to_string(),
                    allowed: product.sizes.clone(),
                }
                .into())
            }
        },
        None if !product.sizes.is_empty() => {
            return Err(ValidationError::required("Size").into());
        }
        None => None,
    };

    let entry = CartEntry::for_product(&product, &session.uid, quantity, size, Utc::now());
    app.store.with_state(|s| s.cart.check_add(&entry))?;

    app.remote
        .put_cart_entry(&entry)
        .await
        .map_err(|e| app.report("Failed to add to cart: ", e.into()))?;
    app.store.dispatch(Action::CartEntryPut(entry));
    app.notifier.success("Added to cart");
    Ok(cart_response(app))
}

pub async fn remove_from_cart(app: &Storefront, product_id: &str) -> AppResult<CartResponse> {
    debug!(product_id = %product_id, "remove_from_cart command");
    let session = app.require_session()?;

    app.remote
        .remove_cart_entry(&session.uid, product_id)
        .await
        .map_err(|e| app.report("", e.into()))?;
    app.store
        .dispatch(Action::CartEntryRemoved(product_id.to_string()));
    Ok(cart_response(app))
}

/// Re-reads the cart from the remote store.
pub async fn refresh_cart(app: &Storefront) -> AppResult<CartResponse> {
    let session = app.require_session()?;
    let entries = app.remote.fetch_cart(&session.uid).await?;
    app.store.dispatch(Action::CartLoaded(entries));
    Ok(cart_response(app))
}

pub async fn clear_cart(app: &Storefront) -> AppResult<()> {
    debug!("clear_cart command");
    let session = app.require_session()?;
    app.remote
        .clear_cart(&session.uid)
        .await
        .map_err(|e| app.report("", e.into()))?;
    app.store.dispatch(Action::CartCleared);
    Ok(())
}
