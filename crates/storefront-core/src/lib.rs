//! # storefront-core: Pure Domain Logic for the Storefront
//!
//! Every rule that does not need I/O lives here: the catalog filter/sort
//! engine, money and discount math, domain types and validation.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storefront Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Views / Forms (apps/storefront)                 │   │
//! │  │    Home ──► Listing ──► Product Detail ──► Cart / Profile       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ dispatch / subscribe                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  Store + Remote Access Layer                    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            ★ storefront-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  catalog  │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │  filter   │  │   rules   │  │   │
//! │  │   │   User    │  │ discounts │  │   sort    │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, User, Address, CartEntry)
//! - [`money`] - Money in minor units, discount percentages
//! - [`catalog`] - Filter/sort engine and listing query parameters
//! - [`error`] - Domain error types
//! - [`validation`] - Input and business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::catalog::{filter_products, FilterCriteria, SortOrder};
//!
//! let criteria = FilterCriteria {
//!     sort: SortOrder::PriceAsc,
//!     ..FilterCriteria::default()
//! };
//! let visible = filter_products(&[], &criteria);
//! assert!(visible.is_empty());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::{filter_products, FilterCriteria, ListingQuery, SortOrder};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Currency used when a product document does not name one.
pub const DEFAULT_CURRENCY: &str = "INR";

/// Maximum number of images attached to a product.
pub const MAX_PRODUCT_IMAGES: usize = 4;

/// Number of bestsellers shown on the home page.
pub const BESTSELLER_LIMIT: usize = 4;

/// Number of newest products shown on the home page.
pub const LATEST_LIMIT: usize = 10;

/// Length of an Indian postal index number.
pub const PINCODE_LENGTH: usize = 6;

/// Maximum distinct entries in a cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single cart entry.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10)
pub const MAX_ITEM_QUANTITY: i64 = 999;
