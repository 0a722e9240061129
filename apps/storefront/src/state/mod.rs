//! # State Module
//!
//! Application state for the storefront.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────┐     ┌──────────────────────────┐      │
//! │  │           Store             │     │       ConfigState        │      │
//! │  │  Arc<Mutex<AppState>>       │     │  store name, currency,   │      │
//! │  │  ├── UserSlice              │     │  session, endpoints      │      │
//! │  │  ├── CatalogSlice (+seq)    │     │                          │      │
//! │  │  └── CartSlice              │     │  read-only after load    │      │
//! │  │  watch::Sender<u64>         │     │                          │      │
//! │  └─────────────────────────────┘     └──────────────────────────┘      │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • Store: Mutex for exclusive access, watch for change notification   │
//! │  • ConfigState: immutable, shared behind Arc                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod catalog;
pub mod config;
mod store;
mod user;

pub use cart::{CartSlice, CartTotals};
pub use catalog::CatalogSlice;
pub use config::{ConfigError, ConfigState, ImageHostSettings};
pub use store::{Action, AppState, Store};
pub use user::UserSlice;
