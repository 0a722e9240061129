//! # Global State Store
//!
//! One typed state tree, changed only by dispatching [`Action`]s.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  command ──► store.dispatch(Action::AddressAdded(a))                   │
//! │                   │                                                     │
//! │                   ▼                                                     │
//! │         ┌───────────────────────┐                                       │
//! │         │ Arc<Mutex<AppState>>  │  AppState::apply(action)              │
//! │         │  user / catalog / cart│  (pure, unit-tested)                  │
//! │         └───────────────────────┘                                       │
//! │                   │                                                     │
//! │                   ▼                                                     │
//! │         watch::Sender<u64>  version += 1                                │
//! │                   │                                                     │
//! │                   ▼                                                     │
//! │         subscribers re-read with store.with_state(..)                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The lock is never held across an `.await`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::debug;

use storefront_core::{Address, CartEntry, Product, User};

use super::cart::CartSlice;
use super::catalog::CatalogSlice;
use super::user::UserSlice;

/// Everything the views read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub user: UserSlice,
    pub catalog: CatalogSlice,
    pub cart: CartSlice,
}

/// Every state change the app can make.
#[derive(Debug, Clone)]
pub enum Action {
    /// Auth state resolved, or a fresh user document arrived.
    SetUser(Option<User>),
    UserFailed(String),
    AddressAdded(Address),
    AddressRemoved(String),
    /// Clears the user and their cart.
    SignedOut,

    CatalogLoaded { seq: u64, products: Vec<Product> },
    CatalogFailed { seq: u64, message: String },
    ProductCreated(Product),

    CartLoaded(Vec<CartEntry>),
    CartEntryPut(CartEntry),
    CartEntryRemoved(String),
    CartCleared,
}

impl Action {
    /// Short name for logs; payloads can be large.
    pub fn name(&self) -> &'static str {
        match self {
            Action::SetUser(_) => "set_user",
            Action::UserFailed(_) => "user_failed",
            Action::AddressAdded(_) => "address_added",
            Action::AddressRemoved(_) => "address_removed",
            Action::SignedOut => "signed_out",
            Action::CatalogLoaded { .. } => "catalog_loaded",
            Action::CatalogFailed { .. } => "catalog_failed",
            Action::ProductCreated(_) => "product_created",
            Action::CartLoaded(_) => "cart_loaded",
            Action::CartEntryPut(_) => "cart_entry_put",
            Action::CartEntryRemoved(_) => "cart_entry_removed",
            Action::CartCleared => "cart_cleared",
        }
    }
}

impl AppState {
    /// Applies one action.
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::SetUser(user) => self.user.set(user),
            Action::UserFailed(message) => self.user.fail(message),
            Action::AddressAdded(address) => self.user.add_address(address),
            Action::AddressRemoved(id) => self.user.remove_address(&id),
            Action::SignedOut => {
                self.user.set(None);
                self.cart.clear();
            }
            Action::CatalogLoaded { seq, products } => {
                self.catalog.apply_loaded(seq, products);
            }
            Action::CatalogFailed { seq, message } => {
                self.catalog.apply_failed(seq, message);
            }
            Action::ProductCreated(product) => self.catalog.push(product),
            Action::CartLoaded(entries) => self.cart.replace(entries),
            Action::CartEntryPut(entry) => self.cart.upsert(entry),
            Action::CartEntryRemoved(product_id) => {
                self.cart.remove(&product_id);
            }
            Action::CartCleared => self.cart.clear(),
        }
    }
}

/// Shared handle to the state tree. Clones share the same state.
#[derive(Debug, Clone)]
pub struct Store {
    state: Arc<Mutex<AppState>>,
    version: Arc<watch::Sender<u64>>,
}

impl Store {
    pub fn new() -> Self {
        let (version, _) = watch::channel(0);
        Store {
            state: Arc::new(Mutex::new(AppState::default())),
            version: Arc::new(version),
        }
    }

    pub fn dispatch(&self, action: Action) {
        debug!(action = action.name(), "Dispatching");
        self.lock().apply(action);
        self.notify();
    }

    /// Issues the sequence number for a catalog fetch and marks the
    /// catalog as loading.
    pub fn begin_catalog_fetch(&self) -> u64 {
        let seq = self.lock().catalog.begin_fetch();
        self.notify();
        seq
    }

    /// Receives the state version after every dispatch.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    /// Reads the state under the lock.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let count = store.with_state(|s| s.cart.item_count());
    /// ```
    pub fn with_state<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&AppState) -> R,
    {
        f(&self.lock())
    }

    pub fn snapshot(&self) -> AppState {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, AppState> {
        // A panic mid-apply leaves a consistent-enough tree for reads
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self) {
        self.version.send_modify(|v| *v += 1);
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use storefront_core::{AddressType, Money, NewAddress, NewProduct};

    fn user_with_addresses(ids: &[&str]) -> User {
        let mut user = User::new("u1", "asha@example.com", None, None, Utc::now());
        user.addresses = ids.iter().map(|id| address(id)).collect();
        user
    }

    fn address(id: &str) -> Address {
        NewAddress {
            pincode: "560001".to_string(),
            city: "Bengaluru".to_string(),
            state: "Karnataka".to_string(),
            street: format!("{id} MG Road"),
            landmark: None,
            label: "Home".to_string(),
            address_type: AddressType::Home,
        }
        .into_address(id.to_string(), Utc::now())
    }

    fn product(id: &str) -> Product {
        NewProduct {
            name: id.to_string(),
            price: Money::from_major(100),
            ..NewProduct::default()
        }
        .into_product(id.to_string(), Utc::now())
    }

    #[test]
    fn test_add_then_remove_address_restores_list() {
        let mut state = AppState::default();
        state.apply(Action::SetUser(Some(user_with_addresses(&["a1", "a2"]))));
        let before = state.user.addresses().to_vec();

        state.apply(Action::AddressAdded(address("a3")));
        assert_eq!(state.user.addresses().len(), 3);

        state.apply(Action::AddressRemoved("a3".to_string()));
        assert_eq!(state.user.addresses(), before.as_slice());
    }

    #[test]
    fn test_address_actions_without_user_are_noops() {
        let mut state = AppState::default();
        state.apply(Action::AddressAdded(address("a1")));
        assert!(state.user.current.is_none());
    }

    #[test]
    fn test_stale_catalog_never_replaces_newer() {
        let mut state = AppState::default();
        let first = state.catalog.begin_fetch();
        let second = state.catalog.begin_fetch();

        state.apply(Action::CatalogLoaded {
            seq: second,
            products: vec![product("new")],
        });
        assert!(!state.catalog.loading);

        state.apply(Action::CatalogLoaded {
            seq: first,
            products: vec![product("old")],
        });
        assert_eq!(state.catalog.products[0].id, "new");

        state.apply(Action::CatalogFailed {
            seq: first,
            message: "late failure".to_string(),
        });
        assert!(state.catalog.error.is_none());
    }

    #[test]
    fn test_catalog_stays_loading_until_latest_arrives() {
        let mut state = AppState::default();
        let first = state.catalog.begin_fetch();
        let _second = state.catalog.begin_fetch();

        state.apply(Action::CatalogLoaded {
            seq: first,
            products: vec![product("a")],
        });
        assert!(state.catalog.loading);
        assert_eq!(state.catalog.products.len(), 1);
    }

    #[test]
    fn test_sign_out_clears_user_and_cart() {
        let mut state = AppState::default();
        state.apply(Action::SetUser(Some(user_with_addresses(&[]))));
        state.apply(Action::CartEntryPut(CartEntry {
            product_id: "p1".to_string(),
            user_id: "u1".to_string(),
            quantity: 1,
            size: None,
            price: Money::from_major(1),
            added_at: Utc::now(),
        }));

        state.apply(Action::SignedOut);
        assert!(state.user.current.is_none());
        assert!(!state.user.loading);
        assert!(state.cart.is_empty());
    }

    #[tokio::test]
    async fn test_subscribers_see_dispatches() {
        let store = Store::new();
        let mut rx = store.subscribe();

        store.dispatch(Action::SetUser(Some(user_with_addresses(&["a1"]))));

        rx.changed().await.unwrap();
        let count = store.with_state(|s| s.user.addresses().len());
        assert_eq!(count, 1);
    }

    #[test]
    fn test_clones_share_state() {
        let store = Store::new();
        let other = store.clone();
        other.dispatch(Action::ProductCreated(product("p1")));

        assert_eq!(store.snapshot().catalog.products.len(), 1);
    }
}
