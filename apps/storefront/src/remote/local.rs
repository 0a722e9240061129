//! # Local Document Store
//!
//! [`RemoteStore`] backed by the SQLite document store in `storefront-db`.
//!
//! ## Live User Subscription
//! ```text
//! ┌───────────────┐  DocumentChange   ┌──────────────────┐  Option<User>
//! │ Database      │ ────broadcast───► │ watcher task     │ ────watch────► UI
//! │ (any writer)  │                   │ refetch on match │
//! └───────────────┘                   └──────────────────┘
//!
//! The task exits when the last receiver is dropped or the feed closes.
//! A lagged feed triggers a refetch, so no write goes unseen.
//! ```

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{broadcast::error::RecvError, watch};
use tracing::{debug, info, warn};
use uuid::Uuid;

use storefront_core::validation::{validate_new_address, validate_new_product};
use storefront_core::{Address, CartEntry, NewAddress, NewProduct, Product, ProfileUpdate, User};
use storefront_db::{Database, UserRepository};

use super::{RemoteError, RemoteResult, RemoteStore};

#[derive(Debug, Clone)]
pub struct LocalStore {
    db: Database,
}

impl LocalStore {
    pub fn new(db: Database) -> Self {
        LocalStore { db }
    }

    async fn require_user(&self, uid: &str) -> RemoteResult<User> {
        self.db
            .users()
            .get(uid)
            .await?
            .ok_or_else(|| RemoteError::not_found("User", uid))
    }
}

#[async_trait]
impl RemoteStore for LocalStore {
    async fn fetch_catalog(&self) -> RemoteResult<Vec<Product>> {
        Ok(self.db.products().list().await?)
    }

    async fn fetch_product(&self, id: &str) -> RemoteResult<Option<Product>> {
        Ok(self.db.products().get_by_id(id).await?)
    }

    async fn create_product(&self, data: NewProduct) -> RemoteResult<Product> {
        let data = validate_new_product(data)?;
        let product = data.into_product(Uuid::new_v4().to_string(), Utc::now());

        self.db.products().insert(&product).await?;
        info!(product_id = %product.id, name = %product.name, "Product created");
        Ok(product)
    }

    async fn fetch_user(&self, uid: &str) -> RemoteResult<Option<User>> {
        Ok(self.db.users().get(uid).await?)
    }

    async fn create_user(&self, user: &User) -> RemoteResult<()> {
        Ok(self.db.users().create(user).await?)
    }

    async fn ensure_user(&self, user: &User) -> RemoteResult<bool> {
        Ok(self.db.users().create_if_missing(user).await?)
    }

    async fn touch_last_login(&self, uid: &str) -> RemoteResult<()> {
        self.db.users().touch_last_login(uid, Utc::now()).await?;
        Ok(())
    }

    async fn add_address(&self, uid: &str, data: NewAddress) -> RemoteResult<Address> {
        validate_new_address(&data)?;
        let user = self.require_user(uid).await?;

        let now = Utc::now();
        let address = data.into_address(Uuid::new_v4().to_string(), now);

        let mut addresses = user.addresses;
        addresses.push(address.clone());
        self.db.users().set_addresses(uid, &addresses, now).await?;

        debug!(uid = %uid, address_id = %address.id, "Address added");
        Ok(address)
    }

    async fn remove_address(&self, uid: &str, address_id: &str) -> RemoteResult<()> {
        let user = self.require_user(uid).await?;
        if user.address(address_id).is_none() {
            return Err(RemoteError::AddressNotFound);
        }

        let remaining: Vec<Address> = user
            .addresses
            .into_iter()
            .filter(|a| a.id != address_id)
            .collect();
        self.db
            .users()
            .set_addresses(uid, &remaining, Utc::now())
            .await?;

        debug!(uid = %uid, address_id = %address_id, "Address removed");
        Ok(())
    }

    async fn update_profile(&self, uid: &str, update: &ProfileUpdate) -> RemoteResult<User> {
        Ok(self
            .db
            .users()
            .update_profile(uid, update, Utc::now())
            .await?)
    }

    async fn watch_user(&self, uid: &str) -> RemoteResult<watch::Receiver<Option<User>>> {
        // Subscribe before the first read so a write in between is not lost
        let mut changes = self.db.subscribe();
        let users = self.db.users();
        let initial = users.get(uid).await?;
        let (tx, rx) = watch::channel(initial);

        let uid = uid.to_string();
        tokio::spawn(async move {
            loop {
                let refresh = tokio::select! {
                    _ = tx.closed() => break,
                    change = changes.recv() => match change {
                        Ok(c) => c.collection == UserRepository::COLLECTION && c.id == uid,
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(uid = %uid, skipped, "User watch lagged, refetching");
                            true
                        }
                        Err(RecvError::Closed) => break,
                    },
                };
                if !refresh {
                    continue;
                }

                match users.get(&uid).await {
                    Ok(user) => {
                        tx.send_replace(user);
                    }
                    Err(e) => warn!(uid = %uid, error = %e, "Failed to refresh watched user"),
                }
            }
            debug!(uid = %uid, "User watch stopped");
        });

        Ok(rx)
    }

    async fn put_cart_entry(&self, entry: &CartEntry) -> RemoteResult<()> {
        Ok(self.db.carts(&entry.user_id).put(entry).await?)
    }

    async fn fetch_cart(&self, uid: &str) -> RemoteResult<Vec<CartEntry>> {
        Ok(self.db.carts(uid).list().await?)
    }

    async fn remove_cart_entry(&self, uid: &str, product_id: &str) -> RemoteResult<bool> {
        Ok(self.db.carts(uid).remove(product_id).await?)
    }

    async fn clear_cart(&self, uid: &str) -> RemoteResult<()> {
        let removed = self.db.carts(uid).clear().await?;
        debug!(uid = %uid, removed, "Cart cleared");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use storefront_core::{AddressType, Money, ProductStatus};
    use storefront_db::DbConfig;

    async fn store() -> LocalStore {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        LocalStore::new(db)
    }

    fn new_address(street: &str) -> NewAddress {
        NewAddress {
            pincode: "560001".to_string(),
            city: "Bengaluru".to_string(),
            state: "Karnataka".to_string(),
            street: street.to_string(),
            landmark: Some("Near Metro".to_string()),
            label: "Home".to_string(),
            address_type: AddressType::Home,
        }
    }

    async fn with_user(store: &LocalStore, uid: &str) -> User {
        let user = User::new(uid, format!("{uid}@example.com"), None, None, Utc::now());
        store.create_user(&user).await.unwrap();
        user
    }

    #[tokio::test]
    async fn test_create_product_stamps_fields() {
        let store = store().await;
        let product = store
            .create_product(NewProduct {
                name: "Linen Shirt".to_string(),
                price: Money::from_major(1000),
                discounted_price: Some(Money::from_major(800)),
                categories: vec!["topware".to_string()],
                image_urls: vec!["https://img.example/1.jpg".to_string()],
                ..NewProduct::default()
            })
            .await
            .unwrap();

        assert!(!product.id.is_empty());
        assert!(!product.is_deleted);
        assert_eq!(product.status, ProductStatus::Active);
        assert_eq!(product.discount_percentage, Some(20));
        assert_eq!(product.created_at, product.updated_at);

        let catalog = store.fetch_catalog().await.unwrap();
        assert_eq!(catalog, vec![product]);
    }

    #[tokio::test]
    async fn test_create_product_rejects_missing_images() {
        let store = store().await;
        let result = store
            .create_product(NewProduct {
                name: "Linen Shirt".to_string(),
                price: Money::from_major(1000),
                categories: vec!["topware".to_string()],
                ..NewProduct::default()
            })
            .await;

        assert!(matches!(result, Err(RemoteError::Validation(_))));
        assert!(store.fetch_catalog().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_and_remove_address() {
        let store = store().await;
        with_user(&store, "u1").await;

        let address = store.add_address("u1", new_address("12 MG Road")).await.unwrap();
        assert_eq!(
            address.full_address,
            "12 MG Road, Near Metro, Bengaluru, Karnataka - 560001"
        );

        let user = store.fetch_user("u1").await.unwrap().unwrap();
        assert_eq!(user.addresses, vec![address.clone()]);
        assert!(user.updated_at.is_some());

        store.remove_address("u1", &address.id).await.unwrap();
        let user = store.fetch_user("u1").await.unwrap().unwrap();
        assert!(user.addresses.is_empty());
    }

    #[tokio::test]
    async fn test_remove_unknown_address() {
        let store = store().await;
        with_user(&store, "u1").await;

        let err = store.remove_address("u1", "missing").await.unwrap_err();
        assert!(matches!(err, RemoteError::AddressNotFound));
        assert_eq!(err.to_string(), "Address not found");
    }

    #[tokio::test]
    async fn test_add_address_for_unknown_user() {
        let store = store().await;
        let err = store
            .add_address("ghost", new_address("1 Janpath"))
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_profile_returns_fresh_document() {
        let store = store().await;
        with_user(&store, "u1").await;

        let updated = store
            .update_profile(
                "u1",
                &ProfileUpdate {
                    display_name: Some("Asha".to_string()),
                    phone: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.display_name.as_deref(), Some("Asha"));
        assert!(updated.phone.is_none());
        assert!(updated.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_watch_user_sees_writes() {
        let store = store().await;
        with_user(&store, "u1").await;

        let mut rx = store.watch_user("u1").await.unwrap();
        assert!(rx.borrow().as_ref().unwrap().addresses.is_empty());

        store.add_address("u1", new_address("12 MG Road")).await.unwrap();

        tokio::time::timeout(Duration::from_secs(2), rx.changed())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(rx.borrow().as_ref().unwrap().addresses.len(), 1);
    }

    #[tokio::test]
    async fn test_cart_roundtrip() {
        let store = store().await;
        let entry = CartEntry {
            product_id: "p1".to_string(),
            user_id: "u1".to_string(),
            quantity: 2,
            size: Some("M".to_string()),
            price: Money::from_major(499),
            added_at: Utc::now(),
        };

        store.put_cart_entry(&entry).await.unwrap();
        assert_eq!(store.fetch_cart("u1").await.unwrap(), vec![entry]);

        assert!(store.remove_cart_entry("u1", "p1").await.unwrap());
        assert!(!store.remove_cart_entry("u1", "p1").await.unwrap());
        store.clear_cart("u1").await.unwrap();
    }
}
