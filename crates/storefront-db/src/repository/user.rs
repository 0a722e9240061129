//! # User Repository
//!
//! User profile documents in the `users` collection, keyed by auth uid.
//!
//! Partial updates go through JSON merge patches so a profile edit never
//! clobbers a concurrent `lastLogin` stamp, and vice versa. Addresses are
//! the exception: the embedded array is always rewritten whole.

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::error::DbResult;
use crate::repository::document::DocumentRepository;
use storefront_core::{Address, ProfileUpdate, User};

#[derive(Debug, Clone)]
pub struct UserRepository {
    docs: DocumentRepository,
}

impl UserRepository {
    pub const COLLECTION: &'static str = "users";

    pub fn new(docs: DocumentRepository) -> Self {
        UserRepository { docs }
    }

    pub async fn get(&self, uid: &str) -> DbResult<Option<User>> {
        self.docs.get(uid).await
    }

    /// Creates the profile document. Fails if one already exists.
    pub async fn create(&self, user: &User) -> DbResult<()> {
        debug!(uid = %user.uid, "Creating user document");
        self.docs.insert(&user.uid, user).await
    }

    /// Creates the profile document unless one exists.
    ///
    /// ## Returns
    /// * `true` - A new document was written
    /// * `false` - The user already had a document; it is left untouched
    pub async fn create_if_missing(&self, user: &User) -> DbResult<bool> {
        if self.docs.get::<Value>(&user.uid).await?.is_some() {
            return Ok(false);
        }
        self.create(user).await?;
        Ok(true)
    }

    /// Stamps `lastLogin` on an existing profile.
    pub async fn touch_last_login(&self, uid: &str, now: DateTime<Utc>) -> DbResult<User> {
        self.patch(uid, json!({ "lastLogin": now })).await
    }

    /// Replaces the embedded address array.
    pub async fn set_addresses(
        &self,
        uid: &str,
        addresses: &[Address],
        now: DateTime<Utc>,
    ) -> DbResult<User> {
        debug!(uid = %uid, count = addresses.len(), "Rewriting addresses");
        self.patch(uid, json!({ "addresses": addresses, "updatedAt": now }))
            .await
    }

    /// Writes the provided profile fields and stamps `updatedAt`.
    pub async fn update_profile(
        &self,
        uid: &str,
        update: &ProfileUpdate,
        now: DateTime<Utc>,
    ) -> DbResult<User> {
        let mut patch = Map::new();
        if let Some(name) = &update.display_name {
            patch.insert("displayName".to_string(), json!(name));
        }
        if let Some(phone) = &update.phone {
            patch.insert("phone".to_string(), json!(phone));
        }
        patch.insert("updatedAt".to_string(), json!(now));

        self.patch(uid, Value::Object(patch)).await
    }

    async fn patch(&self, uid: &str, patch: Value) -> DbResult<User> {
        let merged = self.docs.merge(uid, &patch).await?;
        Ok(serde_json::from_value(merged)?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use crate::DbError;
    use chrono::Utc;
    use storefront_core::{AddressType, NewAddress, ProfileUpdate, User};

    fn user(uid: &str) -> User {
        User::new(uid, format!("{uid}@example.com"), None, None, Utc::now())
    }

    #[tokio::test]
    async fn test_create_if_missing_is_idempotent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let users = db.users();

        assert!(users.create_if_missing(&user("u1")).await.unwrap());

        let mut other = user("u1");
        other.display_name = Some("Changed".to_string());
        assert!(!users.create_if_missing(&other).await.unwrap());

        let stored = users.get("u1").await.unwrap().unwrap();
        assert!(stored.display_name.is_none());
    }

    #[tokio::test]
    async fn test_update_profile_keeps_other_fields() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let users = db.users();
        users.create(&user("u1")).await.unwrap();

        let update = ProfileUpdate {
            display_name: Some("Asha".to_string()),
            phone: None,
        };
        let updated = users.update_profile("u1", &update, Utc::now()).await.unwrap();

        assert_eq!(updated.display_name.as_deref(), Some("Asha"));
        assert_eq!(updated.email, "u1@example.com");
        assert!(updated.phone.is_none());
        assert!(updated.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_set_addresses_rewrites_array() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let users = db.users();
        users.create(&user("u1")).await.unwrap();

        let address = NewAddress {
            pincode: "560001".to_string(),
            city: "Bengaluru".to_string(),
            state: "Karnataka".to_string(),
            street: "1 MG Road".to_string(),
            landmark: None,
            label: "Home".to_string(),
            address_type: AddressType::Home,
        }
        .into_address("a1".to_string(), Utc::now());

        let updated = users
            .set_addresses("u1", &[address.clone()], Utc::now())
            .await
            .unwrap();
        assert_eq!(updated.addresses, vec![address]);

        let cleared = users.set_addresses("u1", &[], Utc::now()).await.unwrap();
        assert!(cleared.addresses.is_empty());
    }

    #[tokio::test]
    async fn test_patch_unknown_user_is_not_found() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db
            .users()
            .touch_last_login("ghost", Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
