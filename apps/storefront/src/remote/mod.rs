//! # Remote Data Access Layer
//!
//! Every call that leaves the process goes through one of four traits.
//! Commands depend on the traits only, so tests swap in fakes.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Remote Service Seams                               │
//! │                                                                         │
//! │  trait            local implementation     backing service              │
//! │  ─────            ────────────────────     ───────────────              │
//! │  RemoteStore      LocalStore               storefront-db documents      │
//! │  AuthProvider     LocalAuth                accounts + argon2 + JWT      │
//! │  ImageHost        CloudinaryHost           HTTPS multipart upload       │
//! │  PostalLookup     IndiaPostClient          HTTPS JSON lookup            │
//! │                                                                         │
//! │  No retries, no batching. Failures surface as RemoteError.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod image_host;
pub mod local;
pub mod postal;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;

use storefront_core::{
    Address, CartEntry, NewAddress, NewProduct, Product, ProfileUpdate, User, ValidationError,
};
use storefront_db::DbError;

pub use auth::{LocalAuth, SessionTokens};
pub use image_host::{upload_all, CloudinaryHost, ImageHost, ImageUpload};
pub use local::LocalStore;
pub use postal::{parse_response, IndiaPostClient, PostalArea, PostalLookup};

// =============================================================================
// Errors
// =============================================================================

/// Failures at the remote seam.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// An operation that needs a session ran without one.
    #[error("No user is signed in")]
    NotSignedIn,

    /// The session's user has no role for this operation.
    #[error("Not authorized: {0}")]
    Forbidden(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("Address not found")]
    AddressNotFound,

    /// Wrong email or password. Deliberately doesn't say which.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email already in use: {0}")]
    EmailInUse(String),

    #[error("Password reset link is invalid or has expired")]
    InvalidResetToken,

    /// A stored or issued session token failed verification.
    #[error("Session error: {0}")]
    Session(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] DbError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from an HTTP service.
    #[error("Service error ({status}): {message}")]
    Api { status: u16, message: String },

    /// A response body that doesn't have the expected shape.
    #[error("Unexpected response: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RemoteError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        RemoteError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

pub type RemoteResult<T> = Result<T, RemoteError>;

// =============================================================================
// Document Store
// =============================================================================

/// Catalog, user profiles and carts.
///
/// Operations that act "as the signed-in user" take the uid explicitly;
/// the command layer resolves it from the [`AuthProvider`] session.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// The whole catalog in catalog order.
    async fn fetch_catalog(&self) -> RemoteResult<Vec<Product>>;

    async fn fetch_product(&self, id: &str) -> RemoteResult<Option<Product>>;

    /// Stamps id, timestamps, `is_deleted = false` and `status = active`.
    async fn create_product(&self, data: NewProduct) -> RemoteResult<Product>;

    async fn fetch_user(&self, uid: &str) -> RemoteResult<Option<User>>;

    /// Writes a fresh profile document. Fails if one exists.
    async fn create_user(&self, user: &User) -> RemoteResult<()>;

    /// Writes the profile document only if the user has none.
    /// Returns whether a document was created.
    async fn ensure_user(&self, user: &User) -> RemoteResult<bool>;

    async fn touch_last_login(&self, uid: &str) -> RemoteResult<()>;

    /// Appends an address, generating its id and creation time.
    async fn add_address(&self, uid: &str, data: NewAddress) -> RemoteResult<Address>;

    /// Fails with [`RemoteError::AddressNotFound`] for an unknown id.
    async fn remove_address(&self, uid: &str, address_id: &str) -> RemoteResult<()>;

    /// Writes the given fields, stamps `updatedAt`, returns the fresh
    /// document.
    async fn update_profile(&self, uid: &str, update: &ProfileUpdate) -> RemoteResult<User>;

    /// Live view of a user document. The receiver holds the latest
    /// snapshot; it changes whenever the document is written.
    async fn watch_user(&self, uid: &str) -> RemoteResult<watch::Receiver<Option<User>>>;

    /// Creates or replaces the entry for `entry.product_id`.
    async fn put_cart_entry(&self, entry: &CartEntry) -> RemoteResult<()>;

    async fn fetch_cart(&self, uid: &str) -> RemoteResult<Vec<CartEntry>>;

    /// Returns whether the product was in the cart.
    async fn remove_cart_entry(&self, uid: &str, product_id: &str) -> RemoteResult<bool>;

    async fn clear_cart(&self, uid: &str) -> RemoteResult<()>;
}

// =============================================================================
// Auth
// =============================================================================

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    /// Signed token that can restore this session later.
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Identity asserted by an external sign-in provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederatedIdentity {
    pub provider: String,
    pub email: String,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> RemoteResult<Session>;

    async fn sign_in(&self, email: &str, password: &str) -> RemoteResult<Session>;

    /// Signs in with an external identity, creating the account on first
    /// use.
    async fn sign_in_federated(&self, identity: &FederatedIdentity) -> RemoteResult<Session>;

    async fn sign_out(&self) -> RemoteResult<()>;

    /// Resumes a session from a previously issued token. `None` if the
    /// token is expired or the account is gone.
    async fn restore(&self, token: &str) -> RemoteResult<Option<Session>>;

    fn current_session(&self) -> Option<Session>;

    /// Fires on every sign-in and sign-out.
    fn auth_state(&self) -> watch::Receiver<Option<Session>>;

    async fn update_display_name(&self, uid: &str, display_name: &str) -> RemoteResult<()>;

    /// Sends a reset link. Unknown addresses succeed silently.
    async fn send_password_reset(&self, email: &str) -> RemoteResult<()>;

    async fn confirm_password_reset(&self, token: &str, new_password: &str) -> RemoteResult<()>;
}
