//! # storefront-db: Storage Layer for the Storefront
//!
//! A small document store on SQLite, plus the account table used by the
//! local auth provider.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storefront Data Flow                             │
//! │                                                                         │
//! │  remote::LocalStore / remote::LocalAuth (app)                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  storefront-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │  │   │
//! │  │   │               │    │ DocumentRepo   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ ProductRepo    │    │ 001_init.sql │  │   │
//! │  │   │ Change feed   │    │ UserRepo       │    │              │  │   │
//! │  │   │               │    │ CartRepo       │    │              │  │   │
//! │  │   │               │    │ AccountRepo    │    │              │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite: documents(collection, id, data JSON), accounts, resets        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storefront_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("storefront.db")).await?;
//! let catalog = db.products().list().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{ChangeKind, Database, DbConfig, DocumentChange};

pub use repository::account::{Account, AccountRepository, PASSWORD_PROVIDER};
pub use repository::cart::CartRepository;
pub use repository::document::DocumentRepository;
pub use repository::product::ProductRepository;
pub use repository::user::UserRepository;
