//! # Commands Module
//!
//! Every user action the front end can trigger.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (exports)
//! ├── catalog.rs  ◄─── Catalog loading, product lookup
//! ├── auth.rs     ◄─── Sign up/in/out, password reset, session restore
//! ├── profile.rs  ◄─── Profile edits, addresses (optimistic)
//! ├── admin.rs    ◄─── Product creation with image upload
//! └── cart.rs     ◄─── Cart manipulation
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  CLI / view                                                             │
//! │       │  commands::profile::remove_address(&app, "addr-1")             │
//! │       ▼                                                                 │
//! │  ┌──────────────────────────────────────────────────────────────┐      │
//! │  │ 1. Validate input locally (forms)       ──► ValidationError  │      │
//! │  │ 2. Resolve the session (auth)           ──► NotSignedIn      │      │
//! │  │ 3. Call the remote seam                 ──► RemoteError      │      │
//! │  │ 4. Dispatch the resulting Action to the Store                │      │
//! │  │ 5. Queue a success or error notification                     │      │
//! │  └──────────────────────────────────────────────────────────────┘      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Result<T, AppError>                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Commands take the [`crate::Storefront`] bundle and borrow only what
//! they need from it.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod profile;

#[cfg(test)]
pub(crate) mod fakes;
