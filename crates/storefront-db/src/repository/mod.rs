//! # Repository Module
//!
//! Storage access for the storefront.
//!
//! ## Layering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ProductRepository ─┐                                                  │
//! │  UserRepository ────┼──► DocumentRepository ──► documents table        │
//! │  CartRepository ────┘        (one collection)                          │
//! │                                                                         │
//! │  AccountRepository ─────────────────────────► accounts,                │
//! │                                                password_resets         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Typed repositories own the collection naming and the document shape.
//! `DocumentRepository` only knows about ids and JSON.

pub mod account;
pub mod cart;
pub mod document;
pub mod product;
pub mod user;
