//! Stockroom Core - Shared domain types.
//!
//! This crate provides the common types used across Stockroom components:
//! - `server` - the inventory service (HTTP surface, sync engine, webhooks)
//! - `integration-tests` - cross-crate behavioral tests
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - SKUs, storefront identifiers, product status, and the
//!   named quantity buckets reported by the remote platform

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
