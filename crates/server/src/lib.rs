//! Stockroom server library.
//!
//! This crate provides the inventory service as a library, allowing it to
//! be tested and reused. The binary in `main.rs` wires it to the network.
//!
//! # Architecture
//!
//! - Axum HTTP surface (sync entrypoints, order webhooks, diagnostics)
//! - `PostgreSQL` catalog via sqlx - the authoritative on-hand counts
//! - Per-operation Shopify Admin API clients for two storefronts
//! - A delta-sync engine reconciling local counts against both stores

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod models;
pub mod routes;
pub mod shopify;
pub mod state;
pub mod sync;
