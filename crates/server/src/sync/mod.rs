//! Inventory reconciliation between the local catalog and the storefronts.
//!
//! The local on-hand count is authoritative. For each (product, store) pair
//! the engine resolves the SKU remotely, computes the signed difference
//! between local and remote, and applies it through the platform's
//! *relative* adjustment mutation. Re-running a sync against unchanged
//! state produces a delta of 0, so syncs are idempotent.
//!
//! There is no optimistic-concurrency check anywhere in this path: a
//! scheduled batch sync and a webhook-triggered decrement for the same SKU
//! both read-then-write the local and remote quantities, and an unlucky
//! interleaving can lose one of the updates. This is a known, accepted
//! limitation of the current design rather than something the engine
//! detects.

mod engine;
mod report;

pub use engine::SyncEngine;
pub use report::{SyncReport, SyncResult};

use async_trait::async_trait;

use stockroom_core::{Sku, Storefront};

use crate::shopify::{ResolvedSku, StoreError};

/// The remote operations the engine needs from one store connection.
///
/// Implemented by the real Admin API client; tests substitute in-memory
/// fakes to drive the engine without a network.
#[async_trait]
pub trait StoreGateway: Send + Sync {
    /// Resolve a SKU to its remote identifiers and current quantity.
    async fn resolve_sku(
        &self,
        sku: &Sku,
        location_id: &str,
    ) -> Result<ResolvedSku, StoreError>;

    /// Apply a signed delta to an inventory level.
    async fn adjust(
        &self,
        inventory_item_id: &str,
        location_id: &str,
        delta: i64,
        reason: &str,
    ) -> Result<(), StoreError>;
}

/// Factory for per-operation store connections.
///
/// A gateway is built fresh for every sync attempt so credential rotation
/// takes effect on the next operation; nothing long-lived caches a token.
pub trait Connect: Send + Sync {
    type Gateway: StoreGateway;

    /// Open a connection to the given storefront.
    ///
    /// # Errors
    ///
    /// Returns a configuration-class `StoreError` when the store's
    /// credentials are absent.
    fn connect(&self, store: Storefront) -> Result<Self::Gateway, StoreError>;

    /// The store-level default location, used when a product's store link
    /// does not carry its own.
    fn default_location(&self, store: Storefront) -> Option<&str>;
}
