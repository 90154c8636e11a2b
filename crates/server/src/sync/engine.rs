//! The delta-sync engine and multi-store orchestration.

use futures::future::join_all;
use tracing::instrument;

use stockroom_core::Storefront;

use crate::models::Product;
use crate::shopify::StoreError;

use super::{Connect, StoreGateway, SyncReport, SyncResult};

/// Reason string attached to reconciliation adjustments.
const ADJUSTMENT_REASON: &str = "correction";

/// Reconciles local on-hand counts against both storefronts.
///
/// Generic over the connection factory so tests can drive it with fake
/// gateways; production uses [`crate::shopify::ShopifyConnector`].
pub struct SyncEngine<C> {
    connector: C,
}

impl<C: Connect> SyncEngine<C> {
    /// Create an engine over a connection factory.
    #[must_use]
    pub const fn new(connector: C) -> Self {
        Self { connector }
    }

    /// Sync one product against one storefront.
    ///
    /// This is the failure-isolation boundary: every error raised during
    /// connection, resolution, or the write is caught here and converted
    /// into a `success=false` result. Callers never see an error for a
    /// single (product, store) pair, only the aggregated report.
    #[instrument(skip(self, product), fields(sku = %product.sku, store = %store))]
    pub async fn sync_one(&self, product: &Product, store: Storefront) -> SyncResult {
        match self.sync_inner(product, store).await {
            Ok(applied) => {
                tracing::info!(
                    previous = applied.previous,
                    new = applied.new,
                    "inventory synced"
                );
                SyncResult::succeeded(product.sku.clone(), store, applied.previous, applied.new)
            }
            Err(err) => {
                if err.is_not_found() {
                    // Expected outcome: the store simply does not carry
                    // this SKU.
                    tracing::info!(error = %err, "SKU not carried by store");
                } else {
                    tracing::warn!(error = %err, "sync failed");
                }
                SyncResult::failed(product.sku.clone(), store, err.to_string())
            }
        }
    }

    /// Sync one product against both storefronts.
    ///
    /// Each store is attempted independently and unconditionally - a
    /// failure against one store never prevents the attempt against the
    /// other. Results are collected into one flat list.
    pub async fn sync_product_everywhere(&self, product: &Product) -> Vec<SyncResult> {
        join_all(
            Storefront::ALL
                .into_iter()
                .map(|store| self.sync_one(product, store)),
        )
        .await
    }

    /// Sync a batch of products against both storefronts.
    ///
    /// Every product is attempted against every store. Attempts carry no
    /// ordering dependency on each other (each operates on its own
    /// product/store pair), so the per-product fan-outs run concurrently.
    #[instrument(skip(self, products), fields(count = products.len()))]
    pub async fn sync_batch(&self, products: &[Product]) -> SyncReport {
        let results: Vec<SyncResult> = join_all(
            products
                .iter()
                .map(|product| self.sync_product_everywhere(product)),
        )
        .await
        .into_iter()
        .flatten()
        .collect();

        let report = SyncReport::from(results);
        tracing::info!(
            succeeded = report.succeeded,
            failed = report.failed,
            "batch sync finished"
        );
        report
    }

    /// The fallible inner path of a single sync attempt.
    async fn sync_inner(
        &self,
        product: &Product,
        store: Storefront,
    ) -> Result<AppliedSync, StoreError> {
        // Per-product location override, else the store-level default.
        let location_id = product
            .store_link(store)
            .and_then(|link| link.location_id.as_deref())
            .or_else(|| self.connector.default_location(store))
            .ok_or(StoreError::NoLocation(store))?
            .to_string();

        let gateway = self.connector.connect(store)?;

        let resolved = gateway.resolve_sku(&product.sku, &location_id).await?;

        // The central correctness-critical step: the remote mutation is
        // relative, so the authoritative target must be converted into a
        // signed delta against what the store currently reports. A delta
        // of 0 is still issued; it is a no-op on the remote side.
        let delta = product.on_hand - resolved.current_quantity;

        gateway
            .adjust(
                &resolved.inventory_item_id,
                &resolved.location_id,
                delta,
                ADJUSTMENT_REASON,
            )
            .await?;

        Ok(AppliedSync {
            previous: resolved.current_quantity,
            new: product.on_hand,
        })
    }
}

struct AppliedSync {
    previous: i64,
    new: i64,
}
