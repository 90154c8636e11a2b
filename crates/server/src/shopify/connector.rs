//! Production wiring of the sync engine's connection seam.

use async_trait::async_trait;

use stockroom_core::{Sku, Storefront};

use crate::config::ShopifyConfig;
use crate::sync::{Connect, StoreGateway};

use super::{ResolvedSku, StoreClient, StoreError, resolve_by_sku};

/// Builds a fresh [`StoreClient`] from configuration for every operation.
#[derive(Debug, Clone)]
pub struct ShopifyConnector {
    config: ShopifyConfig,
}

impl ShopifyConnector {
    /// Create a connector over the two-store configuration.
    #[must_use]
    pub const fn new(config: ShopifyConfig) -> Self {
        Self { config }
    }
}

impl Connect for ShopifyConnector {
    type Gateway = StoreClient;

    fn connect(&self, store: Storefront) -> Result<Self::Gateway, StoreError> {
        StoreClient::connect(store, &self.config)
    }

    fn default_location(&self, store: Storefront) -> Option<&str> {
        self.config.store(store).location_id.as_deref()
    }
}

#[async_trait]
impl StoreGateway for StoreClient {
    async fn resolve_sku(
        &self,
        sku: &Sku,
        location_id: &str,
    ) -> Result<ResolvedSku, StoreError> {
        resolve_by_sku(self, sku, location_id).await
    }

    async fn adjust(
        &self,
        inventory_item_id: &str,
        location_id: &str,
        delta: i64,
        reason: &str,
    ) -> Result<(), StoreError> {
        self.adjust_quantities(inventory_item_id, location_id, delta, reason)
            .await
    }
}
