//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::db::PgProductStore;
use crate::shopify::ShopifyConnector;
use crate::sync::SyncEngine;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    engine: SyncEngine<ShopifyConnector>,
}

impl AppState {
    /// Build application state from loaded configuration and a database pool.
    #[must_use]
    pub fn new(config: ServerConfig, pool: PgPool) -> Self {
        let connector = ShopifyConnector::new(config.shopify.clone());
        let engine = SyncEngine::new(connector);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                engine,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// The delta-sync engine over both storefront connections.
    #[must_use]
    pub fn engine(&self) -> &SyncEngine<ShopifyConnector> {
        &self.inner.engine
    }

    /// A product repository over the shared pool.
    #[must_use]
    pub fn products(&self) -> PgProductStore {
        PgProductStore::new(self.inner.pool.clone())
    }
}
