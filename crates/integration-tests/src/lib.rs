//! Shared test support for Stockroom integration tests.
//!
//! Provides in-memory stand-ins for the two external systems the sync core
//! talks to: the remote storefronts (a fake gateway/connector pair) and the
//! product catalog (a fake repository). Tests drive the real engine and
//! webhook processing code against these.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use stockroom_core::{ProductStatus, QuantityBuckets, Sku, Storefront};
use stockroom_server::db::{ProductStore, RepositoryError};
use stockroom_server::models::{BinLocation, Product, StoreLinks};
use stockroom_server::shopify::{ResolvedSku, StoreError};
use stockroom_server::sync::{Connect, StoreGateway};

// =============================================================================
// Fake remote storefronts
// =============================================================================

/// Shared state of both fake storefronts.
#[derive(Debug, Default)]
pub struct RemoteState {
    /// Remote quantity per (store, SKU). A SKU absent from the map does not
    /// exist in that store.
    pub quantities: HashMap<(Storefront, String), i64>,
    /// Every adjustment issued, in order: (store, inventory item id, delta).
    pub adjustments: Vec<(Storefront, String, i64)>,
    /// Stores whose adjustment writes fail.
    pub failing_adjust: HashSet<Storefront>,
    /// Stores whose SKU resolution fails with a transport-style error.
    pub failing_resolve: HashSet<Storefront>,
}

/// A connection factory over shared in-memory remote state.
///
/// Like the production connector, `connect` hands out a fresh gateway per
/// call; all gateways share the same underlying state.
#[derive(Clone, Default)]
pub struct FakeConnector {
    state: Arc<Mutex<RemoteState>>,
    default_locations: HashMap<Storefront, String>,
}

impl FakeConnector {
    /// A connector with a default location configured for both stores.
    #[must_use]
    pub fn with_default_locations() -> Self {
        let mut default_locations = HashMap::new();
        for store in Storefront::ALL {
            default_locations.insert(store, format!("loc-{store}"));
        }
        Self {
            state: Arc::new(Mutex::new(RemoteState::default())),
            default_locations,
        }
    }

    /// A connector with no locations configured anywhere.
    #[must_use]
    pub fn without_locations() -> Self {
        Self::default()
    }

    /// Seed the remote quantity for a SKU in one store.
    pub fn seed(&self, store: Storefront, sku: &str, quantity: i64) {
        self.lock()
            .quantities
            .insert((store, sku.to_string()), quantity);
    }

    /// Make adjustment writes fail for one store.
    pub fn fail_adjust(&self, store: Storefront) {
        self.lock().failing_adjust.insert(store);
    }

    /// Make SKU resolution fail for one store.
    pub fn fail_resolve(&self, store: Storefront) {
        self.lock().failing_resolve.insert(store);
    }

    /// Current remote quantity for a SKU in one store.
    #[must_use]
    pub fn remote_quantity(&self, store: Storefront, sku: &str) -> Option<i64> {
        self.lock()
            .quantities
            .get(&(store, sku.to_string()))
            .copied()
    }

    /// All adjustments issued so far.
    #[must_use]
    pub fn adjustments(&self) -> Vec<(Storefront, String, i64)> {
        self.lock().adjustments.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RemoteState> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Connect for FakeConnector {
    type Gateway = FakeGateway;

    fn connect(&self, store: Storefront) -> Result<Self::Gateway, StoreError> {
        Ok(FakeGateway {
            store,
            state: Arc::clone(&self.state),
        })
    }

    fn default_location(&self, store: Storefront) -> Option<&str> {
        self.default_locations.get(&store).map(String::as_str)
    }
}

/// One fake store connection.
pub struct FakeGateway {
    store: Storefront,
    state: Arc<Mutex<RemoteState>>,
}

impl FakeGateway {
    fn lock(&self) -> std::sync::MutexGuard<'_, RemoteState> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl StoreGateway for FakeGateway {
    async fn resolve_sku(
        &self,
        sku: &Sku,
        location_id: &str,
    ) -> Result<ResolvedSku, StoreError> {
        let state = self.lock();

        if state.failing_resolve.contains(&self.store) {
            return Err(StoreError::Unauthorized(
                "invalid or expired access token".to_string(),
            ));
        }

        let quantity = state
            .quantities
            .get(&(self.store, sku.as_str().to_string()))
            .copied()
            .ok_or_else(|| StoreError::SkuNotFound(sku.clone()))?;

        Ok(ResolvedSku {
            product_id: format!("product-{sku}"),
            variant_id: format!("variant-{sku}"),
            // Fake inventory item ids are the SKU itself so adjustments can
            // be applied back to the quantity map.
            inventory_item_id: sku.as_str().to_string(),
            location_id: location_id.to_string(),
            title: format!("Product {sku}"),
            buckets: QuantityBuckets {
                on_hand: Some(quantity),
                available: Some(quantity),
                ..QuantityBuckets::default()
            },
            current_quantity: quantity,
        })
    }

    async fn adjust(
        &self,
        inventory_item_id: &str,
        _location_id: &str,
        delta: i64,
        _reason: &str,
    ) -> Result<(), StoreError> {
        let mut state = self.lock();

        if state.failing_adjust.contains(&self.store) {
            return Err(StoreError::UserError(
                "Quantity could not be adjusted".to_string(),
            ));
        }

        let key = (self.store, inventory_item_id.to_string());
        if let Some(quantity) = state.quantities.get_mut(&key) {
            *quantity += delta;
        }
        state
            .adjustments
            .push((self.store, inventory_item_id.to_string(), delta));

        Ok(())
    }
}

// =============================================================================
// Fake product catalog
// =============================================================================

/// In-memory product repository keyed by document id.
#[derive(Clone, Default)]
pub struct MemoryProductStore {
    products: Arc<Mutex<HashMap<String, Product>>>,
}

impl MemoryProductStore {
    /// Insert a product into the catalog.
    pub fn insert(&self, product: Product) {
        self.lock().insert(product.id.clone(), product);
    }

    /// Current on-hand count for a document id.
    #[must_use]
    pub fn on_hand(&self, id: &str) -> Option<i64> {
        self.lock().get(id).map(|p| p.on_hand)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Product>> {
        self.products
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn find_by_sku(&self, sku: &Sku) -> Result<Option<Product>, RepositoryError> {
        Ok(self
            .lock()
            .values()
            .find(|product| product.sku == *sku)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let mut products: Vec<Product> = self.lock().values().cloned().collect();
        products.sort_by(|a, b| a.sku.as_str().cmp(b.sku.as_str()));
        Ok(products)
    }

    async fn set_on_hand(&self, id: &str, on_hand: i64) -> Result<(), RepositoryError> {
        let mut products = self.lock();
        let product = products.get_mut(id).ok_or(RepositoryError::NotFound)?;
        product.on_hand = on_hand;
        product.last_updated = Utc::now();
        Ok(())
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// A catalog product with the given SKU and on-hand count, no store links.
///
/// # Panics
///
/// Panics if `sku` is not a valid SKU.
#[must_use]
pub fn product(sku: &str, on_hand: i64) -> Product {
    Product {
        id: format!("doc-{}", sku.to_lowercase()),
        sku: Sku::new(sku).expect("valid SKU"),
        name: format!("Product {sku}"),
        on_hand,
        status: ProductStatus::Active,
        location: BinLocation::default(),
        secondary: None,
        store_links: StoreLinks::default(),
        created_at: Utc::now(),
        last_updated: Utc::now(),
    }
}
