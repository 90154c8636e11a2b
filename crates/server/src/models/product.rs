//! The local, authoritative product record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{ProductStatus, Sku, Storefront};

/// A product in the local catalog.
///
/// The local `on_hand` count is the single source of truth for stock; the
/// sync engine pushes it out to the remote storefronts, and the webhook
/// handler decrements it when a remote order arrives. Products are never
/// deleted implicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Document id in the catalog store.
    pub id: String,
    pub sku: Sku,
    pub name: String,
    /// Authoritative on-hand quantity. Never negative.
    pub on_hand: i64,
    pub status: ProductStatus,
    /// Primary physical location of the stock.
    pub location: BinLocation,
    /// Optional overflow location with its own independent count.
    /// That count is local bookkeeping only and is never synced remotely.
    pub secondary: Option<SecondaryLocation>,
    /// Per-store remote identifiers, resolved lazily by SKU lookup.
    #[serde(default)]
    pub store_links: StoreLinks,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl Product {
    /// The cached remote identifiers for a storefront, if any.
    #[must_use]
    pub const fn store_link(&self, store: Storefront) -> Option<&StoreLink> {
        match store {
            Storefront::StoreOne => self.store_links.store_one.as_ref(),
            Storefront::StoreTwo => self.store_links.store_two.as_ref(),
        }
    }
}

/// A free-text warehouse position (zone / aisle / shelf / bin).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BinLocation {
    #[serde(default)]
    pub zone: String,
    #[serde(default)]
    pub aisle: String,
    #[serde(default)]
    pub shelf: String,
    #[serde(default)]
    pub bin: String,
}

/// An overflow location with its own on-hand count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecondaryLocation {
    #[serde(flatten)]
    pub location: BinLocation,
    pub on_hand: i64,
}

/// Remote identifiers per storefront.
///
/// Either side may be absent: a product can exist locally before it is ever
/// resolved against a store. When present, the identifiers are treated as a
/// hint - the SKU resolver re-verifies against the remote variant's SKU
/// rather than trusting a cached id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_one: Option<StoreLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_two: Option<StoreLink>,
}

/// The identifiers tying a local product to one remote store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreLink {
    pub product_id: String,
    pub variant_id: String,
    pub inventory_item_id: String,
    /// Location override for this product; falls back to the store-level
    /// default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product() -> Product {
        Product {
            id: "prod-1".to_string(),
            sku: Sku::new("SS-NOG").unwrap(),
            name: "Nogent straight razor".to_string(),
            on_hand: 42,
            status: ProductStatus::Active,
            location: BinLocation {
                zone: "A".to_string(),
                aisle: "3".to_string(),
                shelf: "2".to_string(),
                bin: "14".to_string(),
            },
            secondary: None,
            store_links: StoreLinks {
                store_one: Some(StoreLink {
                    product_id: "gid://shopify/Product/1".to_string(),
                    variant_id: "gid://shopify/ProductVariant/11".to_string(),
                    inventory_item_id: "gid://shopify/InventoryItem/111".to_string(),
                    location_id: None,
                }),
                store_two: None,
            },
            created_at: Utc::now(),
            last_updated: Utc::now(),
        }
    }

    #[test]
    fn test_store_link_lookup() {
        let product = product();
        assert!(product.store_link(Storefront::StoreOne).is_some());
        assert!(product.store_link(Storefront::StoreTwo).is_none());
    }

    #[test]
    fn test_store_links_round_trip() {
        let product = product();
        let json = serde_json::to_value(&product).unwrap();
        // Unlinked stores are omitted entirely rather than serialized as null.
        assert!(json["store_links"].get("store_two").is_none());

        let back: Product = serde_json::from_value(json).unwrap();
        assert_eq!(back.sku, product.sku);
        assert!(back.store_link(Storefront::StoreTwo).is_none());
    }
}
