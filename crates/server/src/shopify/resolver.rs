//! SKU resolution against a storefront.
//!
//! A product may exist locally with no remote identifiers at all; this
//! module is the mechanism that finds them on demand. Resolution always
//! goes through a SKU text search rather than a cached id, and the match
//! is re-verified against the local SKU string before use.

use serde::Deserialize;
use tracing::instrument;

use stockroom_core::{QuantityBuckets, Sku};

use super::{StoreClient, StoreError};

/// Everything the sync engine needs to know about a SKU in one store.
#[derive(Debug, Clone)]
pub struct ResolvedSku {
    pub product_id: String,
    pub variant_id: String,
    pub inventory_item_id: String,
    pub location_id: String,
    pub title: String,
    /// The named buckets as the platform reported them.
    pub buckets: QuantityBuckets,
    /// The quantity compared against the local on-hand figure
    /// (`on_hand`, falling back to `available`, defaulting to 0).
    pub current_quantity: i64,
}

const LOOKUP_QUERY: &str = r#"
    query inventoryItemBySku($query: String!, $locationId: ID!) {
      inventoryItems(first: 1, query: $query) {
        nodes {
          id
          variant {
            id
            sku
            product {
              id
              title
            }
            inventoryItem {
              id
              inventoryLevel(locationId: $locationId) {
                id
                quantities(names: ["available", "on_hand", "committed", "incoming"]) {
                  name
                  quantity
                }
                location {
                  id
                  name
                }
              }
            }
          }
        }
      }
    }
"#;

// Response shape for the lookup query. Every layer that can legitimately be
// absent is an Option so a missing field becomes a named failure instead of
// a deserialization error.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupData {
    inventory_items: InventoryItemConnection,
}

#[derive(Debug, Deserialize)]
struct InventoryItemConnection {
    #[serde(default)]
    nodes: Vec<InventoryItemNode>,
}

#[derive(Debug, Deserialize)]
struct InventoryItemNode {
    variant: Option<VariantNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VariantNode {
    id: String,
    sku: Option<String>,
    product: ProductNode,
    inventory_item: InventoryItemRef,
}

#[derive(Debug, Deserialize)]
struct ProductNode {
    id: String,
    title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InventoryItemRef {
    id: String,
    inventory_level: Option<InventoryLevelNode>,
}

#[derive(Debug, Deserialize)]
struct InventoryLevelNode {
    #[serde(default)]
    quantities: Vec<QuantityEntry>,
    location: LocationNode,
}

#[derive(Debug, Deserialize)]
struct QuantityEntry {
    name: String,
    quantity: i64,
}

#[derive(Debug, Deserialize)]
struct LocationNode {
    id: String,
}

/// Resolve a SKU to its remote identifiers and current quantity at a
/// location.
///
/// Issues one server-side filtered lookup (`query: "sku:<value>"`) and takes
/// the first returned inventory item. Matching semantics are whatever the
/// remote search endpoint implements - the first server-ranked match is
/// accepted, and a case difference or near-duplicate SKU is logged rather
/// than rejected (an accepted approximation of exact matching).
///
/// # Errors
///
/// - `StoreError::SkuNotFound` when no inventory item matches the SKU
/// - `StoreError::NoInventoryLevel` when the item exists but is not stocked
///   at `location_id` - deliberately distinct so callers can report
///   "not in this store" versus "misconfigured location"
/// - any transport or GraphQL error from the client
#[instrument(skip(client), fields(store = %client.store(), sku = %sku, location_id = %location_id))]
pub async fn resolve_by_sku(
    client: &StoreClient,
    sku: &Sku,
    location_id: &str,
) -> Result<ResolvedSku, StoreError> {
    let variables = serde_json::json!({
        "query": format!("sku:{sku}"),
        "locationId": location_id,
    });

    let data: LookupData = client.execute(LOOKUP_QUERY, Some(variables)).await?;

    select_match(data, sku, location_id)
}

/// Pick the resolved SKU out of a lookup response.
fn select_match(
    data: LookupData,
    sku: &Sku,
    location_id: &str,
) -> Result<ResolvedSku, StoreError> {
    let variant = data
        .inventory_items
        .nodes
        .into_iter()
        .next()
        .and_then(|node| node.variant)
        .ok_or_else(|| StoreError::SkuNotFound(sku.clone()))?;

    let level = variant
        .inventory_item
        .inventory_level
        .ok_or_else(|| StoreError::NoInventoryLevel {
            sku: sku.clone(),
            location_id: location_id.to_string(),
        })?;

    match variant.sku.as_deref() {
        Some(remote_sku) if sku.matches(remote_sku) => {}
        remote_sku => {
            // The search endpoint ranked this item first for the SKU query
            // but its variant SKU string does not match ours.
            tracing::warn!(
                local_sku = %sku,
                remote_sku = remote_sku.unwrap_or("<none>"),
                variant_id = %variant.id,
                "resolved variant SKU does not exactly match local SKU"
            );
        }
    }

    let buckets = QuantityBuckets::from_pairs(
        level
            .quantities
            .iter()
            .map(|entry| (entry.name.as_str(), entry.quantity)),
    );

    Ok(ResolvedSku {
        product_id: variant.product.id,
        variant_id: variant.id,
        inventory_item_id: variant.inventory_item.id,
        location_id: level.location.id,
        title: variant.product.title,
        current_quantity: buckets.effective(),
        buckets,
    })
}
