//! SKU lookup diagnostics.
//!
//! Resolves a SKU directly against one storefront and reports the remote
//! identifiers and quantity buckets. Used to check a mapping before a sync
//! is trusted with it.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use stockroom_core::{Sku, Storefront};

use crate::shopify::{StoreClient, StoreError, resolve_by_sku};
use crate::state::AppState;

/// Build the SKU lookup router.
pub fn router() -> Router<AppState> {
    Router::new().route("/skus/{sku}", get(lookup_sku))
}

#[derive(Debug, Deserialize)]
struct LookupParams {
    /// Storefront to resolve against; defaults to store one.
    store: Option<Storefront>,
}

/// GET /skus/{sku} - resolve a SKU against one storefront.
#[instrument(skip(state))]
async fn lookup_sku(
    State(state): State<AppState>,
    Path(raw_sku): Path<String>,
    Query(params): Query<LookupParams>,
) -> Response {
    let Ok(sku) = Sku::new(raw_sku) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "error": "SKU parameter is required"})),
        )
            .into_response();
    };

    let store = params.store.unwrap_or(Storefront::StoreOne);
    let shopify = &state.config().shopify;

    let Some(location_id) = shopify.store(store).location_id.as_deref() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "error": format!("No location ID configured for store: {store}"),
            })),
        )
            .into_response();
    };

    let client = match StoreClient::connect(store, shopify) {
        Ok(client) => client,
        Err(err) => return store_error_response(&err),
    };

    match resolve_by_sku(&client, &sku, location_id).await {
        Ok(resolved) => Json(json!({
            "success": true,
            "store": store,
            "product": {
                "id": resolved.product_id,
                "title": resolved.title,
                "variant": {
                    "id": resolved.variant_id,
                    "sku": sku,
                    "inventoryItemId": resolved.inventory_item_id,
                    "locationId": resolved.location_id,
                    "quantities": resolved.buckets,
                    "currentQuantity": resolved.current_quantity,
                },
            },
        }))
        .into_response(),
        Err(err) => store_error_response(&err),
    }
}

/// Map resolution failures onto the diagnostic response statuses.
fn store_error_response(err: &StoreError) -> Response {
    let status = match err {
        StoreError::SkuNotFound(_) => StatusCode::NOT_FOUND,
        StoreError::NoInventoryLevel { .. }
        | StoreError::MissingCredentials { .. }
        | StoreError::NoLocation(_) => StatusCode::BAD_REQUEST,
        StoreError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (
        status,
        Json(json!({"success": false, "error": err.to_string()})),
    )
        .into_response()
}
