//! Storefront connection diagnostics.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use tracing::instrument;

use stockroom_core::Storefront;

use crate::shopify::StoreClient;
use crate::state::AppState;

/// Build the store diagnostics router.
pub fn router() -> Router<AppState> {
    Router::new().route("/stores/{store}", get(store_status))
}

/// GET /stores/{store} - verify one storefront connection.
///
/// Opens a fresh client and fetches basic shop information, confirming the
/// configured domain and access token actually work.
#[instrument(skip(state))]
async fn store_status(State(state): State<AppState>, Path(store): Path<Storefront>) -> Response {
    let client = match StoreClient::connect(store, &state.config().shopify) {
        Ok(client) => client,
        Err(err) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"connected": false, "error": err.to_string()})),
            )
                .into_response();
        }
    };

    match client.shop_info().await {
        Ok(shop) => Json(json!({"connected": true, "store": store, "shop": shop})).into_response(),
        Err(err) => (
            StatusCode::BAD_GATEWAY,
            Json(json!({"connected": false, "error": err.to_string()})),
        )
            .into_response(),
    }
}
