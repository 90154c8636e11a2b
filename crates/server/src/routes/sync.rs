//! Sync entrypoints: the scheduled full sync and the manually triggered one.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::db::ProductStore;
use crate::state::AppState;
use crate::sync::SyncReport;

/// Build the sync router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sync", post(run_sync))
        .route("/cron/sync", post(run_cron_sync))
}

/// Request body for a manually triggered sync.
#[derive(Debug, Default, Deserialize)]
pub struct SyncRequest {
    /// Restrict the sync to these SKUs; absent means the whole catalog.
    #[serde(default)]
    pub skus: Option<Vec<String>>,
}

/// Response for both sync entrypoints.
#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub report: SyncReport,
}

impl From<SyncReport> for SyncResponse {
    fn from(report: SyncReport) -> Self {
        Self {
            success: report.failed == 0,
            message: report.summary(),
            report,
        }
    }
}

/// Exact-equality check of the scheduler's shared-secret header.
#[must_use]
pub fn cron_token_matches(headers: &HeaderMap, secret: &SecretString) -> bool {
    headers
        .get("x-cron-token")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|token| token == secret.expose_secret())
}

/// POST /cron/sync - scheduled full-catalog sync.
///
/// Authenticated by the `X-Cron-Token` header; on mismatch nothing is read
/// or synced.
#[instrument(skip(state, headers))]
async fn run_cron_sync(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if !cron_token_matches(&headers, &state.config().cron_secret) {
        tracing::error!("unauthorized cron attempt");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Unauthorized"})),
        )
            .into_response();
    }

    let run_id = Uuid::new_v4();
    tracing::info!(%run_id, "starting scheduled sync");

    let products = match state.products().list_all().await {
        Ok(products) => products,
        Err(err) => {
            tracing::error!(%run_id, error = %err, "failed to load catalog");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Sync failed", "message": err.to_string()})),
            )
                .into_response();
        }
    };

    if products.is_empty() {
        return Json(json!({
            "success": false,
            "message": "No products found to sync",
        }))
        .into_response();
    }

    let report = state.engine().sync_batch(&products).await;
    tracing::info!(%run_id, succeeded = report.succeeded, failed = report.failed, "scheduled sync finished");

    Json(SyncResponse::from(report)).into_response()
}

/// POST /sync - manually triggered sync, optionally restricted by SKU.
///
/// Accepts an empty body (sync everything) or `{"skus": [...]}`.
#[instrument(skip(state, body))]
async fn run_sync(State(state): State<AppState>, body: Bytes) -> Response {
    let request: SyncRequest = if body.is_empty() {
        SyncRequest::default()
    } else {
        match serde_json::from_slice(&body) {
            Ok(request) => request,
            Err(err) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"error": format!("Malformed request: {err}")})),
                )
                    .into_response();
            }
        }
    };

    let mut products = match state.products().list_all().await {
        Ok(products) => products,
        Err(err) => {
            tracing::error!(error = %err, "failed to load catalog");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Sync failed", "message": err.to_string()})),
            )
                .into_response();
        }
    };

    if let Some(skus) = &request.skus {
        products.retain(|product| skus.iter().any(|sku| product.sku.matches(sku)));

        if products.is_empty() {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "No matching products for requested SKUs"})),
            )
                .into_response();
        }
    }

    let report = state.engine().sync_batch(&products).await;

    Json(SyncResponse::from(report)).into_response()
}
