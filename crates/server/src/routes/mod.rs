//! HTTP route handlers.

pub mod skus;
pub mod stores;
pub mod sync;
pub mod webhooks;

use axum::Router;

use crate::state::AppState;

/// Assemble all API routes under `/api`.
pub fn routes() -> Router<AppState> {
    let api = Router::new()
        .merge(sync::router())
        .merge(webhooks::router())
        .merge(skus::router())
        .merge(stores::router());

    Router::new().nest("/api", api)
}
