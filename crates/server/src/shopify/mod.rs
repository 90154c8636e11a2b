//! Shopify Admin API access for both storefronts.
//!
//! # Architecture
//!
//! - One [`StoreClient`] per storefront, constructed fresh for every
//!   operation so rotated credentials are picked up immediately
//! - GraphQL requests are issued directly with `reqwest`: this service uses
//!   a fixed set of three documents (SKU lookup, inventory adjustment, shop
//!   probe), so raw query strings with `serde`-typed responses are simpler
//!   than schema codegen
//! - No retry or backoff inside the client; each operation either succeeds
//!   or reports a failure for that unit of work only
//!
//! # Example
//!
//! ```rust,ignore
//! use stockroom_server::shopify::{StoreClient, resolve_by_sku};
//!
//! let client = StoreClient::connect(Storefront::StoreOne, &config.shopify)?;
//! let resolved = resolve_by_sku(&client, &sku, "gid://shopify/Location/1").await?;
//! client
//!     .adjust_quantities(
//!         &resolved.inventory_item_id,
//!         &resolved.location_id,
//!         2,
//!         "correction",
//!     )
//!     .await?;
//! ```

mod client;
mod connector;
mod resolver;

pub use client::StoreClient;
pub use connector::ShopifyConnector;
pub use resolver::{ResolvedSku, resolve_by_sku};

use stockroom_core::{Sku, Storefront};
use thiserror::Error;

/// Errors that can occur when talking to a remote storefront.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Required credentials are absent or blank for a store.
    ///
    /// Configuration-class failure: the caller can report "misconfigured
    /// store" rather than a runtime fault.
    #[error("missing credentials for {store}: {what}")]
    MissingCredentials {
        store: Storefront,
        what: &'static str,
    },

    /// Neither the product's store link nor the store config carries a
    /// location id.
    #[error("no location configured for store: {0}")]
    NoLocation(Storefront),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// No remote inventory item matched the SKU.
    ///
    /// An expected, reportable outcome - deliberately distinct from
    /// [`StoreError::NoInventoryLevel`] so callers can tell "not found in
    /// this store" apart from "item exists but the location is wrong".
    #[error("no inventory item found with SKU: {0}")]
    SkuNotFound(Sku),

    /// The matched item carries no inventory level at the target location.
    #[error("no inventory level found for location {location_id} (SKU {sku})")]
    NoInventoryLevel { sku: Sku, location_id: String },

    /// Rate limited by the platform.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Authentication/authorization failed.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// User error from a mutation (e.g., invalid input), surfaced verbatim.
    #[error("user error: {0}")]
    UserError(String),
}

impl StoreError {
    /// Whether this error means the SKU simply is not carried by the store.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::SkuNotFound(_))
    }
}

/// A GraphQL error returned by the Admin API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Source locations in the query.
    pub locations: Vec<GraphQLErrorLocation>,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

/// Location in a GraphQL query where an error occurred.
#[derive(Debug, Clone)]
pub struct GraphQLErrorLocation {
    /// Line number (1-indexed).
    pub line: i64,
    /// Column number (1-indexed).
    pub column: i64,
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    errors
        .iter()
        .map(|e| e.message.clone())
        .collect::<Vec<_>>()
        .join("; ")
}
