//! Per-storefront Admin API GraphQL client.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::instrument;

use stockroom_core::Storefront;

use crate::config::ShopifyConfig;

use super::{GraphQLError, GraphQLErrorLocation, StoreError};

/// Reference document attached to inventory adjustments so they are
/// attributable in the store's adjustment history.
const REFERENCE_DOCUMENT_URI: &str = "gid://shopify/App/stockroom-inventory-sync";

/// One authenticated connection to one storefront's Admin API.
///
/// Constructed per operation rather than cached: credential rotation in the
/// environment takes effect on the next call, and a stale token can never
/// be used silently.
#[derive(Debug)]
pub struct StoreClient {
    client: reqwest::Client,
    store: Storefront,
    endpoint: String,
    access_token: SecretString,
}

/// GraphQL response wrapper.
#[derive(Debug, Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLErrorResponse>>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorResponse {
    message: String,
    #[serde(default)]
    locations: Vec<GraphQLErrorLocationResponse>,
    #[serde(default)]
    path: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorLocationResponse {
    line: i64,
    column: i64,
}

/// A mutation-level user error.
#[derive(Debug, Deserialize)]
struct UserError {
    message: String,
    #[serde(default)]
    field: Option<Vec<String>>,
}

/// Basic shop information, used for connection diagnostics.
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopInfo {
    pub name: String,
    pub myshopify_domain: String,
}

impl StoreClient {
    /// Open a connection to one storefront.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::MissingCredentials` naming the store and the
    /// missing field when the configured domain or access token is blank.
    pub fn connect(store: Storefront, config: &ShopifyConfig) -> Result<Self, StoreError> {
        let store_config = config.store(store);

        if store_config.domain.trim().is_empty() {
            return Err(StoreError::MissingCredentials {
                store,
                what: "store domain",
            });
        }
        if store_config.access_token.expose_secret().trim().is_empty() {
            return Err(StoreError::MissingCredentials {
                store,
                what: "access token",
            });
        }

        let endpoint = format!(
            "https://{}/admin/api/{}/graphql.json",
            store_config.domain, config.api_version
        );

        Ok(Self {
            client: reqwest::Client::new(),
            store,
            endpoint,
            access_token: store_config.access_token.clone(),
        })
    }

    /// The storefront this client talks to.
    #[must_use]
    pub const fn store(&self) -> Storefront {
        self.store
    }

    /// Execute a GraphQL request.
    ///
    /// Every read and write goes through here. No retry or backoff is
    /// applied; callers own their failure handling.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::RateLimited` on 429 (with the Retry-After hint),
    /// `StoreError::Unauthorized` on 401, `StoreError::GraphQL` when the
    /// response carries errors, and `StoreError::Http` on transport
    /// failures.
    #[instrument(skip(self, query, variables), fields(store = %self.store))]
    pub async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Option<serde_json::Value>,
    ) -> Result<T, StoreError> {
        let body = serde_json::json!({
            "query": query,
            "variables": variables.unwrap_or(serde_json::Value::Null),
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("X-Shopify-Access-Token", self.access_token.expose_secret())
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        // Check for rate limiting
        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return Err(StoreError::RateLimited(retry_after));
        }

        // Check for unauthorized
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(StoreError::Unauthorized(
                "invalid or expired access token".to_string(),
            ));
        }

        let graphql_response: GraphQLResponse<T> = response.json().await?;

        // Check for GraphQL errors
        if let Some(errors) = graphql_response.errors
            && !errors.is_empty()
        {
            let converted_errors: Vec<GraphQLError> = errors
                .into_iter()
                .map(|e| GraphQLError {
                    message: e.message,
                    locations: e
                        .locations
                        .into_iter()
                        .map(|l| GraphQLErrorLocation {
                            line: l.line,
                            column: l.column,
                        })
                        .collect(),
                    path: e.path,
                })
                .collect();
            return Err(StoreError::GraphQL(converted_errors));
        }

        graphql_response.data.ok_or_else(|| {
            StoreError::GraphQL(vec![GraphQLError {
                message: "No data in response".to_string(),
                locations: vec![],
                path: vec![],
            }])
        })
    }

    /// Adjust an inventory level by a signed delta.
    ///
    /// The underlying mutation is *relative*: the platform adds `delta` to
    /// the `available` bucket. Absolute targets must be converted to a
    /// delta by the caller before reaching this method.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::UserError` with the first platform-reported
    /// validation message, or any transport/GraphQL error from `execute`.
    #[instrument(
        skip(self),
        fields(store = %self.store, inventory_item_id = %inventory_item_id, location_id = %location_id, delta = %delta)
    )]
    pub async fn adjust_quantities(
        &self,
        inventory_item_id: &str,
        location_id: &str,
        delta: i64,
        reason: &str,
    ) -> Result<(), StoreError> {
        const MUTATION: &str = r"
            mutation inventoryAdjustQuantities($input: InventoryAdjustQuantitiesInput!) {
              inventoryAdjustQuantities(input: $input) {
                inventoryAdjustmentGroup {
                  createdAt
                  reason
                  changes {
                    name
                    delta
                    quantityAfterChange
                  }
                }
                userErrors {
                  field
                  message
                }
              }
            }
        ";

        #[derive(Debug, Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Response {
            inventory_adjust_quantities: Option<Payload>,
        }

        #[derive(Debug, Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Payload {
            #[serde(default)]
            user_errors: Vec<UserError>,
        }

        let variables = serde_json::json!({
            "input": {
                "changes": [{
                    "inventoryItemId": inventory_item_id,
                    "locationId": location_id,
                    "delta": delta,
                }],
                "name": "available",
                "reason": reason,
                "referenceDocumentUri": REFERENCE_DOCUMENT_URI,
            }
        });

        let response: Response = self.execute(MUTATION, Some(variables)).await?;

        if let Some(payload) = response.inventory_adjust_quantities
            && let Some(first) = payload.user_errors.into_iter().next()
        {
            let field = first.field.map_or_else(String::new, |f| f.join("."));
            return Err(StoreError::UserError(if field.is_empty() {
                first.message
            } else {
                format!("{field}: {}", first.message)
            }));
        }

        Ok(())
    }

    /// Fetch basic shop information to verify the connection.
    ///
    /// # Errors
    ///
    /// Returns any transport, authentication, or GraphQL error from
    /// `execute`.
    #[instrument(skip(self), fields(store = %self.store))]
    pub async fn shop_info(&self) -> Result<ShopInfo, StoreError> {
        const QUERY: &str = r"
            query {
              shop {
                name
                myshopifyDomain
              }
            }
        ";

        #[derive(Debug, Deserialize)]
        struct Response {
            shop: ShopInfo,
        }

        let response: Response = self.execute::<Response>(QUERY, None).await?;
        Ok(response.shop)
    }
}
