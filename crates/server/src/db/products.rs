//! Product repository for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use stockroom_core::{ProductStatus, Sku};

use crate::models::{BinLocation, Product, SecondaryLocation, StoreLinks};

use super::RepositoryError;

/// The persistence boundary the sync core depends on.
///
/// Deliberately small: the reconciliation engine and webhook processor only
/// ever look products up by SKU, enumerate the catalog, and write back an
/// on-hand count. The full CRUD surface lives with the catalog UI, outside
/// this service. There is no transaction API - callers read-modify-write,
/// and concurrent writers to the same SKU can lose updates (an accepted
/// limitation of the current design).
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Look a product up by exact SKU.
    async fn find_by_sku(&self, sku: &Sku) -> Result<Option<Product>, RepositoryError>;

    /// Every product in the catalog.
    async fn list_all(&self) -> Result<Vec<Product>, RepositoryError>;

    /// Persist a new on-hand count for a product, bumping `last_updated`.
    async fn set_on_hand(&self, id: &str, on_hand: i64) -> Result<(), RepositoryError>;
}

/// Internal row type for `PostgreSQL` queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    sku: String,
    name: String,
    on_hand: i64,
    status: String,
    location: Json<BinLocation>,
    secondary: Option<Json<SecondaryLocation>>,
    store_links: Json<StoreLinks>,
    created_at: DateTime<Utc>,
    last_updated: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let sku = Sku::new(row.sku)
            .map_err(|e| RepositoryError::DataCorruption(format!("product {}: {e}", row.id)))?;
        let status = row.status.parse::<ProductStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("product {}: {e}", row.id))
        })?;

        Ok(Self {
            id: row.id,
            sku,
            name: row.name,
            on_hand: row.on_hand,
            status,
            location: row.location.0,
            secondary: row.secondary.map(|s| s.0),
            store_links: row.store_links.0,
            created_at: row.created_at,
            last_updated: row.last_updated,
        })
    }
}

/// `PostgreSQL`-backed product repository.
#[derive(Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    /// Create a new product repository over a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn find_by_sku(&self, sku: &Sku) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, sku, name, on_hand, status, location, secondary,
                   store_links, created_at, last_updated
            FROM products
            WHERE sku = $1
            LIMIT 1
            ",
        )
        .bind(sku.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, sku, name, on_hand, status, location, secondary,
                   store_links, created_at, last_updated
            FROM products
            ORDER BY sku
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    async fn set_on_hand(&self, id: &str, on_hand: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE products
            SET on_hand = $2,
                last_updated = (CURRENT_TIMESTAMP AT TIME ZONE 'utc')
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(on_hand)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
