//! Integration tests for the delta-sync engine.
//!
//! These tests drive the real engine against in-memory storefronts,
//! pinning the delta computation, idempotence, per-store isolation, and
//! the failure-as-data contract.

use stockroom_core::Storefront;
use stockroom_integration_tests::{FakeConnector, product};
use stockroom_server::models::{StoreLink, StoreLinks};
use stockroom_server::sync::SyncEngine;

// =============================================================================
// Delta computation
// =============================================================================

#[tokio::test]
async fn test_sync_one_issues_delta_between_local_and_remote() {
    let connector = FakeConnector::with_default_locations();
    connector.seed(Storefront::StoreOne, "SS-NOG", 40);
    let engine = SyncEngine::new(connector.clone());

    let result = engine
        .sync_one(&product("SS-NOG", 42), Storefront::StoreOne)
        .await;

    assert!(result.success, "sync should succeed: {:?}", result.error);
    assert_eq!(result.previous_quantity, Some(40));
    assert_eq!(result.new_quantity, Some(42));
    assert_eq!(
        result.message.as_deref(),
        Some("Updated inventory from 40 to 42")
    );

    // The write carried delta = local - remote = +2.
    let adjustments = connector.adjustments();
    assert_eq!(adjustments.len(), 1);
    assert_eq!(
        adjustments.first(),
        Some(&(Storefront::StoreOne, "SS-NOG".to_string(), 2))
    );

    // And afterwards the remote matches the local authoritative count.
    assert_eq!(connector.remote_quantity(Storefront::StoreOne, "SS-NOG"), Some(42));
}

#[tokio::test]
async fn test_sync_one_pushes_negative_delta_when_remote_is_ahead() {
    let connector = FakeConnector::with_default_locations();
    connector.seed(Storefront::StoreTwo, "SS-NOG", 50);
    let engine = SyncEngine::new(connector.clone());

    let result = engine
        .sync_one(&product("SS-NOG", 37), Storefront::StoreTwo)
        .await;

    assert!(result.success);
    assert_eq!(
        connector.adjustments().first(),
        Some(&(Storefront::StoreTwo, "SS-NOG".to_string(), -13))
    );
    assert_eq!(connector.remote_quantity(Storefront::StoreTwo, "SS-NOG"), Some(37));
}

#[tokio::test]
async fn test_sync_one_is_idempotent() {
    let connector = FakeConnector::with_default_locations();
    connector.seed(Storefront::StoreOne, "SS-NOG", 40);
    let engine = SyncEngine::new(connector.clone());
    let item = product("SS-NOG", 42);

    let first = engine.sync_one(&item, Storefront::StoreOne).await;
    assert!(first.success);

    // No intervening state change: the second sync computes a delta of 0
    // and reports previous == new.
    let second = engine.sync_one(&item, Storefront::StoreOne).await;
    assert!(second.success);
    assert_eq!(second.previous_quantity, Some(42));
    assert_eq!(second.new_quantity, Some(42));

    let adjustments = connector.adjustments();
    assert_eq!(adjustments.len(), 2);
    assert_eq!(adjustments.get(1).map(|a| a.2), Some(0));
}

// =============================================================================
// Location resolution
// =============================================================================

#[tokio::test]
async fn test_store_link_location_overrides_store_default() {
    let connector = FakeConnector::with_default_locations();
    connector.seed(Storefront::StoreOne, "SS-NOG", 42);
    let engine = SyncEngine::new(connector);

    let mut item = product("SS-NOG", 42);
    item.store_links = StoreLinks {
        store_one: Some(StoreLink {
            product_id: "p".to_string(),
            variant_id: "v".to_string(),
            inventory_item_id: "i".to_string(),
            location_id: Some("loc-override".to_string()),
        }),
        store_two: None,
    };

    let result = engine.sync_one(&item, Storefront::StoreOne).await;
    assert!(result.success);
}

#[tokio::test]
async fn test_missing_location_is_a_configuration_failure() {
    let connector = FakeConnector::without_locations();
    connector.seed(Storefront::StoreOne, "SS-NOG", 40);
    let engine = SyncEngine::new(connector.clone());

    let result = engine
        .sync_one(&product("SS-NOG", 42), Storefront::StoreOne)
        .await;

    assert!(!result.success);
    let error = result.error.unwrap_or_default();
    assert!(
        error.contains("no location configured"),
        "unexpected error: {error}"
    );
    // Nothing was written.
    assert!(connector.adjustments().is_empty());
}

// =============================================================================
// Failure isolation
// =============================================================================

#[tokio::test]
async fn test_sku_not_found_is_a_reported_failure_not_an_error() {
    let connector = FakeConnector::with_default_locations();
    let engine = SyncEngine::new(connector.clone());

    // The SKU exists locally but was never created in the store.
    let result = engine
        .sync_one(&product("SS-NOG", 42), Storefront::StoreOne)
        .await;

    assert!(!result.success);
    assert!(
        result
            .error
            .unwrap_or_default()
            .contains("no inventory item found with SKU"),
    );
    assert!(connector.adjustments().is_empty());
}

#[tokio::test]
async fn test_failure_in_one_store_does_not_block_the_other() {
    let connector = FakeConnector::with_default_locations();
    connector.seed(Storefront::StoreOne, "SS-NOG", 40);
    connector.seed(Storefront::StoreTwo, "SS-NOG", 39);
    connector.fail_adjust(Storefront::StoreOne);
    let engine = SyncEngine::new(connector.clone());

    let results = engine.sync_product_everywhere(&product("SS-NOG", 42)).await;

    assert_eq!(results.len(), 2);
    let store_one = results
        .iter()
        .find(|r| r.store == Storefront::StoreOne)
        .expect("store one result");
    let store_two = results
        .iter()
        .find(|r| r.store == Storefront::StoreTwo)
        .expect("store two result");

    assert!(!store_one.success);
    assert!(store_one
        .error
        .as_deref()
        .unwrap_or_default()
        .contains("Quantity could not be adjusted"));

    // Store two was still attempted and converged.
    assert!(store_two.success);
    assert_eq!(connector.remote_quantity(Storefront::StoreTwo, "SS-NOG"), Some(42));
}

#[tokio::test]
async fn test_resolve_failure_in_one_store_does_not_block_the_other() {
    let connector = FakeConnector::with_default_locations();
    connector.seed(Storefront::StoreOne, "SS-NOG", 40);
    connector.seed(Storefront::StoreTwo, "SS-NOG", 40);
    connector.fail_resolve(Storefront::StoreOne);
    let engine = SyncEngine::new(connector.clone());

    let results = engine.sync_product_everywhere(&product("SS-NOG", 42)).await;

    let outcomes: Vec<bool> = results.iter().map(|r| r.success).collect();
    assert!(outcomes.contains(&true));
    assert!(outcomes.contains(&false));
}

// =============================================================================
// Batch orchestration
// =============================================================================

#[tokio::test]
async fn test_sync_batch_attempts_every_product_against_every_store() {
    let connector = FakeConnector::with_default_locations();
    connector.seed(Storefront::StoreOne, "SS-NOG", 40);
    connector.seed(Storefront::StoreTwo, "SS-NOG", 41);
    connector.seed(Storefront::StoreOne, "GM-BRU", 7);
    // GM-BRU is not carried by store two.
    let engine = SyncEngine::new(connector.clone());

    let products = vec![product("SS-NOG", 42), product("GM-BRU", 7)];
    let report = engine.sync_batch(&products).await;

    assert_eq!(report.results.len(), 4);
    assert_eq!(report.succeeded, 3);
    assert_eq!(report.failed, 1);

    assert_eq!(connector.remote_quantity(Storefront::StoreOne, "SS-NOG"), Some(42));
    assert_eq!(connector.remote_quantity(Storefront::StoreTwo, "SS-NOG"), Some(42));
    assert_eq!(connector.remote_quantity(Storefront::StoreOne, "GM-BRU"), Some(7));
}

#[tokio::test]
async fn test_sync_batch_of_nothing_reports_nothing() {
    let engine = SyncEngine::new(FakeConnector::with_default_locations());
    let report = engine.sync_batch(&[]).await;
    assert_eq!(report.succeeded, 0);
    assert_eq!(report.failed, 0);
    assert!(report.results.is_empty());
}
