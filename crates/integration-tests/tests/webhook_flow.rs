//! Integration tests for the order webhook flow.
//!
//! Signature verification gates everything; once verified, line items
//! decrement the local catalog (floored at zero) and both storefronts are
//! re-synced to the corrected count.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use secrecy::SecretString;
use sha2::Sha256;

use stockroom_core::Storefront;
use stockroom_integration_tests::{FakeConnector, MemoryProductStore, product};
use stockroom_server::routes::webhooks::{OrderPayload, process_order, verify_signature};
use stockroom_server::sync::SyncEngine;

fn sign(secret: &str, body: &[u8]) -> String {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(body);
    BASE64.encode(mac.finalize().into_bytes())
}

fn order(json: &str) -> OrderPayload {
    serde_json::from_str(json).expect("valid order payload")
}

// =============================================================================
// Signature verification
// =============================================================================

#[test]
fn test_valid_signature_is_accepted() {
    let secret = SecretString::from("whsec_5bT8jW2nF6yH0dG4");
    let body = br#"{"line_items":[{"sku":"SS-NOG","quantity":5}]}"#;
    assert!(verify_signature(
        &secret,
        body,
        &sign("whsec_5bT8jW2nF6yH0dG4", body)
    ));
}

#[test]
fn test_tampered_payload_is_rejected() {
    let secret = SecretString::from("whsec_5bT8jW2nF6yH0dG4");
    let body = br#"{"line_items":[{"sku":"SS-NOG","quantity":5}]}"#.to_vec();
    let signature = sign("whsec_5bT8jW2nF6yH0dG4", &body);

    // Flip the ordered quantity from 5 to 9 without re-signing.
    let tampered = String::from_utf8(body)
        .expect("utf8 body")
        .replace("\"quantity\":5", "\"quantity\":9");
    assert!(!verify_signature(&secret, tampered.as_bytes(), &signature));
}

#[test]
fn test_signature_from_other_stores_secret_is_rejected() {
    let secret = SecretString::from("whsec_5bT8jW2nF6yH0dG4");
    let body = br#"{"line_items":[]}"#;
    assert!(!verify_signature(
        &secret,
        body,
        &sign("whsec_2pQ9cV4xM8zD1aS7", body)
    ));
}

// =============================================================================
// Order processing
// =============================================================================

#[tokio::test]
async fn test_order_decrements_local_and_resyncs_both_stores() {
    let catalog = MemoryProductStore::default();
    catalog.insert(product("SS-NOG", 42));

    let connector = FakeConnector::with_default_locations();
    // Store one took the order, so its count already dropped; store two is
    // still at the old figure.
    connector.seed(Storefront::StoreOne, "SS-NOG", 37);
    connector.seed(Storefront::StoreTwo, "SS-NOG", 42);
    let engine = SyncEngine::new(connector.clone());

    let payload = order(r#"{"line_items":[{"sku":"SS-NOG","quantity":5}]}"#);
    let outcome = process_order(&catalog, &engine, Storefront::StoreOne, &payload).await;

    assert_eq!(outcome.updated, 1);
    assert_eq!(outcome.skipped, 0);

    // Local authoritative count dropped to 37...
    assert_eq!(catalog.on_hand("doc-ss-nog"), Some(37));

    // ...and both stores were pushed to 37.
    assert_eq!(outcome.sync_results.len(), 2);
    assert!(outcome.sync_results.iter().all(|r| r.success));
    assert_eq!(connector.remote_quantity(Storefront::StoreOne, "SS-NOG"), Some(37));
    assert_eq!(connector.remote_quantity(Storefront::StoreTwo, "SS-NOG"), Some(37));
}

#[tokio::test]
async fn test_decrement_floors_at_zero() {
    let catalog = MemoryProductStore::default();
    catalog.insert(product("SS-NOG", 3));

    let connector = FakeConnector::with_default_locations();
    connector.seed(Storefront::StoreOne, "SS-NOG", 3);
    connector.seed(Storefront::StoreTwo, "SS-NOG", 3);
    let engine = SyncEngine::new(connector);

    let payload = order(r#"{"line_items":[{"sku":"SS-NOG","quantity":5}]}"#);
    process_order(&catalog, &engine, Storefront::StoreTwo, &payload).await;

    // Oversold by 2, but the local count never goes negative.
    assert_eq!(catalog.on_hand("doc-ss-nog"), Some(0));
}

#[tokio::test]
async fn test_unknown_sku_is_skipped_and_remaining_items_processed() {
    let catalog = MemoryProductStore::default();
    catalog.insert(product("SS-NOG", 42));

    let connector = FakeConnector::with_default_locations();
    connector.seed(Storefront::StoreOne, "SS-NOG", 42);
    connector.seed(Storefront::StoreTwo, "SS-NOG", 42);
    let engine = SyncEngine::new(connector);

    let payload = order(
        r#"{"line_items":[
            {"sku":"GONE-1","quantity":1},
            {"quantity":2},
            {"sku":"SS-NOG","quantity":2}
        ]}"#,
    );
    let outcome = process_order(&catalog, &engine, Storefront::StoreOne, &payload).await;

    // One unknown SKU and one SKU-less item skipped; the known item still
    // processed.
    assert_eq!(outcome.skipped, 2);
    assert_eq!(outcome.updated, 1);
    assert_eq!(catalog.on_hand("doc-ss-nog"), Some(40));
}

#[tokio::test]
async fn test_order_with_no_line_items_does_nothing() {
    let catalog = MemoryProductStore::default();
    catalog.insert(product("SS-NOG", 42));
    let engine = SyncEngine::new(FakeConnector::with_default_locations());

    let payload = order(r#"{"line_items":[]}"#);
    let outcome = process_order(&catalog, &engine, Storefront::StoreOne, &payload).await;

    assert_eq!(outcome.updated, 0);
    assert_eq!(outcome.skipped, 0);
    assert_eq!(catalog.on_hand("doc-ss-nog"), Some(42));
}
