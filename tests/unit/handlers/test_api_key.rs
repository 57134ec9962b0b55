// Unit tests for the API key handler and key store

use crate::common::{request, request_with};
use serde_json::json;
use std::sync::Arc;
use warden::chain::handler::AuthenticationHandler;
use warden::chain::verify::{Verify, VerifyOutcome};
use warden::handlers::api_key::{ApiKeyHandler, ApiKeyHash, KeyStore, MemoryKeyStore};
use warden::handlers::Account;

fn store_with(key: &str) -> Arc<MemoryKeyStore> {
    let mut store = MemoryKeyStore::new();
    store.insert(
        key,
        Account {
            user: json!({"id": 7}),
            auth: json!({"role": "service"}),
        },
    );
    Arc::new(store)
}

#[tokio::test]
async fn test_store_lookup_by_hash() {
    let store = store_with("k-123");

    let hit = store.lookup(&ApiKeyHash::from_api_key("k-123")).await.unwrap();
    assert!(hit.is_some());
    assert_eq!(hit.unwrap().user, json!({"id": 7}));

    let miss = store.lookup(&ApiKeyHash::from_api_key("k-456")).await.unwrap();
    assert!(miss.is_none());
}

#[tokio::test]
async fn test_missing_header_skips() {
    let handler = ApiKeyHandler::new(store_with("k-123"));
    let (verify, outcome) = Verify::channel();

    handler.authenticate(&request(), verify).await;

    match outcome.await.unwrap() {
        VerifyOutcome::Skip => {}
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_valid_key_succeeds() {
    let handler = ApiKeyHandler::new(store_with("k-123"));
    let (verify, outcome) = Verify::channel();

    handler
        .authenticate(&request_with(&[("x-api-key", "k-123")]), verify)
        .await;

    match outcome.await.unwrap() {
        VerifyOutcome::Success { user, auth } => {
            assert_eq!(user, json!({"id": 7}));
            assert_eq!(auth, json!({"role": "service"}));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_unknown_key_fails() {
    let handler = ApiKeyHandler::new(store_with("k-123"));
    let (verify, outcome) = Verify::channel();

    handler
        .authenticate(&request_with(&[("x-api-key", "wrong")]), verify)
        .await;

    match outcome.await.unwrap() {
        VerifyOutcome::Fail { message } => assert_eq!(message, "invalid API key"),
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_custom_header_name() {
    let handler = ApiKeyHandler::new(store_with("k-123")).with_header("x-service-key");
    let (verify, outcome) = Verify::channel();

    handler
        .authenticate(&request_with(&[("x-service-key", "k-123")]), verify)
        .await;

    match outcome.await.unwrap() {
        VerifyOutcome::Success { .. } => {}
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[test]
fn test_handler_scheme_name() {
    let handler = ApiKeyHandler::new(store_with("k"));
    assert_eq!(handler.scheme(), "api-key");
    assert!(!handler.supports_challenge());
    assert!(!handler.supports_deny());
}
