//! Login and session persistence.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use marketplace_core::ProductId;
use marketplace_integration_tests::{EMAIL, FakeBackend, MUG_ID, PASSWORD};
use marketplace_storefront::{FileStore, LoginError};
use secrecy::SecretString;

#[tokio::test]
async fn test_wrong_password_stores_nothing() {
    let backend = FakeBackend::start().await;
    let storefront = backend.storefront();

    let err = storefront
        .login(EMAIL, &SecretString::from("wrong-password"))
        .await
        .unwrap_err();

    assert!(matches!(err, LoginError::Failed { .. }));
    assert_eq!(err.to_string(), "Invalid email or password");
    assert!(storefront.session().token().is_none());
    assert!(storefront.current_user().is_none());
    assert_eq!(backend.active_sessions(), 0);
}

#[tokio::test]
async fn test_malformed_email_never_reaches_backend() {
    let backend = FakeBackend::start().await;
    let storefront = backend.storefront();

    let err = storefront
        .login("john.doe", &SecretString::from(PASSWORD))
        .await
        .unwrap_err();

    assert!(matches!(err, LoginError::InvalidEmail(_)));
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_login_sends_bearer_token_on_later_calls() {
    let backend = FakeBackend::start().await;
    let storefront = backend.storefront();
    storefront
        .login(EMAIL, &SecretString::from(PASSWORD))
        .await
        .unwrap();

    // The cart endpoint rejects requests without a valid bearer token.
    storefront.api().get_cart().await.unwrap();
    assert_eq!(backend.active_sessions(), 1);
}

#[tokio::test]
async fn test_file_session_survives_restart() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let first = backend.storefront_with_store(Arc::new(FileStore::new(&path)));
    first
        .login(EMAIL, &SecretString::from(PASSWORD))
        .await
        .unwrap();
    first
        .cart()
        .add(&ProductId::new(MUG_ID), 1)
        .await
        .unwrap();

    let second = backend.storefront_with_store(Arc::new(FileStore::new(&path)));
    assert!(second.session().is_authenticated());
    assert_eq!(second.current_user().unwrap().display_name(), "John Doe");
    second.start().await.unwrap();
    assert_eq!(second.cart().item_count(), 1);

    second.logout().await.unwrap();
    let third = backend.storefront_with_store(Arc::new(FileStore::new(&path)));
    assert!(!third.session().is_authenticated());
}

#[tokio::test]
async fn test_corrupt_session_file_is_replaced() {
    let backend = FakeBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, r#"{"token": "abc""#).unwrap();

    let storefront = backend.storefront_with_store(Arc::new(FileStore::new(&path)));
    assert!(!storefront.session().is_authenticated());

    storefront
        .login(EMAIL, &SecretString::from(PASSWORD))
        .await
        .unwrap();
    assert!(storefront.session().is_authenticated());

    std::fs::write(&path, "garbage").unwrap();
    storefront.logout().await.unwrap();
    assert!(!storefront.session().is_authenticated());
}
