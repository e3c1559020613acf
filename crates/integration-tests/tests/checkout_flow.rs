//! End-to-end shopping flow against the fake backend.

#![allow(clippy::unwrap_used)]

use marketplace_core::{Price, ProductId};
use marketplace_integration_tests::{EMAIL, FakeBackend, LAMP_ID, PASSWORD};
use marketplace_storefront::{Navigation, ProductQuery, Route};
use secrecy::SecretString;

#[tokio::test]
async fn test_login_browse_and_manage_cart() {
    let backend = FakeBackend::start().await;
    let storefront = backend.storefront();

    // Anonymous visitors are sent to login.
    assert_eq!(
        storefront.navigate(Route::Products),
        Navigation::Redirect(Route::Login)
    );

    let user = storefront
        .login(EMAIL, &SecretString::from(PASSWORD))
        .await
        .unwrap();
    assert_eq!(user.display_name(), "John Doe");
    assert_eq!(
        storefront.navigate(Route::Products),
        Navigation::Render(Route::Products)
    );
    assert!(storefront.cart().state().is_empty());

    let products = storefront
        .api()
        .list_products(&ProductQuery::default())
        .await
        .unwrap();
    let lamp = products
        .iter()
        .find(|p| p.id.as_str() == LAMP_ID)
        .unwrap()
        .clone();
    assert_eq!(lamp.stock, 5);

    let cart = storefront.cart();

    cart.add(&lamp.id, 2).await.unwrap();
    let state = cart.state();
    assert_eq!(state.item_count, 1);
    assert_eq!(state.line(&lamp.id).unwrap().quantity, 2);
    assert_eq!(state.subtotal, lamp.price * 2);
    assert_eq!(state.subtotal, Price::from_cents(9998));

    cart.update_quantity(&lamp.id, 3).await.unwrap();
    let state = cart.state();
    assert_eq!(state.line(&lamp.id).unwrap().quantity, 3);
    assert_eq!(state.subtotal, lamp.price * 3);
    assert_eq!(state.total(), state.subtotal);

    cart.remove(&lamp.id).await.unwrap();
    let state = cart.state();
    assert!(state.is_empty());
    assert_eq!(state.item_count, 0);
    assert_eq!(state.subtotal, Price::ZERO);

    assert_eq!(
        backend.requests(),
        vec![
            "POST /auth/login".to_string(),
            "GET /cart".to_string(),
            "GET /products".to_string(),
            format!("POST /cart {LAMP_ID} 2"),
            "GET /cart".to_string(),
            format!("PUT /cart/{LAMP_ID} 3"),
            "GET /cart".to_string(),
            format!("DELETE /cart/{LAMP_ID}"),
            "GET /cart".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_logout_resets_cart_and_guard() {
    let backend = FakeBackend::start().await;
    let storefront = backend.storefront();
    storefront
        .login(EMAIL, &SecretString::from(PASSWORD))
        .await
        .unwrap();
    storefront
        .cart()
        .add(&ProductId::new(LAMP_ID), 1)
        .await
        .unwrap();
    assert_eq!(storefront.cart().item_count(), 1);

    storefront.logout().await.unwrap();

    assert!(storefront.cart().state().is_empty());
    assert!(storefront.current_user().is_none());
    assert_eq!(
        storefront.navigate(Route::Cart),
        Navigation::Redirect(Route::Login)
    );
    assert_eq!(
        storefront.navigate(Route::Login),
        Navigation::Render(Route::Login)
    );
}
