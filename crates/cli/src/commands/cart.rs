//! Cart commands.
//!
//! Quantity controls clamp on this side: decrement stops at 1, increment
//! stops at the stock carried in the cart line.

use marketplace_core::ProductId;
use marketplace_storefront::{CartItem, Route, Storefront, clamp_quantity};

use super::{CliError, cart_failed, enter, load_failed, page};
use crate::views;

/// Render the cart page from the current state.
pub(super) fn render(storefront: &Storefront) -> String {
    page(storefront, &views::cart::render(&storefront.cart().state()))
}

/// Show the cart.
///
/// # Errors
///
/// Returns an error without a credential.
pub async fn show(storefront: &Storefront) -> Result<String, CliError> {
    enter(storefront, Route::Cart).await?;
    Ok(render(storefront))
}

/// Add a product, clamping the quantity to the product's stock.
///
/// A sold-out product is shown instead of being added.
///
/// # Errors
///
/// Returns an error if the product cannot be loaded or the backend refuses.
pub async fn add(
    storefront: &Storefront,
    product_id: &ProductId,
    requested: i64,
) -> Result<String, CliError> {
    enter(storefront, Route::ProductDetail(product_id.clone())).await?;

    let product = match storefront.api().get_product(product_id).await {
        Ok(product) => product,
        Err(e) => {
            let retry = format!("mp cart add {product_id} --quantity {requested}");
            return Err(load_failed(storefront, e, "Product not found", &retry).await);
        }
    };

    if !product.in_stock() {
        return Ok(page(storefront, &views::product_detail::out_of_stock(&product)));
    }

    let quantity = clamp_quantity(requested, product.stock);
    if let Err(e) = storefront.cart().add(product_id, quantity).await {
        return Err(cart_failed(storefront, e).await);
    }

    let note = views::product_detail::added(&product, requested, quantity);
    Ok(format!("{note}\n{}", render(storefront)))
}

/// Set a line's quantity, clamped to `[1, stock]`.
///
/// # Errors
///
/// Returns an error if the product is not in the cart or the backend refuses.
pub async fn set(
    storefront: &Storefront,
    product_id: &ProductId,
    requested: i64,
) -> Result<String, CliError> {
    let line = cart_line(storefront, product_id).await?;
    let quantity = line
        .product
        .as_ref()
        .map_or(requested.max(1), |product| clamp_quantity(requested, product.stock));

    update(storefront, product_id, quantity).await
}

/// Increase a line's quantity by one, unless it is at the stock limit.
///
/// # Errors
///
/// Returns an error if the product is not in the cart or the backend refuses.
pub async fn increment(storefront: &Storefront, product_id: &ProductId) -> Result<String, CliError> {
    let line = cart_line(storefront, product_id).await?;
    if !line.can_increment() {
        let state = storefront.cart().state();
        return Ok(page(
            storefront,
            &views::cart::unchanged("Already at the available stock.", &state),
        ));
    }

    update(storefront, product_id, line.quantity + 1).await
}

/// Decrease a line's quantity by one, never below 1.
///
/// # Errors
///
/// Returns an error if the product is not in the cart or the backend refuses.
pub async fn decrement(storefront: &Storefront, product_id: &ProductId) -> Result<String, CliError> {
    let line = cart_line(storefront, product_id).await?;
    if !line.can_decrement() {
        let state = storefront.cart().state();
        return Ok(page(
            storefront,
            &views::cart::unchanged(
                "Quantity is already 1. Use `mp cart remove` to drop the item.",
                &state,
            ),
        ));
    }

    update(storefront, product_id, line.quantity - 1).await
}

/// Remove a line.
///
/// # Errors
///
/// Returns an error if the backend refuses.
pub async fn remove(storefront: &Storefront, product_id: &ProductId) -> Result<String, CliError> {
    enter(storefront, Route::Cart).await?;
    if let Err(e) = storefront.cart().remove(product_id).await {
        return Err(cart_failed(storefront, e).await);
    }
    Ok(render(storefront))
}

/// Empty the cart.
///
/// # Errors
///
/// Returns an error if the backend refuses.
pub async fn clear(storefront: &Storefront) -> Result<String, CliError> {
    enter(storefront, Route::Cart).await?;
    if let Err(e) = storefront.cart().clear().await {
        return Err(cart_failed(storefront, e).await);
    }
    Ok(render(storefront))
}

async fn update(
    storefront: &Storefront,
    product_id: &ProductId,
    quantity: i64,
) -> Result<String, CliError> {
    if let Err(e) = storefront.cart().update_quantity(product_id, quantity).await {
        return Err(cart_failed(storefront, e).await);
    }
    Ok(render(storefront))
}

/// Enter the cart and find the line for `product_id`.
async fn cart_line(storefront: &Storefront, product_id: &ProductId) -> Result<CartItem, CliError> {
    enter(storefront, Route::Cart).await?;
    storefront
        .cart()
        .state()
        .line(product_id)
        .cloned()
        .ok_or_else(|| CliError::NotInCart(product_id.clone()))
}
