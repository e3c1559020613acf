//! Product list and detail pages.

use marketplace_core::ProductId;
use marketplace_storefront::{ProductQuery, Route, Storefront};

use super::{CliError, enter, load_failed, page};
use crate::views;

/// List products.
///
/// # Errors
///
/// Returns an error without a credential or if the list cannot be loaded.
pub async fn list(storefront: &Storefront, query: &ProductQuery) -> Result<String, CliError> {
    enter(storefront, Route::Products).await?;
    render_list(storefront, query).await
}

/// Show one product.
///
/// # Errors
///
/// Returns an error without a credential or if the product cannot be loaded.
pub async fn show(storefront: &Storefront, id: &ProductId) -> Result<String, CliError> {
    enter(storefront, Route::ProductDetail(id.clone())).await?;
    render_detail(storefront, id).await
}

pub(super) async fn render_list(
    storefront: &Storefront,
    query: &ProductQuery,
) -> Result<String, CliError> {
    match storefront.api().list_products(query).await {
        Ok(products) => Ok(page(storefront, &views::products::render(&products))),
        Err(e) => Err(load_failed(
            storefront,
            e,
            "An error occurred while loading products. Please try again.",
            "mp products",
        )
        .await),
    }
}

pub(super) async fn render_detail(
    storefront: &Storefront,
    id: &ProductId,
) -> Result<String, CliError> {
    match storefront.api().get_product(id).await {
        Ok(product) => Ok(page(storefront, &views::product_detail::render(&product))),
        Err(e) => {
            let fallback = if e.is_not_found() {
                "Product not found"
            } else {
                "An error occurred while loading the product."
            };
            Err(load_failed(storefront, e, fallback, &format!("mp product {id}")).await)
        }
    }
}
