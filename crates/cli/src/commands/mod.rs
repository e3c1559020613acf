//! Command handlers.
//!
//! Every handler passes its route through the navigation guard, loads the
//! cart for the navbar and returns the rendered page. Failures become a
//! [`CliError`] whose hint tells the user how to retry.

pub mod auth;
pub mod cart;
pub mod products;

use marketplace_core::ProductId;
use marketplace_storefront::{
    ApiError, CartError, ConfigError, LoginError, Navigation, Route, RouteError, StorageError,
    Storefront,
};
use thiserror::Error;
use tracing::warn;

use crate::views;

/// Errors reported to the user.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to initialize client: {0}")]
    Client(#[source] ApiError),

    #[error("{0}")]
    Login(#[from] LoginError),

    #[error("Please log in to continue.")]
    LoginRequired,

    #[error("Your session has expired. Please log in again.")]
    SessionExpired,

    #[error("{message}")]
    Load {
        message: String,
        retry: String,
        #[source]
        source: ApiError,
    },

    #[error("{0}")]
    Cart(#[from] CartError),

    #[error("Product {0} is not in your cart")]
    NotInCart(ProductId),

    #[error("Failed to update session: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Route(#[from] RouteError),
}

impl CliError {
    /// How to try again, printed below the message.
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::Login(LoginError::Failed { .. } | LoginError::Rejected { .. })
            | Self::LoginRequired
            | Self::SessionExpired => {
                Some("Run `mp login --email <email>` to log in.".to_string())
            }
            Self::Login(LoginError::InvalidEmail(_)) => {
                Some("Check the address and run `mp login` again.".to_string())
            }
            Self::Load { retry, .. } => Some(format!("Try again with `{retry}`.")),
            Self::Cart(_) | Self::NotInCart(_) => {
                Some("Run `mp cart show` to see your cart.".to_string())
            }
            Self::Route(_) => {
                Some("Known paths: /login, /products, /products/<id>, /cart.".to_string())
            }
            Self::Config(_) | Self::Client(_) | Self::Storage(_) | Self::Login(_) => None,
        }
    }
}

/// Run the guard and prepare the page for `route`.
///
/// Returns the route that should actually render.
async fn enter(storefront: &Storefront, route: Route) -> Result<Route, CliError> {
    let route = match storefront.navigate(route) {
        Navigation::Render(route) => route,
        Navigation::Redirect(Route::Login) => return Err(CliError::LoginRequired),
        Navigation::Redirect(target) => target,
    };

    if route.is_protected() {
        load_cart(storefront).await?;
    }
    Ok(route)
}

/// Load the cart for the navbar badge and cart commands.
///
/// An expired credential ends the session; any other failure leaves the
/// cart empty and the page renders anyway.
async fn load_cart(storefront: &Storefront) -> Result<(), CliError> {
    match storefront.start().await {
        Ok(()) => Ok(()),
        Err(e) if e.is_unauthenticated() => {
            storefront.recover(&e.source).await;
            Err(CliError::SessionExpired)
        }
        Err(e) => {
            warn!(error = %e, "Cart unavailable");
            Ok(())
        }
    }
}

/// Map a failed page load, ending the session on an auth failure.
async fn load_failed(
    storefront: &Storefront,
    error: ApiError,
    fallback: &str,
    retry: &str,
) -> CliError {
    if storefront.recover(&error).await {
        return CliError::SessionExpired;
    }

    CliError::Load {
        message: error.server_message().unwrap_or(fallback).to_string(),
        retry: retry.to_string(),
        source: error,
    }
}

/// Map a failed cart operation, ending the session on an auth failure.
async fn cart_failed(storefront: &Storefront, error: CartError) -> CliError {
    if storefront.recover(&error.source).await {
        CliError::SessionExpired
    } else {
        CliError::Cart(error)
    }
}

/// Wrap a body in the full page with the navbar.
fn page(storefront: &Storefront, body: &str) -> String {
    let navbar = storefront.session().is_authenticated().then(|| {
        views::navbar::render(
            storefront.current_user().as_ref(),
            storefront.cart().item_count(),
        )
    });
    views::page(navbar.as_deref(), body)
}

/// Navigate to a path, as a link or address bar would.
///
/// # Errors
///
/// Returns an error for unknown paths, protected paths without a credential
/// and failed page loads.
pub async fn open(storefront: &Storefront, path: &str) -> Result<String, CliError> {
    let route = enter(storefront, path.parse()?).await?;

    match route {
        Route::Login => Ok(page(storefront, &views::login::form(None))),
        Route::Products => products::render_list(storefront, &Default::default()).await,
        Route::ProductDetail(id) => products::render_detail(storefront, &id).await,
        Route::Cart => Ok(cart::render(storefront)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hints() {
        assert!(
            CliError::SessionExpired
                .hint()
                .is_some_and(|h| h.contains("mp login"))
        );

        let load = CliError::Load {
            message: "Failed to load products".to_string(),
            retry: "mp products".to_string(),
            source: ApiError::EmptyResponse,
        };
        assert_eq!(load.to_string(), "Failed to load products");
        assert_eq!(load.hint().as_deref(), Some("Try again with `mp products`."));

        let route = CliError::Route(RouteError::Unknown("/checkout".to_string()));
        assert!(route.hint().is_some_and(|h| h.contains("/cart")));
    }

    #[test]
    fn test_login_error_message_passes_through() {
        let err = CliError::from(LoginError::Rejected { message: None });
        assert_eq!(err.to_string(), "Login failed. Please check your credentials.");
    }
}
