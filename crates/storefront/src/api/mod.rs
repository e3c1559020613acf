//! Marketplace REST API client.
//!
//! One async method per backend operation. Each call is a single request
//! and response with no retry; the bearer token is read from the
//! [`SessionStore`] at call time, so a login or logout takes effect on the
//! next request without rebuilding the client.
//!
//! # Error mapping
//!
//! | Response | Error |
//! |---|---|
//! | 401 / 403 | [`ApiError::Unauthorized`] |
//! | 404 | [`ApiError::NotFound`] |
//! | other non-2xx, or `success: false` | [`ApiError::Rejected`] |
//! | connection failure | [`ApiError::Transport`] |
//! | undecodable body | [`ApiError::Decode`] |

pub mod types;

pub use types::{
    CartItem, CartProduct, CartSnapshot, Envelope, LoginData, Product, ProductList, ProductQuery,
    User,
};

use std::sync::Arc;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::de::{DeserializeOwned, IgnoredAny};
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

use marketplace_core::{Email, ProductId};

use crate::config::StorefrontConfig;
use crate::session::SessionStore;
use types::{AddToCartRequest, LoginRequest, UpdateCartItemRequest};

/// Errors returned by the API client.
///
/// Variants produced from a server response keep the server's `message`
/// when it sent one.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The credential is missing, expired or not allowed (401/403).
    #[error("{}", .message.as_deref().unwrap_or("Not authenticated"))]
    Unauthorized { message: Option<String> },

    /// The resource does not exist (404).
    #[error("{}", .message.as_deref().unwrap_or("Not found"))]
    NotFound { message: Option<String> },

    /// The backend refused the request.
    #[error("Request rejected ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Rejected { status: u16, message: Option<String> },

    /// The response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A successful response carried no `data`.
    #[error("Response contained no data")]
    EmptyResponse,

    /// The request URL could not be built.
    #[error("Invalid request URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// Message supplied by the server, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { message }
            | Self::NotFound { message }
            | Self::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Whether the error means the credential is no longer valid.
    #[must_use]
    pub const fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Whether the requested resource does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the Marketplace REST API.
///
/// Cheap to clone; clones share the connection pool and session.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
    session: SessionStore,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: &StorefrontConfig, session: SessionStore) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("marketplace-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_url.clone(),
                session,
            }),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    fn cart_item_url(&self, product_id: &ProductId) -> String {
        self.url(&format!("/cart/{}", urlencoding::encode(product_id.as_str())))
    }

    /// Send a request and unwrap the response envelope.
    ///
    /// Returns `Ok(None)` when a successful response has no body or no `data`.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Option<T>, ApiError> {
        let request = match self.inner.session.token() {
            Some(token) => request.bearer_auth(token.expose()),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        if body.trim().is_empty() {
            return Ok(None);
        }

        let envelope: Envelope<T> = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %truncate(&body),
                "Failed to parse Marketplace API response"
            );
            e
        })?;

        if !envelope.success {
            debug!(status = %status, message = ?envelope.message, "API reported failure");
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message: envelope.message,
            });
        }

        Ok(envelope.data)
    }

    /// Send a request whose payload is required.
    async fn fetch<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        self.execute(request).await?.ok_or(ApiError::EmptyResponse)
    }

    /// Send a request whose payload, if any, is not used.
    async fn submit(&self, request: reqwest::RequestBuilder) -> Result<(), ApiError> {
        self.execute::<IgnoredAny>(request).await.map(|_| ())
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Exchange credentials for a bearer token and user.
    ///
    /// The token is not stored here; see [`crate::Storefront::login`].
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend refuses the login.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &Email, password: &SecretString) -> Result<LoginData, ApiError> {
        let body = LoginRequest {
            email: email.as_str(),
            password: password.expose_secret(),
        };
        self.fetch(self.inner.client.post(self.url("/auth/login")).json(&body))
            .await
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// List products, optionally filtered and sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self, query: &ProductQuery) -> Result<Vec<Product>, ApiError> {
        let mut url = Url::parse(&self.url("/products"))?;
        let pairs = query.to_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }

        let list: Option<ProductList> = self.execute(self.inner.client.get(url)).await?;
        Ok(list.unwrap_or_default().products)
    }

    /// Get a single product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let url = self.url(&format!("/products/{}", urlencoding::encode(id.as_str())));
        self.fetch(self.inner.client.get(url)).await
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Get the authenticated user's cart.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` without a valid credential.
    #[instrument(skip(self))]
    pub async fn get_cart(&self) -> Result<CartSnapshot, ApiError> {
        let cart: Option<CartSnapshot> =
            self.execute(self.inner.client.get(self.url("/cart"))).await?;
        Ok(cart.unwrap_or_default())
    }

    /// Add a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend refuses it
    /// (for example, not enough stock).
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_to_cart(&self, product_id: &ProductId, quantity: i64) -> Result<(), ApiError> {
        let body = AddToCartRequest {
            product_id,
            quantity,
        };
        self.submit(self.inner.client.post(self.url("/cart")).json(&body))
            .await
    }

    /// Set the quantity of a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend refuses it.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn update_cart_item(
        &self,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<(), ApiError> {
        let body = UpdateCartItemRequest { quantity };
        self.submit(
            self.inner
                .client
                .put(self.cart_item_url(product_id))
                .json(&body),
        )
        .await
    }

    /// Remove a product from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend refuses it.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_from_cart(&self, product_id: &ProductId) -> Result<(), ApiError> {
        self.submit(self.inner.client.delete(self.cart_item_url(product_id)))
            .await
    }

    /// Remove every line from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend refuses it.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> Result<(), ApiError> {
        self.submit(self.inner.client.delete(self.url("/cart")))
            .await
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

/// Map a non-2xx response to an error, keeping the envelope message.
fn status_error(status: StatusCode, body: &str) -> ApiError {
    let message = serde_json::from_str::<Envelope<IgnoredAny>>(body)
        .ok()
        .and_then(|envelope| envelope.message);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            debug!(status = %status, "API rejected credential");
            ApiError::Unauthorized { message }
        }
        StatusCode::NOT_FOUND => ApiError::NotFound { message },
        s if s.is_server_error() => {
            tracing::error!(
                status = %s,
                body = %truncate(body),
                "Marketplace API returned server error"
            );
            ApiError::Rejected {
                status: s.as_u16(),
                message,
            }
        }
        s => {
            warn!(status = %s, message = ?message, "Marketplace API refused request");
            ApiError::Rejected {
                status: s.as_u16(),
                message,
            }
        }
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(500).collect()
}
