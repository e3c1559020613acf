//! Cart synchronization.
//!
//! [`CartSynchronizer`] is the single owner of the local cart state. Every
//! mutation is sent to the backend and, on success, followed by a full
//! refresh so that items and subtotal always mirror what the server holds.
//! Nothing is applied optimistically.
//!
//! Mutations and refreshes run one at a time through an async mutation lane,
//! so a slow response can never overwrite the result of a later operation.

use std::future::Future;

use parking_lot::RwLock;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use marketplace_core::{Price, ProductId};

use crate::api::{ApiClient, ApiError, CartItem, CartSnapshot};

// =============================================================================
// CartApi
// =============================================================================

/// Backend operations the synchronizer depends on.
///
/// Implemented by [`ApiClient`]; tests substitute an in-memory backend.
pub trait CartApi: Send + Sync {
    /// Fetch the authoritative cart.
    fn fetch_cart(&self) -> impl Future<Output = Result<CartSnapshot, ApiError>> + Send;

    /// Add `quantity` units of a product.
    fn add_item(
        &self,
        product_id: &ProductId,
        quantity: i64,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Set the quantity of a product's line.
    fn set_quantity(
        &self,
        product_id: &ProductId,
        quantity: i64,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Remove a product's line.
    fn remove_item(&self, product_id: &ProductId)
    -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Remove every line.
    fn clear_items(&self) -> impl Future<Output = Result<(), ApiError>> + Send;
}

impl CartApi for ApiClient {
    fn fetch_cart(&self) -> impl Future<Output = Result<CartSnapshot, ApiError>> + Send {
        self.get_cart()
    }

    fn add_item(
        &self,
        product_id: &ProductId,
        quantity: i64,
    ) -> impl Future<Output = Result<(), ApiError>> + Send {
        self.add_to_cart(product_id, quantity)
    }

    fn set_quantity(
        &self,
        product_id: &ProductId,
        quantity: i64,
    ) -> impl Future<Output = Result<(), ApiError>> + Send {
        self.update_cart_item(product_id, quantity)
    }

    fn remove_item(
        &self,
        product_id: &ProductId,
    ) -> impl Future<Output = Result<(), ApiError>> + Send {
        self.remove_from_cart(product_id)
    }

    fn clear_items(&self) -> impl Future<Output = Result<(), ApiError>> + Send {
        self.clear_cart()
    }
}

// =============================================================================
// State and Errors
// =============================================================================

/// Snapshot of the local cart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartState {
    /// Cart lines in server order.
    pub items: Vec<CartItem>,
    /// Number of lines (not units), shown on the navbar badge.
    pub item_count: usize,
    /// Server-computed subtotal.
    pub subtotal: Price,
    /// True while a refresh is in flight.
    pub loading: bool,
}

impl CartState {
    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Order total. There are no taxes or shipping, so this is the subtotal.
    #[must_use]
    pub const fn total(&self) -> Price {
        self.subtotal
    }

    /// The line for a product, if it is in the cart.
    #[must_use]
    pub fn line(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.product_id == product_id)
    }
}

impl From<CartSnapshot> for CartState {
    fn from(snapshot: CartSnapshot) -> Self {
        Self {
            item_count: snapshot.items.len(),
            items: snapshot.items,
            subtotal: snapshot.subtotal,
            loading: false,
        }
    }
}

/// The cart operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOperation {
    Refresh,
    Add,
    Update,
    Remove,
    Clear,
}

impl CartOperation {
    /// Message shown when the server gave no reason.
    #[must_use]
    pub const fn fallback_message(self) -> &'static str {
        match self {
            Self::Refresh => "Failed to load cart",
            Self::Add => "Failed to add item to cart",
            Self::Update => "Failed to update cart item",
            Self::Remove => "Failed to remove item from cart",
            Self::Clear => "Failed to clear cart",
        }
    }
}

/// A failed cart operation.
///
/// Displays as the server's message when there is one, otherwise as the
/// operation's fallback message.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CartError {
    /// Which operation failed.
    pub operation: CartOperation,
    /// User-facing message.
    pub message: String,
    /// The underlying API failure.
    #[source]
    pub source: ApiError,
}

impl CartError {
    fn new(operation: CartOperation, source: ApiError) -> Self {
        let message = source
            .server_message()
            .unwrap_or_else(|| operation.fallback_message())
            .to_string();
        Self {
            operation,
            message,
            source,
        }
    }

    /// Whether the failure was caused by a missing or expired credential.
    #[must_use]
    pub const fn is_unauthenticated(&self) -> bool {
        self.source.is_unauthenticated()
    }
}

/// Clamp a requested quantity to `[1, stock]`.
///
/// Used by views before calling the synchronizer; the synchronizer itself
/// passes quantities through unchanged. A product with no stock still
/// clamps to 1 and the backend decides.
#[must_use]
pub fn clamp_quantity(requested: i64, stock: i64) -> i64 {
    requested.clamp(1, stock.max(1))
}

// =============================================================================
// CartSynchronizer
// =============================================================================

/// Owner of the local cart state.
pub struct CartSynchronizer<A> {
    api: A,
    state: RwLock<CartState>,
    lane: tokio::sync::Mutex<()>,
}

impl<A: CartApi> CartSynchronizer<A> {
    /// Create a synchronizer with an empty cart. Call [`Self::refresh`] to load it.
    #[must_use]
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: RwLock::new(CartState::default()),
            lane: tokio::sync::Mutex::new(()),
        }
    }

    /// Current cart state.
    #[must_use]
    pub fn state(&self) -> CartState {
        self.state.read().clone()
    }

    /// Number of cart lines.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.state.read().item_count
    }

    /// Replace the local state with the server's cart.
    ///
    /// On failure the state is emptied before the error is returned.
    ///
    /// # Errors
    ///
    /// Returns `CartError` with operation `Refresh` if the cart cannot be loaded.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), CartError> {
        let _lane = self.lane.lock().await;
        self.refresh_locked().await
    }

    /// Add `quantity` units of a product, then refresh.
    ///
    /// # Errors
    ///
    /// Returns `CartError` if the backend refuses; the state is left untouched.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add(&self, product_id: &ProductId, quantity: i64) -> Result<(), CartError> {
        self.mutate(CartOperation::Add, || {
            self.api.add_item(product_id, quantity)
        })
        .await
    }

    /// Set a line's quantity, then refresh. The quantity is sent as given.
    ///
    /// # Errors
    ///
    /// Returns `CartError` if the backend refuses; the state is left untouched.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn update_quantity(
        &self,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<(), CartError> {
        self.mutate(CartOperation::Update, || {
            self.api.set_quantity(product_id, quantity)
        })
        .await
    }

    /// Remove a product's line, then refresh.
    ///
    /// # Errors
    ///
    /// Returns `CartError` if the backend refuses; the state is left untouched.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove(&self, product_id: &ProductId) -> Result<(), CartError> {
        self.mutate(CartOperation::Remove, || self.api.remove_item(product_id))
            .await
    }

    /// Empty the cart on the server, then refresh.
    ///
    /// # Errors
    ///
    /// Returns `CartError` if the backend refuses; the state is left untouched.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<(), CartError> {
        self.mutate(CartOperation::Clear, || self.api.clear_items())
            .await
    }

    /// Drop the local state without contacting the server (logout).
    pub async fn reset(&self) {
        let _lane = self.lane.lock().await;
        *self.state.write() = CartState::default();
    }

    async fn mutate<F, Fut>(&self, operation: CartOperation, call: F) -> Result<(), CartError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), ApiError>>,
    {
        let _lane = self.lane.lock().await;

        call()
            .await
            .map_err(|e| CartError::new(operation, e))?;

        // The mutation stands even if the follow-up refresh fails; the
        // state is already empty in that case.
        if let Err(e) = self.refresh_locked().await {
            debug!(operation = ?operation, error = %e, "Refresh after cart mutation failed");
        }
        Ok(())
    }

    async fn refresh_locked(&self) -> Result<(), CartError> {
        self.state.write().loading = true;

        match self.api.fetch_cart().await {
            Ok(snapshot) => {
                *self.state.write() = CartState::from(snapshot);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to load cart, clearing local state");
                *self.state.write() = CartState::default();
                Err(CartError::new(CartOperation::Refresh, e))
            }
        }
    }
}

impl<A> std::fmt::Debug for CartSynchronizer<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartSynchronizer")
            .field("state", &*self.state.read())
            .finish_non_exhaustive()
    }
}
