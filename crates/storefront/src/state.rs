//! The storefront context handed to views.

use std::sync::Arc;

use secrecy::SecretString;
use tracing::{debug, info, instrument, warn};

use marketplace_core::Email;

use crate::api::{ApiClient, ApiError, User};
use crate::cart::{CartError, CartSynchronizer};
use crate::config::StorefrontConfig;
use crate::error::LoginError;
use crate::guard::{Navigation, NavigationGuard, Route};
use crate::session::{AuthToken, FileStore, KeyValueStore, SessionStore, StorageError};

/// Storefront context: session, API client, cart and guard.
///
/// Cheaply cloneable via `Arc`. There is no global instance; create one and
/// pass it to whatever renders views.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    session: SessionStore,
    api: ApiClient,
    cart: CartSynchronizer<ApiClient>,
    guard: NavigationGuard,
}

impl Storefront {
    /// Create a storefront over an explicit key-value store.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: StorefrontConfig, store: Arc<dyn KeyValueStore>) -> Result<Self, ApiError> {
        let session = SessionStore::new(store);
        let api = ApiClient::new(&config, session.clone())?;
        let cart = CartSynchronizer::new(api.clone());
        let guard = NavigationGuard::new(session.clone());

        Ok(Self {
            inner: Arc::new(StorefrontInner {
                session,
                api,
                cart,
                guard,
            }),
        })
    }

    /// Create a storefront persisting its session to `config.session_file`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn open(config: StorefrontConfig) -> Result<Self, ApiError> {
        let store = Arc::new(FileStore::new(config.session_file.clone()));
        Self::new(config, store)
    }

    /// Get a reference to the session store.
    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    /// Get a reference to the API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the cart synchronizer.
    #[must_use]
    pub fn cart(&self) -> &CartSynchronizer<ApiClient> {
        &self.inner.cart
    }

    /// The logged-in user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.inner.session.user()
    }

    /// Load the cart if a credential is present.
    ///
    /// # Errors
    ///
    /// Returns the refresh error; the cart is empty in that case.
    #[instrument(skip(self))]
    pub async fn start(&self) -> Result<(), CartError> {
        if self.inner.session.is_authenticated() {
            self.inner.cart.refresh().await
        } else {
            Ok(())
        }
    }

    /// Log in and load the user's cart.
    ///
    /// Nothing is stored unless the backend issues a non-empty token and a
    /// user.
    ///
    /// # Errors
    ///
    /// Returns `LoginError` describing why no credential was stored.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<User, LoginError> {
        let email = Email::parse(email)?;
        let data = self.inner.api.login(&email, password).await?;

        if data.token.is_empty() {
            return Err(LoginError::Rejected { message: None });
        }
        let user = data.user.ok_or(LoginError::Rejected { message: None })?;

        self.inner
            .session
            .set_credential(&AuthToken::new(data.token), &user)?;
        info!(user_id = %user.id, "Logged in");

        if let Err(e) = self.inner.cart.refresh().await {
            debug!(error = %e, "Cart refresh after login failed");
        }

        Ok(user)
    }

    /// Destroy the credential and drop the local cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the session file cannot be written. The cart is
    /// reset either way.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), StorageError> {
        let cleared = self.inner.session.clear();
        self.inner.cart.reset().await;
        info!("Logged out");
        cleared
    }

    /// Run the navigation guard for `route`.
    #[must_use]
    pub fn navigate(&self, route: Route) -> Navigation {
        self.inner.guard.check(route)
    }

    /// Handle an authentication failure reported by any API call.
    ///
    /// Returns `true` when the credential was discarded and the caller should
    /// send the user to the login view.
    pub async fn recover(&self, error: &ApiError) -> bool {
        if !error.is_unauthenticated() {
            return false;
        }

        if let Err(e) = self.logout().await {
            warn!(error = %e, "Failed to clear expired session");
        }
        true
    }
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("api", &self.inner.api)
            .field("session", &self.inner.session)
            .finish_non_exhaustive()
    }
}
