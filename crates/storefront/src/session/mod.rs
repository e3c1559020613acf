//! Credential persistence.
//!
//! The session store keeps the bearer token and the logged-in user under
//! fixed keys of a [`KeyValueStore`]. Presence of the token is what the
//! navigation guard and the API client look at; expiry is never checked
//! here (an expired token simply makes the next API call fail with
//! [`crate::ApiError::Unauthorized`]).

mod store;

pub use store::{FileStore, KeyValueStore, MemoryStore, StorageError};

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tracing::warn;

use crate::api::types::User;

/// Storage keys for credential data.
pub mod keys {
    /// Key for the bearer token.
    pub const TOKEN: &str = "token";

    /// Key for the JSON-encoded logged-in user.
    pub const USER: &str = "user";
}

/// Opaque bearer token issued at login.
///
/// `Debug` output is redacted.
#[derive(Clone)]
pub struct AuthToken(SecretString);

impl AuthToken {
    /// Wrap a raw token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// The raw token, for the `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken([REDACTED])")
    }
}

/// Session store over a pluggable key-value backend.
///
/// Cheap to clone; clones share the same backend.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    /// Create a session store over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Session store backed by a fresh [`MemoryStore`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Persist the credential obtained at login.
    ///
    /// The user is written before the token so that a token is never present
    /// without its user.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    pub fn set_credential(&self, token: &AuthToken, user: &User) -> Result<(), StorageError> {
        let user_json = serde_json::to_string(user)?;
        self.store.set(keys::USER, &user_json)?;
        self.store.set(keys::TOKEN, token.expose())
    }

    /// The current token, if any.
    ///
    /// A backend read failure is logged and reported as "no token".
    #[must_use]
    pub fn token(&self) -> Option<AuthToken> {
        match self.store.get(keys::TOKEN) {
            Ok(Some(token)) if !token.is_empty() => Some(AuthToken::new(token)),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "Failed to read session token, treating as logged out");
                None
            }
        }
    }

    /// The logged-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        let raw = match self.store.get(keys::USER) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "Failed to read session user");
                return None;
            }
        };

        serde_json::from_str(&raw)
            .inspect_err(|e| warn!(error = %e, "Stored session user is not valid JSON"))
            .ok()
    }

    /// Whether a credential is present. Used for route gating.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Destroy the credential (logout).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(keys::TOKEN)?;
        self.store.remove(keys::USER)
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user() -> User {
        serde_json::from_str(r#"{"id": "u1", "email": "john.doe@example.com", "name": "John"}"#)
            .unwrap()
    }

    #[test]
    fn test_credential_lifecycle() {
        let session = SessionStore::in_memory();
        assert!(!session.is_authenticated());
        assert!(session.user().is_none());

        session
            .set_credential(&AuthToken::new("jwt-abc"), &user())
            .unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.token().unwrap().expose(), "jwt-abc");
        assert_eq!(session.user().unwrap(), user());

        session.clear().unwrap();
        assert!(!session.is_authenticated());
        assert!(session.user().is_none());
    }

    #[test]
    fn test_uses_fixed_keys() {
        let backend = Arc::new(MemoryStore::new());
        let session = SessionStore::new(backend.clone());
        session
            .set_credential(&AuthToken::new("jwt-abc"), &user())
            .unwrap();

        assert_eq!(backend.get("token").unwrap().as_deref(), Some("jwt-abc"));
        let stored: serde_json::Value =
            serde_json::from_str(&backend.get("user").unwrap().unwrap()).unwrap();
        assert_eq!(stored["name"], "John");
    }

    #[test]
    fn test_empty_token_is_not_a_credential() {
        let backend = Arc::new(MemoryStore::new());
        backend.set(keys::TOKEN, "").unwrap();
        assert!(!SessionStore::new(backend).is_authenticated());
    }

    #[test]
    fn test_corrupt_user_is_ignored() {
        let backend = Arc::new(MemoryStore::new());
        backend.set(keys::USER, "{not json").unwrap();
        assert!(SessionStore::new(backend).user().is_none());
    }

    #[test]
    fn test_unreadable_backend_means_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "garbage").unwrap();

        let session = SessionStore::new(Arc::new(FileStore::new(path)));
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let token = AuthToken::new("super-secret-jwt");
        let debug = format!("{token:?}");
        assert!(!debug.contains("super-secret-jwt"));
        assert!(debug.contains("REDACTED"));
    }
}
