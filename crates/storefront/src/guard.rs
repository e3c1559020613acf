//! Route table and authentication-gated navigation.
//!
//! Every protected route requires a credential in the session store. The
//! check is re-run on each navigation and holds no state of its own.

use marketplace_core::ProductId;
use thiserror::Error;

use crate::session::SessionStore;

/// Error returned for a path that matches no route.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("unknown route: {0}")]
    Unknown(String),
}

/// A navigable view.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    /// `/login` (also `/`)
    Login,
    /// `/products`
    Products,
    /// `/products/:id`
    ProductDetail(ProductId),
    /// `/cart`
    Cart,
}

impl Route {
    /// Whether the route requires a credential.
    #[must_use]
    pub const fn is_protected(&self) -> bool {
        !matches!(self, Self::Login)
    }

    /// Canonical path of the route.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Login => "/login".to_string(),
            Self::Products => "/products".to_string(),
            Self::ProductDetail(id) => format!("/products/{}", urlencoding::encode(id.as_str())),
            Self::Cart => "/cart".to_string(),
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}

impl std::str::FromStr for Route {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if !trimmed.starts_with('/') {
            return Err(RouteError::Unknown(s.to_string()));
        }
        let segments: Vec<&str> = trimmed.trim_end_matches('/').split('/').skip(1).collect();

        match segments.as_slice() {
            [] | ["login"] => Ok(Self::Login),
            ["products"] => Ok(Self::Products),
            ["cart"] => Ok(Self::Cart),
            ["products", id] if !id.is_empty() => {
                let id = urlencoding::decode(id).map_err(|_| RouteError::Unknown(s.to_string()))?;
                Ok(Self::ProductDetail(ProductId::new(id.into_owned())))
            }
            _ => Err(RouteError::Unknown(s.to_string())),
        }
    }
}

/// Outcome of a navigation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Show the requested route.
    Render(Route),
    /// Go somewhere else instead.
    Redirect(Route),
}

/// Decide where a navigation ends up.
///
/// - protected route without a credential: redirect to login
/// - login with a credential: redirect to products
/// - anything else renders
#[must_use]
pub fn resolve(route: Route, authenticated: bool) -> Navigation {
    match (route, authenticated) {
        (Route::Login, true) => Navigation::Redirect(Route::Products),
        (route, false) if route.is_protected() => Navigation::Redirect(Route::Login),
        (route, _) => Navigation::Render(route),
    }
}

/// Navigation guard bound to a session store.
#[derive(Debug, Clone)]
pub struct NavigationGuard {
    session: SessionStore,
}

impl NavigationGuard {
    /// Create a guard reading credentials from `session`.
    #[must_use]
    pub const fn new(session: SessionStore) -> Self {
        Self { session }
    }

    /// Check a navigation against the current credential.
    #[must_use]
    pub fn check(&self, route: Route) -> Navigation {
        resolve(route, self.session.is_authenticated())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::User;
    use crate::session::AuthToken;

    #[test]
    fn test_parse_routes() {
        assert_eq!("/".parse::<Route>().unwrap(), Route::Login);
        assert_eq!("/login".parse::<Route>().unwrap(), Route::Login);
        assert_eq!("/products/".parse::<Route>().unwrap(), Route::Products);
        assert_eq!("/cart".parse::<Route>().unwrap(), Route::Cart);
        assert_eq!(
            "/products/abc-123".parse::<Route>().unwrap(),
            Route::ProductDetail(ProductId::new("abc-123"))
        );
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!("/checkout".parse::<Route>().is_err());
        assert!("/products/a/b".parse::<Route>().is_err());
        assert!("products".parse::<Route>().is_err());
    }

    #[test]
    fn test_path_round_trips_encoded_ids() {
        let route = Route::ProductDetail(ProductId::new("a b"));
        assert_eq!(route.path(), "/products/a%20b");
        assert_eq!(route.path().parse::<Route>().unwrap(), route);
    }

    #[test]
    fn test_resolve_table() {
        let detail = Route::ProductDetail(ProductId::new("p1"));

        for route in [Route::Products, Route::Cart, detail.clone()] {
            assert_eq!(resolve(route.clone(), false), Navigation::Redirect(Route::Login));
            assert_eq!(resolve(route.clone(), true), Navigation::Render(route));
        }

        assert_eq!(resolve(Route::Login, false), Navigation::Render(Route::Login));
        assert_eq!(
            resolve(Route::Login, true),
            Navigation::Redirect(Route::Products)
        );
    }

    #[test]
    fn test_guard_follows_session() {
        let session = SessionStore::in_memory();
        let guard = NavigationGuard::new(session.clone());
        assert_eq!(guard.check(Route::Cart), Navigation::Redirect(Route::Login));

        let user: User = serde_json::from_str(r#"{"id": "u1"}"#).unwrap();
        session
            .set_credential(&AuthToken::new("jwt"), &user)
            .unwrap();
        assert_eq!(guard.check(Route::Cart), Navigation::Render(Route::Cart));

        session.clear().unwrap();
        assert_eq!(guard.check(Route::Cart), Navigation::Redirect(Route::Login));
    }
}
