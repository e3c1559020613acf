//! Marketplace Storefront library.
//!
//! Client-side core of the Marketplace storefront: it talks to the remote
//! REST API, keeps the login credential, owns the shopping cart state and
//! decides which views an anonymous visitor may see.
//!
//! # Architecture
//!
//! - [`api`] - API gateway client, one method per backend operation
//! - [`session`] - Credential persistence over a pluggable key-value store
//! - [`cart`] - Cart synchronizer (refresh-after-mutate, fail-closed refresh)
//! - [`guard`] - Route table and authentication-gated navigation
//! - [`state`] - The [`Storefront`] context that owns all of the above
//!
//! Views consume a [`Storefront`] handed to them explicitly; there is no
//! global state.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod config;
pub mod error;
pub mod guard;
pub mod session;
pub mod state;

pub use api::{ApiClient, ApiError, CartItem, Product, ProductQuery, User};
pub use cart::{CartApi, CartError, CartOperation, CartState, CartSynchronizer, clamp_quantity};
pub use config::{ConfigError, StorefrontConfig};
pub use error::LoginError;
pub use guard::{Navigation, NavigationGuard, Route, RouteError};
pub use session::{AuthToken, FileStore, KeyValueStore, MemoryStore, SessionStore, StorageError};
pub use state::Storefront;
