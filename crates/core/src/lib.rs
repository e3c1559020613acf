//! Marketplace Core - Shared types library.
//!
//! This crate provides common types used across all Marketplace components:
//! - `storefront` - API gateway client, session store and cart synchronizer
//! - `cli` - Terminal views over the storefront
//! - `integration-tests` - Fake backend and end-to-end tests
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails and sort orders

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
