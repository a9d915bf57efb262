// SPDX-License-Identifier: MPL-2.0
//! Infrastructure layer adapters.
//!
//! Concrete implementations of the port traits defined in
//! `application::port`.
//!
//! # Available Adapters
//!
//! - [`mangadex`]: MangaDex REST API (implements [`CatalogService`])
//! - [`query_cache`]: LRU response cache wrapping any [`CatalogService`]
//!
//! The store backends live with the store itself in `app::store`.
//!
//! [`CatalogService`]: crate::application::port::CatalogService

pub mod mangadex;
pub mod query_cache;

pub use mangadex::MangaDexClient;
pub use query_cache::{CachedCatalog, QueryCacheStats, QueryKey};
