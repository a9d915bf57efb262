// SPDX-License-Identifier: MPL-2.0
//! Port definitions (traits) for dependency inversion.
//!
//! This module defines abstract interfaces that infrastructure adapters implement.
//! These traits use only domain types, so the reader core can be exercised
//! against in-memory fakes.
//!
//! # Available Ports
//!
//! - [`catalog`]: The remote manga catalog (search, listings, chapters, manifests)
//! - [`store`]: Persistence of reading preferences and history
//!
//! # Example
//!
//! ```ignore
//! use manga_lens::application::port::CatalogService;
//!
//! async fn first_chapter(catalog: &impl CatalogService, manga_id: &str) -> Option<String> {
//!     let chapters = catalog.get_chapters(manga_id).await.ok()?;
//!     chapters.first().map(|c| c.id.clone())
//! }
//! ```

pub mod catalog;
pub mod store;

pub use catalog::{CatalogError, CatalogResult, CatalogService};
pub use store::{StoreBackend, StoreSnapshot};
