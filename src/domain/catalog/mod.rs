// SPDX-License-Identifier: MPL-2.0
//! Catalog domain types.
//!
//! Transport-independent shapes for what the catalog service returns.

pub mod types;

pub use types::{
    page_image_url, CatalogPage, ChapterImageManifest, ChapterNeighbors, ChapterSummary,
    MangaListCategory, MangaStatus, MangaSummary, NO_DESCRIPTION, UNKNOWN_TITLE,
};
