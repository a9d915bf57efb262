// SPDX-License-Identifier: MPL-2.0
//! Catalog service port definition.
//!
//! The [`CatalogService`] trait is the request/response interface the reader
//! consumes for titles, chapters and image manifests. Transport is a detail of
//! the adapter (see `infrastructure::mangadex`).

use crate::domain::catalog::{
    page_image_url, CatalogPage, ChapterImageManifest, ChapterSummary, MangaListCategory,
    MangaSummary,
};
use std::fmt;
use std::future::Future;

// =============================================================================
// CatalogError
// =============================================================================

/// Errors returned by a catalog service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The request never produced a response (DNS, TLS, connection reset, timeout).
    Network(String),

    /// The server answered with a non-success status.
    Status {
        /// HTTP status code.
        code: u16,
    },

    /// The response body did not have the expected shape.
    Decode(String),

    /// The requested resource does not exist.
    NotFound,

    /// A configured endpoint is not a usable base URL.
    InvalidUrl(String),
}

impl CatalogError {
    /// Returns true if repeating the request may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            CatalogError::Network(_) => true,
            CatalogError::Status { code } => *code == 429 || *code >= 500,
            CatalogError::Decode(_) | CatalogError::NotFound | CatalogError::InvalidUrl(_) => {
                false
            }
        }
    }
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Network(msg) => write!(f, "Network error: {msg}"),
            CatalogError::Status { code } => write!(f, "Unexpected HTTP status: {code}"),
            CatalogError::Decode(msg) => write!(f, "Malformed response: {msg}"),
            CatalogError::NotFound => write!(f, "Not found"),
            CatalogError::InvalidUrl(msg) => write!(f, "Invalid endpoint URL: {msg}"),
        }
    }
}

impl std::error::Error for CatalogError {}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

// =============================================================================
// CatalogService Trait
// =============================================================================

/// Read-only access to a manga catalog.
///
/// Implementations issue their own retries; callers only react to the final
/// success or failure.
pub trait CatalogService {
    /// Searches titles by free text.
    fn search_manga(
        &self,
        query: &str,
        offset: u32,
        limit: u32,
    ) -> impl Future<Output = CatalogResult<CatalogPage<MangaSummary>>> + Send;

    /// Lists titles for a predefined category.
    fn list_manga(
        &self,
        category: MangaListCategory,
        offset: u32,
        limit: u32,
    ) -> impl Future<Output = CatalogResult<CatalogPage<MangaSummary>>> + Send;

    /// Fetches one title.
    fn get_manga(&self, id: &str) -> impl Future<Output = CatalogResult<MangaSummary>> + Send;

    /// Fetches the chapters of a title, ascending by chapter number.
    fn get_chapters(
        &self,
        manga_id: &str,
    ) -> impl Future<Output = CatalogResult<Vec<ChapterSummary>>> + Send;

    /// Fetches metadata for one chapter.
    fn get_chapter_metadata(
        &self,
        chapter_id: &str,
    ) -> impl Future<Output = CatalogResult<ChapterSummary>> + Send;

    /// Fetches where the chapter's page images live.
    fn get_chapter_image_manifest(
        &self,
        chapter_id: &str,
    ) -> impl Future<Output = CatalogResult<ChapterImageManifest>> + Send;

    /// Builds the URL of a cover image.
    fn cover_image_url(&self, manga_id: &str, filename: &str) -> String;

    /// Builds the URL of a page image.
    fn page_image_url(&self, base_url: &str, hash: &str, filename: &str, data_saver: bool) -> String {
        page_image_url(base_url, hash, filename, data_saver)
    }
}
