// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all configuration constants.
//!
//! # Categories
//!
//! - **Catalog**: API endpoints, page sizes, retry policy
//! - **Cache**: Query cache capacity and staleness, page image cache limits
//! - **Reader**: Preload window, zoom sensitivity, layout padding

use crate::domain::reader::newtypes::{preload_bounds, zoom_bounds};

// ==========================================================================
// Catalog Defaults
// ==========================================================================

/// Base URL of the catalog REST API.
pub const DEFAULT_API_BASE_URL: &str = "https://api.mangadex.org";

/// Endpoint that resolves a chapter id to its image server and file list.
pub const DEFAULT_AT_HOME_URL: &str = "https://api.mangadex.org/at-home/server";

/// Host serving cover art.
pub const DEFAULT_UPLOADS_URL: &str = "https://uploads.mangadex.org";

/// User agent sent with every catalog request.
pub const DEFAULT_USER_AGENT: &str = concat!("MangaLens/", env!("CARGO_PKG_VERSION"));

/// Default number of titles per listing page.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Minimum titles per listing page.
pub const MIN_PAGE_SIZE: u32 = 1;

/// Maximum titles per listing page (server limit).
pub const MAX_PAGE_SIZE: u32 = 100;

/// Default number of chapters fetched for a title.
pub const DEFAULT_CHAPTER_PAGE_SIZE: u32 = 100;

/// Maximum chapters fetched for a title in one request.
pub const MAX_CHAPTER_PAGE_SIZE: u32 = 500;

/// Default retries for a failed catalog request.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Maximum retries for a failed catalog request.
pub const MAX_MAX_RETRIES: u32 = 5;

/// Default request timeout (in seconds).
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default chapter translation languages.
pub const DEFAULT_TRANSLATED_LANGUAGES: &[&str] = &["en"];

/// Default content ratings included in listings.
pub const DEFAULT_CONTENT_RATINGS: &[&str] = &["safe", "suggestive"];

// ==========================================================================
// Cache Defaults
// ==========================================================================

/// Default number of cached catalog responses.
pub const DEFAULT_CACHE_ENTRIES: usize = 64;

/// Minimum number of cached catalog responses.
pub const MIN_CACHE_ENTRIES: usize = 4;

/// Maximum number of cached catalog responses.
pub const MAX_CACHE_ENTRIES: usize = 1024;

/// Default age after which a cached response is refetched (in seconds).
pub const DEFAULT_STALE_AFTER_SECS: u64 = 300;

/// Default page image cache size (in MB).
pub const DEFAULT_PAGE_CACHE_MB: usize = 64;

/// Minimum page image cache size (in MB).
pub const MIN_PAGE_CACHE_MB: usize = 8;

/// Maximum page image cache size (in MB).
pub const MAX_PAGE_CACHE_MB: usize = 512;

/// Default number of page images held in memory.
pub const DEFAULT_PAGE_CACHE_PAGES: usize = 48;

pub const MIN_PAGE_CACHE_PAGES: usize = 4;

pub const MAX_PAGE_CACHE_PAGES: usize = 256;

// ==========================================================================
// Reader Defaults
// ==========================================================================

/// Default single-mode preload window (current page included).
pub const DEFAULT_PRELOAD_COUNT: u32 = preload_bounds::DEFAULT;

/// Default zoom change per unit of wheel delta.
pub const DEFAULT_ZOOM_SENSITIVITY: f32 = zoom_bounds::DEFAULT_SENSITIVITY;

/// Maximum zoom change per unit of wheel delta.
pub const MAX_ZOOM_SENSITIVITY: f32 = zoom_bounds::MAX_SENSITIVITY;

/// Default vertical space reserved for reader chrome (in pixels).
pub const DEFAULT_VERTICAL_PADDING: f32 = 100.0;

// ==========================================================================
// Logging Defaults
// ==========================================================================

/// Default log level name.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// ==========================================================================
// Compile-time Validation
// ==========================================================================

const _: () = {
    assert!(MIN_PAGE_SIZE > 0);
    assert!(DEFAULT_PAGE_SIZE >= MIN_PAGE_SIZE);
    assert!(DEFAULT_PAGE_SIZE <= MAX_PAGE_SIZE);
    assert!(DEFAULT_CHAPTER_PAGE_SIZE <= MAX_CHAPTER_PAGE_SIZE);
    assert!(DEFAULT_MAX_RETRIES <= MAX_MAX_RETRIES);
    assert!(DEFAULT_REQUEST_TIMEOUT_SECS > 0);

    assert!(MIN_CACHE_ENTRIES > 0);
    assert!(DEFAULT_CACHE_ENTRIES >= MIN_CACHE_ENTRIES);
    assert!(DEFAULT_CACHE_ENTRIES <= MAX_CACHE_ENTRIES);
    assert!(MIN_PAGE_CACHE_MB > 0);
    assert!(DEFAULT_PAGE_CACHE_MB >= MIN_PAGE_CACHE_MB);
    assert!(DEFAULT_PAGE_CACHE_MB <= MAX_PAGE_CACHE_MB);
    assert!(MIN_PAGE_CACHE_PAGES > 0);
    assert!(DEFAULT_PAGE_CACHE_PAGES >= MIN_PAGE_CACHE_PAGES);
    assert!(DEFAULT_PAGE_CACHE_PAGES <= MAX_PAGE_CACHE_PAGES);

    assert!(DEFAULT_PRELOAD_COUNT >= preload_bounds::MIN);
    assert!(DEFAULT_PRELOAD_COUNT <= preload_bounds::MAX);
    assert!(DEFAULT_ZOOM_SENSITIVITY > 0.0);
    assert!(DEFAULT_ZOOM_SENSITIVITY <= MAX_ZOOM_SENSITIVITY);
    assert!(DEFAULT_VERTICAL_PADDING >= 0.0);
};
