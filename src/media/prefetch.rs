// SPDX-License-Identifier: MPL-2.0
//! Byte-bounded cache of downloaded page images.
//!
//! Pages are keyed by their URL, so the full-quality and data-saver variants
//! of the same page are separate entries. Least recently used pages are evicted
//! first once either the entry or byte limit is reached.

use super::fetch::{fetch_page_image, PageImage};
use crate::app::config::{
    CacheConfig, DEFAULT_PAGE_CACHE_MB, DEFAULT_PAGE_CACHE_PAGES, MAX_PAGE_CACHE_MB,
    MAX_PAGE_CACHE_PAGES, MIN_PAGE_CACHE_MB, MIN_PAGE_CACHE_PAGES,
};
use crate::error::Result;
use lru::LruCache;
use std::num::NonZeroUsize;

const BYTES_PER_MB: usize = 1024 * 1024;

/// Limits for the page cache, built from the `[cache]` settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCacheConfig {
    /// Maximum total size of cached bytes.
    pub max_bytes: usize,

    /// Maximum number of cached pages.
    pub max_pages: usize,

    pub enabled: bool,
}

impl Default for PageCacheConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_CACHE_MB * BYTES_PER_MB, DEFAULT_PAGE_CACHE_PAGES)
    }
}

impl PageCacheConfig {
    /// Enabled cache with both limits clamped to their supported ranges.
    #[must_use]
    pub fn new(max_bytes: usize, max_pages: usize) -> Self {
        Self {
            max_bytes: max_bytes.clamp(
                MIN_PAGE_CACHE_MB * BYTES_PER_MB,
                MAX_PAGE_CACHE_MB * BYTES_PER_MB,
            ),
            max_pages: max_pages.clamp(MIN_PAGE_CACHE_PAGES, MAX_PAGE_CACHE_PAGES),
            enabled: true,
        }
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }
}

impl From<&CacheConfig> for PageCacheConfig {
    fn from(config: &CacheConfig) -> Self {
        if !config.page_cache_enabled {
            return Self::disabled();
        }
        Self::new(
            config.page_cache_mb.saturating_mul(BYTES_PER_MB),
            config.page_cache_max_pages,
        )
    }
}

/// Statistics about page cache performance.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageCacheStats {
    pub page_count: usize,
    pub total_bytes: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub insertions: u64,
}

impl PageCacheStats {
    /// Returns the cache hit rate as a percentage (0.0 - 100.0).
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

pub struct PageImageCache {
    cache: LruCache<String, PageImage>,
    config: PageCacheConfig,
    current_bytes: usize,
    stats: PageCacheStats,
}

impl PageImageCache {
    #[must_use]
    pub fn new(config: PageCacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_pages).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(capacity),
            config,
            current_bytes: 0,
            stats: PageCacheStats::default(),
        }
    }

    /// Inserts a page.
    ///
    /// Returns `false` if caching is disabled or the page is larger than half
    /// the byte budget.
    pub fn insert(&mut self, url: String, page: PageImage) -> bool {
        if !self.config.enabled {
            return false;
        }

        let size = page.size_bytes();
        if size > self.config.max_bytes / 2 {
            return false;
        }

        if let Some(existing) = self.cache.pop(&url) {
            self.current_bytes = self.current_bytes.saturating_sub(existing.size_bytes());
        }

        while self.current_bytes + size > self.config.max_bytes && !self.cache.is_empty() {
            if let Some((_, evicted)) = self.cache.pop_lru() {
                self.current_bytes = self.current_bytes.saturating_sub(evicted.size_bytes());
                self.stats.evictions += 1;
            }
        }

        // `push` evicts on the entry limit.
        if let Some((_, evicted)) = self.cache.push(url, page) {
            self.current_bytes = self.current_bytes.saturating_sub(evicted.size_bytes());
            self.stats.evictions += 1;
        }
        self.current_bytes += size;
        self.stats.insertions += 1;
        self.stats.page_count = self.cache.len();
        self.stats.total_bytes = self.current_bytes;
        true
    }

    /// Looks up a page, refreshing its LRU position.
    pub fn get(&mut self, url: &str) -> Option<PageImage> {
        if !self.config.enabled {
            return None;
        }
        if let Some(page) = self.cache.get(url) {
            self.stats.hits += 1;
            Some(page.clone())
        } else {
            self.stats.misses += 1;
            None
        }
    }

    #[must_use]
    pub fn contains(&self, url: &str) -> bool {
        self.config.enabled && self.cache.contains(url)
    }

    pub fn clear(&mut self) {
        self.cache.clear();
        self.current_bytes = 0;
        self.stats.page_count = 0;
        self.stats.total_bytes = 0;
    }

    #[must_use]
    pub fn stats(&self) -> PageCacheStats {
        self.stats
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.current_bytes
    }

    /// Returns the cached page or downloads it, caching the result on success.
    ///
    /// # Errors
    ///
    /// Propagates download and probe failures from [`fetch_page_image`].
    pub async fn get_or_fetch(&mut self, client: &reqwest::Client, url: &str) -> Result<PageImage> {
        if let Some(page) = self.get(url) {
            return Ok(page);
        }
        let page = fetch_page_image(client, url).await?;
        self.insert(url.to_string(), page.clone());
        Ok(page)
    }
}

impl std::fmt::Debug for PageImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageImageCache")
            .field("enabled", &self.config.enabled)
            .field("page_count", &self.cache.len())
            .field("memory_usage", &self.current_bytes)
            .field("max_bytes", &self.config.max_bytes)
            .field("max_pages", &self.config.max_pages)
            .field("stats", &self.stats)
            .finish()
    }
}
