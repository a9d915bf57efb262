// SPDX-License-Identifier: MPL-2.0
//! Response cache in front of a [`CatalogService`].
//!
//! # Design
//!
//! - **Keyed by query**: one entry per distinct request ([`QueryKey`])
//! - **LRU eviction**: bounded by `[cache] max_entries`
//! - **Staleness**: entries older than `[cache] stale_after_secs` are
//!   refetched; if the refetch fails, the stale value is served instead
//! - **Errors are not cached**

use crate::app::config::CacheConfig;
use crate::application::port::{CatalogResult, CatalogService};
use crate::domain::catalog::{
    CatalogPage, ChapterImageManifest, ChapterSummary, MangaListCategory, MangaSummary,
};
use lru::LruCache;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Identity of a catalog request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Search {
        query: String,
        offset: u32,
        limit: u32,
    },
    List {
        category: MangaListCategory,
        offset: u32,
        limit: u32,
    },
    Manga(String),
    Chapters(String),
    Chapter(String),
    ChapterImages(String),
}

#[derive(Debug, Clone)]
enum CachedValue {
    MangaPage(CatalogPage<MangaSummary>),
    Manga(MangaSummary),
    Chapters(Vec<ChapterSummary>),
    Chapter(ChapterSummary),
    Manifest(ChapterImageManifest),
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: CachedValue,
    fetched_at: Instant,
}

/// Statistics about query cache performance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryCacheStats {
    /// Fresh entries served without a request.
    pub hits: u64,
    /// Requests issued because nothing usable was cached.
    pub misses: u64,
    /// Requests issued because the cached entry was stale.
    pub refreshes: u64,
    /// Stale entries served because the refresh failed.
    pub stale_served: u64,
}

#[derive(Debug)]
struct Inner {
    entries: LruCache<QueryKey, CacheEntry>,
    stats: QueryCacheStats,
}

/// A [`CatalogService`] that caches the responses of another.
#[derive(Debug)]
pub struct CachedCatalog<C> {
    inner: C,
    state: Mutex<Inner>,
    stale_after: Duration,
}

impl<C: CatalogService + Sync> CachedCatalog<C> {
    #[must_use]
    pub fn new(inner: C, config: &CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries()).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            state: Mutex::new(Inner {
                entries: LruCache::new(capacity),
                stats: QueryCacheStats::default(),
            }),
            stale_after: config.stale_after(),
        }
    }

    /// The wrapped service.
    #[must_use]
    pub fn inner(&self) -> &C {
        &self.inner
    }

    #[must_use]
    pub fn stats(&self) -> QueryCacheStats {
        self.lock().stats
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops one entry so the next request refetches it.
    pub fn invalidate(&self, key: &QueryKey) {
        self.lock().entries.pop(key);
    }

    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A panic while holding the lock cannot leave the cache inconsistent.
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    async fn cached<T, Fut>(
        &self,
        key: QueryKey,
        fetch: Fut,
        wrap: fn(T) -> CachedValue,
        extract: fn(&CachedValue) -> Option<T>,
    ) -> CatalogResult<T>
    where
        T: Clone,
        Fut: Future<Output = CatalogResult<T>>,
    {
        let stale = {
            let mut state = self.lock();
            let cached = state.entries.get(&key).and_then(|entry| {
                let fresh = entry.fetched_at.elapsed() <= self.stale_after;
                Some((extract(&entry.value)?, fresh))
            });
            match cached {
                Some((value, true)) => {
                    state.stats.hits += 1;
                    return Ok(value);
                }
                Some((value, false)) => {
                    state.stats.refreshes += 1;
                    Some(value)
                }
                None => {
                    state.stats.misses += 1;
                    None
                }
            }
        };

        match fetch.await {
            Ok(value) => {
                self.lock().entries.put(
                    key,
                    CacheEntry {
                        value: wrap(value.clone()),
                        fetched_at: Instant::now(),
                    },
                );
                Ok(value)
            }
            Err(err) => match stale {
                Some(value) => {
                    log::warn!("Serving stale {key:?} after refresh failed: {err}");
                    self.lock().stats.stale_served += 1;
                    Ok(value)
                }
                None => Err(err),
            },
        }
    }
}

impl<C: CatalogService + Sync> CatalogService for CachedCatalog<C> {
    async fn search_manga(
        &self,
        query: &str,
        offset: u32,
        limit: u32,
    ) -> CatalogResult<CatalogPage<MangaSummary>> {
        let key = QueryKey::Search {
            query: query.to_string(),
            offset,
            limit,
        };
        self.cached(
            key,
            self.inner.search_manga(query, offset, limit),
            CachedValue::MangaPage,
            |v| match v {
                CachedValue::MangaPage(page) => Some(page.clone()),
                _ => None,
            },
        )
        .await
    }

    async fn list_manga(
        &self,
        category: MangaListCategory,
        offset: u32,
        limit: u32,
    ) -> CatalogResult<CatalogPage<MangaSummary>> {
        let key = QueryKey::List {
            category,
            offset,
            limit,
        };
        self.cached(
            key,
            self.inner.list_manga(category, offset, limit),
            CachedValue::MangaPage,
            |v| match v {
                CachedValue::MangaPage(page) => Some(page.clone()),
                _ => None,
            },
        )
        .await
    }

    async fn get_manga(&self, id: &str) -> CatalogResult<MangaSummary> {
        self.cached(
            QueryKey::Manga(id.to_string()),
            self.inner.get_manga(id),
            CachedValue::Manga,
            |v| match v {
                CachedValue::Manga(manga) => Some(manga.clone()),
                _ => None,
            },
        )
        .await
    }

    async fn get_chapters(&self, manga_id: &str) -> CatalogResult<Vec<ChapterSummary>> {
        self.cached(
            QueryKey::Chapters(manga_id.to_string()),
            self.inner.get_chapters(manga_id),
            CachedValue::Chapters,
            |v| match v {
                CachedValue::Chapters(chapters) => Some(chapters.clone()),
                _ => None,
            },
        )
        .await
    }

    async fn get_chapter_metadata(&self, chapter_id: &str) -> CatalogResult<ChapterSummary> {
        self.cached(
            QueryKey::Chapter(chapter_id.to_string()),
            self.inner.get_chapter_metadata(chapter_id),
            CachedValue::Chapter,
            |v| match v {
                CachedValue::Chapter(chapter) => Some(chapter.clone()),
                _ => None,
            },
        )
        .await
    }

    async fn get_chapter_image_manifest(
        &self,
        chapter_id: &str,
    ) -> CatalogResult<ChapterImageManifest> {
        self.cached(
            QueryKey::ChapterImages(chapter_id.to_string()),
            self.inner.get_chapter_image_manifest(chapter_id),
            CachedValue::Manifest,
            |v| match v {
                CachedValue::Manifest(manifest) => Some(manifest.clone()),
                _ => None,
            },
        )
        .await
    }

    fn cover_image_url(&self, manga_id: &str, filename: &str) -> String {
        self.inner.cover_image_url(manga_id, filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::port::CatalogError;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    #[derive(Default)]
    struct FakeCatalog {
        calls: AtomicU32,
        failing: AtomicBool,
    }

    impl FakeCatalog {
        fn respond<T>(&self, value: T) -> CatalogResult<T> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                Err(CatalogError::Status { code: 503 })
            } else {
                Ok(value)
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    fn manga(id: &str) -> MangaSummary {
        MangaSummary {
            id: id.to_string(),
            title: format!("Title {id}"),
            ..MangaSummary::default()
        }
    }

    impl CatalogService for FakeCatalog {
        async fn search_manga(
            &self,
            query: &str,
            offset: u32,
            limit: u32,
        ) -> CatalogResult<CatalogPage<MangaSummary>> {
            self.respond(CatalogPage {
                items: vec![manga(query)],
                total: 1,
                offset,
                limit,
            })
        }

        async fn list_manga(
            &self,
            category: MangaListCategory,
            offset: u32,
            limit: u32,
        ) -> CatalogResult<CatalogPage<MangaSummary>> {
            self.respond(CatalogPage {
                items: vec![manga(category.as_str())],
                total: 1,
                offset,
                limit,
            })
        }

        async fn get_manga(&self, id: &str) -> CatalogResult<MangaSummary> {
            self.respond(manga(id))
        }

        async fn get_chapters(&self, _manga_id: &str) -> CatalogResult<Vec<ChapterSummary>> {
            self.respond(Vec::new())
        }

        async fn get_chapter_metadata(&self, chapter_id: &str) -> CatalogResult<ChapterSummary> {
            self.respond(ChapterSummary {
                id: chapter_id.to_string(),
                ..ChapterSummary::default()
            })
        }

        async fn get_chapter_image_manifest(
            &self,
            _chapter_id: &str,
        ) -> CatalogResult<ChapterImageManifest> {
            self.respond(ChapterImageManifest::default())
        }

        fn cover_image_url(&self, manga_id: &str, filename: &str) -> String {
            format!("cover://{manga_id}/{filename}")
        }
    }

    fn config(stale_after_secs: u64) -> CacheConfig {
        CacheConfig {
            max_entries: 8,
            stale_after_secs,
            ..CacheConfig::default()
        }
    }

    #[tokio::test]
    async fn repeated_request_is_served_from_cache() {
        let catalog = CachedCatalog::new(FakeCatalog::default(), &config(300));

        let first = catalog.get_manga("m1").await.expect("fetch");
        let second = catalog.get_manga("m1").await.expect("cached");
        assert_eq!(first, second);
        assert_eq!(catalog.inner().calls(), 1);
        assert_eq!(catalog.stats().hits, 1);
        assert_eq!(catalog.stats().misses, 1);
    }

    #[tokio::test]
    async fn distinct_keys_are_cached_separately() {
        let catalog = CachedCatalog::new(FakeCatalog::default(), &config(300));
        catalog.search_manga("a", 0, 20).await.expect("fetch");
        catalog.search_manga("a", 20, 20).await.expect("fetch");
        catalog
            .list_manga(MangaListCategory::Popular, 0, 20)
            .await
            .expect("fetch");
        assert_eq!(catalog.inner().calls(), 3);
        assert_eq!(catalog.len(), 3);
    }

    #[tokio::test]
    async fn stale_entry_is_refetched() {
        let catalog = CachedCatalog::new(FakeCatalog::default(), &config(0));
        catalog.get_chapters("m1").await.expect("fetch");
        tokio::time::sleep(Duration::from_millis(5)).await;
        catalog.get_chapters("m1").await.expect("refetch");
        assert_eq!(catalog.inner().calls(), 2);
        assert_eq!(catalog.stats().refreshes, 1);
    }

    #[tokio::test]
    async fn stale_entry_is_served_when_refresh_fails() {
        let catalog = CachedCatalog::new(FakeCatalog::default(), &config(0));
        catalog.get_chapter_metadata("c1").await.expect("fetch");
        tokio::time::sleep(Duration::from_millis(5)).await;
        catalog.inner().failing.store(true, Ordering::SeqCst);

        let chapter = catalog.get_chapter_metadata("c1").await.expect("stale");
        assert_eq!(chapter.id, "c1");
        assert_eq!(catalog.stats().stale_served, 1);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let catalog = CachedCatalog::new(FakeCatalog::default(), &config(300));
        catalog.inner().failing.store(true, Ordering::SeqCst);
        let err = catalog
            .get_chapter_image_manifest("c1")
            .await
            .expect_err("failure");
        assert_eq!(err, CatalogError::Status { code: 503 });
        assert!(catalog.is_empty());

        catalog.inner().failing.store(false, Ordering::SeqCst);
        catalog.get_chapter_image_manifest("c1").await.expect("fetch");
        assert_eq!(catalog.inner().calls(), 2);
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let catalog = CachedCatalog::new(FakeCatalog::default(), &config(300));
        catalog.get_manga("m1").await.expect("fetch");
        catalog.invalidate(&QueryKey::Manga("m1".into()));
        catalog.get_manga("m1").await.expect("refetch");
        assert_eq!(catalog.inner().calls(), 2);
    }

    #[test]
    fn cover_url_is_delegated() {
        let catalog = CachedCatalog::new(FakeCatalog::default(), &config(300));
        assert_eq!(catalog.cover_image_url("m1", "a.jpg"), "cover://m1/a.jpg");
    }
}
