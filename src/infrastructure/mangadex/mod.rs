// SPDX-License-Identifier: MPL-2.0
//! MangaDex catalog adapter.
//!
//! Implements [`CatalogService`] over the public MangaDex REST API with
//! `reqwest`. Transient failures (network errors, 429, 5xx) are retried with a
//! linear backoff up to `[catalog] max_retries` times.

pub mod wire;

use crate::app::config::{CatalogConfig, MAX_PAGE_SIZE, MIN_PAGE_SIZE};
use crate::application::port::{CatalogError, CatalogResult, CatalogService};
use crate::domain::catalog::{
    CatalogPage, ChapterImageManifest, ChapterSummary, MangaListCategory, MangaSummary,
};
use serde::de::DeserializeOwned;
use std::time::Duration;
use wire::{AtHomeResponse, ChapterData, EntityEnvelope, ListEnvelope, MangaData};

/// Delay before the first retry; later retries wait proportionally longer.
const RETRY_BACKOFF: Duration = Duration::from_millis(250);

/// Relationships expanded inline on manga requests.
const MANGA_INCLUDES: [&str; 3] = ["cover_art", "author", "artist"];

type QueryParams = Vec<(String, String)>;

/// HTTP client for the MangaDex API.
#[derive(Debug, Clone)]
pub struct MangaDexClient {
    http: reqwest::Client,
    config: CatalogConfig,
}

impl MangaDexClient {
    /// Builds a client with the configured user agent and timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new(config: CatalogConfig) -> CatalogResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| CatalogError::Network(e.to_string()))?;
        Ok(Self { http, config })
    }

    #[must_use]
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    fn api_url(&self, segments: &[&str]) -> CatalogResult<String> {
        endpoint_url(&self.config.api_base_url, segments)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &QueryParams) -> CatalogResult<T> {
        let max_retries = self.config.max_retries();
        let mut attempt = 0;
        loop {
            match self.get_json_once(url, query).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < max_retries => {
                    attempt += 1;
                    let delay = retry_delay(attempt);
                    log::warn!("GET {url} failed ({err}); retry {attempt}/{max_retries} in {delay:?}");
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    log::debug!("GET {url} failed: {err}");
                    return Err(err);
                }
            }
        }
    }

    async fn get_json_once<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &QueryParams,
    ) -> CatalogResult<T> {
        log::debug!("GET {url}");
        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound);
        }
        if !status.is_success() {
            return Err(CatalogError::Status {
                code: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;
        serde_json::from_slice(&body).map_err(|e| CatalogError::Decode(e.to_string()))
    }
}

/// Appends `segments` to `base`, percent-encoding each one so ids cannot
/// escape their path segment.
fn endpoint_url(base: &str, segments: &[&str]) -> CatalogResult<String> {
    let mut url =
        reqwest::Url::parse(base).map_err(|e| CatalogError::InvalidUrl(format!("{base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|()| CatalogError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url.into())
}

/// Backoff before retry number `attempt` (1-based).
#[must_use]
pub fn retry_delay(attempt: u32) -> Duration {
    RETRY_BACKOFF * attempt.max(1)
}

// =============================================================================
// Query shapes
// =============================================================================

fn push(params: &mut QueryParams, key: &str, value: impl ToString) {
    params.push((key.to_string(), value.to_string()));
}

fn listing_params(config: &CatalogConfig, offset: u32, limit: u32) -> QueryParams {
    let mut params = QueryParams::new();
    push(&mut params, "limit", limit.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE));
    push(&mut params, "offset", offset);
    for include in MANGA_INCLUDES {
        push(&mut params, "includes[]", include);
    }
    for rating in &config.content_ratings {
        push(&mut params, "contentRating[]", rating);
    }
    params
}

/// Parameters for `GET /manga` with a free-text title search.
#[must_use]
pub fn search_params(config: &CatalogConfig, query: &str, offset: u32, limit: u32) -> QueryParams {
    let mut params = vec![("title".to_string(), query.to_string())];
    params.extend(listing_params(config, offset, limit));
    push(&mut params, "order[relevance]", "desc");
    params
}

/// Parameters for `GET /manga` for a listing category.
#[must_use]
pub fn list_params(
    config: &CatalogConfig,
    category: MangaListCategory,
    offset: u32,
    limit: u32,
) -> QueryParams {
    let mut params = listing_params(config, offset, limit);
    match category {
        MangaListCategory::Popular => push(&mut params, "order[followedCount]", "desc"),
        MangaListCategory::Latest => {
            push(&mut params, "order[latestUploadedChapter]", "desc");
            push(&mut params, "hasAvailableChapters", "true");
        }
        MangaListCategory::Trending => push(&mut params, "order[rating]", "desc"),
        MangaListCategory::Hot => {
            push(&mut params, "order[followedCount]", "desc");
            push(&mut params, "order[rating]", "desc");
        }
        MangaListCategory::All => push(&mut params, "order[relevance]", "desc"),
    }
    params
}

/// Parameters for `GET /chapter` listing a title's chapters.
#[must_use]
pub fn chapters_params(config: &CatalogConfig, manga_id: &str) -> QueryParams {
    let mut params = QueryParams::new();
    push(&mut params, "manga", manga_id);
    push(&mut params, "limit", config.chapter_page_size());
    push(&mut params, "offset", 0);
    for language in &config.translated_languages {
        push(&mut params, "translatedLanguage[]", language);
    }
    push(&mut params, "order[chapter]", "asc");
    params
}

// =============================================================================
// CatalogService
// =============================================================================

impl CatalogService for MangaDexClient {
    async fn search_manga(
        &self,
        query: &str,
        offset: u32,
        limit: u32,
    ) -> CatalogResult<CatalogPage<MangaSummary>> {
        let params = search_params(&self.config, query, offset, limit);
        let url = self.api_url(&["manga"])?;
        let envelope: ListEnvelope<MangaData> = self.get_json(&url, &params).await?;
        Ok(envelope.into())
    }

    async fn list_manga(
        &self,
        category: MangaListCategory,
        offset: u32,
        limit: u32,
    ) -> CatalogResult<CatalogPage<MangaSummary>> {
        let params = list_params(&self.config, category, offset, limit);
        let url = self.api_url(&["manga"])?;
        let envelope: ListEnvelope<MangaData> = self.get_json(&url, &params).await?;
        Ok(envelope.into())
    }

    async fn get_manga(&self, id: &str) -> CatalogResult<MangaSummary> {
        let mut params = QueryParams::new();
        for include in MANGA_INCLUDES {
            push(&mut params, "includes[]", include);
        }
        let url = self.api_url(&["manga", id])?;
        let envelope: EntityEnvelope<MangaData> = self.get_json(&url, &params).await?;
        Ok(envelope.data.into())
    }

    async fn get_chapters(&self, manga_id: &str) -> CatalogResult<Vec<ChapterSummary>> {
        let params = chapters_params(&self.config, manga_id);
        let url = self.api_url(&["chapter"])?;
        let envelope: ListEnvelope<ChapterData> = self.get_json(&url, &params).await?;
        Ok(envelope.data.into_iter().map(ChapterSummary::from).collect())
    }

    async fn get_chapter_metadata(&self, chapter_id: &str) -> CatalogResult<ChapterSummary> {
        let url = self.api_url(&["chapter", chapter_id])?;
        let envelope: EntityEnvelope<ChapterData> = self.get_json(&url, &QueryParams::new()).await?;
        Ok(envelope.data.into())
    }

    async fn get_chapter_image_manifest(
        &self,
        chapter_id: &str,
    ) -> CatalogResult<ChapterImageManifest> {
        let url = endpoint_url(&self.config.at_home_url, &[chapter_id])?;
        let response: AtHomeResponse = self.get_json(&url, &QueryParams::new()).await?;
        Ok(response.into())
    }

    fn cover_image_url(&self, manga_id: &str, filename: &str) -> String {
        format!(
            "{}/covers/{manga_id}/{filename}",
            self.config.uploads_url.trim_end_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has(params: &QueryParams, key: &str, value: &str) -> bool {
        params.iter().any(|(k, v)| k == key && v == value)
    }

    #[test]
    fn search_params_include_relationships_and_ratings() {
        let params = search_params(&CatalogConfig::default(), "berserk", 40, 20);
        assert!(has(&params, "title", "berserk"));
        assert!(has(&params, "offset", "40"));
        assert!(has(&params, "limit", "20"));
        assert!(has(&params, "includes[]", "cover_art"));
        assert!(has(&params, "includes[]", "author"));
        assert!(has(&params, "includes[]", "artist"));
        assert!(has(&params, "contentRating[]", "safe"));
        assert!(has(&params, "contentRating[]", "suggestive"));
        assert!(has(&params, "order[relevance]", "desc"));
    }

    #[test]
    fn listing_limit_is_clamped_to_server_maximum() {
        let params = search_params(&CatalogConfig::default(), "x", 0, 500);
        assert!(has(&params, "limit", "100"));
    }

    #[test]
    fn list_params_order_by_category() {
        let config = CatalogConfig::default();

        let popular = list_params(&config, MangaListCategory::Popular, 0, 20);
        assert!(has(&popular, "order[followedCount]", "desc"));

        let latest = list_params(&config, MangaListCategory::Latest, 0, 20);
        assert!(has(&latest, "order[latestUploadedChapter]", "desc"));
        assert!(has(&latest, "hasAvailableChapters", "true"));

        let trending = list_params(&config, MangaListCategory::Trending, 0, 20);
        assert!(has(&trending, "order[rating]", "desc"));

        let hot = list_params(&config, MangaListCategory::Hot, 0, 20);
        assert!(has(&hot, "order[followedCount]", "desc"));
        assert!(has(&hot, "order[rating]", "desc"));

        let all = list_params(&config, MangaListCategory::All, 0, 20);
        assert!(has(&all, "order[relevance]", "desc"));
    }

    #[test]
    fn chapters_params_filter_language_and_sort_ascending() {
        let params = chapters_params(&CatalogConfig::default(), "m1");
        assert!(has(&params, "manga", "m1"));
        assert!(has(&params, "limit", "100"));
        assert!(has(&params, "translatedLanguage[]", "en"));
        assert!(has(&params, "order[chapter]", "asc"));
    }

    #[test]
    fn cover_url_uses_uploads_host() {
        let client = MangaDexClient::new(CatalogConfig::default()).expect("client");
        assert_eq!(
            client.cover_image_url("m1", "cover.jpg"),
            "https://uploads.mangadex.org/covers/m1/cover.jpg"
        );
    }

    #[test]
    fn page_url_delegates_to_quality_layout() {
        let client = MangaDexClient::new(CatalogConfig::default()).expect("client");
        assert_eq!(
            client.page_image_url("https://node.example", "abc", "1.png", true),
            "https://node.example/data-saver/abc/1.png"
        );
    }

    #[test]
    fn endpoint_ids_stay_in_one_path_segment() {
        assert_eq!(
            endpoint_url("https://api.example/", &["manga", "m1"]).expect("url"),
            "https://api.example/manga/m1"
        );
        assert_eq!(
            endpoint_url("https://api.example/at-home/server", &["../x?y#z"]).expect("url"),
            "https://api.example/at-home/server/..%2Fx%3Fy%23z"
        );
        assert!(matches!(
            endpoint_url("not a url", &["manga"]),
            Err(CatalogError::InvalidUrl(_))
        ));
    }

    #[test]
    fn retry_delay_grows_linearly() {
        assert_eq!(retry_delay(1), Duration::from_millis(250));
        assert_eq!(retry_delay(2), Duration::from_millis(500));
        assert_eq!(retry_delay(0), Duration::from_millis(250));
    }
}
