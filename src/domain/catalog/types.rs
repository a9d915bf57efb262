// SPDX-License-Identifier: MPL-2.0
//! Catalog value objects: titles, chapters and chapter image manifests.

use std::fmt;

/// Fallback title when a manga carries no title in any language.
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Fallback description when a manga carries none.
pub const NO_DESCRIPTION: &str = "No description available";

// =============================================================================
// Listing
// =============================================================================

/// Predefined catalog listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MangaListCategory {
    Popular,
    Latest,
    Trending,
    Hot,
    #[default]
    All,
}

impl MangaListCategory {
    /// All categories, in display order.
    pub const ALL: [Self; 5] = [
        Self::Popular,
        Self::Latest,
        Self::Trending,
        Self::Hot,
        Self::All,
    ];

    /// Parses a category name, case-insensitively.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "popular" => Some(Self::Popular),
            "latest" => Some(Self::Latest),
            "trending" => Some(Self::Trending),
            "hot" => Some(Self::Hot),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Popular => "popular",
            Self::Latest => "latest",
            Self::Trending => "trending",
            Self::Hot => "hot",
            Self::All => "all",
        }
    }
}

impl fmt::Display for MangaListCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One page of a paginated catalog listing.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogPage<T> {
    pub items: Vec<T>,
    /// Total number of matches on the server.
    pub total: u32,
    pub offset: u32,
    pub limit: u32,
}

impl<T> CatalogPage<T> {
    /// Offset of the following page, if any matches remain.
    #[must_use]
    pub fn next_offset(&self) -> Option<u32> {
        let next = self.offset.saturating_add(self.limit);
        (self.limit > 0 && next < self.total).then_some(next)
    }
}

// =============================================================================
// Manga
// =============================================================================

/// Publication status of a title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MangaStatus {
    Ongoing,
    Completed,
    Hiatus,
    Cancelled,
    #[default]
    Unknown,
}

impl MangaStatus {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "ongoing" => Self::Ongoing,
            "completed" => Self::Completed,
            "hiatus" => Self::Hiatus,
            "cancelled" => Self::Cancelled,
            _ => Self::Unknown,
        }
    }
}

/// Summary of a title as shown in listings and on the detail page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MangaSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub year: Option<u32>,
    pub status: MangaStatus,
    pub content_rating: String,
    pub tags: Vec<String>,
    pub original_language: String,
    pub last_volume: Option<String>,
    pub last_chapter: Option<String>,
    /// File name of the cover art, when the listing included it.
    pub cover_filename: Option<String>,
    pub authors: Vec<String>,
    pub artists: Vec<String>,
}

// =============================================================================
// Chapter
// =============================================================================

/// Metadata for one chapter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChapterSummary {
    pub id: String,
    /// Owning title, from the chapter's `manga` relationship.
    pub manga_id: Option<String>,
    pub volume: Option<String>,
    /// Chapter number as published (may be fractional, e.g. "10.5").
    pub chapter: Option<String>,
    pub title: Option<String>,
    pub translated_language: String,
    pub pages: u32,
    pub version: u32,
}

impl ChapterSummary {
    /// Display label, e.g. `Chapter 12 - The Return`.
    #[must_use]
    pub fn label(&self) -> String {
        let number = self.chapter.as_deref().unwrap_or("?");
        match self.title.as_deref().filter(|t| !t.is_empty()) {
            Some(title) => format!("Chapter {number} - {title}"),
            None => format!("Chapter {number}"),
        }
    }
}

/// Chapters adjacent to a given chapter in an ordered chapter list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChapterNeighbors {
    pub prev_chapter_id: Option<String>,
    pub next_chapter_id: Option<String>,
}

impl ChapterNeighbors {
    /// Locates `chapter_id` in `chapters` (ascending order) and returns its neighbours.
    ///
    /// A chapter that is not in the list has no neighbours.
    #[must_use]
    pub fn locate(chapters: &[ChapterSummary], chapter_id: &str) -> Self {
        let Some(index) = chapters.iter().position(|c| c.id == chapter_id) else {
            return Self::default();
        };

        Self {
            prev_chapter_id: index
                .checked_sub(1)
                .and_then(|i| chapters.get(i))
                .map(|c| c.id.clone()),
            next_chapter_id: chapters.get(index + 1).map(|c| c.id.clone()),
        }
    }
}

// =============================================================================
// Image manifest
// =============================================================================

/// Path segment for full-quality pages.
pub const QUALITY_DATA: &str = "data";

/// Path segment for data-saver pages.
pub const QUALITY_DATA_SAVER: &str = "data-saver";

/// Builds a page image URL: `{base_url}/{quality}/{hash}/{filename}`.
#[must_use]
pub fn page_image_url(base_url: &str, hash: &str, filename: &str, data_saver: bool) -> String {
    let quality = if data_saver {
        QUALITY_DATA_SAVER
    } else {
        QUALITY_DATA
    };
    format!(
        "{}/{quality}/{hash}/{filename}",
        base_url.trim_end_matches('/')
    )
}

/// Where a chapter's page images live. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChapterImageManifest {
    pub base_url: String,
    pub hash: String,
    pub normal_page_filenames: Vec<String>,
    pub data_saver_page_filenames: Vec<String>,
}

impl ChapterImageManifest {
    /// Filenames for the selected quality, in page order.
    #[must_use]
    pub fn page_filenames(&self, data_saver: bool) -> &[String] {
        if data_saver {
            &self.data_saver_page_filenames
        } else {
            &self.normal_page_filenames
        }
    }

    /// Number of pages for the selected quality.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn page_count(&self, data_saver: bool) -> u32 {
        // A chapter never has anywhere near u32::MAX pages.
        self.page_filenames(data_saver).len() as u32
    }

    /// URL of a one-based page, or `None` when out of range.
    #[must_use]
    pub fn page_url(&self, page: u32, data_saver: bool) -> Option<String> {
        let index = usize::try_from(page.checked_sub(1)?).ok()?;
        let filename = self.page_filenames(data_saver).get(index)?;
        Some(page_image_url(
            &self.base_url,
            &self.hash,
            filename,
            data_saver,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapter(id: &str, number: &str) -> ChapterSummary {
        ChapterSummary {
            id: id.to_string(),
            chapter: Some(number.to_string()),
            ..ChapterSummary::default()
        }
    }

    fn manifest() -> ChapterImageManifest {
        ChapterImageManifest {
            base_url: "https://cdn.example.org".to_string(),
            hash: "abc123".to_string(),
            normal_page_filenames: vec!["1-full.png".into(), "2-full.png".into()],
            data_saver_page_filenames: vec!["1-small.jpg".into(), "2-small.jpg".into()],
        }
    }

    #[test]
    fn page_url_uses_quality_segment() {
        let manifest = manifest();
        assert_eq!(
            manifest.page_url(1, false).as_deref(),
            Some("https://cdn.example.org/data/abc123/1-full.png")
        );
        assert_eq!(
            manifest.page_url(2, true).as_deref(),
            Some("https://cdn.example.org/data-saver/abc123/2-small.jpg")
        );
    }

    #[test]
    fn page_url_out_of_range_is_none() {
        let manifest = manifest();
        assert!(manifest.page_url(0, false).is_none());
        assert!(manifest.page_url(3, false).is_none());
    }

    #[test]
    fn page_image_url_trims_trailing_slash() {
        assert_eq!(
            page_image_url("https://cdn.example.org/", "h", "f.png", false),
            "https://cdn.example.org/data/h/f.png"
        );
    }

    #[test]
    fn neighbors_in_middle_of_list() {
        let chapters = vec![chapter("c1", "1"), chapter("c2", "2"), chapter("c3", "3")];
        let neighbors = ChapterNeighbors::locate(&chapters, "c2");
        assert_eq!(neighbors.prev_chapter_id.as_deref(), Some("c1"));
        assert_eq!(neighbors.next_chapter_id.as_deref(), Some("c3"));
    }

    #[test]
    fn neighbors_at_edges_and_unknown() {
        let chapters = vec![chapter("c1", "1"), chapter("c2", "2")];
        let first = ChapterNeighbors::locate(&chapters, "c1");
        assert!(first.prev_chapter_id.is_none());
        assert_eq!(first.next_chapter_id.as_deref(), Some("c2"));

        let last = ChapterNeighbors::locate(&chapters, "c2");
        assert!(last.next_chapter_id.is_none());

        assert_eq!(
            ChapterNeighbors::locate(&chapters, "missing"),
            ChapterNeighbors::default()
        );
    }

    #[test]
    fn chapter_label_with_and_without_title() {
        let mut c = chapter("c1", "12");
        assert_eq!(c.label(), "Chapter 12");
        c.title = Some("The Return".to_string());
        assert_eq!(c.label(), "Chapter 12 - The Return");
    }

    #[test]
    fn category_parse_round_trip() {
        for category in MangaListCategory::ALL {
            assert_eq!(MangaListCategory::parse(category.as_str()), Some(category));
        }
        assert_eq!(MangaListCategory::parse("HOT"), Some(MangaListCategory::Hot));
        assert!(MangaListCategory::parse("weekly").is_none());
    }

    #[test]
    fn catalog_page_next_offset() {
        let page = CatalogPage::<u8> {
            items: Vec::new(),
            total: 45,
            offset: 20,
            limit: 20,
        };
        assert_eq!(page.next_offset(), Some(40));

        let last = CatalogPage::<u8> {
            offset: 40,
            ..page
        };
        assert_eq!(last.next_offset(), None);
    }
}
