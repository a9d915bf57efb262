// SPDX-License-Identifier: MPL-2.0
//! MangaDex JSON payloads and their conversion into catalog domain types.
//!
//! Only the fields the reader uses are declared; everything else in the
//! response is ignored.

use crate::domain::catalog::{
    CatalogPage, ChapterImageManifest, ChapterSummary, MangaStatus, MangaSummary,
    NO_DESCRIPTION, UNKNOWN_TITLE,
};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// Language preferred when picking from a localized string map.
const PREFERRED_LANGUAGE: &str = "en";

/// `{ "data": [...], "total": n, "offset": n, "limit": n }`
#[derive(Debug, Deserialize)]
pub struct ListEnvelope<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub limit: u32,
}

/// `{ "data": {...} }`
#[derive(Debug, Deserialize)]
pub struct EntityEnvelope<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub struct Relationship {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub attributes: Option<RelationshipAttributes>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipAttributes {
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

// =============================================================================
// Manga
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct MangaData {
    pub id: String,
    pub attributes: MangaAttributes,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MangaAttributes {
    #[serde(default, deserialize_with = "localized")]
    pub title: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "localized")]
    pub description: BTreeMap<String, String>,
    #[serde(default)]
    pub year: Option<u32>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub content_rating: Option<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub last_volume: Option<String>,
    #[serde(default)]
    pub last_chapter: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Tag {
    pub attributes: TagAttributes,
}

#[derive(Debug, Deserialize)]
pub struct TagAttributes {
    #[serde(default, deserialize_with = "localized")]
    pub name: BTreeMap<String, String>,
}

/// Localized strings arrive as `{"en": "..."}`, but an empty one is sent as `[]`.
fn localized<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Localized {
        Map(BTreeMap<String, String>),
        Empty(Vec<serde_json::Value>),
    }

    Ok(match Option::<Localized>::deserialize(deserializer)? {
        Some(Localized::Map(map)) => map,
        Some(Localized::Empty(_)) | None => BTreeMap::new(),
    })
}

/// Picks the preferred language, else any non-empty value.
fn pick_localized(map: &BTreeMap<String, String>) -> Option<&str> {
    map.get(PREFERRED_LANGUAGE)
        .filter(|s| !s.is_empty())
        .or_else(|| map.values().find(|s| !s.is_empty()))
        .map(String::as_str)
}

impl From<MangaData> for MangaSummary {
    fn from(data: MangaData) -> Self {
        let attributes = data.attributes;
        let mut cover_filename = None;
        let mut authors = Vec::new();
        let mut artists = Vec::new();

        for relationship in data.relationships {
            let attrs = relationship.attributes.unwrap_or_default();
            match relationship.kind.as_str() {
                "cover_art" => cover_filename = cover_filename.or(attrs.file_name),
                "author" => authors.extend(attrs.name),
                "artist" => artists.extend(attrs.name),
                _ => {}
            }
        }

        Self {
            id: data.id,
            title: pick_localized(&attributes.title)
                .unwrap_or(UNKNOWN_TITLE)
                .to_string(),
            description: pick_localized(&attributes.description)
                .unwrap_or(NO_DESCRIPTION)
                .to_string(),
            year: attributes.year,
            status: attributes
                .status
                .as_deref()
                .map(MangaStatus::parse)
                .unwrap_or_default(),
            content_rating: attributes.content_rating.unwrap_or_default(),
            tags: attributes
                .tags
                .iter()
                .filter_map(|tag| pick_localized(&tag.attributes.name))
                .map(str::to_string)
                .collect(),
            original_language: attributes.original_language.unwrap_or_default(),
            last_volume: attributes.last_volume.filter(|s| !s.is_empty()),
            last_chapter: attributes.last_chapter.filter(|s| !s.is_empty()),
            cover_filename,
            authors,
            artists,
        }
    }
}

impl From<ListEnvelope<MangaData>> for CatalogPage<MangaSummary> {
    fn from(envelope: ListEnvelope<MangaData>) -> Self {
        Self {
            items: envelope.data.into_iter().map(MangaSummary::from).collect(),
            total: envelope.total,
            offset: envelope.offset,
            limit: envelope.limit,
        }
    }
}

// =============================================================================
// Chapter
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ChapterData {
    pub id: String,
    pub attributes: ChapterAttributes,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterAttributes {
    #[serde(default)]
    pub volume: Option<String>,
    #[serde(default)]
    pub chapter: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub translated_language: Option<String>,
    #[serde(default)]
    pub pages: u32,
    #[serde(default)]
    pub version: u32,
}

impl From<ChapterData> for ChapterSummary {
    fn from(data: ChapterData) -> Self {
        let manga_id = data
            .relationships
            .into_iter()
            .find(|r| r.kind == "manga")
            .map(|r| r.id);
        let attributes = data.attributes;

        Self {
            id: data.id,
            manga_id,
            volume: attributes.volume,
            chapter: attributes.chapter,
            title: attributes.title.filter(|t| !t.is_empty()),
            translated_language: attributes.translated_language.unwrap_or_default(),
            pages: attributes.pages,
            version: attributes.version,
        }
    }
}

// =============================================================================
// At-home server
// =============================================================================

/// Response of `GET /at-home/server/{chapterId}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtHomeResponse {
    pub base_url: String,
    pub chapter: AtHomeChapter,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtHomeChapter {
    pub hash: String,
    #[serde(default)]
    pub data: Vec<String>,
    #[serde(default)]
    pub data_saver: Vec<String>,
}

impl From<AtHomeResponse> for ChapterImageManifest {
    fn from(response: AtHomeResponse) -> Self {
        Self {
            base_url: response.base_url,
            hash: response.chapter.hash,
            normal_page_filenames: response.chapter.data,
            data_saver_page_filenames: response.chapter.data_saver,
        }
    }
}
