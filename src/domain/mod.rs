// SPDX-License-Identifier: MPL-2.0
//! Domain layer - Core types with no external runtime dependencies.
//!
//! # Modules
//!
//! - [`catalog`]: Catalog shapes ([`MangaSummary`](catalog::MangaSummary),
//!   [`ChapterSummary`](catalog::ChapterSummary), [`ChapterImageManifest`](catalog::ChapterImageManifest))
//! - [`reader`]: Reader value objects ([`ZoomFactor`](reader::ZoomFactor),
//!   [`PreloadCount`](reader::PreloadCount), [`ReadingPreferences`](reader::ReadingPreferences))

pub mod catalog;
pub mod reader;
