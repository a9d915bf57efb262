// SPDX-License-Identifier: MPL-2.0
//! Reading preferences and reading history records.
//!
//! Field and variant names serialize to the persisted store layout
//! (`readingDirection`, `ltr`/`rtl`, `single`/`continuous`, ...).

use serde::{Deserialize, Serialize};

/// Which arrow key advances through pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingDirection {
    /// Left to right: `ArrowRight` advances.
    Ltr,
    /// Right to left (manga convention): `ArrowLeft` advances.
    #[default]
    Rtl,
}

impl ReadingDirection {
    /// Returns the opposite direction.
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Self::Ltr => Self::Rtl,
            Self::Rtl => Self::Ltr,
        }
    }
}

/// How pages of a chapter are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingMode {
    /// One page at a time, paginated with keys or buttons.
    #[default]
    Single,
    /// All pages stacked vertically and scrolled.
    Continuous,
}

/// User reading preferences, shared by every reader session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingPreferences {
    #[serde(default)]
    pub reading_direction: ReadingDirection,
    #[serde(default)]
    pub reading_mode: ReadingMode,
    /// Request the lower-resolution image variant.
    #[serde(default)]
    pub data_saver: bool,
    #[serde(default)]
    pub dark_mode: bool,
    /// Stack continuous-mode pages without spacing.
    #[serde(default = "default_no_gaps")]
    pub no_gaps: bool,
}

fn default_no_gaps() -> bool {
    true
}

impl Default for ReadingPreferences {
    fn default() -> Self {
        Self {
            reading_direction: ReadingDirection::Rtl,
            reading_mode: ReadingMode::Single,
            data_saver: false,
            dark_mode: false,
            no_gaps: default_no_gaps(),
        }
    }
}

impl ReadingPreferences {
    /// Returns a copy with every field set in `patch` overwritten.
    #[must_use]
    pub fn merged(self, patch: &PreferencesPatch) -> Self {
        Self {
            reading_direction: patch.reading_direction.unwrap_or(self.reading_direction),
            reading_mode: patch.reading_mode.unwrap_or(self.reading_mode),
            data_saver: patch.data_saver.unwrap_or(self.data_saver),
            dark_mode: patch.dark_mode.unwrap_or(self.dark_mode),
            no_gaps: patch.no_gaps.unwrap_or(self.no_gaps),
        }
    }
}

/// Partial update of [`ReadingPreferences`]; `None` fields are left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PreferencesPatch {
    pub reading_direction: Option<ReadingDirection>,
    pub reading_mode: Option<ReadingMode>,
    pub data_saver: Option<bool>,
    pub dark_mode: Option<bool>,
    pub no_gaps: Option<bool>,
}

impl PreferencesPatch {
    #[must_use]
    pub fn reading_direction(direction: ReadingDirection) -> Self {
        Self {
            reading_direction: Some(direction),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn reading_mode(mode: ReadingMode) -> Self {
        Self {
            reading_mode: Some(mode),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn data_saver(enabled: bool) -> Self {
        Self {
            data_saver: Some(enabled),
            ..Self::default()
        }
    }

    /// Returns true if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Last read position for one title. Only the latest entry per manga is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingHistoryEntry {
    pub manga_id: String,
    pub chapter_id: String,
    /// One-based page number.
    pub page: u32,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}
