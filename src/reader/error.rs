// SPDX-License-Identifier: MPL-2.0
//! Errors surfaced to the reader while a chapter is open.
//!
//! None of these are fatal: the session keeps running and the user can
//! navigate away, dismiss the message, or switch image quality.

use std::fmt;

/// Message shown in place of pages when a chapter has none.
pub const EMPTY_CHAPTER_MESSAGE: &str = "No pages available for this chapter.";

/// A session-local error shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderError {
    /// Chapter metadata or image manifest could not be fetched.
    FetchFailure(String),
    /// One page image failed to load.
    ImageLoadFailure { page: u32 },
}

impl ReaderError {
    /// Whether the error is shown as a dismissible banner over the pages.
    #[must_use]
    pub fn is_dismissible(&self) -> bool {
        matches!(self, Self::ImageLoadFailure { .. })
    }
}

impl fmt::Display for ReaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReaderError::FetchFailure(reason) => {
                write!(f, "Failed to load chapter: {}", reason)
            }
            ReaderError::ImageLoadFailure { page } => write!(
                f,
                "Failed to load page {}. Please try again or switch to data saver mode.",
                page
            ),
        }
    }
}

impl std::error::Error for ReaderError {}
