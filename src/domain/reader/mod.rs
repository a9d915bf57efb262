// SPDX-License-Identifier: MPL-2.0
//! Reader domain types.
//!
//! Value objects shared by the reader core and the preference store,
//! independent of any presentation layer.

pub mod newtypes;
pub mod preferences;

pub use newtypes::{PreloadCount, ZoomFactor};
pub use preferences::{
    PreferencesPatch, ReadingDirection, ReadingHistoryEntry, ReadingMode, ReadingPreferences,
};
