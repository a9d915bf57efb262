// SPDX-License-Identifier: MPL-2.0
//! Persistence boundary for reading preferences and history.
//!
//! The [`StoreBackend`] trait loads and saves a whole [`StoreSnapshot`].
//! The store that owns the snapshot decides when to call it (load once on
//! construction, save after every mutation).

use crate::domain::reader::{ReadingHistoryEntry, ReadingPreferences};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything persisted across sessions.
///
/// Serializes to `{ readingHistory: { [mangaId]: entry }, preferences: {...} }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    /// Latest read position, keyed by manga id.
    #[serde(default)]
    pub reading_history: BTreeMap<String, ReadingHistoryEntry>,

    #[serde(default)]
    pub preferences: ReadingPreferences,
}

/// Loads and saves [`StoreSnapshot`]s.
pub trait StoreBackend {
    /// Loads the persisted snapshot.
    ///
    /// Returns `Ok(None)` when nothing has been persisted yet.
    ///
    /// # Errors
    ///
    /// Returns an error if persisted data exists but cannot be read or decoded.
    fn load(&self) -> Result<Option<StoreSnapshot>>;

    /// Persists the snapshot, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written.
    fn save(&self, snapshot: &StoreSnapshot) -> Result<()>;
}
