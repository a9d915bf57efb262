// SPDX-License-Identifier: MPL-2.0
//! Reading preference and history store.
//!
//! [`ReaderStore`] owns the in-memory [`StoreSnapshot`] and writes it through
//! a [`StoreBackend`] after every mutation. It is created once per process
//! and handed to reader sessions, which reference it but do not own it.
//!
//! # Backends
//!
//! - [`CborFileBackend`]: `store.cbor` in the app data directory
//! - [`MemoryBackend`]: shared in-memory slot, for tests and ephemeral runs
//!
//! # Path Resolution
//!
//! 1. `CborFileBackend::with_override()` with an explicit directory
//! 2. `MANGA_LENS_DATA_DIR` environment variable (or `--data-dir`)
//! 3. Platform-specific data directory

use super::paths;
use crate::application::port::{StoreBackend, StoreSnapshot};
use crate::domain::reader::{PreferencesPatch, ReadingHistoryEntry, ReadingPreferences};
use crate::error::{Error, Result};
use std::cell::RefCell;
use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Store file name within the app data directory.
pub const STORE_FILE: &str = "store.cbor";

/// Warning key returned when persisted state cannot be decoded.
pub const STORE_PARSE_ERROR_KEY: &str = "notification-store-parse-error";

// =============================================================================
// ReaderStore
// =============================================================================

/// Process-wide preferences and per-title reading history.
///
/// Writes are last-write-wins. A failed save is logged and returned to the
/// caller, but the in-memory value is kept so the running session behaves
/// as if the write succeeded.
pub struct ReaderStore {
    backend: Box<dyn StoreBackend>,
    snapshot: StoreSnapshot,
}

impl std::fmt::Debug for ReaderStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReaderStore")
            .field("snapshot", &self.snapshot)
            .finish_non_exhaustive()
    }
}

/// Store handle shared between the composition layer and reader sessions.
pub type SharedStore = Rc<RefCell<ReaderStore>>;

impl ReaderStore {
    /// Opens the store, loading the persisted snapshot once.
    ///
    /// Returns a tuple of (store, optional_warning). Unreadable data yields
    /// default preferences and empty history with a warning key.
    pub fn open(backend: impl StoreBackend + 'static) -> (Self, Option<String>) {
        let (snapshot, warning) = match backend.load() {
            Ok(Some(snapshot)) => (snapshot, None),
            Ok(None) => (StoreSnapshot::default(), None),
            Err(err) => {
                log::warn!("Discarding unreadable reader store: {err}");
                (
                    StoreSnapshot::default(),
                    Some(STORE_PARSE_ERROR_KEY.to_string()),
                )
            }
        };

        (
            Self {
                backend: Box::new(backend),
                snapshot,
            },
            warning,
        )
    }

    /// Wraps the store in a shared handle.
    #[must_use]
    pub fn into_shared(self) -> SharedStore {
        Rc::new(RefCell::new(self))
    }

    #[must_use]
    pub fn preferences(&self) -> ReadingPreferences {
        self.snapshot.preferences
    }

    /// Applies a partial preference update and persists it.
    ///
    /// # Errors
    ///
    /// Returns the backend error if the snapshot could not be saved. The new
    /// preferences are applied in memory either way.
    pub fn update_preferences(&mut self, patch: &PreferencesPatch) -> Result<ReadingPreferences> {
        self.snapshot.preferences = self.snapshot.preferences.merged(patch);
        self.persist()?;
        Ok(self.snapshot.preferences)
    }

    /// Latest read position for a title.
    #[must_use]
    pub fn history(&self, manga_id: &str) -> Option<&ReadingHistoryEntry> {
        self.snapshot.reading_history.get(manga_id)
    }

    /// Records the current position for a title, stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns the backend error if the snapshot could not be saved.
    pub fn record_history(&mut self, manga_id: &str, chapter_id: &str, page: u32) -> Result<()> {
        let now = chrono::Utc::now().timestamp_millis();
        self.record_history_at(manga_id, chapter_id, page, now)
    }

    /// Records the position for a title with an explicit timestamp (epoch millis).
    ///
    /// Any previous entry for the title is replaced.
    ///
    /// # Errors
    ///
    /// Returns the backend error if the snapshot could not be saved.
    pub fn record_history_at(
        &mut self,
        manga_id: &str,
        chapter_id: &str,
        page: u32,
        timestamp: i64,
    ) -> Result<()> {
        self.snapshot.reading_history.insert(
            manga_id.to_string(),
            ReadingHistoryEntry {
                manga_id: manga_id.to_string(),
                chapter_id: chapter_id.to_string(),
                page,
                timestamp,
            },
        );
        self.persist()
    }

    /// All history entries, most recently read first.
    #[must_use]
    pub fn recent_history(&self) -> Vec<&ReadingHistoryEntry> {
        let mut entries: Vec<_> = self.snapshot.reading_history.values().collect();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries
    }

    #[must_use]
    pub fn snapshot(&self) -> &StoreSnapshot {
        &self.snapshot
    }

    fn persist(&self) -> Result<()> {
        self.backend.save(&self.snapshot).inspect_err(|err| {
            log::warn!("Failed to persist reader store: {err}");
        })
    }
}

// =============================================================================
// CBOR File Backend
// =============================================================================

/// Persists the snapshot as CBOR in the app data directory.
#[derive(Debug, Clone)]
pub struct CborFileBackend {
    path: Option<PathBuf>,
}

impl CborFileBackend {
    /// Backend at the default data directory.
    #[must_use]
    pub fn new() -> Self {
        Self::with_override(None)
    }

    /// Backend in a custom directory, falling back to default resolution.
    #[must_use]
    pub fn with_override(base_dir: Option<PathBuf>) -> Self {
        let path = paths::get_app_data_dir_with_override(base_dir).map(|mut path| {
            path.push(STORE_FILE);
            path
        });
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl Default for CborFileBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreBackend for CborFileBackend {
    fn load(&self) -> Result<Option<StoreSnapshot>> {
        let Some(path) = &self.path else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }

        let reader = BufReader::new(fs::File::open(path)?);
        ciborium::from_reader(reader)
            .map(Some)
            .map_err(|err| Error::Store(err.to_string()))
    }

    fn save(&self, snapshot: &StoreSnapshot) -> Result<()> {
        let Some(path) = &self.path else {
            return Err(Error::Store("no data directory available".to_string()));
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let writer = BufWriter::new(fs::File::create(path)?);
        ciborium::into_writer(snapshot, writer).map_err(|err| Error::Store(err.to_string()))
    }
}

// =============================================================================
// Memory Backend
// =============================================================================

/// Keeps the snapshot in memory.
///
/// Clones share the same slot, so a test can keep one handle to inspect
/// what the store saved.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    slot: Rc<RefCell<Option<StoreSnapshot>>>,
    fail_saves: Rc<RefCell<bool>>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-populated with a snapshot.
    #[must_use]
    pub fn with_snapshot(snapshot: StoreSnapshot) -> Self {
        let backend = Self::default();
        *backend.slot.borrow_mut() = Some(snapshot);
        backend
    }

    /// Last saved snapshot.
    #[must_use]
    pub fn saved(&self) -> Option<StoreSnapshot> {
        self.slot.borrow().clone()
    }

    /// Makes subsequent saves fail, simulating a full or read-only disk.
    pub fn set_fail_saves(&self, fail: bool) {
        *self.fail_saves.borrow_mut() = fail;
    }
}

impl StoreBackend for MemoryBackend {
    fn load(&self) -> Result<Option<StoreSnapshot>> {
        Ok(self.slot.borrow().clone())
    }

    fn save(&self, snapshot: &StoreSnapshot) -> Result<()> {
        if *self.fail_saves.borrow() {
            return Err(Error::Store("save rejected".to_string()));
        }
        *self.slot.borrow_mut() = Some(snapshot.clone());
        Ok(())
    }
}
