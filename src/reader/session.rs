// SPDX-License-Identifier: MPL-2.0
//! Reader session: one open chapter.
//!
//! The session composes the navigation state machine, the page load tracker,
//! the zoom/pan controller and the image geometry engine. The composition
//! layer feeds it [`Message`]s (input events, fetch results, image load
//! outcomes) and carries out the returned [`Effect`]s (fetch these images,
//! navigate to that chapter, show this error).
//!
//! Image requests are stamped with a [`LoadTicket`]. Outcomes whose ticket
//! no longer matches the session's chapter, generation, or tracked pages are
//! dropped without touching any state.

use super::error::ReaderError;
use super::geometry::{fit_to_container, DisplaySize, ImageDimensions, Viewport};
use super::input::{map_key, Key, ReaderCommand};
use super::navigation::{NavigationContext, NavigationState, Navigator, Transition};
use super::preload::{PageLoadState, PageLoadTracker};
use super::zoom_pan::{Point, ZoomPanController, ZoomPanState};
use crate::app::config::ReaderConfig;
use crate::app::store::SharedStore;
use crate::domain::catalog::ChapterImageManifest;
use crate::domain::reader::newtypes::zoom_bounds;
use crate::domain::reader::{PreferencesPatch, PreloadCount, ReadingMode, ReadingPreferences};
use std::collections::BTreeMap;

/// Vertical spacing between stacked pages in continuous mode.
pub const PAGE_GAP: f32 = 16.0;

/// Spacing used when gaps are disabled; pages overlap slightly so no seam shows.
pub const NO_GAP_SPACING: f32 = -4.0;

// =============================================================================
// Options and payloads
// =============================================================================

/// Tunables for a reader session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionOptions {
    pub preload_count: PreloadCount,
    pub zoom_sensitivity: f32,
    pub reclamp_pan_on_zoom: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            preload_count: PreloadCount::default(),
            zoom_sensitivity: zoom_bounds::DEFAULT_SENSITIVITY,
            reclamp_pan_on_zoom: true,
        }
    }
}

impl From<&ReaderConfig> for SessionOptions {
    fn from(config: &ReaderConfig) -> Self {
        Self {
            preload_count: config.preload_count(),
            zoom_sensitivity: config.zoom_sensitivity(),
            reclamp_pan_on_zoom: config.reclamp_pan_on_zoom,
        }
    }
}

/// Identity of one image request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    pub chapter_id: String,
    /// Bumped whenever previously issued requests become meaningless.
    pub generation: u64,
    /// 1-based page.
    pub page: u32,
}

/// A page image the composition layer should fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub ticket: LoadTicket,
    pub url: String,
    /// Fetch immediately rather than when convenient.
    pub eager: bool,
}

/// Everything fetched for a chapter before pages can be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterContent {
    pub chapter_id: String,
    /// Owning title; history is only recorded when known.
    pub manga_id: Option<String>,
    pub manifest: ChapterImageManifest,
    pub prev_chapter_id: Option<String>,
    pub next_chapter_id: Option<String>,
    /// 1-based page to open at, clamped into range.
    pub start_page: u32,
}

// =============================================================================
// Messages and effects
// =============================================================================

/// Inputs to a reader session.
#[derive(Debug, Clone)]
pub enum Message {
    ContentLoaded(ChapterContent),
    ContentFailed { chapter_id: String, reason: String },
    Key(Key),
    /// Wheel delta on the page (positive scrolls down and zooms out).
    Wheel(f32),
    Advance,
    Retreat,
    JumpToPage(u32),
    JumpToChapter(String),
    PointerDown(Point),
    PointerMoved(Point),
    PointerUp,
    ViewportResized(Viewport),
    ImageLoaded {
        ticket: LoadTicket,
        dimensions: ImageDimensions,
    },
    ImageFailed(LoadTicket),
    /// Continuous mode: a page scrolled into view.
    PageVisible(u32),
    /// Re-request the current page after a failure.
    RetryPage,
    UpdatePreferences(PreferencesPatch),
    ToggleSettings,
    DismissError,
}

/// Work for the composition layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    RequestImages(Vec<ImageRequest>),
    /// Leave this session and open another chapter.
    NavigateToChapter(String),
    ShowError(ReaderError),
    PreferencesChanged(ReadingPreferences),
    SettingsToggled(bool),
}

// =============================================================================
// Session
// =============================================================================

/// State of one chapter view.
///
/// The preference store is shared with the rest of the process; the session
/// only references it.
#[derive(Debug)]
pub struct ReaderSession {
    store: SharedStore,
    preferences: ReadingPreferences,
    chapter_id: Option<String>,
    content: Option<ChapterContent>,
    generation: u64,
    navigator: Navigator,
    tracker: PageLoadTracker,
    zoom_pan: ZoomPanController,
    /// Natural sizes of loaded pages, so revisiting a loaded page lays out at once.
    natural_sizes: BTreeMap<u32, ImageDimensions>,
    image_dimensions: Option<ImageDimensions>,
    viewport: Viewport,
    error: Option<ReaderError>,
    settings_open: bool,
}

impl ReaderSession {
    /// Creates an idle session, reading preferences from the store.
    pub fn new(store: SharedStore, options: SessionOptions) -> Self {
        let preferences = store.borrow().preferences();
        Self {
            store,
            preferences,
            chapter_id: None,
            content: None,
            generation: 0,
            navigator: Navigator::new(),
            tracker: PageLoadTracker::new(options.preload_count),
            zoom_pan: ZoomPanController::new(
                options.zoom_sensitivity,
                options.reclamp_pan_on_zoom,
            ),
            natural_sizes: BTreeMap::new(),
            image_dimensions: None,
            viewport: Viewport::default(),
            error: None,
            settings_open: false,
        }
    }

    /// Starts waiting for a chapter's content.
    ///
    /// Ignored once the session is transitioning to another chapter.
    pub fn open_chapter(&mut self, chapter_id: &str) {
        if self.navigator.state().is_terminal() {
            log::debug!("Session already left its chapter; not opening {chapter_id}");
            return;
        }
        self.generation += 1;
        self.chapter_id = Some(chapter_id.to_string());
        self.content = None;
        self.tracker.reset(0);
        self.natural_sizes.clear();
        self.image_dimensions = None;
        self.error = None;
        self.zoom_pan.reset();
        self.navigator.begin_loading();
    }

    /// Handles a message and returns the resulting effects.
    pub fn handle(&mut self, message: Message) -> Vec<Effect> {
        match message {
            Message::ContentLoaded(content) => self.on_content_loaded(content),
            Message::ContentFailed { chapter_id, reason } => {
                self.on_content_failed(&chapter_id, reason)
            }
            Message::Key(key) => self.on_key(key),
            Message::Wheel(delta_y) => {
                self.apply_zoom_delta(delta_y);
                Vec::new()
            }
            Message::Advance => self.advance(),
            Message::Retreat => self.retreat(),
            Message::JumpToPage(page) => self.jump_to_page(page),
            Message::JumpToChapter(chapter_id) => self.jump_to_chapter(&chapter_id),
            Message::PointerDown(pointer) => {
                self.begin_drag(pointer);
                Vec::new()
            }
            Message::PointerMoved(pointer) => {
                self.drag_to(pointer);
                Vec::new()
            }
            Message::PointerUp => {
                self.end_drag();
                Vec::new()
            }
            Message::ViewportResized(viewport) => {
                self.set_viewport(viewport);
                Vec::new()
            }
            Message::ImageLoaded { ticket, dimensions } => {
                self.on_image_loaded(&ticket, dimensions);
                Vec::new()
            }
            Message::ImageFailed(ticket) => self.on_image_failed(&ticket),
            Message::PageVisible(page) => self.page_visible(page),
            Message::RetryPage => self.retry_current_page(),
            Message::UpdatePreferences(patch) => self.update_preferences(&patch),
            Message::ToggleSettings => self.toggle_settings(),
            Message::DismissError => {
                self.dismiss_error();
                Vec::new()
            }
        }
    }

    // -------------------------------------------------------------------------
    // Content
    // -------------------------------------------------------------------------

    /// Chapter metadata and image manifest arrived.
    pub fn on_content_loaded(&mut self, content: ChapterContent) -> Vec<Effect> {
        if self.chapter_id.as_deref() != Some(content.chapter_id.as_str())
            || *self.navigator.state() != NavigationState::AwaitingContent
        {
            log::debug!("Discarding stale content for chapter {}", content.chapter_id);
            return Vec::new();
        }

        let total = content.manifest.page_count(self.preferences.data_saver);
        log::info!("Opened chapter {} with {total} pages", content.chapter_id);

        self.error = None;
        self.tracker.reset(total);
        let transition = self.navigator.load_content(
            total,
            content.prev_chapter_id.clone(),
            content.next_chapter_id.clone(),
            content.start_page,
        );
        self.content = Some(content);
        self.apply_transition(transition)
    }

    /// Chapter metadata or manifest could not be fetched.
    pub fn on_content_failed(&mut self, chapter_id: &str, reason: String) -> Vec<Effect> {
        if self.chapter_id.as_deref() != Some(chapter_id)
            || *self.navigator.state() != NavigationState::AwaitingContent
        {
            log::debug!("Discarding stale fetch failure for chapter {chapter_id}");
            return Vec::new();
        }
        log::warn!("Failed to fetch chapter {chapter_id}: {reason}");
        let error = ReaderError::FetchFailure(reason);
        self.error = Some(error.clone());
        vec![Effect::ShowError(error)]
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    pub fn advance(&mut self) -> Vec<Effect> {
        let transition = self.navigator.advance();
        self.apply_transition(transition)
    }

    pub fn retreat(&mut self) -> Vec<Effect> {
        let transition = self.navigator.retreat();
        self.apply_transition(transition)
    }

    pub fn jump_to_page(&mut self, page: u32) -> Vec<Effect> {
        let transition = self.navigator.jump_to_page(page);
        self.apply_transition(transition)
    }

    /// Leaves for any chapter, e.g. one picked from the chapter list.
    pub fn jump_to_chapter(&mut self, chapter_id: &str) -> Vec<Effect> {
        let transition = self.navigator.jump_to_chapter(chapter_id);
        self.apply_transition(transition)
    }

    /// Keyboard input; only live in single mode.
    pub fn on_key(&mut self, key: Key) -> Vec<Effect> {
        if self.preferences.reading_mode != ReadingMode::Single {
            return Vec::new();
        }
        match map_key(key, self.preferences.reading_direction) {
            Some(ReaderCommand::Advance) => self.advance(),
            Some(ReaderCommand::Retreat) => self.retreat(),
            Some(ReaderCommand::ToggleSettings) => self.toggle_settings(),
            None => Vec::new(),
        }
    }

    fn apply_transition(&mut self, transition: Transition) -> Vec<Effect> {
        match transition {
            Transition::None => Vec::new(),
            Transition::Page(page) => self.enter_page(page),
            Transition::Chapter(chapter_id) => {
                log::info!("Leaving for chapter {chapter_id}");
                self.zoom_pan.end_drag();
                vec![Effect::NavigateToChapter(chapter_id)]
            }
            Transition::Empty => {
                log::info!("Chapter has no pages");
                self.image_dimensions = None;
                self.zoom_pan.reset();
                self.update_layout();
                Vec::new()
            }
        }
    }

    fn enter_page(&mut self, page: u32) -> Vec<Effect> {
        self.zoom_pan.reset();
        self.image_dimensions = None;
        self.record_history(page);
        self.schedule(page)
    }

    /// Requests images for `page` according to the reading mode.
    fn schedule(&mut self, page: u32) -> Vec<Effect> {
        let mode = self.preferences.reading_mode;
        let pages = match mode {
            ReadingMode::Single => {
                // Failed pages in the window are re-requested, so no banner applies.
                if matches!(self.error, Some(ReaderError::ImageLoadFailure { .. })) {
                    self.error = None;
                }
                let pages = self.tracker.focus(page);
                let tracker = &self.tracker;
                self.natural_sizes.retain(|p, _| tracker.is_tracked(*p));
                self.image_dimensions = if tracker.state(page) == PageLoadState::Loaded {
                    self.natural_sizes.get(&page).copied()
                } else {
                    None
                };
                pages
            }
            ReadingMode::Continuous => {
                self.image_dimensions = None;
                let mut pages = self.tracker.declare_all();
                if self.tracker.page_visible(page) {
                    pages.push(page);
                }
                pages
            }
        };
        self.update_layout();

        let requests = self.image_requests(&pages, |p| {
            p == page || (mode == ReadingMode::Continuous && p == 1)
        });
        if requests.is_empty() {
            Vec::new()
        } else {
            vec![Effect::RequestImages(requests)]
        }
    }

    fn image_requests(&self, pages: &[u32], eager: impl Fn(u32) -> bool) -> Vec<ImageRequest> {
        let (Some(content), Some(chapter_id)) = (&self.content, &self.chapter_id) else {
            return Vec::new();
        };
        pages
            .iter()
            .filter_map(|&page| {
                let url = content
                    .manifest
                    .page_url(page, self.preferences.data_saver)?;
                Some(ImageRequest {
                    ticket: LoadTicket {
                        chapter_id: chapter_id.clone(),
                        generation: self.generation,
                        page,
                    },
                    url,
                    eager: eager(page),
                })
            })
            .collect()
    }

    fn record_history(&mut self, page: u32) {
        let Some(content) = &self.content else {
            return;
        };
        let Some(manga_id) = &content.manga_id else {
            log::debug!("No title known for chapter {}; history not recorded", content.chapter_id);
            return;
        };
        if let Err(err) = self
            .store
            .borrow_mut()
            .record_history(manga_id, &content.chapter_id, page)
        {
            log::debug!("History for page {page} kept in memory only: {err}");
        }
    }

    // -------------------------------------------------------------------------
    // Image outcomes
    // -------------------------------------------------------------------------

    /// A page image finished loading with its natural size.
    ///
    /// Returns `false` if the outcome was stale and ignored.
    pub fn on_image_loaded(&mut self, ticket: &LoadTicket, dimensions: ImageDimensions) -> bool {
        if !self.is_current(ticket) || !self.tracker.mark_loaded(ticket.page) {
            log::debug!(
                "Discarding stale load of page {} (chapter {}, generation {})",
                ticket.page,
                ticket.chapter_id,
                ticket.generation
            );
            return false;
        }

        self.natural_sizes.insert(ticket.page, dimensions);
        if self.is_on_screen(ticket.page) {
            if matches!(self.error, Some(ReaderError::ImageLoadFailure { .. })) {
                self.error = None;
            }
            if self.preferences.reading_mode == ReadingMode::Single {
                self.image_dimensions = Some(dimensions);
                self.update_layout();
            }
        }
        true
    }

    /// A page image failed to load.
    pub fn on_image_failed(&mut self, ticket: &LoadTicket) -> Vec<Effect> {
        if !self.is_current(ticket) || !self.tracker.mark_failed(ticket.page) {
            log::debug!(
                "Discarding stale failure of page {} (chapter {}, generation {})",
                ticket.page,
                ticket.chapter_id,
                ticket.generation
            );
            return Vec::new();
        }

        log::warn!("Failed to load page {} of chapter {}", ticket.page, ticket.chapter_id);
        if !self.is_on_screen(ticket.page) {
            return Vec::new();
        }
        let error = ReaderError::ImageLoadFailure { page: ticket.page };
        self.error = Some(error.clone());
        vec![Effect::ShowError(error)]
    }

    /// Continuous mode: a page scrolled into view and may need its image.
    pub fn page_visible(&mut self, page: u32) -> Vec<Effect> {
        if self.preferences.reading_mode != ReadingMode::Continuous
            || self.navigator.state().displayed_page().is_none()
            || !self.tracker.page_visible(page)
        {
            return Vec::new();
        }
        let requests = self.image_requests(&[page], |_| false);
        vec![Effect::RequestImages(requests)]
    }

    /// Re-requests the current page if its load failed.
    pub fn retry_current_page(&mut self) -> Vec<Effect> {
        let Some(page) = self.navigator.state().displayed_page() else {
            return Vec::new();
        };
        if !self.tracker.retry(page) {
            return Vec::new();
        }
        self.dismiss_error();
        let requests = self.image_requests(&[page], |_| true);
        vec![Effect::RequestImages(requests)]
    }

    fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.generation == self.generation
            && self.chapter_id.as_deref() == Some(ticket.chapter_id.as_str())
    }

    /// Whether a page is visible: the current page in single mode, any page
    /// in continuous mode.
    fn is_on_screen(&self, page: u32) -> bool {
        match self.preferences.reading_mode {
            ReadingMode::Single => self.navigator.state().displayed_page() == Some(page),
            ReadingMode::Continuous => true,
        }
    }

    // -------------------------------------------------------------------------
    // Zoom, pan, layout
    // -------------------------------------------------------------------------

    fn accepts_pointer_input(&self) -> bool {
        self.preferences.reading_mode == ReadingMode::Single
            && self.navigator.state().displayed_page().is_some()
    }

    /// Applies a wheel delta to the zoom. Returns `true` if the zoom changed.
    pub fn apply_zoom_delta(&mut self, delta_y: f32) -> bool {
        self.accepts_pointer_input() && self.zoom_pan.apply_zoom_delta(delta_y)
    }

    pub fn begin_drag(&mut self, pointer: Point) -> bool {
        self.accepts_pointer_input() && self.zoom_pan.begin_drag(pointer)
    }

    pub fn drag_to(&mut self, pointer: Point) -> bool {
        self.accepts_pointer_input() && self.zoom_pan.drag_to(pointer)
    }

    pub fn end_drag(&mut self) {
        self.zoom_pan.end_drag();
    }

    /// Updates the space available to the page image.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.update_layout();
    }

    fn update_layout(&mut self) {
        let display = self.display_size();
        self.zoom_pan.set_layout(display, self.viewport);
    }

    // -------------------------------------------------------------------------
    // Preferences and chrome
    // -------------------------------------------------------------------------

    /// Applies a preference change, persisting it through the store.
    pub fn update_preferences(&mut self, patch: &PreferencesPatch) -> Vec<Effect> {
        if patch.is_empty() {
            return Vec::new();
        }
        let previous = self.preferences;
        let preferences = {
            let mut store = self.store.borrow_mut();
            if let Err(err) = store.update_preferences(patch) {
                log::warn!("Preferences kept for this session only: {err}");
            }
            store.preferences()
        };
        self.preferences = preferences;

        let mut effects = vec![Effect::PreferencesChanged(preferences)];
        if previous.data_saver != preferences.data_saver {
            effects.extend(self.on_quality_changed());
        } else if previous.reading_mode != preferences.reading_mode {
            effects.extend(self.on_mode_changed());
        }
        effects
    }

    /// Every outstanding request targets the other image variant, which may
    /// even have a different page count.
    fn on_quality_changed(&mut self) -> Vec<Effect> {
        let Some(content) = &self.content else {
            return Vec::new();
        };
        let total = content.manifest.page_count(self.preferences.data_saver);
        log::info!(
            "Switched to {} images ({total} pages)",
            if self.preferences.data_saver { "data-saver" } else { "full quality" }
        );

        self.generation += 1;
        self.tracker.reset(total);
        self.natural_sizes.clear();
        if matches!(self.error, Some(ReaderError::ImageLoadFailure { .. })) {
            self.error = None;
        }
        let transition = self.navigator.set_total_pages(total);
        self.apply_transition(transition)
    }

    fn on_mode_changed(&mut self) -> Vec<Effect> {
        self.zoom_pan.reset();
        let Some(page) = self.navigator.state().displayed_page() else {
            return Vec::new();
        };
        self.schedule(page)
    }

    pub fn toggle_settings(&mut self) -> Vec<Effect> {
        self.settings_open = !self.settings_open;
        vec![Effect::SettingsToggled(self.settings_open)]
    }

    pub fn dismiss_error(&mut self) {
        if self.error.as_ref().is_some_and(ReaderError::is_dismissible) {
            self.error = None;
        }
    }

    // -------------------------------------------------------------------------
    // Read-only views
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn state(&self) -> &NavigationState {
        self.navigator.state()
    }

    #[must_use]
    pub fn navigation_context(&self) -> &NavigationContext {
        self.navigator.context()
    }

    #[must_use]
    pub fn zoom_pan(&self) -> ZoomPanState {
        self.zoom_pan.state()
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.zoom_pan.is_dragging()
    }

    #[must_use]
    pub fn page_load_states(&self) -> &BTreeMap<u32, PageLoadState> {
        self.tracker.states()
    }

    #[must_use]
    pub fn page_load_state(&self, page: u32) -> PageLoadState {
        self.tracker.state(page)
    }

    #[must_use]
    pub fn image_dimensions(&self) -> Option<ImageDimensions> {
        self.image_dimensions
    }

    /// Fitted size of the current page, once its natural size is known.
    #[must_use]
    pub fn display_size(&self) -> Option<DisplaySize> {
        self.image_dimensions
            .and_then(|dimensions| fit_to_container(dimensions, self.viewport))
    }

    #[must_use]
    pub fn error(&self) -> Option<&ReaderError> {
        self.error.as_ref()
    }

    /// Whether a spinner should be shown for the chapter or current page.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        match self.navigator.state() {
            NavigationState::AwaitingContent => self.error.is_none(),
            NavigationState::Displaying(page) => {
                self.tracker.state(*page) == PageLoadState::Loading
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn preferences(&self) -> ReadingPreferences {
        self.preferences
    }

    #[must_use]
    pub fn chapter_id(&self) -> Option<&str> {
        self.chapter_id.as_deref()
    }

    #[must_use]
    pub fn settings_open(&self) -> bool {
        self.settings_open
    }

    /// URL of a page in the current image variant.
    #[must_use]
    pub fn page_url(&self, page: u32) -> Option<String> {
        self.content
            .as_ref()?
            .manifest
            .page_url(page, self.preferences.data_saver)
    }

    /// Spacing between stacked pages in continuous mode.
    #[must_use]
    pub fn page_gap(&self) -> f32 {
        if self.preferences.no_gaps {
            NO_GAP_SPACING
        } else {
            PAGE_GAP
        }
    }

    /// Footer page counter, e.g. `Page 3 of 10`.
    #[must_use]
    pub fn page_label(&self) -> Option<String> {
        let page = self.navigator.state().displayed_page()?;
        Some(format!(
            "Page {} of {}",
            page,
            self.navigator.context().total_pages
        ))
    }

    /// Footer zoom readout, e.g. `150%`.
    #[must_use]
    pub fn zoom_label(&self) -> String {
        format!("{}%", self.zoom_pan.zoom().as_percent())
    }

    #[must_use]
    pub fn prev_label(&self) -> &'static str {
        if self.navigator.context().is_first_page() {
            "Previous Chapter"
        } else {
            "Previous"
        }
    }

    #[must_use]
    pub fn next_label(&self) -> &'static str {
        if self.navigator.context().is_last_page() {
            "Next Chapter"
        } else {
            "Next"
        }
    }

    /// Whether `retreat` would do anything.
    #[must_use]
    pub fn can_retreat(&self) -> bool {
        let context = self.navigator.context();
        match self.navigator.state() {
            NavigationState::Displaying(page) => *page > 1 || context.prev_chapter_id.is_some(),
            NavigationState::Empty => context.prev_chapter_id.is_some(),
            _ => false,
        }
    }

    /// Whether `advance` would do anything.
    #[must_use]
    pub fn can_advance(&self) -> bool {
        let context = self.navigator.context();
        match self.navigator.state() {
            NavigationState::Displaying(page) => {
                *page < context.total_pages || context.next_chapter_id.is_some()
            }
            NavigationState::Empty => context.next_chapter_id.is_some(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::store::{MemoryBackend, ReaderStore};
    use crate::domain::reader::{ReadingDirection, ReadingMode};
    use crate::reader::zoom_pan::PanOffset;

    fn manifest(pages: usize) -> ChapterImageManifest {
        ChapterImageManifest {
            base_url: "https://cdn.example".into(),
            hash: "h".into(),
            normal_page_filenames: (1..=pages).map(|p| format!("p{p}.png")).collect(),
            data_saver_page_filenames: (1..=pages).map(|p| format!("p{p}.jpg")).collect(),
        }
    }

    fn content(pages: usize, next: Option<&str>) -> ChapterContent {
        ChapterContent {
            chapter_id: "c1".into(),
            manga_id: Some("m1".into()),
            manifest: manifest(pages),
            prev_chapter_id: None,
            next_chapter_id: next.map(String::from),
            start_page: 1,
        }
    }

    fn session_with(pages: usize, preferences: ReadingPreferences) -> (ReaderSession, SharedStore) {
        let backend = MemoryBackend::new();
        let (mut store, _) = ReaderStore::open(backend);
        store
            .update_preferences(&PreferencesPatch {
                reading_direction: Some(preferences.reading_direction),
                reading_mode: Some(preferences.reading_mode),
                data_saver: Some(preferences.data_saver),
                dark_mode: Some(preferences.dark_mode),
                no_gaps: Some(preferences.no_gaps),
            })
            .expect("save");
        let store = store.into_shared();
        let mut session = ReaderSession::new(store.clone(), SessionOptions::default());
        session.open_chapter("c1");
        session.on_content_loaded(content(pages, None));
        (session, store)
    }

    fn session(pages: usize) -> ReaderSession {
        session_with(pages, ReadingPreferences::default()).0
    }

    fn requested(effects: &[Effect]) -> Vec<u32> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::RequestImages(requests) => Some(requests),
                _ => None,
            })
            .flatten()
            .map(|r| r.ticket.page)
            .collect()
    }

    fn ticket(session: &ReaderSession, page: u32) -> LoadTicket {
        LoadTicket {
            chapter_id: "c1".into(),
            generation: session.generation,
            page,
        }
    }

    #[test]
    fn content_load_requests_current_page_and_lookahead() {
        let mut session = ReaderSession::new(
            ReaderStore::open(MemoryBackend::new()).0.into_shared(),
            SessionOptions::default(),
        );
        session.open_chapter("c1");
        assert!(session.is_loading());

        let effects = session.on_content_loaded(content(5, None));
        assert_eq!(requested(&effects), vec![1, 2]);
        assert_eq!(session.state(), &NavigationState::Displaying(1));

        let Effect::RequestImages(requests) = &effects[0] else {
            panic!("expected image requests");
        };
        assert!(requests[0].eager);
        assert!(!requests[1].eager);
        assert_eq!(requests[0].url, "https://cdn.example/data/h/p1.png");
    }

    #[test]
    fn content_for_another_chapter_is_stale() {
        let mut session = ReaderSession::new(
            ReaderStore::open(MemoryBackend::new()).0.into_shared(),
            SessionOptions::default(),
        );
        session.open_chapter("c2");
        assert!(session.on_content_loaded(content(5, None)).is_empty());
        assert_eq!(session.state(), &NavigationState::AwaitingContent);
    }

    #[test]
    fn fetch_failure_is_surfaced_once() {
        let mut session = ReaderSession::new(
            ReaderStore::open(MemoryBackend::new()).0.into_shared(),
            SessionOptions::default(),
        );
        session.open_chapter("c1");
        let effects = session.on_content_failed("c1", "status 503".into());
        assert_eq!(
            effects,
            vec![Effect::ShowError(ReaderError::FetchFailure("status 503".into()))]
        );
        assert!(!session.is_loading());
        assert!(session.on_content_failed("c9", "late".into()).is_empty());
    }

    #[test]
    fn loaded_current_page_sets_dimensions_and_layout() {
        let mut session = session(5);
        session.set_viewport(Viewport::new(1000.0, 600.0));
        let ticket = ticket(&session, 1);

        assert!(session.on_image_loaded(&ticket, ImageDimensions::new(800, 1200)));
        assert_eq!(session.image_dimensions(), Some(ImageDimensions::new(800, 1200)));
        let display = session.display_size().expect("layout");
        assert!((display.height - 600.0).abs() < 1e-3);
        assert!(!session.is_loading());
    }

    #[test]
    fn lookahead_load_does_not_set_dimensions() {
        let mut session = session(5);
        let ticket = ticket(&session, 2);
        assert!(session.on_image_loaded(&ticket, ImageDimensions::new(800, 1200)));
        assert_eq!(session.image_dimensions(), None);
        assert_eq!(session.page_load_state(2), PageLoadState::Loaded);
    }

    #[test]
    fn revisiting_loaded_page_restores_dimensions() {
        let mut session = session(5);
        let first = ticket(&session, 1);
        session.on_image_loaded(&first, ImageDimensions::new(700, 1000));
        session.advance();
        assert_eq!(session.image_dimensions(), None);

        let effects = session.retreat();
        assert!(requested(&effects).is_empty());
        assert_eq!(session.image_dimensions(), Some(ImageDimensions::new(700, 1000)));
    }

    #[test]
    fn page_change_resets_zoom_and_pan() {
        let mut session = session(5);
        session.set_viewport(Viewport::new(800.0, 600.0));
        let ticket = ticket(&session, 1);
        session.on_image_loaded(&ticket, ImageDimensions::new(800, 600));

        assert!(session.apply_zoom_delta(-1000.0));
        assert!(session.begin_drag(Point::new(0.0, 0.0)));
        assert!(session.drag_to(Point::new(50.0, 50.0)));
        assert_ne!(session.zoom_pan().position, PanOffset::ZERO);

        session.advance();
        assert!(session.zoom_pan().is_identity());
        assert!(!session.is_dragging());
        assert!(session.is_loading());
        assert_eq!(session.zoom_label(), "100%");
    }

    #[test]
    fn failed_current_page_shows_dismissible_error() {
        let mut session = session(5);
        let ticket = ticket(&session, 1);
        let effects = session.on_image_failed(&ticket);
        assert_eq!(
            effects,
            vec![Effect::ShowError(ReaderError::ImageLoadFailure { page: 1 })]
        );
        assert_eq!(session.page_load_state(1), PageLoadState::Failed);

        session.dismiss_error();
        assert!(session.error().is_none());
    }

    #[test]
    fn failed_lookahead_page_is_silent_and_retried_on_focus() {
        let mut session = session(5);
        let ticket = ticket(&session, 2);
        assert!(session.on_image_failed(&ticket).is_empty());
        assert!(session.error().is_none());

        let effects = session.advance();
        assert_eq!(requested(&effects), vec![2, 3]);
    }

    #[test]
    fn retry_current_page_rerequests_and_clears_error() {
        let mut session = session(5);
        let ticket = ticket(&session, 1);
        session.on_image_failed(&ticket);

        let effects = session.handle(Message::RetryPage);
        assert_eq!(requested(&effects), vec![1]);
        assert!(session.error().is_none());
        assert!(session.handle(Message::RetryPage).is_empty());
    }

    #[test]
    fn outcome_for_page_navigated_away_from_is_discarded() {
        let mut session = session(20);
        let stale = ticket(&session, 1);
        session.jump_to_page(10);

        assert!(!session.on_image_loaded(&stale, ImageDimensions::new(10, 10)));
        assert!(session.on_image_failed(&stale).is_empty());
        assert!(session.error().is_none());
        assert_eq!(session.page_load_state(1), PageLoadState::Unrequested);
    }

    #[test]
    fn outcome_from_previous_generation_is_discarded() {
        let mut session = session(5);
        let stale = ticket(&session, 1);
        session.update_preferences(&PreferencesPatch::data_saver(true));

        assert!(!session.on_image_loaded(&stale, ImageDimensions::new(10, 10)));
        assert_eq!(session.page_load_state(1), PageLoadState::Loading);
    }

    #[test]
    fn data_saver_switch_rerequests_current_page() {
        let mut session = session(5);
        session.jump_to_page(3);

        let effects = session.update_preferences(&PreferencesPatch::data_saver(true));
        assert!(matches!(effects[0], Effect::PreferencesChanged(p) if p.data_saver));
        assert_eq!(requested(&effects), vec![3, 4]);
        assert_eq!(
            session.page_url(3).as_deref(),
            Some("https://cdn.example/data-saver/h/p3.jpg")
        );
        assert_eq!(session.state(), &NavigationState::Displaying(3));
    }

    #[test]
    fn keys_follow_reading_direction() {
        let mut session = session(5);
        assert_eq!(session.preferences().reading_direction, ReadingDirection::Rtl);
        session.on_key(Key::ArrowLeft);
        assert_eq!(session.state(), &NavigationState::Displaying(2));
        session.on_key(Key::ArrowRight);
        assert_eq!(session.state(), &NavigationState::Displaying(1));

        session.update_preferences(&PreferencesPatch::reading_direction(ReadingDirection::Ltr));
        session.on_key(Key::ArrowRight);
        assert_eq!(session.state(), &NavigationState::Displaying(2));
    }

    #[test]
    fn keys_and_wheel_are_ignored_in_continuous_mode() {
        let (mut session, _) = session_with(
            5,
            ReadingPreferences {
                reading_mode: ReadingMode::Continuous,
                ..ReadingPreferences::default()
            },
        );
        assert!(session.on_key(Key::ArrowLeft).is_empty());
        assert!(session.on_key(Key::Char('s')).is_empty());
        assert!(!session.apply_zoom_delta(-500.0));
        assert_eq!(session.state(), &NavigationState::Displaying(1));
    }

    #[test]
    fn continuous_mode_requests_first_page_then_visible_pages() {
        let (mut session, _) = session_with(
            4,
            ReadingPreferences {
                reading_mode: ReadingMode::Continuous,
                ..ReadingPreferences::default()
            },
        );
        assert_eq!(session.page_load_states().len(), 4);
        assert_eq!(session.page_load_state(1), PageLoadState::Loading);
        assert_eq!(session.page_load_state(2), PageLoadState::Unrequested);

        let effects = session.page_visible(3);
        assert_eq!(requested(&effects), vec![3]);
        assert!(session.page_visible(3).is_empty());
    }

    #[test]
    fn continuous_failure_names_any_page() {
        let (mut session, _) = session_with(
            4,
            ReadingPreferences {
                reading_mode: ReadingMode::Continuous,
                ..ReadingPreferences::default()
            },
        );
        session.page_visible(3);
        let ticket = ticket(&session, 3);
        assert_eq!(
            session.on_image_failed(&ticket),
            vec![Effect::ShowError(ReaderError::ImageLoadFailure { page: 3 })]
        );
    }

    #[test]
    fn mode_switch_keeps_current_page() {
        let mut session = session(6);
        session.jump_to_page(4);

        let effects =
            session.update_preferences(&PreferencesPatch::reading_mode(ReadingMode::Continuous));
        assert_eq!(session.state(), &NavigationState::Displaying(4));
        assert_eq!(session.page_load_states().len(), 6);
        assert_eq!(requested(&effects), vec![1]);

        session.update_preferences(&PreferencesPatch::reading_mode(ReadingMode::Single));
        assert_eq!(session.state(), &NavigationState::Displaying(4));
    }

    #[test]
    fn every_page_change_records_history() {
        let (mut session, store) = session_with(5, ReadingPreferences::default());
        session.advance();
        session.advance();

        let store = store.borrow();
        let entry = store.history("m1").expect("history entry");
        assert_eq!(entry.chapter_id, "c1");
        assert_eq!(entry.page, 3);
    }

    #[test]
    fn settings_toggle_with_s_key() {
        let mut session = session(3);
        assert_eq!(
            session.on_key(Key::Char('s')),
            vec![Effect::SettingsToggled(true)]
        );
        assert!(session.settings_open());
        session.handle(Message::ToggleSettings);
        assert!(!session.settings_open());
    }

    #[test]
    fn footer_labels_track_position() {
        let mut session = session(2);
        assert_eq!(session.page_label().as_deref(), Some("Page 1 of 2"));
        assert_eq!(session.prev_label(), "Previous Chapter");
        assert_eq!(session.next_label(), "Next");
        assert!(!session.can_retreat());
        assert!(session.can_advance());

        session.advance();
        assert_eq!(session.prev_label(), "Previous");
        assert_eq!(session.next_label(), "Next Chapter");
        assert!(!session.can_advance());
    }

    #[test]
    fn page_gap_follows_preference() {
        let mut session = session(2);
        assert!((session.page_gap() - NO_GAP_SPACING).abs() < f32::EPSILON);
        session.update_preferences(&PreferencesPatch {
            no_gaps: Some(false),
            ..PreferencesPatch::default()
        });
        assert!((session.page_gap() - PAGE_GAP).abs() < f32::EPSILON);
    }
}
