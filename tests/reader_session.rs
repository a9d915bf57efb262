// SPDX-License-Identifier: MPL-2.0
use manga_lens::app::store::{MemoryBackend, ReaderStore, SharedStore};
use manga_lens::domain::catalog::ChapterImageManifest;
use manga_lens::domain::reader::{PreferencesPatch, ReadingDirection, ReadingMode};
use manga_lens::reader::{
    ChapterContent, Effect, ImageDimensions, ImageRequest, Key, Message, NavigationState,
    PageLoadState, ReaderError, ReaderSession, SessionOptions, Viewport,
};

fn manifest(pages: usize) -> ChapterImageManifest {
    ChapterImageManifest {
        base_url: "https://node.example".to_string(),
        hash: "hash".to_string(),
        normal_page_filenames: (1..=pages).map(|p| format!("{p}.png")).collect(),
        data_saver_page_filenames: (1..=pages).map(|p| format!("{p}.jpg")).collect(),
    }
}

fn content(chapter_id: &str, pages: usize, next: Option<&str>) -> ChapterContent {
    ChapterContent {
        chapter_id: chapter_id.to_string(),
        manga_id: Some("manga".to_string()),
        manifest: manifest(pages),
        prev_chapter_id: None,
        next_chapter_id: next.map(String::from),
        start_page: 1,
    }
}

fn open_store(patch: &PreferencesPatch) -> (SharedStore, MemoryBackend) {
    let backend = MemoryBackend::new();
    let (mut store, warning) = ReaderStore::open(backend.clone());
    assert!(warning.is_none());
    if !patch.is_empty() {
        store.update_preferences(patch).expect("save preferences");
    }
    (store.into_shared(), backend)
}

fn opened_session(store: &SharedStore, content: ChapterContent) -> (ReaderSession, Vec<Effect>) {
    let mut session = ReaderSession::new(store.clone(), SessionOptions::default());
    session.set_viewport(Viewport::from_window(1000.0, 900.0, 100.0));
    session.open_chapter(&content.chapter_id);
    let effects = session.handle(Message::ContentLoaded(content));
    (session, effects)
}

fn requests(effects: &[Effect]) -> Vec<ImageRequest> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::RequestImages(requests) => Some(requests.clone()),
            _ => None,
        })
        .flatten()
        .collect()
}

#[test]
fn last_page_with_next_chapter_hands_off() {
    let (store, _) = open_store(&PreferencesPatch::default());
    let (mut session, _) = opened_session(&store, content("c1", 10, Some("c2")));

    session.handle(Message::JumpToPage(10));
    assert_eq!(session.next_label(), "Next Chapter");
    let effects = session.handle(Message::Advance);

    assert_eq!(effects, vec![Effect::NavigateToChapter("c2".to_string())]);
    assert_eq!(
        *session.state(),
        NavigationState::Transitioning("c2".to_string())
    );
    assert_eq!(session.navigation_context().current_page, 10);

    // Nothing moves a session that already left its chapter.
    assert!(session.handle(Message::Retreat).is_empty());
    assert_eq!(session.navigation_context().current_page, 10);
}

#[test]
fn empty_chapter_shows_empty_state() {
    let (store, _) = open_store(&PreferencesPatch::default());
    let (session, effects) = opened_session(&store, content("c1", 0, Some("c2")));

    assert!(requests(&effects).is_empty());
    assert_eq!(*session.state(), NavigationState::Empty);
    assert!(session.error().is_none());
    assert!(session.page_label().is_none());
    assert!(session.can_advance());
    assert!(!session.can_retreat());
}

#[test]
fn arrow_keys_follow_reading_direction() {
    let (rtl_store, _) =
        open_store(&PreferencesPatch::reading_direction(ReadingDirection::Rtl));
    let (mut rtl, _) = opened_session(&rtl_store, content("c1", 5, None));
    rtl.handle(Message::Key(Key::ArrowLeft));
    assert_eq!(*rtl.state(), NavigationState::Displaying(2));

    let (ltr_store, _) =
        open_store(&PreferencesPatch::reading_direction(ReadingDirection::Ltr));
    let (mut ltr, _) = opened_session(&ltr_store, content("c1", 5, None));
    ltr.handle(Message::Key(Key::ArrowLeft));
    assert_eq!(*ltr.state(), NavigationState::Displaying(1));
    ltr.handle(Message::Key(Key::ArrowRight));
    assert_eq!(*ltr.state(), NavigationState::Displaying(2));
}

#[test]
fn rtl_right_arrow_on_first_page_returns_to_previous_chapter() {
    let (store, _) = open_store(&PreferencesPatch::reading_direction(ReadingDirection::Rtl));
    let mut chapter = content("c1", 5, Some("c2"));
    chapter.prev_chapter_id = Some("c0".to_string());
    let (mut session, _) = opened_session(&store, chapter);

    assert_eq!(session.prev_label(), "Previous Chapter");
    let effects = session.handle(Message::Key(Key::ArrowRight));

    assert_eq!(effects, vec![Effect::NavigateToChapter("c0".to_string())]);
    assert_eq!(
        *session.state(),
        NavigationState::Transitioning("c0".to_string())
    );
}

#[test]
fn keys_are_ignored_in_continuous_mode() {
    let (store, _) = open_store(&PreferencesPatch::reading_mode(ReadingMode::Continuous));
    let (mut session, _) = opened_session(&store, content("c1", 5, None));

    assert!(session.handle(Message::Key(Key::ArrowLeft)).is_empty());
    assert!(session.handle(Message::Key(Key::Char('s'))).is_empty());
    assert_eq!(*session.state(), NavigationState::Displaying(1));
    assert!(!session.settings_open());
}

#[test]
fn history_keeps_one_entry_per_title() {
    let (store, backend) = open_store(&PreferencesPatch::default());
    let (mut session, _) = opened_session(&store, content("c1", 10, None));

    session.handle(Message::Advance);
    session.handle(Message::Advance);
    session.handle(Message::JumpToPage(7));

    let saved = backend.saved().expect("store saved");
    assert_eq!(saved.reading_history.len(), 1);
    let entry = &saved.reading_history["manga"];
    assert_eq!(entry.chapter_id, "c1");
    assert_eq!(entry.page, 7);
}

#[test]
fn image_outcomes_drive_layout_and_errors() {
    let (store, _) = open_store(&PreferencesPatch::default());
    let (mut session, effects) = opened_session(&store, content("c1", 4, None));

    let requested = requests(&effects);
    assert_eq!(
        requested.iter().map(|r| r.ticket.page).collect::<Vec<_>>(),
        vec![1, 2]
    );
    assert_eq!(requested[0].url, "https://node.example/data/hash/1.png");
    assert!(session.is_loading());

    session.handle(Message::ImageLoaded {
        ticket: requested[0].ticket.clone(),
        dimensions: ImageDimensions::new(800, 1600),
    });
    assert!(!session.is_loading());
    let display = session.display_size().expect("fitted");
    assert!(display.height <= 800.0 + f32::EPSILON);

    let effects = session.handle(Message::Advance);
    assert!(requests(&effects).iter().any(|r| r.ticket.page == 3));
    let failure = session.handle(Message::ImageFailed(requested[1].ticket.clone()));
    assert_eq!(
        failure,
        vec![Effect::ShowError(ReaderError::ImageLoadFailure { page: 2 })]
    );

    let retry = requests(&session.handle(Message::RetryPage));
    assert_eq!(retry.len(), 1);
    assert_eq!(retry[0].ticket.page, 2);
    assert!(session.error().is_none());
    assert_eq!(session.page_load_state(2), PageLoadState::Loading);
}

#[test]
fn moving_to_a_loaded_page_clears_the_previous_page_banner() {
    let (store, _) = open_store(&PreferencesPatch::default());
    let (mut session, effects) = opened_session(&store, content("c1", 5, None));
    let requested = requests(&effects);

    session.handle(Message::ImageLoaded {
        ticket: requested[1].ticket.clone(),
        dimensions: ImageDimensions::new(10, 20),
    });
    session.handle(Message::ImageFailed(requested[0].ticket.clone()));
    assert_eq!(
        session.error(),
        Some(&ReaderError::ImageLoadFailure { page: 1 })
    );

    session.handle(Message::Advance);
    assert_eq!(*session.state(), NavigationState::Displaying(2));
    assert_eq!(session.image_dimensions(), Some(ImageDimensions::new(10, 20)));
    assert!(session.error().is_none());

    // Going back re-requests the failed page without restoring its banner.
    let retried = requests(&session.handle(Message::Retreat));
    assert_eq!(retried[0].ticket.page, 1);
    assert!(session.error().is_none());
}

#[test]
fn data_saver_toggle_discards_stale_outcomes() {
    let (store, _) = open_store(&PreferencesPatch::default());
    let (mut session, effects) = opened_session(&store, content("c1", 3, None));
    let stale = requests(&effects).remove(0);

    let effects = session.handle(Message::UpdatePreferences(PreferencesPatch::data_saver(true)));
    let fresh = requests(&effects);
    assert!(fresh
        .iter()
        .all(|r| r.url.contains("/data-saver/") && r.ticket.generation > stale.ticket.generation));

    session.handle(Message::ImageLoaded {
        ticket: stale.ticket,
        dimensions: ImageDimensions::new(100, 100),
    });
    assert_eq!(session.page_load_state(1), PageLoadState::Loading);
    assert!(session.image_dimensions().is_none());
    assert!(store.borrow().preferences().data_saver);
}

#[test]
fn zoom_stays_within_bounds() {
    let (store, _) = open_store(&PreferencesPatch::default());
    let (mut session, effects) = opened_session(&store, content("c1", 2, None));
    let first = requests(&effects).remove(0);
    session.handle(Message::ImageLoaded {
        ticket: first.ticket,
        dimensions: ImageDimensions::new(600, 900),
    });

    session.handle(Message::Wheel(-100_000.0));
    assert_eq!(session.zoom_label(), "300%");
    session.handle(Message::Wheel(100_000.0));
    assert_eq!(session.zoom_label(), "50%");

    session.handle(Message::Advance);
    assert_eq!(session.zoom_label(), "100%");
}

#[test]
fn stale_content_for_previous_chapter_is_ignored() {
    let (store, _) = open_store(&PreferencesPatch::default());
    let mut session = ReaderSession::new(store, SessionOptions::default());
    session.open_chapter("c1");
    session.open_chapter("c2");

    let effects = session.handle(Message::ContentLoaded(content("c1", 5, None)));
    assert!(effects.is_empty());
    assert_eq!(*session.state(), NavigationState::AwaitingContent);

    session.handle(Message::ContentFailed {
        chapter_id: "c2".to_string(),
        reason: "timeout".to_string(),
    });
    assert!(matches!(session.error(), Some(ReaderError::FetchFailure(_))));
    assert!(!session.is_loading());
}
