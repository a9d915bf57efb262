// SPDX-License-Identifier: MPL-2.0
//! Headless command-line front end.
//!
//! Browses the catalog and drives a [`ReaderSession`] from line commands on
//! stdin, fetching page images and feeding their outcomes back to the session.

use manga_lens::app::config::{self, Config};
use manga_lens::app::paths;
use manga_lens::app::store::{CborFileBackend, ReaderStore, SharedStore};
use manga_lens::application::port::{CatalogResult, CatalogService};
use manga_lens::domain::catalog::{ChapterNeighbors, MangaListCategory, MangaSummary};
use manga_lens::domain::reader::{PreferencesPatch, ReadingDirection, ReadingMode};
use manga_lens::error::{Error, Result};
use manga_lens::infrastructure::{CachedCatalog, MangaDexClient};
use manga_lens::media::{PageCacheConfig, PageImageCache};
use manga_lens::reader::{
    ChapterContent, Effect, Key, Message, NavigationState, Point, ReaderSession, SessionOptions,
    Viewport, EMPTY_CHAPTER_MESSAGE,
};
use simplelog::WriteLogger;
use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

const DEFAULT_WINDOW_WIDTH: f32 = 1280.0;
const DEFAULT_WINDOW_HEIGHT: f32 = 900.0;

const HELP: &str = "\
manga_lens - manga reader

USAGE:
  manga_lens [OPTIONS] <COMMAND>

COMMANDS:
  search <text...>          Search titles
  list <category>           popular | latest | trending | hot | all
  manga <manga-id>          Show a title and its chapters
  history                   Recently read titles
  prefs [<key> <value>]...  Show or change reading preferences
  read <chapter-id>         Open the interactive reader

OPTIONS:
  --offset <n>              Listing offset
  --width <px>              Reader window width
  --height <px>             Reader window height
  --data-dir <path>         Override the data directory
  --config-dir <path>       Override the config directory
  --log-level <level>       off | error | warn | info | debug | trace
  -h, --help                Print this help
";

const READER_HELP: &str = "\
n | p                 next / previous page
left | right | s      arrow keys and settings key
g <page>              jump to page
c <chapter-id>        jump to chapter
z <delta>             wheel zoom (negative zooms in)
drag <x> <y> <x> <y>  pan from one point to another
v <page>              page scrolled into view (continuous mode)
r                     retry the current page
d                     dismiss the error
set <key> <value>     dir ltr|rtl, mode single|continuous, saver|dark|gaps on|off
q                     quit
";

struct Args {
    command: Option<String>,
    offset: u32,
    window_width: f32,
    window_height: f32,
    log_level: Option<String>,
    free: Vec<String>,
}

fn parse_args() -> Result<Args> {
    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let data_dir: Option<String> = args.opt_value_from_str("--data-dir").map_err(arg_error)?;
    let config_dir: Option<String> =
        args.opt_value_from_str("--config-dir").map_err(arg_error)?;
    paths::init_cli_overrides(data_dir, config_dir);

    let parsed = Args {
        offset: args.opt_value_from_str("--offset").map_err(arg_error)?.unwrap_or(0),
        window_width: args
            .opt_value_from_str("--width")
            .map_err(arg_error)?
            .unwrap_or(DEFAULT_WINDOW_WIDTH),
        window_height: args
            .opt_value_from_str("--height")
            .map_err(arg_error)?
            .unwrap_or(DEFAULT_WINDOW_HEIGHT),
        log_level: args.opt_value_from_str("--log-level").map_err(arg_error)?,
        command: args.subcommand().map_err(arg_error)?,
        free: args
            .finish()
            .into_iter()
            .filter_map(|s| s.into_string().ok())
            .collect(),
    };
    Ok(parsed)
}

fn arg_error(err: pico_args::Error) -> Error {
    Error::Config(err.to_string())
}

fn init_logging(config: &Config) {
    let Some(path) = paths::get_log_file_path() else {
        return;
    };
    let file = match path.parent() {
        Some(dir) => fs::create_dir_all(dir).and_then(|()| File::create(&path)),
        None => File::create(&path),
    };
    match file {
        Ok(file) => {
            let level = config.logging.level_filter();
            if let Err(e) = WriteLogger::init(level, simplelog::Config::default(), file) {
                eprintln!("Logging disabled: {e}");
            }
        }
        Err(e) => eprintln!("Logging disabled ({}): {e}", path.display()),
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = parse_args()?;

    let (mut config, config_warning) = config::load();
    if let Some(level) = &args.log_level {
        config.logging.level.clone_from(level);
    }
    init_logging(&config);
    if let Some(key) = config_warning {
        eprintln!("Warning: settings file could not be read ({key}); using defaults");
    }
    log::info!("Starting manga_lens {}", env!("CARGO_PKG_VERSION"));

    let (store, store_warning) = ReaderStore::open(CborFileBackend::new());
    if let Some(key) = store_warning {
        eprintln!("Warning: reading history could not be read ({key}); starting fresh");
    }
    let store = store.into_shared();

    let catalog = CachedCatalog::new(MangaDexClient::new(config.catalog.clone())?, &config.cache);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let page_size = config.catalog.page_size();

    let Some(command) = args.command.as_deref() else {
        print!("{HELP}");
        return Ok(());
    };

    match command {
        "search" => {
            let query = args.free.join(" ");
            runtime.block_on(search(&catalog, &query, args.offset, page_size))
        }
        "list" => {
            let name = args.free.first().map_or("popular", String::as_str);
            let category = MangaListCategory::parse(name)
                .ok_or_else(|| Error::Config(format!("unknown category: {name}")))?;
            runtime.block_on(list(&catalog, category, args.offset, page_size))
        }
        "manga" => {
            let manga_id = required(&args.free, "manga-id")?;
            runtime.block_on(show_manga(&catalog, manga_id))
        }
        "history" => {
            show_history(&store);
            Ok(())
        }
        "prefs" => update_prefs(&store, &args.free),
        "read" => {
            let chapter_id = required(&args.free, "chapter-id")?;
            let viewport = Viewport::from_window(
                args.window_width,
                args.window_height,
                config.reader.vertical_padding(),
            );
            runtime.block_on(read(&catalog, &config, &store, chapter_id, viewport))
        }
        other => Err(Error::Config(format!("unknown command: {other}"))),
    }
}

fn required<'a>(free: &'a [String], name: &str) -> Result<&'a str> {
    free.first()
        .map(String::as_str)
        .ok_or_else(|| Error::Config(format!("missing <{name}>")))
}

// =============================================================================
// Catalog commands
// =============================================================================

async fn search(
    catalog: &impl CatalogService,
    query: &str,
    offset: u32,
    limit: u32,
) -> Result<()> {
    let page = catalog.search_manga(query, offset, limit).await?;
    print_titles(&page.items);
    if let Some(next) = page.next_offset() {
        println!("-- {} of {}, more with --offset {next}", page.items.len(), page.total);
    }
    Ok(())
}

async fn list(
    catalog: &impl CatalogService,
    category: MangaListCategory,
    offset: u32,
    limit: u32,
) -> Result<()> {
    let page = catalog.list_manga(category, offset, limit).await?;
    println!("{category}");
    print_titles(&page.items);
    if let Some(next) = page.next_offset() {
        println!("-- more with --offset {next}");
    }
    Ok(())
}

fn print_titles(items: &[MangaSummary]) {
    for manga in items {
        let year = manga.year.map(|y| format!(" ({y})")).unwrap_or_default();
        println!("{}  {}{year}", manga.id, manga.title);
    }
}

async fn show_manga(catalog: &impl CatalogService, manga_id: &str) -> Result<()> {
    let manga = catalog.get_manga(manga_id).await?;
    println!("{}", manga.title);
    println!("{:?}, {}", manga.status, manga.content_rating);
    if let Some(cover) = &manga.cover_filename {
        println!("{}", catalog.cover_image_url(&manga.id, cover));
    }
    println!();
    println!("{}", manga.description);
    println!();
    for chapter in catalog.get_chapters(manga_id).await? {
        println!("{}  {} ({} pages)", chapter.id, chapter.label(), chapter.pages);
    }
    Ok(())
}

fn show_history(store: &SharedStore) {
    let store = store.borrow();
    for entry in store.recent_history() {
        let when = chrono::DateTime::from_timestamp_millis(entry.timestamp)
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!(
            "{when}  manga {}  chapter {}  page {}",
            entry.manga_id, entry.chapter_id, entry.page
        );
    }
}

fn update_prefs(store: &SharedStore, pairs: &[String]) -> Result<()> {
    for pair in pairs.chunks(2) {
        let [key, value] = pair else {
            return Err(Error::Config(format!("missing value for {}", pair[0])));
        };
        let patch = parse_preference(key, value)
            .ok_or_else(|| Error::Config(format!("invalid preference {key}={value}")))?;
        store.borrow_mut().update_preferences(&patch)?;
    }
    println!("{:?}", store.borrow().preferences());
    Ok(())
}

fn parse_switch(value: &str) -> Option<bool> {
    match value {
        "on" | "true" | "yes" => Some(true),
        "off" | "false" | "no" => Some(false),
        _ => None,
    }
}

fn parse_preference(key: &str, value: &str) -> Option<PreferencesPatch> {
    match key {
        "dir" | "direction" => match value {
            "ltr" => Some(PreferencesPatch::reading_direction(ReadingDirection::Ltr)),
            "rtl" => Some(PreferencesPatch::reading_direction(ReadingDirection::Rtl)),
            _ => None,
        },
        "mode" => match value {
            "single" => Some(PreferencesPatch::reading_mode(ReadingMode::Single)),
            "continuous" => Some(PreferencesPatch::reading_mode(ReadingMode::Continuous)),
            _ => None,
        },
        "saver" | "data-saver" => parse_switch(value).map(PreferencesPatch::data_saver),
        "dark" => parse_switch(value).map(|on| PreferencesPatch {
            dark_mode: Some(on),
            ..PreferencesPatch::default()
        }),
        "gaps" => parse_switch(value).map(|on| PreferencesPatch {
            no_gaps: Some(!on),
            ..PreferencesPatch::default()
        }),
        _ => None,
    }
}

// =============================================================================
// Reader
// =============================================================================

/// Fetches what a chapter needs before its pages can be shown.
///
/// Neighbour lookup is best effort; without it the chapter simply has no
/// prev/next links.
async fn load_content(
    catalog: &impl CatalogService,
    store: &SharedStore,
    chapter_id: &str,
) -> CatalogResult<ChapterContent> {
    let metadata = catalog.get_chapter_metadata(chapter_id).await?;
    let manifest = catalog.get_chapter_image_manifest(chapter_id).await?;

    let neighbors = match &metadata.manga_id {
        Some(manga_id) => match catalog.get_chapters(manga_id).await {
            Ok(chapters) => ChapterNeighbors::locate(&chapters, chapter_id),
            Err(e) => {
                log::warn!("Chapter list for {manga_id} unavailable: {e}");
                ChapterNeighbors::default()
            }
        },
        None => ChapterNeighbors::default(),
    };

    let start_page = metadata
        .manga_id
        .as_deref()
        .and_then(|manga_id| {
            store
                .borrow()
                .history(manga_id)
                .filter(|entry| entry.chapter_id == chapter_id)
                .map(|entry| entry.page)
        })
        .unwrap_or(1);

    Ok(ChapterContent {
        chapter_id: chapter_id.to_string(),
        manga_id: metadata.manga_id,
        manifest,
        prev_chapter_id: neighbors.prev_chapter_id,
        next_chapter_id: neighbors.next_chapter_id,
        start_page,
    })
}

struct Reader<'a, C> {
    catalog: &'a C,
    store: &'a SharedStore,
    options: SessionOptions,
    viewport: Viewport,
    http: reqwest::Client,
    pages: PageImageCache,
    session: ReaderSession,
}

impl<C: CatalogService> Reader<'_, C> {
    /// Replaces the session with a fresh one showing `chapter_id`.
    async fn open(&mut self, chapter_id: &str) {
        self.session = ReaderSession::new(self.store.clone(), self.options);
        self.session.set_viewport(self.viewport);
        self.session.open_chapter(chapter_id);
        println!("Loading chapter {chapter_id}...");

        let message = match load_content(self.catalog, self.store, chapter_id).await {
            Ok(content) => Message::ContentLoaded(content),
            Err(e) => Message::ContentFailed {
                chapter_id: chapter_id.to_string(),
                reason: e.to_string(),
            },
        };
        self.dispatch(message).await;
    }

    /// Handles a message and carries out every effect it causes.
    async fn dispatch(&mut self, message: Message) {
        let mut queue: VecDeque<Effect> = self.session.handle(message).into();
        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::RequestImages(requests) => {
                    for request in requests {
                        let outcome = self.pages.get_or_fetch(&self.http, &request.url).await;
                        let message = match outcome {
                            Ok(page) => Message::ImageLoaded {
                                ticket: request.ticket,
                                dimensions: page.dimensions,
                            },
                            Err(e) => {
                                log::warn!("Page {} failed: {e}", request.ticket.page);
                                Message::ImageFailed(request.ticket)
                            }
                        };
                        queue.extend(self.session.handle(message));
                    }
                }
                Effect::NavigateToChapter(chapter_id) => {
                    Box::pin(self.open(&chapter_id)).await;
                    return;
                }
                Effect::ShowError(error) => println!("! {error}"),
                Effect::PreferencesChanged(preferences) => println!("{preferences:?}"),
                Effect::SettingsToggled(open) => {
                    println!("Settings {}", if open { "open" } else { "closed" });
                }
            }
        }
    }

    fn render(&self) {
        let session = &self.session;
        match session.state() {
            NavigationState::Idle | NavigationState::AwaitingContent => {
                if session.error().is_none() {
                    println!("Loading...");
                }
            }
            NavigationState::Empty => {
                println!("{EMPTY_CHAPTER_MESSAGE}");
                if session.can_retreat() {
                    println!("  p: {}", session.prev_label());
                }
                if session.can_advance() {
                    println!("  n: {}", session.next_label());
                }
            }
            NavigationState::Displaying(page) => {
                let label = session.page_label().unwrap_or_default();
                let size = session
                    .display_size()
                    .map(|s| format!("{:.0}x{:.0}", s.width, s.height))
                    .unwrap_or_else(|| "loading".to_string());
                let pan = session.zoom_pan().position;
                println!(
                    "{label}  [{size}]  zoom {}  pan ({:.0}, {:.0})",
                    session.zoom_label(),
                    pan.x,
                    pan.y
                );
                if let Some(url) = session.page_url(*page) {
                    println!("  {url}");
                }
            }
            NavigationState::Transitioning(chapter_id) => {
                println!("Opening chapter {chapter_id}...");
            }
        }
    }
}

async fn read<C: CatalogService>(
    catalog: &C,
    config: &Config,
    store: &SharedStore,
    chapter_id: &str,
    viewport: Viewport,
) -> Result<()> {
    let http = reqwest::Client::builder()
        .user_agent(config.catalog.user_agent.as_str())
        .timeout(config.catalog.request_timeout())
        .build()
        .map_err(|e| Error::Io(e.to_string()))?;
    let options = SessionOptions::from(&config.reader);

    let mut reader = Reader {
        catalog,
        store,
        options,
        viewport,
        http,
        pages: PageImageCache::new(PageCacheConfig::from(&config.cache)),
        session: ReaderSession::new(store.clone(), options),
    };
    reader.open(chapter_id).await;
    reader.render();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let words: Vec<&str> = line.split_whitespace().collect();
        let message = match words.as_slice() {
            [] => continue,
            ["q" | "quit"] => break,
            ["h" | "help"] => {
                print!("{READER_HELP}");
                continue;
            }
            ["n" | "next"] => Message::Advance,
            ["p" | "prev"] => Message::Retreat,
            ["left"] => Message::Key(Key::ArrowLeft),
            ["right"] => Message::Key(Key::ArrowRight),
            ["r" | "retry"] => Message::RetryPage,
            ["d" | "dismiss"] => Message::DismissError,
            [key] if key.chars().count() == 1 => Message::Key(Key::from_name(key)),
            ["g", page] => match page.parse() {
                Ok(page) => Message::JumpToPage(page),
                Err(_) => {
                    println!("Not a page number: {page}");
                    continue;
                }
            },
            ["c", chapter_id] => Message::JumpToChapter((*chapter_id).to_string()),
            ["z", delta] => match delta.parse() {
                Ok(delta) => Message::Wheel(delta),
                Err(_) => {
                    println!("Not a wheel delta: {delta}");
                    continue;
                }
            },
            ["v", page] => match page.parse() {
                Ok(page) => Message::PageVisible(page),
                Err(_) => {
                    println!("Not a page number: {page}");
                    continue;
                }
            },
            ["drag", rest @ ..] => {
                let coords: Vec<f32> = rest.iter().filter_map(|v| v.parse().ok()).collect();
                let [x0, y0, x1, y1] = coords[..] else {
                    println!("Usage: drag <x> <y> <x> <y>");
                    continue;
                };
                reader.dispatch(Message::PointerDown(Point::new(x0, y0))).await;
                reader.dispatch(Message::PointerMoved(Point::new(x1, y1))).await;
                Message::PointerUp
            }
            ["set", key, value] => match parse_preference(key, value) {
                Some(patch) => Message::UpdatePreferences(patch),
                None => {
                    println!("Unknown setting {key} {value}");
                    continue;
                }
            },
            _ => {
                print!("{READER_HELP}");
                continue;
            }
        };
        reader.dispatch(message).await;
        reader.render();
    }

    let stats = reader.pages.stats();
    log::info!(
        "Page cache: {} pages, {} bytes, {:.1}% hit rate",
        stats.page_count,
        stats.total_bytes,
        stats.hit_rate()
    );
    Ok(())
}
