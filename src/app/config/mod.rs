// SPDX-License-Identifier: MPL-2.0
//! Application configuration loaded from a `settings.toml` file.
//!
//! # Configuration Sections
//!
//! - `[catalog]` - API endpoints, listing sizes, language and rating filters
//! - `[cache]` - Query cache capacity and staleness, page image cache limits
//! - `[reader]` - Preload window, zoom sensitivity, layout padding
//! - `[logging]` - Log level
//!
//! Missing keys fall back to [`defaults`]. Out-of-range numeric values are
//! clamped by the accessor methods rather than rejected, so a hand-edited
//! file never prevents startup.
//!
//! # Path Resolution
//!
//! 1. `load_from_path()`/`save_to_path()` with an explicit path
//! 2. `MANGA_LENS_CONFIG_DIR` environment variable (or `--config-dir`)
//! 3. Platform-specific config directory
//!
//! # Examples
//!
//! ```no_run
//! use manga_lens::app::config;
//!
//! let (mut config, _warning) = config::load();
//! config.reader.preload_count = 4;
//! config::save(&config).expect("Failed to save config");
//! ```

pub mod defaults;

pub use defaults::*;

use crate::app::paths;
use crate::domain::reader::PreloadCount;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE: &str = "settings.toml";

/// Warning key returned when an existing config file cannot be parsed.
pub const CONFIG_LOAD_ERROR_KEY: &str = "notification-config-load-error";

// =============================================================================
// Section Structs
// =============================================================================

/// Catalog API settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CatalogConfig {
    pub api_base_url: String,
    pub at_home_url: String,
    pub uploads_url: String,
    pub user_agent: String,
    /// Titles per listing page.
    pub page_size: u32,
    /// Chapters fetched for a title.
    pub chapter_page_size: u32,
    pub translated_languages: Vec<String>,
    pub content_ratings: Vec<String>,
    /// Retries for transient failures (network errors, 429, 5xx).
    pub max_retries: u32,
    pub request_timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            at_home_url: DEFAULT_AT_HOME_URL.to_string(),
            uploads_url: DEFAULT_UPLOADS_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            chapter_page_size: DEFAULT_CHAPTER_PAGE_SIZE,
            translated_languages: DEFAULT_TRANSLATED_LANGUAGES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            content_ratings: DEFAULT_CONTENT_RATINGS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            max_retries: DEFAULT_MAX_RETRIES,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl CatalogConfig {
    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE)
    }

    #[must_use]
    pub fn chapter_page_size(&self) -> u32 {
        self.chapter_page_size.clamp(1, MAX_CHAPTER_PAGE_SIZE)
    }

    #[must_use]
    pub fn max_retries(&self) -> u32 {
        self.max_retries.min(MAX_MAX_RETRIES)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// Query and page image cache settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    pub max_entries: usize,
    pub stale_after_secs: u64,
    pub page_cache_enabled: bool,
    /// Clamped to `[MIN_PAGE_CACHE_MB, MAX_PAGE_CACHE_MB]` when the cache is built.
    pub page_cache_mb: usize,
    pub page_cache_max_pages: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_CACHE_ENTRIES,
            stale_after_secs: DEFAULT_STALE_AFTER_SECS,
            page_cache_enabled: true,
            page_cache_mb: DEFAULT_PAGE_CACHE_MB,
            page_cache_max_pages: DEFAULT_PAGE_CACHE_PAGES,
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub fn max_entries(&self) -> usize {
        self.max_entries.clamp(MIN_CACHE_ENTRIES, MAX_CACHE_ENTRIES)
    }

    #[must_use]
    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs)
    }
}

/// Reader settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReaderConfig {
    pub preload_count: u32,
    pub zoom_sensitivity: f32,
    pub vertical_padding: f32,
    /// Re-clamp the pan offset whenever the zoom factor changes.
    pub reclamp_pan_on_zoom: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            preload_count: DEFAULT_PRELOAD_COUNT,
            zoom_sensitivity: DEFAULT_ZOOM_SENSITIVITY,
            vertical_padding: DEFAULT_VERTICAL_PADDING,
            reclamp_pan_on_zoom: true,
        }
    }
}

impl ReaderConfig {
    #[must_use]
    pub fn preload_count(&self) -> PreloadCount {
        PreloadCount::new(self.preload_count)
    }

    #[must_use]
    pub fn zoom_sensitivity(&self) -> f32 {
        if self.zoom_sensitivity.is_finite() && self.zoom_sensitivity > 0.0 {
            self.zoom_sensitivity.min(MAX_ZOOM_SENSITIVITY)
        } else {
            DEFAULT_ZOOM_SENSITIVITY
        }
    }

    #[must_use]
    pub fn vertical_padding(&self) -> f32 {
        if self.vertical_padding.is_finite() {
            self.vertical_padding.max(0.0)
        } else {
            DEFAULT_VERTICAL_PADDING
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of `off`, `error`, `warn`, `info`, `debug`, `trace`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl LoggingConfig {
    /// Parsed level filter, falling back to the default on unknown names.
    #[must_use]
    pub fn level_filter(&self) -> log::LevelFilter {
        self.level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

// =============================================================================
// Main Config Struct (Sectioned)
// =============================================================================

/// Application configuration with logical sections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub reader: ReaderConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

// =============================================================================
// Config Path Resolution
// =============================================================================

fn get_config_path_with_override(base_dir: Option<PathBuf>) -> Option<PathBuf> {
    paths::get_app_config_dir_with_override(base_dir).map(|mut path| {
        path.push(CONFIG_FILE);
        path
    })
}

// =============================================================================
// Load Functions
// =============================================================================

/// Loads the configuration from the default path.
///
/// Returns a tuple of (config, optional_warning). If loading fails, returns
/// default config with a warning key explaining what went wrong.
pub fn load() -> (Config, Option<String>) {
    load_with_override(None)
}

/// Loads the configuration from a custom directory.
pub fn load_with_override(base_dir: Option<PathBuf>) -> (Config, Option<String>) {
    if let Some(path) = get_config_path_with_override(base_dir) {
        if path.exists() {
            match load_from_path(&path) {
                Ok(config) => return (config, None),
                Err(err) => {
                    log::warn!("Ignoring unreadable config {}: {err}", path.display());
                    return (Config::default(), Some(CONFIG_LOAD_ERROR_KEY.to_string()));
                }
            }
        }
    }
    (Config::default(), None)
}

/// Loads configuration from a specific path.
pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

// =============================================================================
// Save Functions
// =============================================================================

/// Saves the configuration to the default path.
pub fn save(config: &Config) -> Result<()> {
    save_with_override(config, None)
}

/// Saves the configuration to a custom directory.
pub fn save_with_override(config: &Config, base_dir: Option<PathBuf>) -> Result<()> {
    if let Some(path) = get_config_path_with_override(base_dir) {
        return save_to_path(config, &path);
    }
    Ok(())
}

/// Saves configuration to a specific path.
pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config).map_err(Error::from)?;
    fs::write(path, content)?;
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
