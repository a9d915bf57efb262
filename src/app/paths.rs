// SPDX-License-Identifier: MPL-2.0
//! Centralized path management for application directories.
//!
//! # Path Resolution Order
//!
//! Paths are resolved in the following priority order:
//! 1. **Explicit override** - parameter to `_with_override()` functions (for tests)
//! 2. **CLI arguments** (`--data-dir`, `--config-dir`) - set via [`init_cli_overrides`]
//! 3. **Environment variables** (`MANGA_LENS_DATA_DIR`, `MANGA_LENS_CONFIG_DIR`)
//! 4. **Platform default** - via `dirs` crate

use std::path::PathBuf;
use std::sync::OnceLock;

/// Application name used for directory naming.
const APP_NAME: &str = "MangaLens";

/// Environment variable to override the data directory.
pub const ENV_DATA_DIR: &str = "MANGA_LENS_DATA_DIR";

/// Environment variable to override the config directory.
pub const ENV_CONFIG_DIR: &str = "MANGA_LENS_CONFIG_DIR";

/// Log file written by the CLI, inside the data directory.
pub const LOG_FILE: &str = "manga_lens.log";

static CLI_DATA_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();
static CLI_CONFIG_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Initializes CLI overrides for data and config directories.
///
/// Must be called at most once, before any path resolution.
///
/// # Panics
///
/// Panics if called more than once (OnceLock can only be set once).
pub fn init_cli_overrides(data_dir: Option<String>, config_dir: Option<String>) {
    CLI_DATA_DIR
        .set(data_dir.map(PathBuf::from))
        .expect("CLI data dir override already initialized");
    CLI_CONFIG_DIR
        .set(config_dir.map(PathBuf::from))
        .expect("CLI config dir override already initialized");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AppDir {
    /// Reader store and log file.
    Data,
    /// `settings.toml`.
    Config,
}

impl AppDir {
    fn env_var(self) -> &'static str {
        match self {
            Self::Data => ENV_DATA_DIR,
            Self::Config => ENV_CONFIG_DIR,
        }
    }

    fn cli_override(self) -> Option<PathBuf> {
        let cell = match self {
            Self::Data => &CLI_DATA_DIR,
            Self::Config => &CLI_CONFIG_DIR,
        };
        cell.get().and_then(Clone::clone)
    }

    fn platform_base(self) -> Option<PathBuf> {
        match self {
            Self::Data => dirs::data_dir(),
            Self::Config => dirs::config_dir(),
        }
    }

    fn resolve(self, override_path: Option<PathBuf>) -> Option<PathBuf> {
        override_path
            .or_else(|| self.cli_override())
            .or_else(|| {
                std::env::var(self.env_var())
                    .ok()
                    .filter(|value| !value.is_empty())
                    .map(PathBuf::from)
            })
            .or_else(|| self.platform_base().map(|base| base.join(APP_NAME)))
    }
}

/// Returns the application data directory (reading store, log file).
///
/// - Linux: `~/.local/share/MangaLens/`
/// - macOS: `~/Library/Application Support/MangaLens/`
/// - Windows: `C:\Users\<User>\AppData\Roaming\MangaLens\`
///
/// Returns `None` if the data directory cannot be determined.
pub fn get_app_data_dir() -> Option<PathBuf> {
    get_app_data_dir_with_override(None)
}

pub fn get_app_data_dir_with_override(override_path: Option<PathBuf>) -> Option<PathBuf> {
    AppDir::Data.resolve(override_path)
}

/// Returns the application config directory (`settings.toml`).
pub fn get_app_config_dir() -> Option<PathBuf> {
    get_app_config_dir_with_override(None)
}

pub fn get_app_config_dir_with_override(override_path: Option<PathBuf>) -> Option<PathBuf> {
    AppDir::Config.resolve(override_path)
}

/// Returns where the CLI writes its log.
pub fn get_log_file_path() -> Option<PathBuf> {
    get_app_data_dir().map(|dir| dir.join(LOG_FILE))
}
