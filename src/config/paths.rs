//! Where Desi-Scribe keeps its files, resolved with `dirs`.
//!
//! Layout:
//!
//! Config dir (settings):
//!   Windows: %APPDATA%\desi-scribe\
//!   macOS:   ~/Library/Application Support/desi-scribe/
//!   Linux:   ~/.config/desi-scribe/
//!
//! Data dir (speech models):
//!   Windows: %LOCALAPPDATA%\desi-scribe\models\
//!   macOS:   ~/Library/Application Support/desi-scribe/models/
//!   Linux:   ~/.local/share/desi-scribe/models/
//!
//! Downloaded posters land in the platform download directory unless
//! `ui.download_dir` overrides it.

use std::path::PathBuf;

/// Resolved directories and files for one user.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory holding `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Directory for GGML speech models.
    pub models_dir: PathBuf,
    /// Default target for poster downloads.
    pub download_dir: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "desi-scribe";

    /// Resolves all paths using the `dirs` crate, falling back to the
    /// current directory when the platform has no standard location.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let download_dir = dirs::download_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            settings_file: config_dir.join("settings.toml"),
            config_dir,
            models_dir: data_dir.join("models"),
            download_dir,
        }
    }

    /// Path of the GGML file for a model stem such as `"ggml-small"`.
    pub fn model_file(&self, model: &str) -> PathBuf {
        self.models_dir.join(format!("{model}.bin"))
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
