//! Settings sections and their TOML persistence.
//!
//! Every section is `#[serde(default)]`: a settings file that only names
//! one key still loads, with everything else at its default.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::form::{Format, Language};

// ---------------------------------------------------------------------------
// ServiceConfig
// ---------------------------------------------------------------------------

/// Connection settings for the remote generation service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL of the backend, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout.  Poster generation runs an image model, so the
    /// default is generous.
    pub timeout_secs: u64,
    /// Send `GET /` at startup and log whether the backend answers.
    pub probe_on_startup: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5001".into(),
            timeout_secs: 120,
            probe_on_startup: true,
        }
    }
}

// ---------------------------------------------------------------------------
// DictationConfig
// ---------------------------------------------------------------------------

/// Settings for the speech dictation affordance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DictationConfig {
    /// Turn the mic button off entirely, regardless of capability.
    pub enabled: bool,
    /// GGML model file stem under the models dir.  Must be multilingual to
    /// cover Hindi, Tamil and Marathi.
    pub model: String,
    /// Ask whisper.cpp for GPU inference.
    pub use_gpu: bool,
    /// An utterance is cut off after this many seconds even without a stop.
    pub max_utterance_secs: u64,
}

impl Default for DictationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "ggml-small".into(),
            use_gpu: false,
            max_utterance_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// FormDefaults
// ---------------------------------------------------------------------------

/// Values the form model falls back to whenever it is reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormDefaults {
    pub language: Language,
    pub format: Format,
}

impl Default for FormDefaults {
    fn default() -> Self {
        Self {
            language: Language::English,
            format: Format::Square,
        }
    }
}

// ---------------------------------------------------------------------------
// UiConfig
// ---------------------------------------------------------------------------

/// eframe window settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Initial inner size of the chat window in points.
    pub window_size: (f32, f32),
    /// Keep the chat window above other windows.
    pub always_on_top: bool,
    /// Where downloaded posters are written.  `None` uses the platform
    /// download directory.
    pub download_dir: Option<PathBuf>,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            window_size: (420.0, 640.0),
            always_on_top: false,
            download_dir: None,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Contents of `settings.toml`.
///
/// ```rust,no_run
/// use desi_scribe::config::AppConfig;
///
/// let config = AppConfig::load().unwrap_or_default();
/// println!("backend: {}", config.service.base_url);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceConfig,
    pub dictation: DictationConfig,
    pub form: FormDefaults,
    pub ui: UiConfig,
}

impl AppConfig {
    /// Read `settings.toml` from the platform config dir.  A first run with
    /// no file yields the defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => toml::from_str(&text)
                .with_context(|| format!("invalid settings in {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e).with_context(|| format!("cannot read {}", path.display())),
        }
    }

    /// Write `settings.toml` to the platform config dir.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("cannot create {}", dir.display()))?;
        }
        let text = toml::to_string_pretty(self).context("cannot serialise settings")?;
        std::fs::write(path, text).with_context(|| format!("cannot write {}", path.display()))
    }

    /// Directory poster downloads are written to.
    pub fn download_dir(&self, paths: &AppPaths) -> PathBuf {
        self.ui
            .download_dir
            .clone()
            .unwrap_or_else(|| paths.download_dir.clone())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
