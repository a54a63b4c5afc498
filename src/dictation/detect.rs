//! Capability detector: decides at startup whether the mic is offered.

use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use super::capture::has_input_device;
use super::machine::UtteranceEvent;
use super::session::DictationSession;
use super::whisper::WhisperRecognizer;
use crate::config::{AppPaths, DictationConfig};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capability {
    pub enabled: bool,
    pub model_path: PathBuf,
    pub model_present: bool,
    pub input_device: bool,
}

impl Capability {
    /// Probe the environment.  The audio host is only queried once the
    /// cheaper checks pass.
    pub fn detect(config: &DictationConfig, paths: &AppPaths) -> Self {
        let model_path = paths.model_file(&config.model);
        let model_present = config.enabled && model_path.is_file();
        let input_device = model_present && has_input_device();
        Self {
            enabled: config.enabled,
            model_path,
            model_present,
            input_device,
        }
    }

    pub fn is_available(&self) -> bool {
        self.enabled && self.model_present && self.input_device
    }

    fn reason(&self) -> String {
        if !self.enabled {
            "disabled in settings".into()
        } else if !self.model_present {
            format!("no speech model at {}", self.model_path.display())
        } else {
            "no audio input device".into()
        }
    }
}

/// Build the dictation session for this environment.  Missing capability
/// is not an error: the session is simply unavailable.
pub fn build_session(
    config: &DictationConfig,
    paths: &AppPaths,
    events: mpsc::Sender<UtteranceEvent>,
) -> DictationSession {
    let capability = Capability::detect(config, paths);
    if !capability.is_available() {
        log::info!("dictation unavailable: {}", capability.reason());
        return DictationSession::unavailable();
    }

    match WhisperRecognizer::load(
        &capability.model_path,
        config.use_gpu,
        Duration::from_secs(config.max_utterance_secs),
        events,
    ) {
        Ok(recognizer) => {
            log::info!("dictation ready: {}", capability.model_path.display());
            DictationSession::new(Box::new(recognizer))
        }
        Err(e) => {
            log::warn!("dictation unavailable: {e}");
            DictationSession::unavailable()
        }
    }
}
