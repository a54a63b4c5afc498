//! Speech recognizer seam.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecognizerError {
    /// A previous utterance is still being recorded or transcribed.
    #[error("an utterance is already in progress")]
    Busy,

    #[error("audio capture failed: {0}")]
    Capture(String),

    #[error("speech model failed: {0}")]
    Model(String),
}

/// Environment speech-to-text capability.
///
/// `start` begins a single, non-continuous utterance in `locale` (BCP-47,
/// e.g. `"ta-IN"`).  Progress is reported asynchronously as
/// [`UtteranceEvent`](super::UtteranceEvent)s stamped with `generation`, on
/// the channel the recognizer was built with: `Start`, then at most one
/// `Result`, then `End`; or `Error` on failure.  `stop` ends the utterance
/// early; the final result, if any, is still delivered.
pub trait SpeechRecognizer: Send {
    fn start(&mut self, locale: &str, generation: u64) -> Result<(), RecognizerError>;
    fn stop(&mut self);
}

// ---------------------------------------------------------------------------
// MockRecognizer  (test-only)
// ---------------------------------------------------------------------------

/// Records calls; emits nothing.  Tests feed events to the session directly.
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct MockRecognizer {
    pub calls: std::sync::Arc<std::sync::Mutex<Vec<String>>>,
    pub fail_start: bool,
}

#[cfg(test)]
impl SpeechRecognizer for MockRecognizer {
    fn start(&mut self, locale: &str, generation: u64) -> Result<(), RecognizerError> {
        if self.fail_start {
            return Err(RecognizerError::Capture("no device".into()));
        }
        self.calls
            .lock()
            .unwrap()
            .push(format!("start {locale} #{generation}"));
        Ok(())
    }

    fn stop(&mut self) {
        self.calls.lock().unwrap().push("stop".into());
    }
}
