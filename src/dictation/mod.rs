//! Speech dictation into the product description.
//!
//! # Architecture
//!
//! ```text
//! mic button ─▶ DictationSession::toggle(language)
//!                  │ start(locale) / stop()
//!                  ▼
//!            SpeechRecognizer (WhisperRecognizer: cpal + whisper-rs)
//!                  │ UtteranceEvent (std mpsc, recognizer thread)
//!                  ▼
//!  UI loop ─▶ Session::apply_dictation ─▶ machine::transition
//!                                          └─▶ FormModel::append_description
//! ```
//!
//! [`detect::build_session`] is the capability detector: without a speech
//! model or an input device the session is unavailable and the mic is
//! hidden.

pub mod capture;
pub mod detect;
pub mod machine;
pub mod recognizer;
pub mod resample;
pub mod session;
pub mod whisper;

pub use detect::{build_session, Capability};
pub use machine::{transition, DictationEvent, DictationState, Effect, UtteranceEvent};
pub use recognizer::{RecognizerError, SpeechRecognizer};
pub use session::DictationSession;
pub use whisper::WhisperRecognizer;

#[cfg(test)]
pub use recognizer::MockRecognizer;
