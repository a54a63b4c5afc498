//! Capability-gated dictation session.
//!
//! Built with a recognizer only when the capability detector found speech
//! support.  Without one, every operation is a no-op and
//! [`DictationSession::is_available`] tells the UI to hide the mic.
//!
//! Every [`reset`](DictationSession::reset) starts a new generation.  An
//! utterance is stamped with the generation it was started in, so words
//! still in flight when the chat is closed never reach the next session.

use super::machine::{transition, DictationState, Effect, UtteranceEvent};
use super::recognizer::SpeechRecognizer;
use crate::form::Language;

pub struct DictationSession {
    recognizer: Option<Box<dyn SpeechRecognizer>>,
    state: DictationState,
    generation: u64,
}

impl DictationSession {
    pub fn new(recognizer: Box<dyn SpeechRecognizer>) -> Self {
        Self {
            recognizer: Some(recognizer),
            state: DictationState::Idle,
            generation: 0,
        }
    }

    /// Session for an environment without speech support.
    pub fn unavailable() -> Self {
        Self {
            recognizer: None,
            state: DictationState::Idle,
            generation: 0,
        }
    }

    pub fn is_available(&self) -> bool {
        self.recognizer.is_some()
    }

    pub fn state(&self) -> DictationState {
        self.state
    }

    pub fn is_listening(&self) -> bool {
        self.state == DictationState::Listening
    }

    pub fn placeholder(&self) -> &'static str {
        self.state.placeholder()
    }

    /// Generation new utterances are stamped with.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Mic button press.  Stops an active utterance, or starts one in the
    /// locale of `language`.  Returns the locale when a start was requested.
    pub fn toggle(&mut self, language: Language) -> Option<&'static str> {
        let recognizer = self.recognizer.as_mut()?;

        if self.state == DictationState::Listening {
            log::debug!("dictation: stop requested");
            recognizer.stop();
            return None;
        }

        let locale = language.locale();
        match recognizer.start(locale, self.generation) {
            Ok(()) => {
                log::debug!("dictation: start requested ({locale})");
                Some(locale)
            }
            Err(e) => {
                log::error!("dictation: cannot start: {e}");
                None
            }
        }
    }

    /// Apply a recognizer event.  Returns text to append to the description.
    pub fn handle(&mut self, message: UtteranceEvent) -> Option<String> {
        let UtteranceEvent { generation, event } = message;
        if generation != self.generation {
            log::debug!(
                "dictation: dropping {event:?} from generation {generation} (now {})",
                self.generation
            );
            return None;
        }

        let (next, effect) = transition(self.state, event);
        self.state = next;
        match effect {
            Effect::AppendDescription(text) => {
                let text = text.trim();
                (!text.is_empty()).then(|| text.to_string())
            }
            Effect::LogError(reason) => {
                log::error!("dictation: speech error: {reason}");
                None
            }
            Effect::ShowListening | Effect::ShowIdle => None,
        }
    }

    /// Stop any utterance, including one whose `Start` has not arrived
    /// yet, and return to Idle in a new generation.  Used when the chat is
    /// reopened or closed.
    pub fn reset(&mut self) {
        if let Some(recognizer) = self.recognizer.as_mut() {
            recognizer.stop();
        }
        self.generation += 1;
        self.state = DictationState::Idle;
    }
}

impl std::fmt::Debug for DictationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DictationSession")
            .field("available", &self.is_available())
            .field("state", &self.state)
            .field("generation", &self.generation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictation::machine::DictationEvent;
    use crate::dictation::recognizer::MockRecognizer;

    fn session() -> (DictationSession, MockRecognizer) {
        let mock = MockRecognizer::default();
        (DictationSession::new(Box::new(mock.clone())), mock)
    }

    /// `event` as sent by an utterance started in the current generation.
    fn current(s: &DictationSession, event: DictationEvent) -> UtteranceEvent {
        UtteranceEvent {
            generation: s.generation(),
            event,
        }
    }

    #[test]
    fn unavailable_session_is_a_no_op() {
        let mut s = DictationSession::unavailable();
        assert!(!s.is_available());
        assert_eq!(s.toggle(Language::Hindi), None);
        assert_eq!(s.state(), DictationState::Idle);
    }

    #[test]
    fn toggle_from_idle_starts_in_language_locale() {
        let (mut s, mock) = session();
        assert_eq!(s.toggle(Language::Tamil), Some("ta-IN"));
        assert_eq!(*mock.calls.lock().unwrap(), vec!["start ta-IN #0".to_string()]);
    }

    #[test]
    fn toggle_while_listening_stops_instead_of_starting() {
        let (mut s, mock) = session();
        s.toggle(Language::English);
        s.handle(current(&s, DictationEvent::Start));
        assert!(s.is_listening());

        assert_eq!(s.toggle(Language::English), None);
        assert_eq!(
            *mock.calls.lock().unwrap(),
            vec!["start en-US #0".to_string(), "stop".to_string()]
        );
        // state only changes when the engine reports End
        assert!(s.is_listening());
        s.handle(current(&s, DictationEvent::End));
        assert_eq!(s.state(), DictationState::Idle);
    }

    #[test]
    fn failed_start_stays_idle() {
        let mock = MockRecognizer {
            fail_start: true,
            ..MockRecognizer::default()
        };
        let mut s = DictationSession::new(Box::new(mock));
        assert_eq!(s.toggle(Language::French), None);
        assert_eq!(s.state(), DictationState::Idle);
    }

    #[test]
    fn placeholder_follows_state() {
        let (mut s, _) = session();
        s.handle(current(&s, DictationEvent::Start));
        assert_eq!(s.placeholder(), "Listening... Speak now!");
        s.handle(current(&s, DictationEvent::End));
        assert_eq!(s.placeholder(), "Describe product details...");
    }

    #[test]
    fn result_returns_text_without_changing_state() {
        let (mut s, _) = session();
        s.handle(current(&s, DictationEvent::Start));
        let spoken = current(&s, DictationEvent::Result(" நல்ல ".into()));
        assert_eq!(s.handle(spoken), Some("நல்ல".into()));
        assert!(s.is_listening());
        assert_eq!(s.handle(current(&s, DictationEvent::Result("   ".into()))), None);
    }

    #[test]
    fn error_returns_to_idle_silently() {
        let (mut s, _) = session();
        s.handle(current(&s, DictationEvent::Start));
        assert_eq!(s.handle(current(&s, DictationEvent::Error("network".into()))), None);
        assert_eq!(s.state(), DictationState::Idle);
    }

    #[test]
    fn reset_stops_active_utterance() {
        let (mut s, mock) = session();
        s.toggle(Language::German);
        s.handle(current(&s, DictationEvent::Start));
        s.reset();

        assert_eq!(s.state(), DictationState::Idle);
        assert_eq!(mock.calls.lock().unwrap().last().map(String::as_str), Some("stop"));
    }

    #[test]
    fn reset_stops_utterance_that_has_not_started_yet() {
        let (mut s, mock) = session();
        s.toggle(Language::Hindi);
        assert_eq!(s.state(), DictationState::Idle);
        s.reset();

        assert_eq!(
            *mock.calls.lock().unwrap(),
            vec!["start hi-IN #0".to_string(), "stop".to_string()]
        );
    }

    #[test]
    fn events_from_before_reset_are_dropped() {
        let (mut s, mock) = session();
        s.toggle(Language::Tamil);
        let old = s.generation();
        s.reset();

        let late = |event| UtteranceEvent {
            generation: old,
            event,
        };
        assert_eq!(s.handle(late(DictationEvent::Start)), None);
        assert_eq!(s.state(), DictationState::Idle);
        assert_eq!(s.handle(late(DictationEvent::Result("பழைய".into()))), None);

        // the next utterance carries the new generation
        s.toggle(Language::Tamil);
        assert_eq!(
            mock.calls.lock().unwrap().last().map(String::as_str),
            Some("start ta-IN #1")
        );
        s.handle(current(&s, DictationEvent::Start));
        let spoken = current(&s, DictationEvent::Result("புதிய".into()));
        assert_eq!(s.handle(spoken), Some("புதிய".into()));
    }
}
