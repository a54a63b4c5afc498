//! Dictation state machine.
//!
//! The recognizer reports progress as [`DictationEvent`]s.  [`transition`]
//! is the whole rule set: given the current state and an event it returns
//! the next state and the single [`Effect`] the session must apply.
//!
//! ```text
//! state      event        next       effect
//! ---------  -----------  ---------  -------------------------
//! any        Start        Listening  placeholder → listening
//! any        Result(t)    unchanged  append t to description
//! any        End          Idle       placeholder → idle
//! any        Error(r)     Idle       log r
//! ```

/// Listening status of the single dictation session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DictationState {
    #[default]
    Idle,
    Listening,
}

impl DictationState {
    /// Placeholder for the description field in this state.
    pub fn placeholder(self) -> &'static str {
        match self {
            DictationState::Idle => "Describe product details...",
            DictationState::Listening => "Listening... Speak now!",
        }
    }
}

/// Events emitted by a speech recognizer, at most one utterance per
/// activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictationEvent {
    Start,
    /// Final transcript of the utterance.
    Result(String),
    End,
    /// Recognition failed mid-utterance.  An `End` may or may not follow.
    Error(String),
}

/// A [`DictationEvent`] stamped with the generation of the session that
/// started the utterance.  Events from an older generation are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtteranceEvent {
    pub generation: u64,
    pub event: DictationEvent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ShowListening,
    AppendDescription(String),
    ShowIdle,
    LogError(String),
}

pub fn transition(state: DictationState, event: DictationEvent) -> (DictationState, Effect) {
    match (state, event) {
        (_, DictationEvent::Start) => (DictationState::Listening, Effect::ShowListening),
        (current, DictationEvent::Result(text)) => (current, Effect::AppendDescription(text)),
        (_, DictationEvent::End) => (DictationState::Idle, Effect::ShowIdle),
        (_, DictationEvent::Error(reason)) => (DictationState::Idle, Effect::LogError(reason)),
    }
}
