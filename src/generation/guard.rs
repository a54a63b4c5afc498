//! Per-action re-entrancy guards.
//!
//! Each generation action has its own [`RequestState`].  A trigger is
//! ignored while its own action is in flight; different actions never block
//! each other.

/// One request/response cycle against the generation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    AnalyzeImage,
    GenerateSlogan,
    GeneratePoster,
}

impl Action {
    pub const ALL: [Action; 3] = [
        Action::AnalyzeImage,
        Action::GenerateSlogan,
        Action::GeneratePoster,
    ];

    /// Endpoint path relative to the service base URL.
    pub fn path(self) -> &'static str {
        match self {
            Action::AnalyzeImage => "/analyze-image",
            Action::GenerateSlogan => "/generate-slogan",
            Action::GeneratePoster => "/generate-poster",
        }
    }

    /// Trigger label while idle.
    pub fn label(self) -> &'static str {
        match self {
            Action::AnalyzeImage => "📸 Upload Photo",
            Action::GenerateSlogan => "✒ Slogan",
            Action::GeneratePoster => "🎬 Generate",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RequestState {
    #[default]
    Idle,
    InFlight,
}

#[derive(Debug, Clone, Default)]
pub struct RequestGuards {
    analyze: RequestState,
    slogan: RequestState,
    poster: RequestState,
}

impl RequestGuards {
    pub fn state(&self, action: Action) -> RequestState {
        match action {
            Action::AnalyzeImage => self.analyze,
            Action::GenerateSlogan => self.slogan,
            Action::GeneratePoster => self.poster,
        }
    }

    pub fn is_in_flight(&self, action: Action) -> bool {
        self.state(action) == RequestState::InFlight
    }

    pub fn any_in_flight(&self) -> bool {
        Action::ALL.into_iter().any(|a| self.is_in_flight(a))
    }

    /// Mark `action` in flight.  Returns `false`, and changes nothing, when
    /// it already is.
    pub fn try_begin(&mut self, action: Action) -> bool {
        let slot = self.slot(action);
        if *slot == RequestState::InFlight {
            return false;
        }
        *slot = RequestState::InFlight;
        true
    }

    pub fn finish(&mut self, action: Action) {
        *self.slot(action) = RequestState::Idle;
    }

    fn slot(&mut self, action: Action) -> &mut RequestState {
        match action {
            Action::AnalyzeImage => &mut self.analyze,
            Action::GenerateSlogan => &mut self.slogan,
            Action::GeneratePoster => &mut self.poster,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_begin_is_refused_until_finish() {
        let mut guards = RequestGuards::default();
        assert!(guards.try_begin(Action::GenerateSlogan));
        assert!(!guards.try_begin(Action::GenerateSlogan));

        guards.finish(Action::GenerateSlogan);
        assert_eq!(guards.state(Action::GenerateSlogan), RequestState::Idle);
        assert!(guards.try_begin(Action::GenerateSlogan));
    }

    #[test]
    fn actions_are_independent() {
        let mut guards = RequestGuards::default();
        assert!(guards.try_begin(Action::GenerateSlogan));
        assert!(guards.try_begin(Action::GeneratePoster));
        assert!(guards.try_begin(Action::AnalyzeImage));
        assert!(guards.any_in_flight());

        guards.finish(Action::GeneratePoster);
        assert!(guards.is_in_flight(Action::GenerateSlogan));
        assert!(!guards.is_in_flight(Action::GeneratePoster));
    }
}
