//! The session aggregate: single owner of mode, form, transcript, dictation
//! and request guards.
//!
//! [`Session`] lives on the UI thread and is only ever mutated there.  User
//! actions that need the network return a [`PendingRequest`] for the
//! [`runner`](super::runner) to execute; the answer comes back as a
//! [`Completion`] and is applied with [`Session::complete`].

use crate::config::FormDefaults;
use crate::dictation::{DictationSession, DictationState, UtteranceEvent};
use crate::form::{FormData, FormModel, ValidationError};
use crate::generation::{
    Action, GenerationError, GenerationRequest, ImageAnalysis, ImageUpload, Poster, RequestGuards,
    Slogan,
};
use crate::transcript::{TranscriptEntry, TranscriptLog};

use super::mode::{ModeController, SessionMode, TransitionError};

// ---------------------------------------------------------------------------
// Requests and completions
// ---------------------------------------------------------------------------

/// Work for the generation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    AnalyzeImage(ImageUpload),
    GenerateSlogan(GenerationRequest),
    GeneratePoster(GenerationRequest),
}

impl Job {
    pub fn action(&self) -> Action {
        match self {
            Job::AnalyzeImage(_) => Action::AnalyzeImage,
            Job::GenerateSlogan(_) => Action::GenerateSlogan,
            Job::GeneratePoster(_) => Action::GeneratePoster,
        }
    }
}

/// A request the session has committed to: its guard is InFlight and the
/// user entry is already in the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub epoch: u64,
    pub job: Job,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Analyzed(Result<ImageAnalysis, GenerationError>),
    Slogan(Result<Slogan, GenerationError>),
    Poster(Result<Poster, GenerationError>),
}

impl Outcome {
    pub fn action(&self) -> Action {
        match self {
            Outcome::Analyzed(_) => Action::AnalyzeImage,
            Outcome::Slogan(_) => Action::GenerateSlogan,
            Outcome::Poster(_) => Action::GeneratePoster,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub epoch: u64,
    pub outcome: Outcome,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Status prompt while an earlier analysis still holds the guard.
pub const ANALYSIS_BUSY: &str = "Still analyzing the previous photo. Try again in a moment.";

pub struct Session {
    modes: ModeController,
    form: FormModel,
    transcript: TranscriptLog,
    dictation: DictationSession,
    guards: RequestGuards,
    /// Validation prompt for the status line.
    prompt: Option<String>,
}

impl Session {
    pub fn new(form_defaults: FormDefaults, dictation: DictationSession) -> Self {
        Self {
            modes: ModeController::new(),
            form: FormModel::new(form_defaults),
            transcript: TranscriptLog::new(),
            dictation,
            guards: RequestGuards::default(),
            prompt: None,
        }
    }

    // -----------------------------------------------------------------------
    // Mode transitions
    // -----------------------------------------------------------------------

    /// Open (or reopen) the chat: seed the transcript and reset the form and
    /// the mic.
    pub fn open(&mut self) {
        self.modes.open();
        self.transcript.reset();
        self.form.reset();
        self.dictation.reset();
        self.prompt = None;
        log::info!("session: opened (epoch {})", self.modes.epoch());
    }

    pub fn close(&mut self) {
        self.modes.close();
        self.dictation.reset();
        self.prompt = None;
        log::info!("session: closed");
    }

    pub fn choose_manual(&mut self) -> Result<(), TransitionError> {
        self.modes.choose_manual()?;
        self.transcript.push(TranscriptEntry::user(format!(
            "✍️ Manual Mode selected ({}).",
            self.form.language().name()
        )));
        self.transcript
            .push(TranscriptEntry::system("Okay! Fill in the form below."));
        Ok(())
    }

    /// The caller opens the file picker when this returns `Ok(true)`.
    ///
    /// `Ok(false)` means an analysis from an earlier session is still in
    /// flight: the mode stays Selecting and the prompt says to wait.
    pub fn choose_upload(&mut self) -> Result<bool, TransitionError> {
        if self.modes.mode() == SessionMode::Selecting
            && self.guards.is_in_flight(Action::AnalyzeImage)
        {
            self.prompt = Some(ANALYSIS_BUSY.to_string());
            return Ok(false);
        }
        self.modes.choose_upload()?;
        self.prompt = None;
        Ok(true)
    }

    /// The picker was dismissed without a file.
    pub fn cancel_upload(&mut self) -> Result<(), TransitionError> {
        self.modes.cancel_upload()
    }

    // -----------------------------------------------------------------------
    // Generation actions
    // -----------------------------------------------------------------------

    /// Submit the picked image for analysis.
    ///
    /// `Ok(None)` means the trigger was ignored: an analysis is already in
    /// flight, or no upload is awaited.
    pub fn submit_image(
        &mut self,
        upload: ImageUpload,
    ) -> Result<Option<PendingRequest>, ValidationError> {
        if upload.bytes.is_empty() {
            return Err(self.reject(ValidationError::NoImageSelected));
        }
        if self.modes.mode() != SessionMode::AwaitingUpload {
            log::warn!("session: image submitted while {}", self.modes.mode());
            return Ok(None);
        }
        if !self.guards.try_begin(Action::AnalyzeImage) {
            log::debug!("session: analysis already in flight");
            self.prompt = Some(ANALYSIS_BUSY.to_string());
            self.modes.cancel_upload().ok();
            return Ok(None);
        }

        self.prompt = None;
        self.transcript
            .push(TranscriptEntry::user("📸 Uploading image..."));
        self.transcript
            .push(TranscriptEntry::system("Analyzing image details... 🧠"));
        Ok(Some(self.pending(Job::AnalyzeImage(upload))))
    }

    pub fn request_slogan(&mut self) -> Result<Option<PendingRequest>, ValidationError> {
        self.begin_generation(
            Action::GenerateSlogan,
            |data| format!("📝 Generating {} slogan...", data.language.name()),
            Job::GenerateSlogan,
        )
    }

    pub fn request_poster(&mut self) -> Result<Option<PendingRequest>, ValidationError> {
        self.begin_generation(
            Action::GeneratePoster,
            |data| format!("🎬 Designing {} ad...", data.format.name()),
            Job::GeneratePoster,
        )
    }

    /// Validate, then take the guard, then log the user entry.  A failed
    /// validation never touches the guard or the transcript.
    fn begin_generation(
        &mut self,
        action: Action,
        describe: fn(&FormData) -> String,
        job: fn(GenerationRequest) -> Job,
    ) -> Result<Option<PendingRequest>, ValidationError> {
        let data = self.form.snapshot().map_err(|e| self.reject(e))?;

        if !self.guards.try_begin(action) {
            log::debug!("session: {action:?} already in flight");
            return Ok(None);
        }

        self.prompt = None;
        self.transcript.push(TranscriptEntry::user(describe(&data)));
        Ok(Some(self.pending(job(data.into()))))
    }

    fn pending(&self, job: Job) -> PendingRequest {
        PendingRequest {
            epoch: self.modes.epoch(),
            job,
        }
    }

    fn reject(&mut self, error: ValidationError) -> ValidationError {
        log::debug!("session: validation failed: {error}");
        self.prompt = Some(error.to_string());
        error
    }

    /// Apply a finished request.  The guard is always released; results
    /// from an earlier session are otherwise dropped.
    pub fn complete(&mut self, completion: Completion) {
        self.guards.finish(completion.outcome.action());

        if completion.epoch != self.modes.epoch() {
            log::debug!(
                "session: dropping stale {:?} from epoch {} (now {})",
                completion.outcome.action(),
                completion.epoch,
                self.modes.epoch()
            );
            return;
        }

        match completion.outcome {
            Outcome::Analyzed(result) => self.finish_analysis(result),
            Outcome::Slogan(Ok(Slogan { slogan })) => {
                self.transcript
                    .push(TranscriptEntry::system(format!("✨ \"{slogan}\"")));
            }
            Outcome::Poster(Ok(Poster { slogan, image_url })) => {
                self.transcript
                    .push(TranscriptEntry::system("✨ Design Ready!"));
                self.transcript.push(TranscriptEntry::system_image(image_url));
                self.transcript
                    .push(TranscriptEntry::system(format!("Slogan: \"{slogan}\"")));
            }
            Outcome::Slogan(Err(e)) | Outcome::Poster(Err(e)) => {
                let text = match &e {
                    GenerationError::Service(reason) => {
                        format!("❌ Error: {}", reason.as_deref().unwrap_or("Unknown"))
                    }
                    GenerationError::Transport(detail) => {
                        log::warn!("session: generation transport failure: {detail}");
                        "❌ Network Error.".to_string()
                    }
                };
                self.transcript.push(TranscriptEntry::system(text));
            }
        }
    }

    /// Success or failure, the chat moves on to the form.  A failed
    /// analysis leaves the form untouched.
    fn finish_analysis(&mut self, result: Result<ImageAnalysis, GenerationError>) {
        match result {
            Ok(analysis) => {
                if let Some(tone) = &analysis.tone {
                    log::debug!("session: analysis suggested tone {tone:?}");
                }
                self.form
                    .prefill(&analysis.business_type, &analysis.description);
                self.transcript.push(TranscriptEntry::system(format!(
                    "I see: \"{}\".",
                    analysis.description
                )));
                self.transcript.push(TranscriptEntry::system(format!(
                    "Form auto-filled! Ready to generate in {}?",
                    self.form.language().name()
                )));
            }
            Err(GenerationError::Service(reason)) => {
                self.transcript.push(TranscriptEntry::system(format!(
                    "❌ Analysis failed: {}",
                    reason.as_deref().unwrap_or("Unknown error")
                )));
            }
            Err(GenerationError::Transport(detail)) => {
                log::warn!("session: analysis transport failure: {detail}");
                self.transcript.push(TranscriptEntry::system(
                    "❌ Network Error. Is the backend running?",
                ));
            }
        }

        if let Err(e) = self.modes.image_analyzed() {
            log::warn!("session: {e}");
        }
    }

    // -----------------------------------------------------------------------
    // Dictation
    // -----------------------------------------------------------------------

    /// Mic button.  Returns the locale when listening was requested.
    pub fn toggle_dictation(&mut self) -> Option<&'static str> {
        self.dictation.toggle(self.form.language())
    }

    /// Apply a recognizer event.  Events from an utterance started before
    /// the last open or close are dropped.
    pub fn apply_dictation(&mut self, event: UtteranceEvent) {
        if let Some(text) = self.dictation.handle(event) {
            self.form.append_description(&text);
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn mode(&self) -> SessionMode {
        self.modes.mode()
    }

    pub fn epoch(&self) -> u64 {
        self.modes.epoch()
    }

    pub fn form(&self) -> &FormModel {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormModel {
        &mut self.form
    }

    pub fn transcript(&self) -> &TranscriptLog {
        &self.transcript
    }

    pub fn guards(&self) -> &RequestGuards {
        &self.guards
    }

    pub fn dictation(&self) -> &DictationSession {
        &self.dictation
    }

    pub fn dictation_state(&self) -> DictationState {
        self.dictation.state()
    }

    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictation::{DictationEvent, MockRecognizer};
    use crate::form::{Field, Format, Language};
    use crate::generation::RequestState;
    use crate::transcript::{EntryKind, Role, GREETING, SELECTION_PROMPT};

    fn session() -> Session {
        let mut s = Session::new(FormDefaults::default(), DictationSession::unavailable());
        s.open();
        s
    }

    fn manual_session() -> Session {
        let mut s = session();
        s.choose_manual().unwrap();
        s
    }

    fn fill_chai_house(s: &mut Session) {
        let form = s.form_mut();
        form.set_field(Field::Business, "Chai House");
        form.set_field(Field::AdType, "Discount");
        form.set_field(Field::Description, "20% off");
        form.set_field(Field::Language, "Hindi");
        form.set_field(Field::Format, "Square");
    }

    fn upload() -> ImageUpload {
        ImageUpload {
            file_name: "shop.jpg".into(),
            mime: "image/jpeg".into(),
            bytes: vec![0xFF, 0xD8, 0xFF],
        }
    }

    /// `event` from an utterance started in the current dictation generation.
    fn spoken(s: &Session, event: DictationEvent) -> UtteranceEvent {
        UtteranceEvent {
            generation: s.dictation().generation(),
            event,
        }
    }

    fn dictating_session() -> (Session, MockRecognizer) {
        let mock = MockRecognizer::default();
        let mut s = Session::new(
            FormDefaults::default(),
            DictationSession::new(Box::new(mock.clone())),
        );
        s.open();
        (s, mock)
    }

    fn tail(s: &Session, n: usize) -> Vec<&str> {
        let all = s.transcript().payloads();
        all[all.len() - n..].to_vec()
    }

    #[test]
    fn open_seeds_transcript() {
        let s = session();
        assert_eq!(s.mode(), SessionMode::Selecting);
        assert_eq!(s.transcript().payloads(), vec![GREETING, SELECTION_PROMPT]);
    }

    #[test]
    fn choose_manual_logs_selected_language() {
        let mut s = session();
        s.form_mut().set_language(Language::Tamil);
        s.choose_manual().unwrap();
        assert_eq!(
            tail(&s, 2),
            vec!["✍️ Manual Mode selected (Tamil).", "Okay! Fill in the form below."]
        );
        assert_eq!(s.transcript().entries()[2].role(), Role::User);
        assert!(s.mode().is_form_visible());
    }

    #[test]
    fn choose_manual_twice_is_rejected() {
        let mut s = manual_session();
        let before = s.transcript().len();
        assert!(s.choose_manual().is_err());
        assert_eq!(s.transcript().len(), before);
    }

    #[test]
    fn slogan_success_scenario() {
        let mut s = manual_session();
        fill_chai_house(&mut s);

        let pending = s.request_slogan().unwrap().unwrap();
        let Job::GenerateSlogan(req) = &pending.job else {
            panic!("expected slogan job, got {:?}", pending.job);
        };
        assert_eq!(req.business_type, "Chai House");
        assert_eq!(req.ad_type, "Discount");
        assert_eq!(req.product_description, "20% off");
        assert_eq!(req.language, Language::Hindi);
        assert_eq!(req.format, Format::Square);
        assert!(s.guards().is_in_flight(Action::GenerateSlogan));

        s.complete(Completion {
            epoch: pending.epoch,
            outcome: Outcome::Slogan(Ok(Slogan {
                slogan: "चाय में छूट!".into(),
            })),
        });

        assert_eq!(
            tail(&s, 2),
            vec!["📝 Generating Hindi slogan...", "✨ \"चाय में छूट!\""]
        );
        assert_eq!(s.guards().state(Action::GenerateSlogan), RequestState::Idle);
    }

    #[test]
    fn missing_business_is_a_validation_prompt() {
        let mut s = manual_session();
        fill_chai_house(&mut s);
        s.form_mut().set_field(Field::Business, "   ");
        let before = s.transcript().len();

        assert_eq!(s.request_slogan(), Err(ValidationError::MissingRequired));
        assert_eq!(
            s.prompt(),
            Some("Please enter a Business Name and Product Description!")
        );
        assert_eq!(s.transcript().len(), before);
        assert_eq!(s.guards().state(Action::GenerateSlogan), RequestState::Idle);
    }

    #[test]
    fn in_flight_action_ignores_retrigger() {
        let mut s = manual_session();
        fill_chai_house(&mut s);

        assert!(s.request_poster().unwrap().is_some());
        let before = s.transcript().len();
        assert_eq!(s.request_poster(), Ok(None));
        assert_eq!(s.transcript().len(), before);
        // no cross-action guard
        assert!(s.request_slogan().unwrap().is_some());
    }

    #[test]
    fn poster_success_appends_three_entries() {
        let mut s = manual_session();
        fill_chai_house(&mut s);
        s.form_mut().set_format(Format::Story);

        let pending = s.request_poster().unwrap().unwrap();
        s.complete(Completion {
            epoch: pending.epoch,
            outcome: Outcome::Poster(Ok(Poster {
                slogan: "Sip & save".into(),
                image_url: "data:image/jpeg;base64,AAAA".into(),
            })),
        });

        assert_eq!(
            tail(&s, 4),
            vec![
                "🎬 Designing Story ad...",
                "✨ Design Ready!",
                "data:image/jpeg;base64,AAAA",
                "Slogan: \"Sip & save\"",
            ]
        );
        let image = &s.transcript().entries()[s.transcript().len() - 2];
        assert_eq!(image.kind(), EntryKind::Image);
    }

    #[test]
    fn generation_errors_are_distinguished() {
        let mut s = manual_session();
        fill_chai_house(&mut s);

        for (error, expected) in [
            (GenerationError::Service(Some("quota".into())), "❌ Error: quota"),
            (GenerationError::Service(None), "❌ Error: Unknown"),
            (GenerationError::Transport("refused".into()), "❌ Network Error."),
        ] {
            let pending = s.request_slogan().unwrap().unwrap();
            s.complete(Completion {
                epoch: pending.epoch,
                outcome: Outcome::Slogan(Err(error)),
            });
            assert_eq!(s.transcript().last().unwrap().payload(), expected);
            assert!(!s.guards().is_in_flight(Action::GenerateSlogan));
        }
    }

    #[test]
    fn analysis_failure_moves_to_empty_form() {
        let mut s = session();
        s.choose_upload().unwrap();
        let pending = s.submit_image(upload()).unwrap().unwrap();
        assert_eq!(
            tail(&s, 2),
            vec!["📸 Uploading image...", "Analyzing image details... 🧠"]
        );

        s.complete(Completion {
            epoch: pending.epoch,
            outcome: Outcome::Analyzed(Err(GenerationError::Service(Some(
                "blurry image".into(),
            )))),
        });

        assert_eq!(
            s.transcript().last().unwrap().payload(),
            "❌ Analysis failed: blurry image"
        );
        assert_eq!(s.mode(), SessionMode::ManualEntry);
        assert_eq!(s.form().business(), "");
        assert_eq!(s.form().description(), "");
        assert!(!s.guards().is_in_flight(Action::AnalyzeImage));
    }

    #[test]
    fn analysis_without_reason_and_network_failure() {
        let mut s = session();
        s.choose_upload().unwrap();
        let pending = s.submit_image(upload()).unwrap().unwrap();
        s.complete(Completion {
            epoch: pending.epoch,
            outcome: Outcome::Analyzed(Err(GenerationError::Service(None))),
        });
        assert_eq!(
            s.transcript().last().unwrap().payload(),
            "❌ Analysis failed: Unknown error"
        );

        let mut s = session();
        s.choose_upload().unwrap();
        let pending = s.submit_image(upload()).unwrap().unwrap();
        s.complete(Completion {
            epoch: pending.epoch,
            outcome: Outcome::Analyzed(Err(GenerationError::Transport("refused".into()))),
        });
        assert_eq!(
            s.transcript().last().unwrap().payload(),
            "❌ Network Error. Is the backend running?"
        );
        assert_eq!(s.mode(), SessionMode::ManualEntry);
    }

    #[test]
    fn analysis_success_prefills_form() {
        let mut s = session();
        s.form_mut().set_language(Language::Marathi);
        s.choose_upload().unwrap();
        let pending = s.submit_image(upload()).unwrap().unwrap();

        s.complete(Completion {
            epoch: pending.epoch,
            outcome: Outcome::Analyzed(Ok(ImageAnalysis {
                business_type: "Tea Stall".into(),
                description: "Masala chai in clay cups".into(),
                tone: Some("Catchy".into()),
            })),
        });

        assert_eq!(s.form().business(), "Tea Stall");
        assert_eq!(s.form().description(), "Masala chai in clay cups");
        assert_eq!(
            tail(&s, 2),
            vec![
                "I see: \"Masala chai in clay cups\".",
                "Form auto-filled! Ready to generate in Marathi?",
            ]
        );
        assert_eq!(s.mode(), SessionMode::ManualEntry);
    }

    #[test]
    fn empty_image_is_rejected_locally() {
        let mut s = session();
        s.choose_upload().unwrap();
        let empty = ImageUpload {
            bytes: Vec::new(),
            ..upload()
        };
        assert_eq!(s.submit_image(empty), Err(ValidationError::NoImageSelected));
        assert_eq!(s.transcript().len(), 2);
        assert!(!s.guards().is_in_flight(Action::AnalyzeImage));
    }

    #[test]
    fn image_outside_upload_mode_is_ignored() {
        let mut s = manual_session();
        assert_eq!(s.submit_image(upload()), Ok(None));
        assert!(!s.guards().is_in_flight(Action::AnalyzeImage));
    }

    #[test]
    fn stale_completion_rearms_without_touching_session() {
        let mut s = manual_session();
        fill_chai_house(&mut s);
        let pending = s.request_slogan().unwrap().unwrap();

        s.open();
        let seeded = s.transcript().payloads().len();
        s.complete(Completion {
            epoch: pending.epoch,
            outcome: Outcome::Slogan(Ok(Slogan {
                slogan: "late".into(),
            })),
        });

        assert_eq!(s.transcript().len(), seeded);
        assert_eq!(s.mode(), SessionMode::Selecting);
        assert!(!s.guards().is_in_flight(Action::GenerateSlogan));
    }

    #[test]
    fn stale_analysis_does_not_prefill() {
        let mut s = session();
        s.choose_upload().unwrap();
        let pending = s.submit_image(upload()).unwrap().unwrap();
        s.close();
        s.open();

        s.complete(Completion {
            epoch: pending.epoch,
            outcome: Outcome::Analyzed(Ok(ImageAnalysis {
                business_type: "Old".into(),
                description: "stale".into(),
                tone: None,
            })),
        });
        assert_eq!(s.form().business(), "");
        assert_eq!(s.mode(), SessionMode::Selecting);
    }

    #[test]
    fn reopen_resets_form_and_transcript() {
        let mut s = manual_session();
        fill_chai_house(&mut s);
        s.open();
        assert_eq!(s.form().business(), "");
        assert_eq!(s.form().language(), Language::English);
        assert_eq!(s.transcript().len(), 2);
    }

    #[test]
    fn tamil_dictation_accumulates() {
        let (mut s, _mock) = dictating_session();
        s.form_mut().set_language(Language::Tamil);
        s.choose_manual().unwrap();

        for word in ["நல்ல", "தேநீர்"] {
            assert_eq!(s.toggle_dictation(), Some("ta-IN"));
            s.apply_dictation(spoken(&s, DictationEvent::Start));
            assert_eq!(s.dictation_state(), DictationState::Listening);
            s.apply_dictation(spoken(&s, DictationEvent::Result(word.into())));
            s.apply_dictation(spoken(&s, DictationEvent::End));
        }

        assert_eq!(s.form().description(), "நல்ல தேநீர்");
        assert_eq!(s.dictation_state(), DictationState::Idle);
    }

    #[test]
    fn close_stops_listening() {
        let (mut s, mock) = dictating_session();
        s.choose_manual().unwrap();
        s.toggle_dictation();
        s.apply_dictation(spoken(&s, DictationEvent::Start));

        s.close();
        assert_eq!(s.dictation_state(), DictationState::Idle);
        assert_eq!(mock.calls.lock().unwrap().last().unwrap(), "stop");
    }

    #[test]
    fn close_before_recording_starts_still_stops_the_mic() {
        let (mut s, mock) = dictating_session();
        s.choose_manual().unwrap();
        s.toggle_dictation();
        assert_eq!(s.dictation_state(), DictationState::Idle);

        s.close();
        assert_eq!(mock.calls.lock().unwrap().last().unwrap(), "stop");
    }

    #[test]
    fn words_from_previous_session_are_not_dictated() {
        let (mut s, _mock) = dictating_session();
        s.choose_manual().unwrap();
        s.toggle_dictation();
        let earlier = s.dictation().generation();
        s.apply_dictation(spoken(&s, DictationEvent::Start));

        s.close();
        s.open();
        s.apply_dictation(UtteranceEvent {
            generation: earlier,
            event: DictationEvent::Result("old words".into()),
        });
        s.apply_dictation(UtteranceEvent {
            generation: earlier,
            event: DictationEvent::Start,
        });

        assert_eq!(s.form().description(), "");
        assert_eq!(s.dictation_state(), DictationState::Idle);
    }

    #[test]
    fn reopen_with_analysis_in_flight_keeps_selection_usable() {
        let mut s = session();
        s.choose_upload().unwrap();
        s.submit_image(upload()).unwrap().unwrap();
        s.close();
        s.open();
        assert!(s.guards().is_in_flight(Action::AnalyzeImage));

        // the upload path waits for the earlier analysis
        assert_eq!(s.choose_upload(), Ok(false));
        assert_eq!(s.mode(), SessionMode::Selecting);
        assert_eq!(s.prompt(), Some(ANALYSIS_BUSY));

        // the manual path does not depend on it
        s.choose_manual().unwrap();
        assert_eq!(s.mode(), SessionMode::ManualEntry);
    }

    #[test]
    fn submit_while_analysis_in_flight_returns_to_selection() {
        let mut s = session();
        s.choose_upload().unwrap();
        s.submit_image(upload()).unwrap().unwrap();
        s.close();
        s.open();
        // picker was opened before the reopen
        s.modes.choose_upload().unwrap();

        assert_eq!(s.submit_image(upload()), Ok(None));
        assert_eq!(s.mode(), SessionMode::Selecting);
        assert_eq!(s.prompt(), Some(ANALYSIS_BUSY));
    }

    #[test]
    fn form_visible_only_in_manual_entry() {
        let mut s = Session::new(FormDefaults::default(), DictationSession::unavailable());
        assert!(!s.mode().is_form_visible());
        s.open();
        assert!(!s.mode().is_form_visible());
        s.choose_upload().unwrap();
        assert!(!s.mode().is_form_visible());
        s.cancel_upload().unwrap();
        s.choose_manual().unwrap();
        assert!(s.mode().is_form_visible());
        s.close();
        assert!(!s.mode().is_form_visible());
    }
}
