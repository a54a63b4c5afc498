//! Local speech recognizer: cpal microphone capture + whisper-rs.
//!
//! Each activation runs one utterance on a dedicated thread:
//!
//! ```text
//! start(locale, gen) ─▶ open mic ─▶ Start ─▶ collect 16 kHz mono
//!                                         │ stop() or max length
//!                                         ▼
//!                  Result(text)? ◀─ whisper full() ─▶ End
//! ```
//!
//! The model weights are loaded once and shared by every utterance; a new
//! `WhisperState` is created per transcription.  Every event an utterance
//! sends carries the generation it was started with.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use super::capture::Recording;
use super::machine::{DictationEvent, UtteranceEvent};
use super::recognizer::{RecognizerError, SpeechRecognizer};
use super::resample::{to_whisper_rate, WHISPER_RATE};

/// Utterances shorter than 0.5 s are reported as `no-speech`.
const MIN_UTTERANCE_SAMPLES: usize = (WHISPER_RATE / 2) as usize;

struct Utterance {
    stop: Arc<AtomicBool>,
    worker: JoinHandle<()>,
}

pub struct WhisperRecognizer {
    ctx: Arc<WhisperContext>,
    events: mpsc::Sender<UtteranceEvent>,
    max_utterance: Duration,
    active: Option<Utterance>,
}

impl WhisperRecognizer {
    /// Load a GGML model.  `events` receives every utterance's events.
    pub fn load(
        model_path: &Path,
        use_gpu: bool,
        max_utterance: Duration,
        events: mpsc::Sender<UtteranceEvent>,
    ) -> Result<Self, RecognizerError> {
        let path = model_path.to_str().ok_or_else(|| {
            RecognizerError::Model(format!("non-UTF-8 model path: {}", model_path.display()))
        })?;

        let mut ctx_params = WhisperContextParameters::default();
        ctx_params.use_gpu = use_gpu;
        let ctx = WhisperContext::new_with_params(path, ctx_params)
            .map_err(|e| RecognizerError::Model(e.to_string()))?;

        Ok(Self {
            ctx: Arc::new(ctx),
            events,
            max_utterance,
            active: None,
        })
    }
}

impl SpeechRecognizer for WhisperRecognizer {
    fn start(&mut self, locale: &str, generation: u64) -> Result<(), RecognizerError> {
        if self
            .active
            .as_ref()
            .is_some_and(|u| !u.worker.is_finished())
        {
            return Err(RecognizerError::Busy);
        }

        let stop = Arc::new(AtomicBool::new(false));
        let worker_stop = Arc::clone(&stop);
        let ctx = Arc::clone(&self.ctx);
        let events = self.events.clone();
        let emit = move |event| {
            let _ = events.send(UtteranceEvent { generation, event });
        };
        let language = whisper_language(locale).to_string();
        let max_utterance = self.max_utterance;

        let worker = std::thread::Builder::new()
            .name("dictation-utterance".into())
            .spawn(move || {
                run_utterance(&ctx, &language, max_utterance, &worker_stop, &emit);
            })
            .map_err(|e| RecognizerError::Capture(e.to_string()))?;

        self.active = Some(Utterance { stop, worker });
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(utterance) = &self.active {
            utterance.stop.store(true, Ordering::SeqCst);
        }
    }
}

/// ISO-639-1 code Whisper expects, taken from a BCP-47 locale.
fn whisper_language(locale: &str) -> &str {
    locale.split_once('-').map_or(locale, |(lang, _)| lang)
}

fn run_utterance(
    ctx: &WhisperContext,
    language: &str,
    max_utterance: Duration,
    stop: &AtomicBool,
    emit: &dyn Fn(DictationEvent),
) {
    let outcome = record(max_utterance, stop, emit).and_then(|audio| {
        if audio.len() < MIN_UTTERANCE_SAMPLES {
            Err(RecognizerError::Capture("no-speech".into()))
        } else {
            transcribe(ctx, &audio, language)
        }
    });

    match outcome {
        Ok(text) if !text.is_empty() => {
            emit(DictationEvent::Result(text));
        }
        Ok(_) => log::debug!("dictation: empty transcript"),
        Err(e) => {
            emit(DictationEvent::Error(e.to_string()));
        }
    }
    emit(DictationEvent::End);
}

fn record(
    max_utterance: Duration,
    stop: &AtomicBool,
    emit: &dyn Fn(DictationEvent),
) -> Result<Vec<f32>, RecognizerError> {
    let (tx, rx) = mpsc::channel();
    let recording = Recording::start(tx).map_err(|e| RecognizerError::Capture(e.to_string()))?;

    log::debug!(
        "dictation: recording ({} Hz, {} ch)",
        recording.sample_rate,
        recording.channels
    );
    emit(DictationEvent::Start);

    let started = Instant::now();
    let mut audio = Vec::new();
    while !stop.load(Ordering::SeqCst) && started.elapsed() < max_utterance {
        match rx.recv_timeout(Duration::from_millis(50)) {
            Ok(frame) => audio.extend(to_whisper_rate(&frame.samples, frame.sample_rate)),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    drop(recording);
    for frame in rx.try_iter() {
        audio.extend(to_whisper_rate(&frame.samples, frame.sample_rate));
    }
    Ok(audio)
}

fn transcribe(ctx: &WhisperContext, audio: &[f32], language: &str) -> Result<String, RecognizerError> {
    let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
    params.set_language(Some(language));
    params.set_n_threads(inference_threads());
    params.set_print_progress(false);
    params.set_print_realtime(false);

    let mut state = ctx
        .create_state()
        .map_err(|e| RecognizerError::Model(e.to_string()))?;
    state
        .full(params, audio)
        .map_err(|e| RecognizerError::Model(e.to_string()))?;

    let segments = state
        .full_n_segments()
        .map_err(|e| RecognizerError::Model(e.to_string()))?;
    let mut text = String::new();
    for i in 0..segments {
        let segment = state
            .full_get_segment_text(i)
            .map_err(|e| RecognizerError::Model(format!("segment {i}: {e}")))?;
        text.push_str(&segment);
    }
    Ok(text.trim().to_string())
}

/// CPU threads for inference, capped at 8.
fn inference_threads() -> i32 {
    std::thread::available_parallelism()
        .map(|n| n.get().min(8) as i32)
        .unwrap_or(4)
}
