//! Request runner: executes [`PendingRequest`]s on the tokio runtime.
//!
//! # Flow
//!
//! ```text
//! UI thread                         tokio worker
//! ─────────                         ────────────
//! Session::request_*() ─▶ dispatch ─▶ execute(service, request)
//!                                        │ Completion
//!                                        ▼
//! drain_completions() ◀── mpsc ◀──────── send
//!   └─▶ Session::complete()
//! ```
//!
//! Completions are applied in the order they arrive, which is the order the
//! requests finished, not the order they were issued.

use std::sync::Arc;
use std::time::Instant;

use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::generation::GenerationService;

use super::state::{Completion, Job, Outcome, PendingRequest, Session};

/// Capacity of the completion channel.  At most one request per action is
/// ever in flight, so this never fills.
pub const COMPLETION_CAPACITY: usize = 8;

pub struct RequestRunner {
    service: Arc<dyn GenerationService>,
    handle: Handle,
    completions: mpsc::Sender<Completion>,
}

impl RequestRunner {
    /// * `service`    : backend client, shared by all in-flight requests.
    /// * `handle`     : runtime the requests are spawned on.
    /// * `completions`: channel drained by the UI loop.
    pub fn new(
        service: Arc<dyn GenerationService>,
        handle: Handle,
        completions: mpsc::Sender<Completion>,
    ) -> Self {
        Self {
            service,
            handle,
            completions,
        }
    }

    /// Spawn `request` and return immediately.
    pub fn dispatch(&self, request: PendingRequest) {
        let service = Arc::clone(&self.service);
        let completions = self.completions.clone();

        self.handle.spawn(async move {
            let completion = execute(service.as_ref(), request).await;
            if completions.send(completion).await.is_err() {
                log::warn!("runner: completion channel closed, result dropped");
            }
        });
    }

    /// Run UI-side background work (the photo picker) on the same runtime.
    pub fn spawn<F>(&self, task: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        self.handle.spawn(task);
    }
}

/// Perform one request.  Never fails: errors travel inside the
/// [`Outcome`].
pub async fn execute(service: &dyn GenerationService, request: PendingRequest) -> Completion {
    let PendingRequest { epoch, job } = request;
    let action = job.action();
    let started = Instant::now();

    let outcome = match job {
        Job::AnalyzeImage(upload) => Outcome::Analyzed(service.analyze_image(upload).await),
        Job::GenerateSlogan(request) => Outcome::Slogan(service.generate_slogan(&request).await),
        Job::GeneratePoster(request) => Outcome::Poster(service.generate_poster(&request).await),
    };

    let failure = match &outcome {
        Outcome::Analyzed(r) => r.as_ref().err(),
        Outcome::Slogan(r) => r.as_ref().err(),
        Outcome::Poster(r) => r.as_ref().err(),
    };
    match failure {
        None => log::info!(
            "runner: {} done in {} ms",
            action.path(),
            started.elapsed().as_millis()
        ),
        Some(e) => log::warn!(
            "runner: {} failed after {} ms: {e}",
            action.path(),
            started.elapsed().as_millis()
        ),
    }

    Completion { epoch, outcome }
}

/// Apply every completion that has arrived.  Returns how many were applied.
pub fn drain_completions(session: &mut Session, completions: &mut mpsc::Receiver<Completion>) -> usize {
    let mut applied = 0;
    while let Ok(completion) = completions.try_recv() {
        session.complete(completion);
        applied += 1;
    }
    applied
}
