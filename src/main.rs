//! Desi-Scribe entry point.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Create [`tokio`] runtime (multi-thread, 2 workers).
//! 4. Build the generation client from config and probe the backend.
//! 5. Create the completion and dictation channels.
//! 6. Detect dictation capability and load the speech model.
//! 7. Run [`eframe::run_native`]: blocks the main thread until the window
//!    is closed.

use std::sync::Arc;

use desi_scribe::{
    app::DesiScribeApp,
    config::{AppConfig, AppPaths},
    dictation::{build_session, UtteranceEvent},
    generation::{GenerationService, HttpGenerationService},
    session::{Completion, RequestRunner, Session, COMPLETION_CAPACITY},
};
use tokio::sync::mpsc;

use eframe::egui;

// ---------------------------------------------------------------------------
// Native options builder
// ---------------------------------------------------------------------------

fn native_options(config: &AppConfig) -> eframe::NativeOptions {
    let (width, height) = config.ui.window_size;
    let mut vp = egui::ViewportBuilder::default()
        .with_title("Desi-Scribe")
        .with_inner_size([width, height])
        .with_min_inner_size([340.0, 420.0]);

    if config.ui.always_on_top {
        vp = vp.with_always_on_top();
    }

    eframe::NativeOptions {
        viewport: vp,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> eframe::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Desi-Scribe starting up");

    // 2. Configuration
    let paths = AppPaths::new();
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e:#}); using defaults");
        AppConfig::default()
    });

    // 3. Tokio runtime (2 worker threads; requests are I/O bound)
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to create tokio runtime");

    // 4. Generation client
    let http = Arc::new(HttpGenerationService::from_config(&config.service));
    if config.service.probe_on_startup {
        let probe = Arc::clone(&http);
        let base_url = config.service.base_url.clone();
        rt.spawn(async move {
            match probe.probe().await {
                Ok(message) => log::info!("Backend at {base_url} is up: {message}"),
                Err(e) => log::warn!("Backend at {base_url} not reachable: {e}"),
            }
        });
    }
    let service: Arc<dyn GenerationService> = http;

    // 5. Channel setup
    let (completion_tx, completion_rx) = mpsc::channel::<Completion>(COMPLETION_CAPACITY);
    let (dictation_tx, dictation_rx) = std::sync::mpsc::channel::<UtteranceEvent>();

    // 6. Dictation (mic hidden when unavailable)
    let dictation = build_session(&config.dictation, &paths, dictation_tx);

    // 7. Build the egui app and run it (blocks until the window is closed)
    let session = Session::new(config.form, dictation);
    let runner = RequestRunner::new(service, rt.handle().clone(), completion_tx);
    let app = DesiScribeApp::new(
        session,
        runner,
        completion_rx,
        dictation_rx,
        config.download_dir(&paths),
    );
    let options = native_options(&config);

    eframe::run_native(
        "Desi-Scribe",
        options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )
}
