//! Desi-Scribe chat window (eframe/egui).
//!
//! # Architecture
//!
//! [`DesiScribeApp`] is the top-level [`eframe::App`].  It owns the
//! [`Session`] and these channel endpoints:
//!
//! * `runner`       : spawns generation requests on the tokio runtime.
//! * `completions`  : finished requests, drained every frame.
//! * `dictation_rx` : recognizer events from the dictation thread.
//! * `picker`       : the open photo picker, if any.  The dialog and the
//!   file read run on the runtime so the frame loop keeps draining.
//!
//! # Surfaces
//!
//! | Mode | Visual |
//! |------|--------|
//! | `Closed` | Launcher button |
//! | `Selecting` | Transcript + language picker + "Enter Details" / "Upload Photo" |
//! | `AwaitingUpload` | Same controls, disabled while picking and analyzing |
//! | `ManualEntry` | Transcript + ad form with mic, Slogan and Generate |

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc as std_mpsc;
use std::time::Duration;

use eframe::egui;
use tokio::sync::{mpsc, oneshot};

use crate::dictation::UtteranceEvent;
use crate::form::{Format, Language, AD_TYPE_PRESETS};
use crate::generation::{Action, ImageUpload, RequestState};
use crate::session::{drain_completions, Completion, PendingRequest, RequestRunner, Session, SessionMode};
use crate::transcript::{decode_data_url, save_image, EntryKind, Role, TranscriptEntry};

/// File types the photo picker offers.
pub const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "webp", "bmp", "gif"];

const USER_FILL: egui::Color32 = egui::Color32::from_rgb(255, 153, 51);
const SYSTEM_FILL: egui::Color32 = egui::Color32::from_rgb(44, 48, 58);
const PROMPT_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 136, 68);

// ---------------------------------------------------------------------------
// DesiScribeApp
// ---------------------------------------------------------------------------

pub struct DesiScribeApp {
    session: Session,
    runner: RequestRunner,
    completions: mpsc::Receiver<Completion>,
    dictation_rx: std_mpsc::Receiver<UtteranceEvent>,
    picker: Option<oneshot::Receiver<PickedPhoto>>,

    /// Where poster downloads are written.
    download_dir: PathBuf,
    /// Decoded posters by transcript index; `None` marks an undecodable one.
    textures: HashMap<usize, Option<egui::TextureHandle>>,
    /// Session epoch the texture cache belongs to.
    texture_epoch: u64,
    /// Last download or picker notice for the status line.
    notice: Option<String>,
}

impl DesiScribeApp {
    /// * `session`     : session aggregate, initially Closed.
    /// * `runner`      : request runner bound to the tokio runtime.
    /// * `completions` : receiver paired with the runner's sender.
    /// * `dictation_rx`: receiver paired with the recognizer's sender.
    /// * `download_dir`: destination for poster downloads.
    pub fn new(
        session: Session,
        runner: RequestRunner,
        completions: mpsc::Receiver<Completion>,
        dictation_rx: std_mpsc::Receiver<UtteranceEvent>,
        download_dir: PathBuf,
    ) -> Self {
        Self {
            session,
            runner,
            completions,
            dictation_rx,
            picker: None,
            download_dir,
            textures: HashMap::new(),
            texture_epoch: 0,
            notice: None,
        }
    }

    // ── Channel polling ──────────────────────────────────────────────────

    fn poll_dictation(&mut self) {
        while let Ok(event) = self.dictation_rx.try_recv() {
            self.session.apply_dictation(event);
        }
    }

    fn poll_picker(&mut self) {
        let Some(rx) = self.picker.as_mut() else {
            return;
        };
        let picked = match rx.try_recv() {
            Ok(picked) => picked,
            Err(oneshot::error::TryRecvError::Empty) => return,
            Err(oneshot::error::TryRecvError::Closed) => PickedPhoto::Dismissed,
        };
        self.picker = None;
        self.finish_pick(picked);
    }

    fn poll_completions(&mut self) {
        let applied = drain_completions(&mut self.session, &mut self.completions);
        if applied > 0 {
            log::trace!("app: applied {applied} completion(s)");
        }
    }

    fn dispatch(&self, pending: Option<PendingRequest>) {
        if let Some(request) = pending {
            self.runner.dispatch(request);
        }
    }

    // ── Actions ──────────────────────────────────────────────────────────

    fn open(&mut self) {
        self.session.open();
        self.notice = None;
    }

    fn close(&mut self) {
        self.session.close();
        self.notice = None;
    }

    /// Upload flow: enter AwaitingUpload and open the picker on the
    /// runtime.  The choice comes back through [`Self::poll_picker`].
    fn upload_photo(&mut self, ctx: &egui::Context) {
        if self.picker.is_some() {
            return;
        }
        match self.session.choose_upload() {
            Ok(true) => {}
            Ok(false) => return,
            Err(e) => {
                log::warn!("app: {e}");
                return;
            }
        }

        let dialog = rfd::AsyncFileDialog::new()
            .add_filter("Images", &IMAGE_EXTENSIONS)
            .pick_file();
        let (tx, rx) = oneshot::channel();
        let repaint = ctx.clone();
        self.runner.spawn(async move {
            let picked = match dialog.await {
                None => PickedPhoto::Dismissed,
                Some(file) => PickedPhoto::read(file.path()).await,
            };
            let _ = tx.send(picked);
            repaint.request_repaint();
        });
        self.picker = Some(rx);
    }

    fn finish_pick(&mut self, picked: PickedPhoto) {
        match picked {
            PickedPhoto::Dismissed => {
                log::debug!("app: photo picker dismissed");
                self.cancel_upload();
            }
            PickedPhoto::Unreadable(notice) => {
                log::warn!("app: {notice}");
                self.notice = Some(notice);
                self.cancel_upload();
            }
            PickedPhoto::File(upload) => match self.session.submit_image(upload) {
                Ok(pending) => self.dispatch(pending),
                Err(_) => self.cancel_upload(),
            },
        }
    }

    fn cancel_upload(&mut self) {
        // a reopen while the picker was up already left AwaitingUpload
        if self.session.mode() != SessionMode::AwaitingUpload {
            return;
        }
        if let Err(e) = self.session.cancel_upload() {
            log::warn!("app: {e}");
        }
    }

    fn download(&mut self, url: &str) {
        self.notice = Some(match save_image(url, &self.download_dir) {
            Ok(path) => {
                log::info!("app: poster saved to {}", path.display());
                format!("Saved {}", path.display())
            }
            Err(e) => {
                log::warn!("app: poster download failed: {e}");
                format!("Download failed: {e}")
            }
        });
    }

    // ── Textures ─────────────────────────────────────────────────────────

    fn poster_texture(&mut self, ctx: &egui::Context, index: usize, url: &str) -> Option<egui::TextureHandle> {
        if self.texture_epoch != self.session.epoch() {
            self.textures.clear();
            self.texture_epoch = self.session.epoch();
        }

        self.textures
            .entry(index)
            .or_insert_with(|| {
                decode_poster(url).map(|image| {
                    ctx.load_texture(format!("poster-{index}"), image, egui::TextureOptions::LINEAR)
                })
            })
            .clone()
    }

    // ── Panels ───────────────────────────────────────────────────────────

    fn draw_launcher(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() / 2.0 - 24.0);
            let launcher = egui::Button::new(egui::RichText::new("💬 Chat with Desi-Scribe").size(18.0))
                .fill(USER_FILL)
                .corner_radius(egui::CornerRadius::same(24));
            if ui.add(launcher).clicked() {
                self.open();
            }
        });
    }

    fn draw_header(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("Desi-Scribe").strong().size(16.0));
            ui.label(
                egui::RichText::new(self.session.mode().label())
                    .color(egui::Color32::from_rgb(140, 140, 140))
                    .size(11.0),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.add(egui::Button::new("✖").frame(false)).clicked() {
                    self.close();
                }
            });
        });
    }

    fn draw_transcript(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        // Cloned so entries can be drawn while textures are cached on self.
        let entries: Vec<TranscriptEntry> = self.session.transcript().entries().to_vec();

        egui::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for (index, entry) in entries.iter().enumerate() {
                    let layout = match entry.role() {
                        Role::User => egui::Layout::right_to_left(egui::Align::TOP),
                        Role::System => egui::Layout::left_to_right(egui::Align::TOP),
                    };
                    ui.with_layout(layout, |ui| match entry.kind() {
                        EntryKind::Text => draw_bubble(ui, entry),
                        EntryKind::Image => self.draw_poster(ui, ctx, index, entry.payload()),
                    });
                    ui.add_space(4.0);
                }
            });
    }

    fn draw_poster(&mut self, ui: &mut egui::Ui, ctx: &egui::Context, index: usize, url: &str) {
        ui.vertical(|ui| {
            match self.poster_texture(ctx, index, url) {
                Some(texture) => {
                    let width = (ui.available_width() * 0.8).min(320.0);
                    ui.add(
                        egui::Image::from_texture(egui::load::SizedTexture::from_handle(&texture))
                            .max_width(width)
                            .corner_radius(egui::CornerRadius::same(8)),
                    );
                }
                None => {
                    ui.label(egui::RichText::new("🖼 (poster could not be displayed)").italics());
                }
            }
            if ui.small_button("⬇ Download").clicked() {
                self.download(url);
            }
        });
    }

    /// Manual entry only needs Selecting.  Uploading also waits for the
    /// picker and any earlier analysis.
    fn draw_selection(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let selecting = self.session.mode() == SessionMode::Selecting;
        let analyzing = self.session.guards().is_in_flight(Action::AnalyzeImage);

        ui.add_enabled_ui(selecting, |ui| {
            let mut language = self.session.form().language();
            language_combo(ui, "language-select", &mut language);
            if language != self.session.form().language() {
                self.session.form_mut().set_language(language);
            }

            ui.horizontal(|ui| {
                if ui.button("✍️ Enter Details").clicked() {
                    if let Err(e) = self.session.choose_manual() {
                        log::warn!("app: {e}");
                    }
                }
                let upload = egui::Button::new(Action::AnalyzeImage.label());
                if ui.add_enabled(self.picker.is_none(), upload).clicked() {
                    self.upload_photo(ctx);
                }
                if analyzing || self.picker.is_some() {
                    ui.spinner();
                }
            });
        });
    }

    fn draw_form(&mut self, ui: &mut egui::Ui) {
        let placeholder = self.session.dictation().placeholder();
        let mic_available = self.session.dictation().is_available();
        let listening = self.session.dictation().is_listening();

        egui::Grid::new("ad-form")
            .num_columns(2)
            .spacing([8.0, 6.0])
            .show(ui, |ui| {
                ui.label("Business");
                ui.add(
                    egui::TextEdit::singleline(self.session.form_mut().business_mut())
                        .hint_text("Business Name (e.g. Chai Point)")
                        .desired_width(f32::INFINITY),
                );
                ui.end_row();

                ui.label("Ad type");
                ui.horizontal(|ui| {
                    ui.add(
                        egui::TextEdit::singleline(self.session.form_mut().ad_type_mut())
                            .hint_text("Tone")
                            .desired_width(140.0),
                    );
                    egui::ComboBox::from_id_salt("ad-type-presets")
                        .selected_text("Presets")
                        .show_ui(ui, |ui| {
                            for preset in AD_TYPE_PRESETS {
                                if ui.selectable_label(false, preset).clicked() {
                                    *self.session.form_mut().ad_type_mut() = preset.to_string();
                                }
                            }
                        });
                });
                ui.end_row();

                ui.label("Details");
                ui.horizontal(|ui| {
                    if mic_available {
                        let mic = if listening { "⏹" } else { "🎤" };
                        let hover = if listening { "Stop dictation" } else { "Dictate" };
                        if ui.button(mic).on_hover_text(hover).clicked() {
                            self.session.toggle_dictation();
                        }
                    }
                    ui.add(
                        egui::TextEdit::multiline(self.session.form_mut().description_mut())
                            .hint_text(placeholder)
                            .desired_rows(3)
                            .desired_width(f32::INFINITY),
                    );
                });
                ui.end_row();

                ui.label("Language");
                let mut language = self.session.form().language();
                language_combo(ui, "form-language", &mut language);
                self.session.form_mut().set_language(language);
                ui.end_row();

                ui.label("Format");
                let mut format = self.session.form().format();
                egui::ComboBox::from_id_salt("form-format")
                    .selected_text(format.label())
                    .show_ui(ui, |ui| {
                        for option in Format::ALL {
                            ui.selectable_value(&mut format, option, option.label());
                        }
                    });
                self.session.form_mut().set_format(format);
                ui.end_row();
            });

        ui.add_space(6.0);
        ui.horizontal(|ui| {
            if self.action_button(ui, Action::GenerateSlogan) {
                let pending = self.session.request_slogan();
                self.dispatch(pending.ok().flatten());
            }
            if self.action_button(ui, Action::GeneratePoster) {
                let pending = self.session.request_poster();
                self.dispatch(pending.ok().flatten());
            }
        });
    }

    /// Trigger for `action`; disabled with a spinner while in flight.
    fn action_button(&self, ui: &mut egui::Ui, action: Action) -> bool {
        match self.session.guards().state(action) {
            RequestState::Idle => ui.button(action.label()).clicked(),
            RequestState::InFlight => {
                ui.add_enabled(false, egui::Button::new(action.label()));
                ui.spinner();
                false
            }
        }
    }

    fn draw_status(&mut self, ui: &mut egui::Ui) {
        if let Some(prompt) = self.session.prompt() {
            ui.label(egui::RichText::new(prompt).color(PROMPT_COLOR).size(12.0));
        } else if let Some(notice) = &self.notice {
            ui.label(
                egui::RichText::new(notice.as_str())
                    .color(egui::Color32::from_rgb(140, 140, 140))
                    .size(11.0),
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Photo picker
// ---------------------------------------------------------------------------

/// What the photo picker handed back.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PickedPhoto {
    Dismissed,
    File(ImageUpload),
    /// Status-line notice for a file that could not be read.
    Unreadable(String),
}

impl PickedPhoto {
    async fn read(path: &std::path::Path) -> Self {
        match ImageUpload::read(path).await {
            Ok(upload) => PickedPhoto::File(upload),
            Err(e) => PickedPhoto::Unreadable(format!("Cannot read {}: {e}", path.display())),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn draw_bubble(ui: &mut egui::Ui, entry: &TranscriptEntry) {
    let fill = match entry.role() {
        Role::User => USER_FILL,
        Role::System => SYSTEM_FILL,
    };
    egui::Frame::new()
        .fill(fill)
        .corner_radius(egui::CornerRadius::same(10))
        .inner_margin(egui::Margin::symmetric(10, 6))
        .show(ui, |ui| {
            ui.set_max_width(ui.available_width() * 0.8);
            ui.label(egui::RichText::new(entry.payload()).color(egui::Color32::WHITE));
        });
}

fn language_combo(ui: &mut egui::Ui, id: &str, language: &mut Language) {
    egui::ComboBox::from_id_salt(id)
        .selected_text(language.label())
        .show_ui(ui, |ui| {
            for option in Language::ALL {
                ui.selectable_value(language, option, option.label());
            }
        });
}

/// Decode a poster `data:` URL into an egui image.
fn decode_poster(url: &str) -> Option<egui::ColorImage> {
    let (_, bytes) = decode_data_url(url)
        .map_err(|e| log::warn!("app: poster url: {e}"))
        .ok()?;
    let rgba = image::load_from_memory(&bytes)
        .map_err(|e| log::warn!("app: poster image: {e}"))
        .ok()?
        .to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Some(egui::ColorImage::from_rgba_unmultiplied(
        size,
        rgba.as_flat_samples().as_slice(),
    ))
}

// ---------------------------------------------------------------------------
// eframe::App impl
// ---------------------------------------------------------------------------

impl eframe::App for DesiScribeApp {
    /// Called every frame by eframe.  Polls channels, then renders the
    /// surface for the current mode.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // --- Poll non-blocking channels ------------------------------------
        self.poll_dictation();
        self.poll_completions();
        self.poll_picker();

        // --- Keep polling while something is outstanding ------------------
        if self.session.guards().any_in_flight() || self.session.dictation().is_listening() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        let mode = self.session.mode();
        if mode == SessionMode::Closed {
            egui::CentralPanel::default().show(ctx, |ui| self.draw_launcher(ui));
            return;
        }

        egui::TopBottomPanel::top("header").show(ctx, |ui| self.draw_header(ui));

        egui::TopBottomPanel::bottom("controls").show(ctx, |ui| {
            ui.add_space(6.0);
            if mode.is_form_visible() {
                self.draw_form(ui);
            } else if mode.is_selection_visible() {
                self.draw_selection(ui, ctx);
            }
            self.draw_status(ui);
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| self.draw_transcript(ui, ctx));
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.session.close();
        log::info!("Desi-Scribe closing");
    }
}
