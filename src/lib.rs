//! Desi-Scribe, a conversational ad-copy client.
//!
//! The crate is split along the seams of the chat window:
//!
//! * [`form`]      : the shared form model (business, ad type, description,
//!   language, format) and its validation.
//! * [`transcript`]: the append-only chat log and poster downloads.
//! * [`session`]   : the mode controller, the [`session::Session`] aggregate
//!   and the runner that dispatches requests onto tokio.
//! * [`dictation`] : capability-gated speech dictation (cpal + Whisper).
//! * [`generation`]: the remote generation service contract and its
//!   reqwest client.
//! * [`config`]    : TOML settings and platform paths.
//! * [`app`]       : the eframe/egui front end.

pub mod app;
pub mod config;
pub mod dictation;
pub mod form;
pub mod generation;
pub mod session;
pub mod transcript;
