//! Generation service module.
//!
//! This module provides:
//! * [`GenerationService`]: async trait for the three backend calls.
//! * [`HttpGenerationService`]: reqwest implementation (JSON + multipart).
//! * [`RequestGuards`] / [`Action`]: per-action re-entrancy guards.
//! * Wire types ([`GenerationRequest`], [`ImageAnalysis`], [`Slogan`],
//!   [`Poster`]) and [`GenerationError`].
//!
//! # Quick start
//!
//! ```rust,no_run
//! use desi_scribe::config::ServiceConfig;
//! use desi_scribe::form::{Format, Language};
//! use desi_scribe::generation::{GenerationRequest, GenerationService, HttpGenerationService};
//!
//! #[tokio::main]
//! async fn main() {
//!     let service = HttpGenerationService::from_config(&ServiceConfig::default());
//!     let request = GenerationRequest {
//!         business_type: "Chai House".into(),
//!         ad_type: "Discount".into(),
//!         product_description: "20% off".into(),
//!         language: Language::Hindi,
//!         format: Format::Square,
//!     };
//!     match service.generate_slogan(&request).await {
//!         Ok(s) => println!("{}", s.slogan),
//!         Err(e) => eprintln!("{e}"),
//!     }
//! }
//! ```

pub mod api;
pub mod client;
pub mod guard;

pub use api::{
    parse_envelope, GenerationError, GenerationRequest, ImageAnalysis, ImageUpload, Poster,
    Slogan,
};
pub use client::{GenerationService, HttpGenerationService};
pub use guard::{Action, RequestGuards, RequestState};
