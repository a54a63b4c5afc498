//! Conversation session: mode controller, session aggregate and the
//! request runner that connects it to the generation service.
//!
//! The egui update loop owns one [`Session`].  Each frame it drains
//! dictation events and request completions into it, then renders from
//! it.

pub mod mode;
pub mod runner;
pub mod state;

pub use mode::{ModeController, SessionMode, TransitionError};
pub use runner::{drain_completions, execute, RequestRunner, COMPLETION_CAPACITY};
pub use state::{Completion, Job, Outcome, PendingRequest, Session, ANALYSIS_BUSY};
