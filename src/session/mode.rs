//! Conversation mode controller.
//!
//! ```text
//! Closed ──open──▶ Selecting ──choose_manual──▶ ManualEntry
//!                      │  ▲
//!          choose_upload  cancel_upload
//!                      ▼  │
//!                 AwaitingUpload ──image_analyzed──▶ ManualEntry
//! any ──open──▶ Selecting        any ──close──▶ Closed
//! ```

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionMode {
    #[default]
    Closed,
    Selecting,
    ManualEntry,
    AwaitingUpload,
}

impl SessionMode {
    pub fn label(self) -> &'static str {
        match self {
            SessionMode::Closed => "Closed",
            SessionMode::Selecting => "Selecting",
            SessionMode::ManualEntry => "Manual entry",
            SessionMode::AwaitingUpload => "Awaiting upload",
        }
    }

    /// The form is rendered only while entering details.
    pub fn is_form_visible(self) -> bool {
        self == SessionMode::ManualEntry
    }

    pub fn is_selection_visible(self) -> bool {
        matches!(self, SessionMode::Selecting | SessionMode::AwaitingUpload)
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot {action} while {from}")]
pub struct TransitionError {
    pub from: SessionMode,
    pub action: &'static str,
}

/// Owns the current [`SessionMode`] and the session epoch.
///
/// The epoch advances on every `open` and `close`; requests remember the
/// epoch they were issued in so late answers from an earlier session can be
/// recognised.
#[derive(Debug, Clone, Default)]
pub struct ModeController {
    mode: SessionMode,
    epoch: u64,
}

impl ModeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn open(&mut self) {
        self.epoch += 1;
        self.set(SessionMode::Selecting);
    }

    pub fn close(&mut self) {
        self.epoch += 1;
        self.set(SessionMode::Closed);
    }

    pub fn choose_manual(&mut self) -> Result<(), TransitionError> {
        self.require(SessionMode::Selecting, "enter details")?;
        self.set(SessionMode::ManualEntry);
        Ok(())
    }

    pub fn choose_upload(&mut self) -> Result<(), TransitionError> {
        self.require(SessionMode::Selecting, "upload a photo")?;
        self.set(SessionMode::AwaitingUpload);
        Ok(())
    }

    pub fn cancel_upload(&mut self) -> Result<(), TransitionError> {
        self.require(SessionMode::AwaitingUpload, "cancel an upload")?;
        self.set(SessionMode::Selecting);
        Ok(())
    }

    /// Analysis finished, successfully or not.
    pub fn image_analyzed(&mut self) -> Result<(), TransitionError> {
        self.require(SessionMode::AwaitingUpload, "finish image analysis")?;
        self.set(SessionMode::ManualEntry);
        Ok(())
    }

    fn require(&self, expected: SessionMode, action: &'static str) -> Result<(), TransitionError> {
        if self.mode == expected {
            Ok(())
        } else {
            Err(TransitionError {
                from: self.mode,
                action,
            })
        }
    }

    fn set(&mut self, next: SessionMode) {
        if self.mode != next {
            log::debug!("session: {} → {}", self.mode, next);
        }
        self.mode = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_closed() {
        let m = ModeController::new();
        assert_eq!(m.mode(), SessionMode::Closed);
        assert_eq!(m.epoch(), 0);
    }

    #[test]
    fn manual_path() {
        let mut m = ModeController::new();
        m.open();
        m.choose_manual().unwrap();
        assert_eq!(m.mode(), SessionMode::ManualEntry);
        assert!(m.mode().is_form_visible());
    }

    #[test]
    fn upload_path_and_cancel() {
        let mut m = ModeController::new();
        m.open();
        m.choose_upload().unwrap();
        assert_eq!(m.mode(), SessionMode::AwaitingUpload);
        m.cancel_upload().unwrap();
        assert_eq!(m.mode(), SessionMode::Selecting);
        m.choose_upload().unwrap();
        m.image_analyzed().unwrap();
        assert_eq!(m.mode(), SessionMode::ManualEntry);
    }

    #[test]
    fn manual_entry_unreachable_from_closed() {
        let mut m = ModeController::new();
        let err = m.choose_manual().unwrap_err();
        assert_eq!(err.from, SessionMode::Closed);
        assert_eq!(m.mode(), SessionMode::Closed);
        assert!(m.image_analyzed().is_err());
        assert_eq!(m.mode(), SessionMode::Closed);
    }

    #[test]
    fn illegal_transition_leaves_state_unchanged() {
        let mut m = ModeController::new();
        m.open();
        m.choose_manual().unwrap();
        assert!(m.choose_upload().is_err());
        assert!(m.cancel_upload().is_err());
        assert_eq!(m.mode(), SessionMode::ManualEntry);
    }

    #[test]
    fn open_resets_from_any_mode() {
        let mut m = ModeController::new();
        m.open();
        m.choose_manual().unwrap();
        m.open();
        assert_eq!(m.mode(), SessionMode::Selecting);
        m.close();
        assert_eq!(m.mode(), SessionMode::Closed);
    }

    #[test]
    fn open_and_close_advance_epoch() {
        let mut m = ModeController::new();
        m.open();
        m.close();
        m.open();
        assert_eq!(m.epoch(), 3);
    }

    #[test]
    fn transition_error_message() {
        let err = TransitionError {
            from: SessionMode::Closed,
            action: "enter details",
        };
        assert_eq!(err.to_string(), "cannot enter details while Closed");
    }
}
