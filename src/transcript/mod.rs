//! Append-only chat transcript.
//!
//! Entries are created for every user action and every completed or failed
//! request, and are never edited afterwards.  The only way to remove entries
//! is [`TranscriptLog::reset`], which the session calls when the chat window
//! is reopened.

pub mod download;

pub use download::{decode_data_url, download_file_name, save_image, ImageSaveError};

/// First seed entry after every reset.
pub const GREETING: &str = "Hi! Pick a language & start! 👇";

/// Second seed entry; the selection controls render beneath it.
pub const SELECTION_PROMPT: &str = "✍️ Enter Details or 📸 Upload Photo";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Text,
    /// `payload` is an image URL (a `data:` URL from the poster endpoint).
    Image,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    role: Role,
    kind: EntryKind,
    payload: String,
}

impl TranscriptEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            kind: EntryKind::Text,
            payload: text.into(),
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            kind: EntryKind::Text,
            payload: text.into(),
        }
    }

    pub fn system_image(url: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            kind: EntryKind::Image,
            payload: url.into(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }
}

#[derive(Debug, Clone, Default)]
pub struct TranscriptLog {
    entries: Vec<TranscriptEntry>,
}

impl TranscriptLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: TranscriptEntry) {
        log::trace!("transcript: {:?} {:?}", entry.role, entry.payload);
        self.entries.push(entry);
    }

    /// Drop everything and reseed with the greeting and selection prompt.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.entries.push(TranscriptEntry::system(GREETING));
        self.entries.push(TranscriptEntry::system(SELECTION_PROMPT));
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    /// Payloads in display order.
    pub fn payloads(&self) -> Vec<&str> {
        self.entries.iter().map(TranscriptEntry::payload).collect()
    }
}
