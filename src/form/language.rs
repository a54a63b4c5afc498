//! Target languages and output formats.
//!
//! Both enums travel over the wire by their canonical name (`"Hindi"`,
//! `"Square"`), which is also how they are stored in `settings.toml`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned when a string names no known [`Language`] or [`Format`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value:?}")]
pub struct ParseChoiceError {
    pub kind: &'static str,
    pub value: String,
}

// ---------------------------------------------------------------------------
// Language
// ---------------------------------------------------------------------------

/// Language the slogan and poster are written in.  Also selects the
/// dictation locale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[default]
    English,
    Hindi,
    Spanish,
    French,
    German,
    Tamil,
    Marathi,
}

impl Language {
    pub const ALL: [Language; 7] = [
        Language::English,
        Language::Hindi,
        Language::Spanish,
        Language::French,
        Language::German,
        Language::Tamil,
        Language::Marathi,
    ];

    /// Canonical name sent to the generation service.
    pub fn name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "Hindi",
            Language::Spanish => "Spanish",
            Language::French => "French",
            Language::German => "German",
            Language::Tamil => "Tamil",
            Language::Marathi => "Marathi",
        }
    }

    /// Label shown in the language picker.
    pub fn label(self) -> &'static str {
        match self {
            Language::Hindi => "Hindi (हिंदी)",
            other => other.name(),
        }
    }

    /// BCP-47 locale handed to the speech recognizer.
    ///
    /// ```
    /// use desi_scribe::form::Language;
    ///
    /// assert_eq!(Language::English.locale(), "en-US");
    /// assert_eq!(Language::Tamil.locale(), "ta-IN");
    /// ```
    pub fn locale(self) -> &'static str {
        match self {
            Language::English => "en-US",
            Language::Hindi => "hi-IN",
            Language::Spanish => "es-ES",
            Language::French => "fr-FR",
            Language::German => "de-DE",
            Language::Tamil => "ta-IN",
            Language::Marathi => "mr-IN",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = ParseChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|lang| lang.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseChoiceError {
                kind: "language",
                value: s.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Format
// ---------------------------------------------------------------------------

/// Poster layout requested from the generation service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Format {
    /// 1:1 feed post.
    #[default]
    Square,
    /// 9:16 story.
    Story,
}

impl Format {
    pub const ALL: [Format; 2] = [Format::Square, Format::Story];

    pub fn name(self) -> &'static str {
        match self {
            Format::Square => "Square",
            Format::Story => "Story",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Format::Square => "Square (1:1)",
            Format::Story => "Story (9:16)",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Format {
    type Err = ParseChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Format::ALL
            .into_iter()
            .find(|fmt| fmt.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseChoiceError {
                kind: "format",
                value: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locale_table() {
        let expected = [
            (Language::English, "en-US"),
            (Language::Hindi, "hi-IN"),
            (Language::Spanish, "es-ES"),
            (Language::French, "fr-FR"),
            (Language::German, "de-DE"),
            (Language::Tamil, "ta-IN"),
            (Language::Marathi, "mr-IN"),
        ];
        for (lang, locale) in expected {
            assert_eq!(lang.locale(), locale, "{lang}");
        }
    }

    #[test]
    fn parse_is_case_insensitive_and_trims() {
        assert_eq!(" hindi ".parse::<Language>(), Ok(Language::Hindi));
        assert_eq!("STORY".parse::<Format>(), Ok(Format::Story));
    }

    #[test]
    fn parse_rejects_unknown_values() {
        let err = "Portrait".parse::<Format>().unwrap_err();
        assert_eq!(err.kind, "format");
        assert!(err.to_string().contains("Portrait"));
    }

    #[test]
    fn wire_names_match_serde() {
        assert_eq!(serde_json::to_string(&Language::Marathi).unwrap(), "\"Marathi\"");
        assert_eq!(serde_json::to_string(&Format::Square).unwrap(), "\"Square\"");
    }
}
