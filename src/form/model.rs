//! The shared form model.
//!
//! [`FormModel`] is written by three sources (keystrokes, dictation results
//! and image analysis) and read once per generation request through
//! [`FormModel::snapshot`].  A snapshot is the only way to obtain a
//! [`FormData`], so a request can never be built from half-empty input.

use serde::Serialize;
use thiserror::Error;

use super::language::{Format, Language};
use crate::config::FormDefaults;

/// Addressable form fields for [`FormModel::set_field`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Business,
    AdType,
    Description,
    Language,
    Format,
}

/// Local, pre-network failures.  Shown to the user as a prompt; nothing is
/// appended to the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a Business Name and Product Description!")]
    MissingRequired,

    #[error("Please choose an image to analyze.")]
    NoImageSelected,
}

/// Immutable, validated read of the form.  `business` and `description`
/// are trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormData {
    pub business: String,
    pub ad_type: String,
    pub description: String,
    pub language: Language,
    pub format: Format,
}

#[derive(Debug, Clone, Default)]
pub struct FormModel {
    business: String,
    ad_type: String,
    description: String,
    language: Language,
    format: Format,
    defaults: FormDefaults,
}

impl FormModel {
    pub fn new(defaults: FormDefaults) -> Self {
        Self {
            language: defaults.language,
            format: defaults.format,
            defaults,
            ..Self::default()
        }
    }

    /// Set a field from its textual value.
    ///
    /// Text fields take any value.  `Language` and `Format` must name an
    /// enumerated value; anything else is ignored and the previous value is
    /// kept.  Returns whether the value was applied.
    pub fn set_field(&mut self, field: Field, value: &str) -> bool {
        match field {
            Field::Business => self.business = value.to_string(),
            Field::AdType => self.ad_type = value.to_string(),
            Field::Description => self.description = value.to_string(),
            Field::Language => match value.parse() {
                Ok(lang) => self.language = lang,
                Err(e) => {
                    log::debug!("form: ignoring {e}");
                    return false;
                }
            },
            Field::Format => match value.parse() {
                Ok(fmt) => self.format = fmt,
                Err(e) => {
                    log::debug!("form: ignoring {e}");
                    return false;
                }
            },
        }
        true
    }

    /// Accumulate a dictated utterance into the description.
    ///
    /// ```
    /// use desi_scribe::form::FormModel;
    ///
    /// let mut form = FormModel::default();
    /// form.append_description("20% off");
    /// form.append_description("this weekend");
    /// assert_eq!(form.description(), "20% off this weekend");
    /// ```
    pub fn append_description(&mut self, text: &str) {
        if self.description.is_empty() {
            self.description = text.to_string();
        } else {
            self.description.push(' ');
            self.description.push_str(text);
        }
    }

    /// Fill business and description from an image analysis.
    pub fn prefill(&mut self, business: &str, description: &str) {
        self.business = business.trim().to_string();
        self.description = description.trim().to_string();
    }

    /// Clear the text fields and restore the default language and format.
    pub fn reset(&mut self) {
        *self = Self::new(self.defaults);
    }

    /// Validated, immutable read of the form.
    pub fn snapshot(&self) -> Result<FormData, ValidationError> {
        let business = self.business.trim();
        let description = self.description.trim();
        if business.is_empty() || description.is_empty() {
            return Err(ValidationError::MissingRequired);
        }
        Ok(FormData {
            business: business.to_string(),
            ad_type: self.ad_type.clone(),
            description: description.to_string(),
            language: self.language,
            format: self.format,
        })
    }

    pub fn business(&self) -> &str {
        &self.business
    }

    pub fn ad_type(&self) -> &str {
        &self.ad_type
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn set_format(&mut self, format: Format) {
        self.format = format;
    }

    // Text-edit bindings for the egui form.

    pub fn business_mut(&mut self) -> &mut String {
        &mut self.business
    }

    pub fn ad_type_mut(&mut self) -> &mut String {
        &mut self.ad_type
    }

    pub fn description_mut(&mut self) -> &mut String {
        &mut self.description
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> FormModel {
        let mut form = FormModel::default();
        form.set_field(Field::Business, "Chai House");
        form.set_field(Field::AdType, "Discount");
        form.set_field(Field::Description, "20% off");
        form.set_field(Field::Language, "Hindi");
        form.set_field(Field::Format, "Square");
        form
    }

    #[test]
    fn snapshot_of_complete_form() {
        let data = filled().snapshot().unwrap();
        assert_eq!(
            data,
            FormData {
                business: "Chai House".into(),
                ad_type: "Discount".into(),
                description: "20% off".into(),
                language: Language::Hindi,
                format: Format::Square,
            }
        );
    }

    #[test]
    fn snapshot_rejects_blank_business_or_description() {
        let mut form = filled();
        form.set_field(Field::Business, "   ");
        assert_eq!(form.snapshot(), Err(ValidationError::MissingRequired));

        let mut form = filled();
        form.set_field(Field::Description, "\t\n");
        assert_eq!(form.snapshot(), Err(ValidationError::MissingRequired));

        assert_eq!(
            FormModel::default().snapshot(),
            Err(ValidationError::MissingRequired)
        );
    }

    #[test]
    fn snapshot_trims_required_fields() {
        let mut form = filled();
        form.set_field(Field::Business, "  Chai House ");
        let data = form.snapshot().unwrap();
        assert_eq!(data.business, "Chai House");
    }

    /// Whatever sequence of writes happens, a snapshot is either complete
    /// or an error.
    #[test]
    fn snapshot_never_returns_partial_data() {
        let writes: [(Field, &str); 6] = [
            (Field::Business, ""),
            (Field::Description, "masala"),
            (Field::Business, " "),
            (Field::Business, "Chai"),
            (Field::Description, ""),
            (Field::Description, "tea"),
        ];
        let mut form = FormModel::default();
        for (field, value) in writes {
            form.set_field(field, value);
            match form.snapshot() {
                Ok(data) => {
                    assert!(!data.business.trim().is_empty());
                    assert!(!data.description.trim().is_empty());
                }
                Err(e) => assert_eq!(e, ValidationError::MissingRequired),
            }
        }
    }

    #[test]
    fn invalid_enum_values_are_ignored() {
        let mut form = filled();
        assert!(!form.set_field(Field::Language, "Klingon"));
        assert!(!form.set_field(Field::Format, "Banner"));
        assert_eq!(form.language(), Language::Hindi);
        assert_eq!(form.format(), Format::Square);
    }

    #[test]
    fn append_to_empty_has_no_leading_separator() {
        let mut form = FormModel::default();
        form.append_description("நல்ல");
        assert_eq!(form.description(), "நல்ல");
    }

    #[test]
    fn append_accumulates_in_order() {
        let mut form = FormModel::default();
        form.append_description("நல்ல");
        form.append_description("தேநீர்");
        assert_eq!(form.description(), "நல்ல தேநீர்");
    }

    #[test]
    fn reset_restores_configured_defaults() {
        let mut form = FormModel::new(FormDefaults {
            language: Language::French,
            format: Format::Story,
        });
        form.set_field(Field::Business, "Boulangerie");
        form.set_language(Language::German);
        form.reset();

        assert!(form.business().is_empty());
        assert_eq!(form.language(), Language::French);
        assert_eq!(form.format(), Format::Story);
    }

    #[test]
    fn prefill_sets_business_and_description() {
        let mut form = FormModel::default();
        form.prefill(" Spice Stall ", "a plate of samosas ");
        assert_eq!(form.business(), "Spice Stall");
        assert_eq!(form.description(), "a plate of samosas");
    }
}
