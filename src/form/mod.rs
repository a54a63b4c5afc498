//! Form model: the ad inputs shared by typing, dictation and image analysis.

pub mod language;
pub mod model;

pub use language::{Format, Language, ParseChoiceError};
pub use model::{Field, FormData, FormModel, ValidationError};

/// Tone presets offered next to the free-text ad type field.
pub const AD_TYPE_PRESETS: [&str; 5] = ["Catchy", "Professional", "Luxury", "Humorous", "Discount"];
