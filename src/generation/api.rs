//! Wire types for the generation service.
//!
//! Every endpoint answers with the same envelope: a `status` field that is
//! either `"success"` (the payload fields sit next to it) or anything else,
//! in which case an optional `error` string explains why.
//!
//! ```text
//! {"status": "success", "slogan": "..."}
//! {"status": "error",   "error":  "blurry image"}
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::form::{Format, FormData, Language};

// ---------------------------------------------------------------------------
// GenerationError
// ---------------------------------------------------------------------------

/// Remote failures.  Neither is fatal; the action is re-armed either way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The service answered with a non-success envelope.  Carries its
    /// `error` text when present.
    #[error("service error: {}", .0.as_deref().unwrap_or("unspecified"))]
    Service(Option<String>),

    /// The service could not be reached, timed out, or answered with
    /// something that is not an envelope.
    #[error("network error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GenerationError::Transport("request timed out".into())
        } else {
            GenerationError::Transport(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// JSON body shared by `/generate-slogan` and `/generate-poster`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    pub business_type: String,
    pub ad_type: String,
    pub product_description: String,
    pub language: Language,
    pub format: Format,
}

impl From<FormData> for GenerationRequest {
    fn from(data: FormData) -> Self {
        Self {
            business_type: data.business,
            ad_type: data.ad_type,
            product_description: data.description,
            language: data.language,
            format: data.format,
        }
    }
}

/// An image picked for `/analyze-image`, sent as the multipart field `file`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Read an image from disk, guessing its MIME type from the extension.
    pub async fn read(path: &std::path::Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".into());
        let mime = guess_mime(&file_name).to_string();
        Ok(Self {
            file_name,
            mime,
            bytes,
        })
    }
}

fn guess_mime(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// `/analyze-image` success payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImageAnalysis {
    pub business_type: String,
    pub description: String,
    #[serde(default)]
    pub tone: Option<String>,
}

/// `/generate-slogan` success payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Slogan {
    pub slogan: String,
}

/// `/generate-poster` success payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Poster {
    pub slogan: String,
    pub image_url: String,
}

/// Decode an envelope body into its success payload.
///
/// The HTTP status is not consulted: the backend reports logical failures
/// as `500` with an error envelope, and those must surface as
/// [`GenerationError::Service`].
pub fn parse_envelope<T: DeserializeOwned>(body: &[u8]) -> Result<T, GenerationError> {
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| GenerationError::Transport(format!("malformed response: {e}")))?;

    let Some(obj) = value.as_object() else {
        return Err(GenerationError::Transport(
            "malformed response: expected a JSON object".into(),
        ));
    };

    if obj.get("status").and_then(|s| s.as_str()) == Some("success") {
        serde_json::from_value(value)
            .map_err(|e| GenerationError::Transport(format!("malformed response: {e}")))
    } else {
        let error = obj
            .get("error")
            .and_then(|e| e.as_str())
            .map(str::to_string);
        Err(GenerationError::Service(error))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
