//! `GenerationService` trait and its reqwest implementation.
//!
//! All connection details come from [`ServiceConfig`]; nothing is
//! hardcoded.  Each call is a single attempt: no retries, no backoff.

use async_trait::async_trait;
use reqwest::multipart;

use super::api::{
    parse_envelope, GenerationError, GenerationRequest, ImageAnalysis, ImageUpload, Poster,
    Slogan,
};
use super::guard::Action;
use crate::config::ServiceConfig;

// ---------------------------------------------------------------------------
// GenerationService trait
// ---------------------------------------------------------------------------

/// The remote generation backend.
///
/// Implementors must be `Send + Sync` so they can be held behind an
/// `Arc<dyn GenerationService>` and called from tokio tasks.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn analyze_image(&self, image: ImageUpload) -> Result<ImageAnalysis, GenerationError>;

    async fn generate_slogan(&self, request: &GenerationRequest)
        -> Result<Slogan, GenerationError>;

    async fn generate_poster(&self, request: &GenerationRequest)
        -> Result<Poster, GenerationError>;
}

// ---------------------------------------------------------------------------
// HttpGenerationService
// ---------------------------------------------------------------------------

pub struct HttpGenerationService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGenerationService {
    /// Build the client with the per-request timeout from `config`.  Falls
    /// back to a default client if the builder fails.
    pub fn from_config(config: &ServiceConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `GET /` liveness probe.  Returns the backend's banner message.
    pub async fn probe(&self) -> Result<String, GenerationError> {
        let response = self.client.get(self.url("/")).send().await?;
        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GenerationError::Transport(format!("malformed response: {e}")))?;
        match json["status"].as_str() {
            Some("active") => Ok(json["message"].as_str().unwrap_or("active").to_string()),
            _ => Err(GenerationError::Service(
                json["error"].as_str().map(str::to_string),
            )),
        }
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        action: Action,
        request: &GenerationRequest,
    ) -> Result<T, GenerationError> {
        log::debug!("generation: POST {}", action.path());
        let response = self
            .client
            .post(self.url(action.path()))
            .json(request)
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            log::warn!("generation: {} answered {status}", action.path());
        }
        parse_envelope(&body)
    }
}

#[async_trait]
impl GenerationService for HttpGenerationService {
    async fn analyze_image(&self, image: ImageUpload) -> Result<ImageAnalysis, GenerationError> {
        log::debug!(
            "generation: POST {} ({} bytes, {})",
            Action::AnalyzeImage.path(),
            image.bytes.len(),
            image.mime
        );
        let part = multipart::Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.mime)?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.url(Action::AnalyzeImage.path()))
            .multipart(form)
            .send()
            .await?;
        let body = response.bytes().await?;
        parse_envelope(&body)
    }

    async fn generate_slogan(
        &self,
        request: &GenerationRequest,
    ) -> Result<Slogan, GenerationError> {
        self.post_json(Action::GenerateSlogan, request).await
    }

    async fn generate_poster(
        &self,
        request: &GenerationRequest,
    ) -> Result<Poster, GenerationError> {
        self.post_json(Action::GeneratePoster, request).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
