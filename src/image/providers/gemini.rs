//! Gemini (Google) image generation provider.

use crate::error::{
    parse_retry_after, sanitize_error_message, GreetVizError, Result, ENTITY_NOT_FOUND,
};
use crate::image::provider::ImageProvider;
use crate::image::types::{GeneratedImage, GenerationMetadata, GenerationRequest, ImageFormat};
use crate::session::ApiKeyStore;
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Default REST endpoint of the Gemini API.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Environment variable the key falls back to.
const API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Gemini image model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GeminiModel {
    /// Gemini 2.5 Flash Image (fast, economical, no resolution tiers).
    Flash,
    /// Gemini 3 Pro Image (highest quality).
    #[default]
    Pro,
}

impl GeminiModel {
    /// Returns the API model identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flash => "gemini-2.5-flash-image",
            Self::Pro => "gemini-3-pro-image-preview",
        }
    }

    /// Whether the model accepts an `imageSize` tier.
    pub fn supports_image_size(&self) -> bool {
        matches!(self, Self::Pro)
    }
}

impl std::str::FromStr for GeminiModel {
    type Err = GreetVizError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pro" | "gemini-3-pro-image-preview" => Ok(Self::Pro),
            "flash" | "gemini-2.5-flash-image" => Ok(Self::Flash),
            other => Err(GreetVizError::InvalidRequest(format!(
                "unknown Gemini model: {other}"
            ))),
        }
    }
}

/// Builder for GeminiProvider.
#[derive(Debug, Clone, Default)]
pub struct GeminiProviderBuilder {
    api_key: Option<String>,
    keys: Option<ApiKeyStore>,
    api_base: Option<String>,
    model: GeminiModel,
}

impl GeminiProviderBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `GOOGLE_API_KEY` env var.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Reads the key from a shared store at every request, so a key selected
    /// after the provider was built is picked up.
    pub fn key_store(mut self, keys: ApiKeyStore) -> Self {
        self.keys = Some(keys);
        self
    }

    /// Overrides the REST endpoint (proxies, regional gateways).
    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = Some(base.into());
        self
    }

    /// Sets the Gemini model variant.
    pub fn model(mut self, model: GeminiModel) -> Self {
        self.model = model;
        self
    }

    /// Builds the provider, resolving the API key.
    pub fn build(self) -> Result<GeminiProvider> {
        let keys = match (self.keys, self.api_key) {
            (Some(keys), _) => keys,
            (None, Some(key)) => ApiKeyStore::with_key(key),
            (None, None) => {
                let key = std::env::var(API_KEY_ENV).map_err(|_| {
                    GreetVizError::Auth("GOOGLE_API_KEY not set and no API key provided".into())
                })?;
                ApiKeyStore::with_key(key)
            }
        };

        Ok(GeminiProvider {
            client: reqwest::Client::new(),
            keys,
            api_base: self
                .api_base
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: self.model,
        })
    }
}

/// Gemini image generation provider.
pub struct GeminiProvider {
    client: reqwest::Client,
    keys: ApiKeyStore,
    api_base: String,
    model: GeminiModel,
}

impl GeminiProvider {
    /// Creates a new `GeminiProviderBuilder`.
    pub fn builder() -> GeminiProviderBuilder {
        GeminiProviderBuilder::new()
    }

    /// Returns the model this provider talks to.
    pub fn model(&self) -> GeminiModel {
        self.model
    }

    async fn api_key(&self) -> Result<String> {
        self.keys
            .get()
            .await
            .ok_or_else(|| GreetVizError::KeyRejected("no API key selected".into()))
    }

    async fn generate_impl(&self, request: &GenerationRequest) -> Result<GeneratedImage> {
        let start = Instant::now();
        let api_key = self.api_key().await?;

        let url = format!(
            "{}/models/{}:generateContent",
            self.api_base,
            self.model.as_str(),
        );

        let body = GeminiRequest::from_generation_request(request, self.model);

        tracing::debug!(
            model = self.model.as_str(),
            edit = request.is_edit(),
            "sending Gemini image request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(parse_error(status.as_u16(), &text, &headers));
        }

        let gemini_response: GeminiResponse = response.json().await?;
        let inline_data = gemini_response.into_first_image()?;

        let duration_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(duration_ms, "Gemini image request complete");

        let format = ImageFormat::from_mime_type(&inline_data.mime_type).unwrap_or_default();

        GeneratedImage::from_base64(
            &inline_data.data,
            format,
            GenerationMetadata {
                model: Some(self.model.as_str().to_string()),
                duration_ms: Some(duration_ms),
            },
        )
    }
}

fn parse_error(status: u16, text: &str, headers: &reqwest::header::HeaderMap) -> GreetVizError {
    let message = extract_error_message(text);
    if message.contains(ENTITY_NOT_FOUND) {
        return GreetVizError::KeyRejected(message);
    }
    if status == 402 {
        return GreetVizError::Billing(
            "Gemini billing issue: enable billing at https://ai.google.dev/gemini-api/docs/billing"
                .into(),
        );
    }
    if status == 404 {
        return GreetVizError::InvalidRequest(
            "Model not found. Verify the model name is correct.".into(),
        );
    }
    if status == 429 {
        let retry_after = parse_retry_after(headers).map(std::time::Duration::from_secs);
        return GreetVizError::RateLimited { retry_after };
    }
    if status == 401 || status == 403 {
        return GreetVizError::Auth(message);
    }
    let lower = message.to_lowercase();
    if lower.contains("safety")
        || lower.contains("blocked")
        || lower.contains("content_policy")
        || lower.contains("prohibited")
    {
        return GreetVizError::ContentBlocked(message);
    }
    GreetVizError::Api { status, message }
}

/// Pulls `error.message` out of a Google API error body, falling back to
/// the raw text.
fn extract_error_message(text: &str) -> String {
    let message = serde_json::from_str::<GeminiErrorBody>(text)
        .ok()
        .and_then(|body| body.error.message)
        .unwrap_or_else(|| text.to_string());
    sanitize_error_message(&message)
}

#[async_trait]
impl ImageProvider for GeminiProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedImage> {
        self.generate_impl(request).await
    }

    fn name(&self) -> &str {
        "Gemini (Google)"
    }

    async fn health_check(&self) -> Result<()> {
        let api_key = self.api_key().await?;
        let url = format!("{}/models/{}", self.api_base, self.model.as_str());

        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &api_key)
            .send()
            .await?;

        let status = response.status().as_u16();
        if (200..300).contains(&status) {
            return Ok(());
        }
        let headers = response.headers().clone();
        let text = response.text().await.unwrap_or_default();
        Err(parse_error(status, &text, &headers))
    }
}

// Request/Response types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiRequestPart>,
}

/// A part in a Gemini request - can be text or inline image data.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiRequestPart {
    Text {
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    InlineData {
        inline_data: GeminiInlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiConfig {
    response_modalities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_config: Option<GeminiImageConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiImageConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    aspect_ratio: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_size: Option<&'static str>,
}

impl GeminiRequest {
    fn from_generation_request(req: &GenerationRequest, model: GeminiModel) -> Self {
        let mut parts = Vec::new();

        // Image goes first so the instruction reads as being about it.
        if let Some(ref image_data) = req.input_image {
            let mime_type = ImageFormat::from_magic_bytes(image_data)
                .unwrap_or_default()
                .mime_type()
                .to_string();

            parts.push(GeminiRequestPart::InlineData {
                inline_data: GeminiInlineData {
                    mime_type,
                    data: base64::engine::general_purpose::STANDARD.encode(image_data),
                },
            });
        }

        parts.push(GeminiRequestPart::Text {
            text: req.prompt.clone(),
        });

        let aspect_ratio = req.aspect_ratio.map(|r| r.as_str());
        let image_size = req
            .image_size
            .filter(|_| model.supports_image_size())
            .map(|s| s.as_str());
        let image_config = (aspect_ratio.is_some() || image_size.is_some()).then_some(
            GeminiImageConfig {
                aspect_ratio,
                image_size,
            },
        );

        Self {
            contents: vec![GeminiContent { parts }],
            generation_config: GeminiConfig {
                response_modalities: vec!["IMAGE".to_string()],
                image_config,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

impl GeminiResponse {
    /// Takes the first inline image of the first candidate.
    fn into_first_image(self) -> Result<InlineData> {
        // Blocked prompts come back as HTTP 200 with feedback.
        if let Some(ref feedback) = self.prompt_feedback {
            if let Some(ref reason) = feedback.block_reason {
                let msg = feedback
                    .block_reason_message
                    .clone()
                    .unwrap_or_else(|| format!("Prompt blocked: {}", reason));
                return Err(GreetVizError::ContentBlocked(msg));
            }
        }

        let candidate = self.candidates.into_iter().next().ok_or_else(|| {
            GreetVizError::UnexpectedResponse("No candidates returned from Gemini".into())
        })?;

        if let Some(ref finish_reason) = candidate.finish_reason {
            match finish_reason.as_str() {
                "SAFETY"
                | "IMAGE_SAFETY"
                | "IMAGE_PROHIBITED_CONTENT"
                | "IMAGE_RECITATION"
                | "RECITATION"
                | "PROHIBITED_CONTENT"
                | "BLOCKLIST" => {
                    return Err(GreetVizError::ContentBlocked(format!(
                        "Content blocked by Gemini safety filter: {}",
                        finish_reason
                    )));
                }
                _ => {}
            }
        }

        candidate
            .content
            .into_iter()
            .flat_map(|content| content.parts)
            .find_map(|p| p.inline_data)
            .ok_or_else(|| {
                GreetVizError::UnexpectedResponse("No image data returned from Gemini".into())
            })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContentResponse>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
    #[serde(default)]
    block_reason_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPartResponse {
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    #[serde(default)]
    message: Option<String>,
}
