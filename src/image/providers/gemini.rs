//! Gemini (Google) image generation provider.

use crate::error::{parse_retry_after, redact, sanitize_error_message, Result, StudioError};
use crate::image::provider::ImageProvider;
use crate::image::resource::ImageResource;
use crate::image::types::GenerationRequest;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Default endpoint for the Generative Language API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Environment variables searched for an API key, in order.
pub const API_KEY_ENV_VARS: [&str; 3] = ["GOOGLE_API_KEY", "GEMINI_API_KEY", "API_KEY"];

/// Gemini image model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GeminiModel {
    /// Nano Banana - Gemini 2.5 Flash Image (fast, economical).
    #[default]
    NanoBanana,
    /// Nano Banana Pro (highest quality).
    NanoBananaPro,
}

impl GeminiModel {
    /// Returns the API model identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NanoBanana => "gemini-2.5-flash-image",
            Self::NanoBananaPro => "nano-banana-pro-preview",
        }
    }
}

impl std::str::FromStr for GeminiModel {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "gemini-2.5-flash-image" | "nano-banana" => Ok(Self::NanoBanana),
            "nano-banana-pro-preview" | "nano-banana-pro" => Ok(Self::NanoBananaPro),
            other => Err(StudioError::InvalidRequest(format!(
                "unknown Gemini image model '{other}'"
            ))),
        }
    }
}

/// Builder for GeminiProvider.
#[derive(Debug, Clone, Default)]
pub struct GeminiProviderBuilder {
    api_key: Option<String>,
    model: GeminiModel,
    base_url: Option<String>,
}

impl GeminiProviderBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `GOOGLE_API_KEY`, `GEMINI_API_KEY`, then `API_KEY`.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the Gemini model variant.
    pub fn model(mut self, model: GeminiModel) -> Self {
        self.model = model;
        self
    }

    /// Overrides the API endpoint (e.g. for a proxy).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Builds the provider, resolving the API key.
    pub fn build(self) -> Result<GeminiProvider> {
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .or_else(|| {
                API_KEY_ENV_VARS
                    .iter()
                    .find_map(|var| std::env::var(var).ok().filter(|k| !k.trim().is_empty()))
            })
            .ok_or_else(|| {
                StudioError::Auth(format!(
                    "no API key provided and none of {} is set",
                    API_KEY_ENV_VARS.join(", ")
                ))
            })?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(GeminiProvider {
            client: reqwest::Client::new(),
            api_key,
            model: self.model,
            base_url,
        })
    }
}

/// Gemini image generation provider.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    model: GeminiModel,
    base_url: String,
}

impl GeminiProvider {
    /// Creates a new `GeminiProviderBuilder`.
    pub fn builder() -> GeminiProviderBuilder {
        GeminiProviderBuilder::new()
    }

    /// The model this provider generates with.
    pub fn model(&self) -> GeminiModel {
        self.model
    }

    async fn generate_impl(&self, request: &GenerationRequest) -> Result<ImageResource> {
        let start = Instant::now();

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url,
            self.model.as_str(),
        );

        let body = GeminiRequest::from_generation_request(request);
        tracing::debug!(
            model = self.model.as_str(),
            aspect_ratio = %request.aspect_ratio,
            "submitting Gemini image generation request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(self.parse_error(status.as_u16(), &text, &headers));
        }

        let gemini_response: GeminiResponse = response.json().await?;
        let image = image_from_response(gemini_response)?;

        tracing::debug!(
            duration_ms = start.elapsed().as_millis() as u64,
            "Gemini image generation complete"
        );
        Ok(image)
    }

    fn parse_error(
        &self,
        status: u16,
        text: &str,
        headers: &reqwest::header::HeaderMap,
    ) -> StudioError {
        let text = redact(&sanitize_error_message(text), &self.api_key);
        map_status_error(status, text, headers)
    }
}

fn map_status_error(
    status: u16,
    text: String,
    headers: &reqwest::header::HeaderMap,
) -> StudioError {
    let or_hint = |hint: &str| {
        if text.is_empty() {
            hint.to_string()
        } else {
            text.clone()
        }
    };
    if status == 402 {
        return StudioError::Billing(or_hint(
            "Gemini billing issue: enable billing at https://aistudio.google.com",
        ));
    }
    if status == 404 {
        return StudioError::Api {
            status,
            message: or_hint("Model not found. Verify the model name is correct."),
        };
    }
    if status == 429 {
        let retry_after = parse_retry_after(headers).map(std::time::Duration::from_secs);
        return StudioError::RateLimited {
            retry_after,
            message: or_hint("quota exceeded"),
        };
    }
    if status == 401 || status == 403 {
        return StudioError::Auth(text);
    }
    let lower = text.to_lowercase();
    if lower.contains("safety")
        || lower.contains("blocked")
        || lower.contains("content_policy")
        || lower.contains("prohibited")
    {
        return StudioError::ContentBlocked(text);
    }
    StudioError::Api {
        status,
        message: text,
    }
}

/// Turns a successful (HTTP 200) response into an image or an error.
fn image_from_response(response: GeminiResponse) -> Result<ImageResource> {
    // Blocks are reported with HTTP 200
    if let Some(ref feedback) = response.prompt_feedback {
        if let Some(ref reason) = feedback.block_reason {
            let msg = feedback
                .block_reason_message
                .clone()
                .unwrap_or_else(|| format!("Prompt blocked: {}", reason));
            return Err(StudioError::ContentBlocked(msg));
        }
    }

    let candidate = response.candidates.into_iter().next().ok_or_else(|| {
        StudioError::NoImageProduced("No candidates in Gemini response".into())
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
                return Err(StudioError::ContentBlocked(format!(
                    "Content blocked by Gemini safety filter: {}",
                    finish_reason
                )));
            }
            "IMAGE_OTHER" | "NO_IMAGE" => {
                return Err(StudioError::NoImageProduced(format!(
                    "Generation failed: {}. Try a different prompt.",
                    finish_reason
                )));
            }
            _ => {} // STOP, MAX_TOKENS, etc. are normal
        }
    }

    let content = candidate.content.ok_or_else(|| {
        StudioError::NoImageProduced("No content in Gemini candidate".into())
    })?;

    extract_image(&content.parts).ok_or_else(|| {
        StudioError::NoImageProduced("No image data in Gemini response".into())
    })
}

/// Returns the first part carrying an inline image payload, as a data URI.
///
/// Parts without inline data (text commentary and the like) are skipped.
pub fn extract_image(parts: &[ResponsePart]) -> Option<ImageResource> {
    parts.iter().find_map(|part| {
        part.inline_data
            .as_ref()
            .and_then(|inline| ImageResource::from_inline(&inline.mime_type, &inline.data))
    })
}

#[async_trait]
impl ImageProvider for GeminiProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<ImageResource> {
        self.generate_impl(request).await
    }

    fn name(&self) -> &str {
        "Gemini (Google)"
    }

    async fn health_check(&self) -> Result<()> {
        let url = format!("{}/v1beta/models/{}", self.base_url, self.model.as_str());

        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let headers = response.headers().clone();
        let text = response.text().await.unwrap_or_default();
        Err(self.parse_error(status.as_u16(), &text, &headers))
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

#[derive(Debug, Serialize)]
struct GeminiRequestPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiConfig {
    response_modalities: Vec<String>,
    image_config: GeminiImageConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiImageConfig {
    aspect_ratio: String,
}

impl GeminiRequest {
    fn from_generation_request(req: &GenerationRequest) -> Self {
        Self {
            contents: vec![GeminiContent {
                parts: vec![GeminiRequestPart {
                    text: req.instruction(),
                }],
            }],
            generation_config: GeminiConfig {
                response_modalities: vec!["IMAGE".to_string()],
                image_config: GeminiImageConfig {
                    aspect_ratio: req.aspect_ratio.as_str().to_string(),
                },
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
    parts: Vec<ResponsePart>,
}

/// One part of a Gemini response candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePart {
    /// Text commentary, if the model produced any.
    #[serde(default)]
    pub text: Option<String>,
    /// Inline binary payload.
    #[serde(default)]
    pub inline_data: Option<InlineData>,
}

/// Base64 payload carried inline in a response part.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    /// MIME type of the payload.
    #[serde(default)]
    pub mime_type: String,
    /// Base64-encoded bytes.
    #[serde(default)]
    pub data: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use crate::image::types::AspectRatio;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn text_part(text: &str) -> ResponsePart {
        ResponsePart {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    fn image_part(mime: &str, data: &str) -> ResponsePart {
        ResponsePart {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime.into(),
                data: data.into(),
            }),
        }
    }

    #[test]
    fn test_gemini_model_as_str() {
        assert_eq!(GeminiModel::NanoBanana.as_str(), "gemini-2.5-flash-image");
        assert_eq!(
            GeminiModel::NanoBananaPro.as_str(),
            "nano-banana-pro-preview"
        );
    }

    #[test]
    fn test_gemini_model_default() {
        assert_eq!(GeminiModel::default(), GeminiModel::NanoBanana);
        assert_eq!(
            "nano-banana-pro".parse::<GeminiModel>().unwrap(),
            GeminiModel::NanoBananaPro
        );
        assert!("dall-e-3".parse::<GeminiModel>().is_err());
    }

    #[test]
    fn test_builder_with_explicit_key() {
        let provider = GeminiProviderBuilder::new()
            .api_key("test-key")
            .model(GeminiModel::NanoBananaPro)
            .base_url("http://localhost:9999/")
            .build()
            .unwrap();
        assert_eq!(provider.model(), GeminiModel::NanoBananaPro);
        assert_eq!(provider.base_url, "http://localhost:9999");
        assert_eq!(provider.name(), "Gemini (Google)");
    }

    #[test]
    fn test_request_carries_instruction_and_ratio() {
        let req = GenerationRequest::new("a red fox in snow")
            .with_style_suffix(", oil painting style")
            .with_aspect_ratio(AspectRatio::Landscape);
        let gemini_req = GeminiRequest::from_generation_request(&req);

        assert_eq!(gemini_req.contents.len(), 1);
        assert_eq!(gemini_req.contents[0].parts.len(), 1);
        assert_eq!(
            gemini_req.contents[0].parts[0].text,
            "a red fox in snow, oil painting style"
        );
        assert_eq!(gemini_req.generation_config.image_config.aspect_ratio, "16:9");
    }

    #[test]
    fn test_request_serialization_uses_camel_case() {
        let req = GenerationRequest::new("A puppy").with_aspect_ratio(AspectRatio::Portrait);
        let gemini_req = GeminiRequest::from_generation_request(&req);
        let json = serde_json::to_value(&gemini_req).unwrap();

        assert_eq!(
            json["generationConfig"]["imageConfig"]["aspectRatio"],
            "9:16"
        );
        assert_eq!(json["generationConfig"]["responseModalities"][0], "IMAGE");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "A puppy");
        assert!(json.get("generation_config").is_none());
    }

    #[test]
    fn test_extract_image_skips_text_parts() {
        let parts = vec![
            text_part("Here is your image"),
            image_part("image/png", "iVBORw0KGgo="),
            image_part("image/jpeg", "/9j/"),
        ];
        let image = extract_image(&parts).unwrap();
        assert_eq!(image.as_str(), "data:image/png;base64,iVBORw0KGgo=");
    }

    #[test]
    fn test_extract_image_none_without_payload() {
        assert!(extract_image(&[]).is_none());
        assert!(extract_image(&[text_part("sorry")]).is_none());
        assert!(extract_image(&[image_part("image/png", "")]).is_none());
    }

    #[test]
    fn test_extract_image_skips_empty_inline_payload() {
        let parts = vec![image_part("image/png", ""), image_part("image/webp", "UklGR")];
        let image = extract_image(&parts).unwrap();
        assert_eq!(image.as_str(), "data:image/webp;base64,UklGR");
    }

    #[test]
    fn test_response_with_image() {
        let json = r#"{
            "candidates": [{
                "content": {
                    "parts": [
                        {"text": "A fox, as requested."},
                        {"inlineData": {"mimeType": "image/png", "data": "iVBORw0KGgo="}}
                    ]
                },
                "finishReason": "STOP"
            }]
        }"#;
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        let image = image_from_response(resp).unwrap();
        assert_eq!(image.as_str(), "data:image/png;base64,iVBORw0KGgo=");
    }

    #[test]
    fn test_response_text_only_is_no_image() {
        let json = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "I can't draw that."}]},
                "finishReason": "STOP"
            }]
        }"#;
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        let err = image_from_response(resp).unwrap_err();
        assert_eq!(err.kind(), FailureKind::NoImageProduced);
    }

    #[test]
    fn test_response_without_candidates_is_no_image() {
        let resp: GeminiResponse = serde_json::from_str("{}").unwrap();
        let err = image_from_response(resp).unwrap_err();
        assert!(matches!(err, StudioError::NoImageProduced(_)));
    }

    #[test]
    fn test_response_no_image_finish_reason() {
        let json = r#"{"candidates": [{"finishReason": "NO_IMAGE"}]}"#;
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        let err = image_from_response(resp).unwrap_err();
        assert_eq!(err.kind(), FailureKind::NoImageProduced);
    }

    #[test]
    fn test_response_with_prompt_feedback_block() {
        let json = r#"{
            "candidates": [],
            "promptFeedback": {
                "blockReason": "SAFETY",
                "blockReasonMessage": "Prompt was blocked due to safety"
            }
        }"#;
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        let err = image_from_response(resp).unwrap_err();
        assert_eq!(
            err.to_string(),
            "content blocked: Prompt was blocked due to safety"
        );
        assert_eq!(err.kind(), FailureKind::UpstreamFailure);
    }

    #[test]
    fn test_response_safety_finish_reason() {
        let json = r#"{"candidates": [{"finishReason": "IMAGE_SAFETY"}]}"#;
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        let err = image_from_response(resp).unwrap_err();
        assert!(matches!(err, StudioError::ContentBlocked(_)));
    }

    #[test]
    fn test_status_error_mapping() {
        let headers = reqwest::header::HeaderMap::new();
        assert!(matches!(
            map_status_error(401, "bad key".into(), &headers),
            StudioError::Auth(_)
        ));
        assert!(matches!(
            map_status_error(403, "denied".into(), &headers),
            StudioError::Auth(_)
        ));
        assert!(matches!(
            map_status_error(402, String::new(), &headers),
            StudioError::Billing(_)
        ));
        assert!(matches!(
            map_status_error(400, "request blocked by safety system".into(), &headers),
            StudioError::ContentBlocked(_)
        ));
        match map_status_error(500, "internal".into(), &headers) {
            StudioError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "internal");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_status_errors_keep_upstream_body() {
        let headers = reqwest::header::HeaderMap::new();

        let err = map_status_error(
            404,
            "models/foo is not found for API version v1beta".into(),
            &headers,
        );
        assert_eq!(err.kind(), FailureKind::UpstreamFailure);
        assert_eq!(
            err.to_string(),
            "API error: 404 - models/foo is not found for API version v1beta"
        );

        let err = map_status_error(402, "Project 123 has billing disabled".into(), &headers);
        assert_eq!(err.kind(), FailureKind::UpstreamFailure);
        assert_eq!(err.to_string(), "billing error: Project 123 has billing disabled");

        let err = map_status_error(
            429,
            "Quota exceeded for metric generate_content_requests".into(),
            &headers,
        );
        assert_eq!(err.kind(), FailureKind::UpstreamFailure);
        assert!(err
            .to_string()
            .ends_with("Quota exceeded for metric generate_content_requests"));
    }

    #[test]
    fn test_empty_status_body_falls_back_to_hint() {
        let headers = reqwest::header::HeaderMap::new();
        match map_status_error(404, String::new(), &headers) {
            StudioError::Api { status, message } => {
                assert_eq!(status, 404);
                assert!(message.starts_with("Model not found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_rate_limit_reads_retry_after() {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(reqwest::header::RETRY_AFTER, "12".parse().unwrap());
        match map_status_error(429, String::new(), &headers) {
            StudioError::RateLimited {
                retry_after,
                message,
            } => {
                assert_eq!(retry_after, Some(std::time::Duration::from_secs(12)));
                assert_eq!(message, "quota exceeded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    /// A request seen by [`spawn_api`].
    #[derive(Debug, Clone)]
    struct SeenRequest {
        method: String,
        path: String,
        api_key: Option<String>,
        body: String,
    }

    /// Serves one canned answer for every request on a local port.
    async fn spawn_api(
        status: u16,
        body: &'static str,
    ) -> (String, Arc<Mutex<Vec<SeenRequest>>>) {
        let seen: Arc<Mutex<Vec<SeenRequest>>> = Arc::default();
        let log = seen.clone();
        let app = axum::Router::new().fallback(
            move |method: axum::http::Method,
                  uri: axum::http::Uri,
                  headers: axum::http::HeaderMap,
                  request_body: String| {
                let log = log.clone();
                async move {
                    log.lock().push(SeenRequest {
                        method: method.to_string(),
                        path: uri.path().to_string(),
                        api_key: headers
                            .get("x-goog-api-key")
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_owned),
                        body: request_body,
                    });
                    (
                        axum::http::StatusCode::from_u16(status).unwrap(),
                        [(axum::http::header::CONTENT_TYPE, "application/json")],
                        body,
                    )
                }
            },
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), seen)
    }

    fn provider_for(base_url: &str) -> GeminiProvider {
        GeminiProvider::builder()
            .api_key(TEST_KEY)
            .base_url(base_url)
            .build()
            .unwrap()
    }

    const TEST_KEY: &str = "test-secret-key-123";

    #[tokio::test]
    async fn test_generate_sends_one_request_and_returns_image() {
        let (base_url, seen) = spawn_api(
            200,
            r#"{"candidates": [{"content": {"parts": [
                {"text": "Here you go"},
                {"inlineData": {"mimeType": "image/png", "data": "iVBORw0KGgo="}}
            ]}, "finishReason": "STOP"}]}"#,
        )
        .await;
        let provider = provider_for(&base_url);
        let request = GenerationRequest::new("a red fox in snow")
            .with_style_suffix(", oil painting style")
            .with_aspect_ratio(AspectRatio::Landscape);

        let image = provider.generate(&request).await.unwrap();

        assert_eq!(image.as_str(), "data:image/png;base64,iVBORw0KGgo=");
        let seen = seen.lock().clone();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].method, "POST");
        assert_eq!(
            seen[0].path,
            "/v1beta/models/gemini-2.5-flash-image:generateContent"
        );
        assert_eq!(seen[0].api_key.as_deref(), Some(TEST_KEY));
        let body: serde_json::Value = serde_json::from_str(&seen[0].body).unwrap();
        assert_eq!(
            body["contents"][0]["parts"][0]["text"],
            "a red fox in snow, oil painting style"
        );
        assert_eq!(body["generationConfig"]["imageConfig"]["aspectRatio"], "16:9");
    }

    #[tokio::test]
    async fn test_generate_text_only_response_is_no_image() {
        let (base_url, seen) = spawn_api(
            200,
            r#"{"candidates": [{"content": {"parts": [{"text": "I cannot draw that."}]}}]}"#,
        )
        .await;

        let err = provider_for(&base_url)
            .generate(&GenerationRequest::new("a fox"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::NoImageProduced);
        assert_eq!(err.to_string(), "no image produced: No image data in Gemini response");
        assert_eq!(seen.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_generate_error_body_is_redacted() {
        let (base_url, seen) = spawn_api(
            400,
            r#"{"error": {"code": 400, "message": "API key test-secret-key-123 is malformed", "status": "INVALID_ARGUMENT"}}"#,
        )
        .await;

        let err = provider_for(&base_url)
            .generate(&GenerationRequest::new("a fox"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::UpstreamFailure);
        assert_eq!(
            err.to_string(),
            "API error: 400 - API key [REDACTED] is malformed"
        );
        assert!(!err.to_string().contains(TEST_KEY));
        assert_eq!(seen.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_health_check_surfaces_upstream_body() {
        let (base_url, seen) = spawn_api(
            404,
            r#"{"error": {"code": 404, "message": "models/gemini-2.5-flash-image is not found for API version v1beta"}}"#,
        )
        .await;

        let err = provider_for(&base_url).health_check().await.unwrap_err();

        assert_eq!(err.kind(), FailureKind::UpstreamFailure);
        assert!(err.to_string().contains("is not found for API version v1beta"));
        let seen = seen.lock().clone();
        assert_eq!(seen[0].method, "GET");
        assert_eq!(seen[0].path, "/v1beta/models/gemini-2.5-flash-image");
    }

    #[tokio::test]
    async fn test_health_check_ok() {
        let (base_url, _seen) = spawn_api(200, r#"{"name": "models/gemini-2.5-flash-image"}"#).await;
        provider_for(&base_url).health_check().await.unwrap();
    }
}
