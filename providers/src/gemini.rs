//! Google Gemini client: GenerateContent for post text, Imagen predict
//! for post images.

use serde::Deserialize;
use serde_json::{Value, json};

use genie_types::{ApiKey, Hashtags, ImageRef, Platform, PostContent};

use crate::retry::{RetryConfig, RetryOutcome, send_with_retry};
use crate::{
    GEMINI_API_BASE_URL, ProviderError, TextOutcome, TextRequest, http_client, prompt,
    read_capped_error_body,
};

/// Characters of the raw response embedded in a degraded record.
const RAW_EXCERPT_CHARS: usize = 100;
/// Characters of the prompt used to seed a placeholder image URL.
const PLACEHOLDER_SEED_CHARS: usize = 30;
/// Characters of the prompt echoed in the placeholder caption.
const PLACEHOLDER_CAPTION_CHARS: usize = 20;

/// Client for the two generation operations.
///
/// Carries its own base URL so tests can point it at a mock server.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: ApiKey,
    text_model: String,
    image_model: String,
    retry_config: RetryConfig,
}

impl GeminiClient {
    #[must_use]
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            http: http_client().clone(),
            base_url: GEMINI_API_BASE_URL.to_string(),
            api_key,
            text_model: genie_config::DEFAULT_TEXT_MODEL.to_string(),
            image_model: genie_config::DEFAULT_IMAGE_MODEL.to_string(),
            retry_config: RetryConfig::default(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_models(
        mut self,
        text_model: impl Into<String>,
        image_model: impl Into<String>,
    ) -> Self {
        self.text_model = text_model.into();
        self.image_model = image_model.into();
        self
    }

    #[must_use]
    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    /// Generate structured post text.
    ///
    /// Transport and HTTP failures are hard errors. A body that arrives
    /// but cannot be parsed into the expected shape degrades to a
    /// synthesized record instead, so the caller can still produce an
    /// inspectable post.
    pub async fn generate_post_text(
        &self,
        request: &TextRequest,
    ) -> Result<TextOutcome, ProviderError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, self.text_model
        );
        let body = text_request_body(request);

        let outcome = send_with_retry(
            || {
                self.http
                    .post(&url)
                    .header("x-goog-api-key", self.api_key.expose_secret())
                    .header("content-type", "application/json")
                    .json(&body)
            },
            &self.retry_config,
        )
        .await;

        let response = match outcome {
            RetryOutcome::Success(response) => response,
            RetryOutcome::HttpError(response) => {
                let status = response.status();
                let body = read_capped_error_body(response).await;
                return Err(ProviderError::Api { status, body });
            }
            RetryOutcome::ConnectionError { attempts, source } => {
                return Err(ProviderError::Connection { attempts, source });
            }
            RetryOutcome::NonRetryable(e) => return Err(ProviderError::Transport(e)),
        };

        let envelope: Value = serde_json::from_str(&response.text().await?)?;
        let raw = extract_candidate_text(&envelope).ok_or(ProviderError::MissingText)?;
        Ok(parse_post_content(
            &raw,
            request.platform,
            &request.language,
        ))
    }

    /// Generate a post image for an already-annotated prompt.
    ///
    /// Missing image data and connection failures degrade to a seeded
    /// placeholder reference; only a rejected request (non-success HTTP
    /// status) is a hard failure.
    pub async fn generate_post_image(
        &self,
        image_prompt: &str,
        platform: Platform,
    ) -> Result<ImageRef, ProviderError> {
        let url = format!("{}/models/{}:predict", self.base_url, self.image_model);
        let framed = prompt::image_prompt(image_prompt, platform);
        let body = json!({
            "instances": [{ "prompt": framed }],
            "parameters": { "sampleCount": 1, "outputMimeType": "image/jpeg" }
        });

        let outcome = send_with_retry(
            || {
                self.http
                    .post(&url)
                    .header("x-goog-api-key", self.api_key.expose_secret())
                    .header("content-type", "application/json")
                    .json(&body)
            },
            &self.retry_config,
        )
        .await;

        let response = match outcome {
            RetryOutcome::Success(response) => response,
            RetryOutcome::HttpError(response) => {
                let status = response.status();
                let body = read_capped_error_body(response).await;
                return Err(ProviderError::Api { status, body });
            }
            RetryOutcome::ConnectionError { attempts, source } => {
                tracing::warn!(
                    attempts,
                    error = %source,
                    %platform,
                    "Image request failed to connect; using placeholder"
                );
                return Ok(ImageRef::Placeholder(error_placeholder_url(platform)));
            }
            RetryOutcome::NonRetryable(e) => {
                tracing::warn!(error = %e, %platform, "Image request failed; using placeholder");
                return Ok(ImageRef::Placeholder(error_placeholder_url(platform)));
            }
        };

        let envelope: Value = match response.text().await {
            Ok(text) => serde_json::from_str(&text).unwrap_or(Value::Null),
            Err(e) => {
                tracing::warn!(error = %e, %platform, "Unreadable image response body");
                Value::Null
            }
        };

        match extract_image_bytes(&envelope) {
            Some(b64) => Ok(ImageRef::Data(format!("data:image/jpeg;base64,{b64}"))),
            None => {
                tracing::warn!(%platform, "No image data in response; using placeholder");
                Ok(ImageRef::Placeholder(placeholder_url(image_prompt, platform)))
            }
        }
    }
}

/// Build the GenerateContent request body.
///
/// Note: the Gemini API mixes casing - `system_instruction` is
/// snake_case while `generationConfig` and its fields are camelCase.
fn text_request_body(request: &TextRequest) -> Value {
    let system = prompt::system_instruction(
        &request.language,
        request.output_length,
        request.custom_instructions.as_deref(),
        request.avoidance_instructions.as_deref(),
    );
    let user = prompt::user_prompt(
        &request.persona,
        &request.objective,
        request.platform,
        &request.language,
    );

    json!({
        "contents": [{ "role": "user", "parts": [{ "text": user }] }],
        "system_instruction": { "parts": [{ "text": system }] },
        "generationConfig": {
            "responseMimeType": "application/json",
            "temperature": request.temperature,
        }
    })
}

/// Concatenated text parts of the first candidate, if any.
fn extract_candidate_text(envelope: &Value) -> Option<String> {
    let parts = envelope
        .pointer("/candidates/0/content/parts")?
        .as_array()?;
    let mut text = String::new();
    for part in parts {
        if let Some(chunk) = part.get("text").and_then(Value::as_str) {
            text.push_str(chunk);
        }
    }
    if text.trim().is_empty() { None } else { Some(text) }
}

/// First predicted image payload, if any.
fn extract_image_bytes(envelope: &Value) -> Option<&str> {
    envelope
        .pointer("/predictions/0/bytesBase64Encoded")
        .and_then(Value::as_str)
        .filter(|bytes| !bytes.is_empty())
}

/// Strip a surrounding markdown code fence (``` or ```json) from a raw
/// model response, if present.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(inner) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the optional language tag on the opening fence line.
    let inner = inner
        .split_once('\n')
        .map_or(inner, |(first_line, body)| {
            if first_line.trim().chars().all(char::is_alphanumeric) {
                body
            } else {
                inner
            }
        });
    inner.trim()
}

#[derive(Deserialize)]
struct RawPostContent {
    message: String,
    hashtags: Vec<String>,
    #[serde(rename = "visualSuggestion")]
    visual_suggestion: String,
}

/// Parse and validate raw model text into post content, degrading to a
/// synthesized record on any structural violation.
fn parse_post_content(raw: &str, platform: Platform, language: &str) -> TextOutcome {
    let cleaned = strip_code_fences(raw);

    let parsed: Result<RawPostContent, _> = serde_json::from_str(cleaned);
    match parsed {
        Ok(content)
            if !content.message.trim().is_empty()
                && !content.hashtags.is_empty()
                && !content.visual_suggestion.trim().is_empty() =>
        {
            TextOutcome::Complete(PostContent {
                message: content.message,
                hashtags: Hashtags::from_raw(content.hashtags),
                visual_suggestion: content.visual_suggestion,
            })
        }
        Ok(_) => {
            tracing::warn!(%platform, "Parsed response is missing required fields");
            TextOutcome::Degraded(degraded_content(raw, platform, language))
        }
        Err(e) => {
            tracing::warn!(%platform, error = %e, "Failed to parse structured response");
            TextOutcome::Degraded(degraded_content(raw, platform, language))
        }
    }
}

/// Deterministic fallback record embedding an excerpt of the raw
/// response, so the resulting post is inspectable rather than lost.
fn degraded_content(raw: &str, platform: Platform, language: &str) -> PostContent {
    let excerpt: String = raw.chars().take(RAW_EXCERPT_CHARS).collect();
    PostContent {
        message: format!(
            "Error: could not parse provider response for {platform} (in {language}). Raw: {excerpt}...",
        ),
        hashtags: Hashtags::from_raw(vec![
            "#error".to_string(),
            format!("#{}", platform.id_tag()),
            "#ai".to_string(),
            "#parsing".to_string(),
            format!("#{}", language.to_lowercase()),
        ]),
        visual_suggestion: format!(
            "Error in provider response processing for {platform} (in {language}).",
        ),
    }
}

/// Placeholder image URL seeded by the prompt: stable for the same
/// prompt, distinguishable across prompts. The caption parameter names
/// the platform and echoes the prompt so the failure is visible in the
/// rendered image, not just the URL.
fn placeholder_url(prompt_text: &str, platform: Platform) -> String {
    let seed_prefix: String = prompt_text.chars().take(PLACEHOLDER_SEED_CHARS).collect();
    let seed: String = url::form_urlencoded::byte_serialize(seed_prefix.as_bytes()).collect();
    let caption_prefix: String = prompt_text
        .chars()
        .take(PLACEHOLDER_CAPTION_CHARS)
        .collect();
    let caption: String = url::form_urlencoded::byte_serialize(
        format!("Image Gen Failed for: {platform} - {caption_prefix}...").as_bytes(),
    )
    .collect();
    format!("https://picsum.photos/seed/{seed}/600/400?grayscale&text={caption}")
}

fn error_placeholder_url(platform: Platform) -> String {
    let caption: String = url::form_urlencoded::byte_serialize(
        format!("Image Error for: {platform}").as_bytes(),
    )
    .collect();
    format!(
        "https://picsum.photos/seed/error-{}/600/400?grayscale&text={caption}",
        platform.id_tag()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use genie_types::MAX_HASHTAGS;

    #[test]
    fn strips_plain_fence() {
        assert_eq!(strip_code_fences("```\n{\"a\":1}\n```"), "{\"a\":1}");
    }

    #[test]
    fn strips_json_tagged_fence() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
    }

    #[test]
    fn leaves_unfenced_text_alone() {
        assert_eq!(strip_code_fences("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[test]
    fn leaves_unterminated_fence_alone() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}"), "```json\n{\"a\":1}");
    }

    #[test]
    fn parses_valid_content() {
        let raw = r##"{"message":"hi","hashtags":["#a","#b"],"visualSuggestion":"photo"}"##;
        let outcome = parse_post_content(raw, Platform::Instagram, "English");
        let TextOutcome::Complete(content) = outcome else {
            panic!("expected Complete");
        };
        assert_eq!(content.message, "hi");
        assert_eq!(content.visual_suggestion, "photo");
    }

    #[test]
    fn truncates_excess_hashtags() {
        let raw = r##"{"message":"hi","hashtags":["#1","#2","#3","#4","#5","#6","#7"],"visualSuggestion":"photo"}"##;
        let outcome = parse_post_content(raw, Platform::Twitter, "English");
        let content = outcome.into_content();
        assert_eq!(content.hashtags.as_slice().len(), MAX_HASHTAGS);
    }

    #[test]
    fn empty_message_degrades() {
        let raw = r##"{"message":"  ","hashtags":["#a"],"visualSuggestion":"photo"}"##;
        assert!(
            parse_post_content(raw, Platform::Facebook, "English").is_degraded()
        );
    }

    #[test]
    fn empty_hashtags_degrade() {
        let raw = r##"{"message":"hi","hashtags":[],"visualSuggestion":"photo"}"##;
        assert!(
            parse_post_content(raw, Platform::Facebook, "English").is_degraded()
        );
    }

    #[test]
    fn missing_visual_suggestion_degrades() {
        let raw = r##"{"message":"hi","hashtags":["#a"],"visualSuggestion":""}"##;
        assert!(
            parse_post_content(raw, Platform::Facebook, "English").is_degraded()
        );
    }

    #[test]
    fn non_json_degrades_with_excerpt() {
        let raw = "Sorry, I cannot respond in JSON today.";
        let outcome = parse_post_content(raw, Platform::LinkedIn, "English");
        let TextOutcome::Degraded(content) = outcome else {
            panic!("expected Degraded");
        };
        assert!(content.message.starts_with("Error:"));
        assert!(content.message.contains("Sorry, I cannot respond"));
        assert!(!content.hashtags.is_empty());
        assert!(content.hashtags.as_slice().contains(&"#error".to_string()));
    }

    #[test]
    fn degraded_record_is_deterministic() {
        let a = degraded_content("junk", Platform::TikTok, "English");
        let b = degraded_content("junk", Platform::TikTok, "English");
        assert_eq!(a, b);
    }

    #[test]
    fn placeholder_url_is_stable_per_prompt() {
        let a = placeholder_url("a mountain valley at dawn", Platform::Instagram);
        let b = placeholder_url("a mountain valley at dawn", Platform::Instagram);
        let c = placeholder_url("a different concept", Platform::Instagram);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("https://picsum.photos/seed/"));
    }

    #[test]
    fn placeholder_seed_is_url_encoded() {
        let with_spaces = placeholder_url("two words", Platform::Facebook);
        assert!(!with_spaces.contains("two words"));
        assert!(with_spaces.contains("two+words"));
    }

    #[test]
    fn placeholder_caption_names_platform_and_prompt() {
        let prompt = "a mountain valley at dawn over the ridge";
        let degraded = placeholder_url(prompt, Platform::Twitter);
        assert!(degraded.contains("&text=Image+Gen+Failed+for%3A+Twitter"));
        // Caption echoes only the first 20 prompt characters.
        assert!(degraded.contains("a+mountain+valley+at..."));
        assert!(!degraded.contains("ridge..."));

        let errored = error_placeholder_url(Platform::LinkedIn);
        assert!(errored.contains("/seed/error-linkedin/"));
        assert!(errored.contains("&text=Image+Error+for%3A+LinkedIn"));
    }

    #[test]
    fn candidate_text_concatenates_parts() {
        let envelope = serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "{\"a\":" }, { "text": "1}" }] }
            }]
        });
        assert_eq!(extract_candidate_text(&envelope).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn missing_candidates_yield_no_text() {
        assert!(extract_candidate_text(&serde_json::json!({})).is_none());
        let blank = serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "   " }] } }]
        });
        assert!(extract_candidate_text(&blank).is_none());
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use genie_types::OutputLength;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> GeminiClient {
        GeminiClient::new(ApiKey::new("test-key"))
            .with_base_url(server.uri())
            .with_retry_config(RetryConfig {
                max_retries: 1,
                initial_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(10),
                jitter_factor: 0.0,
            })
    }

    fn text_request(platform: Platform) -> TextRequest {
        TextRequest {
            persona: "indie developers".into(),
            objective: "announce the beta".into(),
            platform,
            language: "English".into(),
            temperature: 0.7,
            output_length: OutputLength::Medium,
            custom_instructions: None,
            avoidance_instructions: None,
        }
    }

    fn text_envelope(inner: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": inner }] } }]
        })
    }

    #[tokio::test]
    async fn text_success_parses_fenced_json() {
        let server = MockServer::start().await;
        let inner = "```json\n{\"message\":\"Beta is live!\",\"hashtags\":[\"#beta\",\"#launch\"],\"visualSuggestion\":\"screenshot collage\"}\n```";

        Mock::given(method("POST"))
            .and(path(format!(
                "/models/{}:generateContent",
                genie_config::DEFAULT_TEXT_MODEL
            )))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "generationConfig": { "responseMimeType": "application/json" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_envelope(inner)))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let outcome = client
            .generate_post_text(&text_request(Platform::Instagram))
            .await
            .unwrap();

        let TextOutcome::Complete(content) = outcome else {
            panic!("expected Complete");
        };
        assert_eq!(content.message, "Beta is live!");
        assert_eq!(content.hashtags.as_slice(), ["#beta", "#launch"]);
    }

    #[tokio::test]
    async fn text_unparseable_content_degrades() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(text_envelope("not json at all")),
            )
            .mount(&server)
            .await;

        let client = test_client(&server);
        let outcome = client
            .generate_post_text(&text_request(Platform::Twitter))
            .await
            .unwrap();
        assert!(outcome.is_degraded());
    }

    #[tokio::test]
    async fn text_http_error_is_hard_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .generate_post_text(&text_request(Platform::Facebook))
            .await
            .unwrap_err();
        match err {
            ProviderError::Api { status, body } => {
                assert_eq!(status, reqwest::StatusCode::BAD_REQUEST);
                assert_eq!(body, "bad request");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn text_empty_candidates_is_hard_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"candidates": []})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .generate_post_text(&text_request(Platform::LinkedIn))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::MissingText));
    }

    #[tokio::test]
    async fn image_success_returns_data_uri() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!(
                "/models/{}:predict",
                genie_config::DEFAULT_IMAGE_MODEL
            )))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "predictions": [{ "bytesBase64Encoded": "aGVsbG8=" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let image = client
            .generate_post_image("a sunrise", Platform::Instagram)
            .await
            .unwrap();
        assert_eq!(
            image,
            ImageRef::Data("data:image/jpeg;base64,aGVsbG8=".into())
        );
    }

    #[tokio::test]
    async fn image_without_predictions_degrades_to_placeholder() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"predictions": []})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server);
        let first = client
            .generate_post_image("a sunrise", Platform::Instagram)
            .await
            .unwrap();
        let second = client
            .generate_post_image("a sunrise", Platform::Instagram)
            .await
            .unwrap();
        // Placeholder is stable for the same prompt.
        assert_eq!(first, second);
        assert!(matches!(first, ImageRef::Placeholder(_)));
    }

    #[tokio::test]
    async fn image_http_error_is_hard_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .generate_post_image("a sunrise", Platform::TikTok)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Api {
                status: reqwest::StatusCode::FORBIDDEN,
                ..
            }
        ));
    }
}
