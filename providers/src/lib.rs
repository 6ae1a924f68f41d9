//! Gemini provider client for Genie.
//!
//! # Architecture
//!
//! [`GeminiClient`] wraps the two remote operations the orchestrator
//! needs:
//!
//! - [`GeminiClient::generate_post_text`] - GenerateContent call that
//!   returns structured post content, or a clearly-marked degraded
//!   record when the response body cannot be parsed.
//! - [`GeminiClient::generate_post_image`] - Imagen predict call that
//!   returns an image reference, degrading to a deterministic seeded
//!   placeholder when the provider produces no image data or the
//!   connection fails.
//!
//! # Error Handling
//!
//! The two operations deliberately fail differently:
//!
//! | Condition | Text op | Image op |
//! |-----------|---------|----------|
//! | Malformed payload | `TextOutcome::Degraded` | placeholder ref |
//! | No content in payload | hard error | placeholder ref |
//! | Connection failure | hard error | placeholder ref |
//! | HTTP error status | hard error | hard error |
//!
//! Text is the primary artifact, so transport problems surface to the
//! caller; images are supplementary to already-captured text, so only a
//! rejected request (non-success status) is treated as hard failure.

pub mod gemini;
pub mod prompt;
pub mod retry;

use std::sync::OnceLock;
use std::time::Duration;

use genie_types::{Platform, PostContent};

/// Canonical Gemini API base URL.
pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const CONNECT_TIMEOUT_SECS: u64 = 30;
const REQUEST_TIMEOUT_SECS: u64 = 120;
const TCP_KEEPALIVE_SECS: u64 = 60;
const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

/// Shared hardened HTTP client.
pub fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .redirect(reqwest::redirect::Policy::none())
            .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
            .build()
            .unwrap_or_else(|e| {
                tracing::error!("Failed to build HTTP client: {e}. Using defaults.");
                reqwest::Client::new()
            })
    })
}

/// Read an error response body, capped so a hostile or broken server
/// cannot balloon memory.
pub async fn read_capped_error_body(response: reqwest::Response) -> String {
    match response.text().await {
        Ok(mut body) => {
            if body.len() > MAX_ERROR_BODY_BYTES {
                let mut end = MAX_ERROR_BODY_BYTES;
                while !body.is_char_boundary(end) {
                    end -= 1;
                }
                body.truncate(end);
                body.push_str("...(truncated)");
            }
            body
        }
        Err(e) => format!("<unreadable body: {e}>"),
    }
}

/// Hard failures of a provider call.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("API error {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("request failed after {attempts} attempts: {source}")]
    Connection {
        attempts: u32,
        source: reqwest::Error,
    },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("provider response carried no text content")]
    MissingText,
    #[error("provider response body was not valid JSON: {0}")]
    InvalidEnvelope(#[from] serde_json::Error),
}

/// Parameters for one text generation call.
#[derive(Debug, Clone)]
pub struct TextRequest {
    /// Persona description - a single persona, or all active personas
    /// joined by the mix separator.
    pub persona: String,
    pub objective: String,
    pub platform: Platform,
    pub language: String,
    /// Creativity temperature in `0.0..=1.0`.
    pub temperature: f32,
    pub output_length: genie_types::OutputLength,
    pub custom_instructions: Option<String>,
    pub avoidance_instructions: Option<String>,
}

/// Result of a text generation call that reached the provider and got a
/// body back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextOutcome {
    /// The structured payload parsed and validated cleanly.
    Complete(PostContent),
    /// The payload was malformed; this content is a synthesized,
    /// clearly-marked fallback embedding an excerpt of the raw response.
    Degraded(PostContent),
}

impl TextOutcome {
    #[must_use]
    pub fn into_content(self) -> PostContent {
        match self {
            TextOutcome::Complete(content) | TextOutcome::Degraded(content) => content,
        }
    }

    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        matches!(self, TextOutcome::Degraded(_))
    }
}

pub use gemini::GeminiClient;
pub use retry::RetryConfig;
