//! Key-point extractor adapter.
//!
//! Wraps a remote generative-text capability (Gemini `generateContent`) behind
//! a total interface: `extract` always returns a list, empty on any failure.
//! The prompt asks for 3-5 bullet points; the parser cleans the free-text
//! answer into plain statements, preserving the model's ordering.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::config::KeyPointsConfig;

// ============================================================================
// GenerativeBackend trait
// ============================================================================

/// Abstraction over generative-text providers.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Submit a prompt and return the raw generated text.
    async fn generate(&self, prompt: &str) -> Result<String, KeyPointError>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

/// Extraction errors. These never leave the adapter; `KeyPointExtractor`
/// absorbs them into an empty list.
#[derive(Error, Debug)]
pub enum KeyPointError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Missing API key")]
    MissingApiKey,

    #[error("Response contained no candidates")]
    NoCandidates,
}

// ============================================================================
// Gemini API structs (private)
// ============================================================================

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<TextPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TextPart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<TextPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: Option<GeminiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    code: u16,
    message: String,
}

// ============================================================================
// GeminiTextClient
// ============================================================================

/// Gemini text-generation client, calling the `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiTextClient {
    client: Client,
    model: String,
    api_key: String,
    base_url: String,
}

impl GeminiTextClient {
    pub fn new(model: String, api_key: String) -> Result<Self, KeyPointError> {
        Self::with_base_url(
            model,
            api_key,
            "https://generativelanguage.googleapis.com/v1beta".to_string(),
        )
    }

    /// Create a client with a custom base URL (for testing / integration)
    pub fn with_base_url(
        model: String,
        api_key: String,
        base_url: String,
    ) -> Result<Self, KeyPointError> {
        if api_key.is_empty() {
            return Err(KeyPointError::MissingApiKey);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            model,
            api_key,
            base_url,
        })
    }
}

#[async_trait]
impl GenerativeBackend for GeminiTextClient {
    async fn generate(&self, prompt: &str) -> Result<String, KeyPointError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![TextPart {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self.client.post(&url).json(&request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let error_detail = serde_json::from_str::<GeminiErrorResponse>(&error_body)
                .ok()
                .and_then(|e| e.error);

            let (code, message) = error_detail
                .map(|e| (e.code, e.message))
                .unwrap_or((status.as_u16(), error_body));

            tracing::error!(code = code, message = %message, "Gemini API error");

            return Err(KeyPointError::Api { code, message });
        }

        let body: GenerateResponse = response.json().await?;
        let candidate = body
            .candidates
            .into_iter()
            .next()
            .ok_or(KeyPointError::NoCandidates)?;

        let text = candidate
            .content
            .parts
            .into_iter()
            .map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");

        Ok(text)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

// ============================================================================
// KeyPointExtractor
// ============================================================================

/// The total wrapper the orchestrator talks to. An uninitialized extractor
/// (no API key at startup, or client construction failed) returns an empty
/// list for its whole lifetime.
pub struct KeyPointExtractor {
    backend: Option<Box<dyn GenerativeBackend>>,
}

impl KeyPointExtractor {
    pub fn new(backend: Box<dyn GenerativeBackend>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// An extractor with no backend; every call returns an empty list.
    pub fn disabled() -> Self {
        Self { backend: None }
    }

    /// Build from config plus the GEMINI_API_KEY environment variable. A
    /// missing key or construction failure downgrades to the disabled state.
    pub fn from_config(config: &KeyPointsConfig) -> Self {
        let api_key = std::env::var("GEMINI_API_KEY").unwrap_or_default();
        if api_key.is_empty() {
            tracing::warn!("GEMINI_API_KEY not set, key-point extraction disabled");
            return Self::disabled();
        }

        match GeminiTextClient::new(config.model.clone(), api_key) {
            Ok(client) => Self::new(Box::new(client)),
            Err(e) => {
                tracing::warn!(error = %e, "key-point extractor failed to initialize");
                Self::disabled()
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// Extract key points from review text. Total: any failure yields an
    /// empty list. No retry.
    pub async fn extract(&self, text: &str) -> Vec<String> {
        let Some(backend) = &self.backend else {
            return Vec::new();
        };

        match backend.generate(&build_prompt(text)).await {
            Ok(raw) => parse_key_points(&raw),
            Err(e) => {
                tracing::warn!(
                    backend = backend.name(),
                    error = %e,
                    "key-point extraction failed, returning no points"
                );
                Vec::new()
            }
        }
    }
}

/// The fixed extraction prompt.
fn build_prompt(review_text: &str) -> String {
    format!(
        "Analyze this product review and extract 3-5 key points in bullet format.\n\
         Be concise and focus on the most important aspects mentioned.\n\
         \n\
         Review: {review_text}\n\
         \n\
         Key Points:"
    )
}

/// Clean raw generated text into an ordered list of key points.
///
/// Lines are trimmed and blanks dropped; leading bullet markers (`-`, `•`,
/// `*`) are stripped; a line still starting with a digit is treated as a
/// numbered item and everything through the first period is discarded. A
/// digit-led line with no period drops out entirely (known parsing edge case,
/// kept as-is). Ordering reflects the model's stated priority and is never
/// re-sorted.
pub fn parse_key_points(raw: &str) -> Vec<String> {
    let mut points = Vec::new();

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut cleaned = line.trim_start_matches(['-', '•', '*']).trim();

        if cleaned.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            cleaned = match cleaned.split_once('.') {
                Some((_, rest)) => rest.trim(),
                None => "",
            };
        }

        if !cleaned.is_empty() {
            points.push(cleaned.to_string());
        }
    }

    points
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> GeminiTextClient {
        GeminiTextClient::with_base_url(
            "gemini-pro".to_string(),
            "test-api-key".to_string(),
            server.uri(),
        )
        .expect("Failed to create client")
    }

    fn generation(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [
                { "content": { "parts": [{ "text": text }] } }
            ]
        })
    }

    #[test]
    fn parse_strips_bullets_and_numbering() {
        let raw = "- Good battery\n2. Screen is bright\n\n* ";
        assert_eq!(
            parse_key_points(raw),
            vec!["Good battery".to_string(), "Screen is bright".to_string()]
        );
    }

    #[test]
    fn parse_preserves_model_ordering() {
        let raw = "• zeta\n- alpha\n* middle";
        assert_eq!(parse_key_points(raw), vec!["zeta", "alpha", "middle"]);
    }

    #[test]
    fn parse_drops_digit_led_line_without_period() {
        // known edge case: numbered item missing its period loses the line
        assert_eq!(parse_key_points("3 stars overall"), Vec::<String>::new());
    }

    #[test]
    fn parse_keeps_text_after_numbered_prefix() {
        assert_eq!(
            parse_key_points("1. Fast shipping\n10. Solid build quality."),
            vec!["Fast shipping", "Solid build quality."]
        );
    }

    #[test]
    fn parse_of_empty_text_is_empty() {
        assert_eq!(parse_key_points(""), Vec::<String>::new());
        assert_eq!(parse_key_points("\n  \n\t\n"), Vec::<String>::new());
    }

    #[test]
    fn prompt_embeds_the_review() {
        let prompt = build_prompt("The camera is superb");
        assert!(prompt.contains("Review: The camera is superb"));
        assert!(prompt.contains("3-5 key points"));
        assert!(prompt.ends_with("Key Points:"));
    }

    #[test]
    fn client_requires_api_key() {
        let result = GeminiTextClient::new("gemini-pro".to_string(), String::new());
        assert!(matches!(result, Err(KeyPointError::MissingApiKey)));
    }

    #[tokio::test]
    async fn extract_parses_generated_bullets() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-pro:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(generation(
                "- Battery lasts two days\n- Screen scratches easily\n- Value for money",
            )))
            .mount(&server)
            .await;

        let extractor = KeyPointExtractor::new(Box::new(test_client(&server)));
        let points = extractor.extract("long review text").await;

        assert_eq!(
            points,
            vec![
                "Battery lasts two days",
                "Screen scratches easily",
                "Value for money"
            ]
        );
    }

    #[tokio::test]
    async fn extract_returns_empty_on_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "error": { "code": 500, "message": "Internal server error" }
            })))
            .mount(&server)
            .await;

        let extractor = KeyPointExtractor::new(Box::new(test_client(&server)));
        assert!(extractor.extract("anything").await.is_empty());
    }

    #[tokio::test]
    async fn extract_returns_empty_on_missing_candidates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "candidates": [] })),
            )
            .mount(&server)
            .await;

        let extractor = KeyPointExtractor::new(Box::new(test_client(&server)));
        assert!(extractor.extract("anything").await.is_empty());
    }

    #[tokio::test]
    async fn disabled_extractor_returns_empty_for_any_input() {
        let extractor = KeyPointExtractor::disabled();
        assert!(!extractor.is_enabled());
        assert!(extractor.extract("great product").await.is_empty());
        assert!(extractor.extract("").await.is_empty());
    }
}
