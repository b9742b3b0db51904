//! Sentiment classifier adapter.
//!
//! Wraps a remote text-classification capability (the Hugging Face Inference
//! API by default) behind a total interface: `classify` always returns a
//! verdict. Backend failures are absorbed into a fixed neutral fallback and
//! never reach the caller.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::config::SentimentConfig;
use crate::models::Sentiment;

/// Classifier input is cut to this many characters before submission, the
/// model's supported context length.
pub const MAX_CLASSIFIER_INPUT_CHARS: usize = 512;

/// Raw-label confidence must clear this before the polarity is trusted;
/// anything at or below maps to neutral.
pub const SENTIMENT_CONFIDENCE_THRESHOLD: f64 = 0.6;

/// Score reported when the classifier is unavailable or errored.
pub const FALLBACK_SENTIMENT_SCORE: f64 = 0.5;

// ============================================================================
// SentimentBackend trait
// ============================================================================

/// Abstraction over raw classification providers.
#[async_trait]
pub trait SentimentBackend: Send + Sync {
    /// Classify already-truncated text into a raw polarity label + confidence.
    async fn classify_raw(&self, text: &str) -> Result<RawClassification, SentimentError>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

/// The provider's untranslated output: one of two polarity labels plus a
/// confidence in [0,1].
#[derive(Debug, Clone)]
pub struct RawClassification {
    pub label: String,
    pub score: f64,
}

/// Classification errors. These never leave the adapter; `SentimentClassifier`
/// absorbs them into the neutral fallback.
#[derive(Error, Debug)]
pub enum SentimentError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Malformed response: no candidate labels returned")]
    EmptyResponse,
}

// ============================================================================
// HfInferenceClient
// ============================================================================

#[derive(Debug, Serialize)]
struct HfRequest {
    inputs: String,
}

#[derive(Debug, Deserialize)]
struct HfCandidate {
    label: String,
    score: f64,
}

/// Hugging Face Inference API client for text-classification models.
#[derive(Debug, Clone)]
pub struct HfInferenceClient {
    client: Client,
    model: String,
    api_token: Option<String>,
    base_url: String,
}

impl HfInferenceClient {
    pub fn new(model: String, api_token: Option<String>) -> Result<Self, SentimentError> {
        Self::with_base_url(
            model,
            api_token,
            "https://api-inference.huggingface.co".to_string(),
        )
    }

    /// Create a client with a custom base URL (for testing / integration)
    pub fn with_base_url(
        model: String,
        api_token: Option<String>,
        base_url: String,
    ) -> Result<Self, SentimentError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            model,
            api_token,
            base_url,
        })
    }
}

#[async_trait]
impl SentimentBackend for HfInferenceClient {
    async fn classify_raw(&self, text: &str) -> Result<RawClassification, SentimentError> {
        let url = format!("{}/models/{}", self.base_url, self.model);

        let mut request = self.client.post(&url).json(&HfRequest {
            inputs: text.to_string(),
        });
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::error!(code = status.as_u16(), message = %message, "Inference API error");
            return Err(SentimentError::Api {
                code: status.as_u16(),
                message,
            });
        }

        // The API answers one row of scored labels per input; we send one
        // input and keep the top-scoring label.
        let rows: Vec<Vec<HfCandidate>> = response.json().await?;
        let top = rows
            .into_iter()
            .next()
            .unwrap_or_default()
            .into_iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
            .ok_or(SentimentError::EmptyResponse)?;

        Ok(RawClassification {
            label: top.label,
            score: top.score,
        })
    }

    fn name(&self) -> &str {
        "hf-inference"
    }
}

// ============================================================================
// SentimentClassifier
// ============================================================================

/// The total wrapper the orchestrator talks to. Holds either a live backend
/// or nothing at all; the uninitialized state behaves as always-failing and
/// yields the fixed fallback for its whole lifetime.
pub struct SentimentClassifier {
    backend: Option<Box<dyn SentimentBackend>>,
}

/// What `classify` always returns: a mapped sentiment plus the raw score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentVerdict {
    pub sentiment: Sentiment,
    pub score: f64,
}

impl SentimentVerdict {
    pub fn fallback() -> Self {
        Self {
            sentiment: Sentiment::Neutral,
            score: FALLBACK_SENTIMENT_SCORE,
        }
    }
}

impl SentimentClassifier {
    pub fn new(backend: Box<dyn SentimentBackend>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// A classifier with no backend; every call returns the fallback verdict.
    pub fn disabled() -> Self {
        Self { backend: None }
    }

    /// Build from config. Any construction failure downgrades to the disabled
    /// state rather than propagating, so startup never fails on this adapter.
    pub fn from_config(config: &SentimentConfig) -> Self {
        if !config.enabled {
            tracing::warn!("sentiment classifier disabled by config, all verdicts will be neutral");
            return Self::disabled();
        }

        let api_token = std::env::var("HF_API_TOKEN").ok();
        match HfInferenceClient::new(config.model.clone(), api_token) {
            Ok(client) => Self::new(Box::new(client)),
            Err(e) => {
                tracing::warn!(error = %e, "sentiment classifier failed to initialize, all verdicts will be neutral");
                Self::disabled()
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// Classify review text. Total: truncates input, maps the raw label
    /// through the confidence threshold, and falls back to `{neutral, 0.5}`
    /// on any failure. No retry.
    pub async fn classify(&self, text: &str) -> SentimentVerdict {
        let Some(backend) = &self.backend else {
            return SentimentVerdict::fallback();
        };

        let input = truncate_chars(text, MAX_CLASSIFIER_INPUT_CHARS);
        match backend.classify_raw(input).await {
            Ok(raw) => SentimentVerdict {
                sentiment: map_verdict(&raw.label, raw.score),
                score: raw.score,
            },
            Err(e) => {
                tracing::warn!(
                    backend = backend.name(),
                    error = %e,
                    "sentiment classification failed, falling back to neutral"
                );
                SentimentVerdict::fallback()
            }
        }
    }
}

/// Map a raw polarity label + confidence to the three-way sentiment. The
/// polarity is only trusted above the threshold; everything else is neutral.
pub fn map_verdict(label: &str, score: f64) -> Sentiment {
    if score > SENTIMENT_CONFIDENCE_THRESHOLD {
        if label.eq_ignore_ascii_case("positive") {
            return Sentiment::Positive;
        }
        if label.eq_ignore_ascii_case("negative") {
            return Sentiment::Negative;
        }
    }
    Sentiment::Neutral
}

/// Cut to at most `max_chars` characters, respecting char boundaries.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

// ============================================================================
// TESTS
// ============================================================================
