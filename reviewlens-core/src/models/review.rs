use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse polarity of a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }

    /// Parse the stored text form. Anything unrecognized reads as `Neutral`
    /// rather than failing the row.
    pub fn parse_or_neutral(s: &str) -> Self {
        match s {
            "positive" => Sentiment::Positive,
            "negative" => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-call analysis output. Created once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub sentiment: Sentiment,
    /// Raw classifier confidence in [0,1], passed through unchanged.
    pub sentiment_score: f64,
    /// Ordered key points; empty when extraction was unavailable.
    pub key_points: Vec<String>,
}

/// A persisted review row. Never updated or deleted once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub id: i64,
    pub review_text: String,
    pub sentiment: Sentiment,
    pub sentiment_score: f64,
    pub key_points: Vec<String>,
    pub created_at: DateTime<Utc>,
}
