pub mod analyzer;
pub mod config;
pub mod db;
pub mod error;
pub mod keypoints;
pub mod models;
pub mod sentiment;
pub mod store;

pub use analyzer::ReviewAnalyzer;
pub use config::ReviewlensConfig;
pub use error::ReviewlensError;
pub use keypoints::{
    parse_key_points, GeminiTextClient, GenerativeBackend, KeyPointError, KeyPointExtractor,
};
pub use models::{AnalysisResult, ReviewRecord, Sentiment};
pub use sentiment::{
    HfInferenceClient, RawClassification, SentimentBackend, SentimentClassifier, SentimentError,
    SentimentVerdict, FALLBACK_SENTIMENT_SCORE, MAX_CLASSIFIER_INPUT_CHARS,
    SENTIMENT_CONFIDENCE_THRESHOLD,
};
pub use store::ReviewStore;
