//! Review analysis orchestrator.
//!
//! Composes the sentiment classifier and key-point extractor into a single
//! `AnalysisResult`. Both adapters are total, so `analyze` has no failure
//! path at all.

use crate::config::ReviewlensConfig;
use crate::keypoints::KeyPointExtractor;
use crate::models::AnalysisResult;
use crate::sentiment::SentimentClassifier;

pub struct ReviewAnalyzer {
    classifier: SentimentClassifier,
    extractor: KeyPointExtractor,
}

impl ReviewAnalyzer {
    pub fn new(classifier: SentimentClassifier, extractor: KeyPointExtractor) -> Self {
        Self {
            classifier,
            extractor,
        }
    }

    /// Build both adapters from config + environment. Constructed once at
    /// startup and passed by reference; a backend that cannot come up is
    /// permanently downgraded to its fallback behavior inside its adapter.
    pub fn from_config(config: &ReviewlensConfig) -> Self {
        Self {
            classifier: SentimentClassifier::from_config(&config.sentiment),
            extractor: KeyPointExtractor::from_config(&config.keypoints),
        }
    }

    /// Analyze one review. The two adapter calls share no state and run
    /// concurrently; their outputs merge positionally into the result.
    pub async fn analyze(&self, review_text: &str) -> AnalysisResult {
        let (verdict, key_points) = tokio::join!(
            self.classifier.classify(review_text),
            self.extractor.extract(review_text),
        );

        AnalysisResult {
            sentiment: verdict.sentiment,
            sentiment_score: verdict.score,
            key_points,
        }
    }
}
