pub mod review;

pub use review::{AnalysisResult, ReviewRecord, Sentiment};
