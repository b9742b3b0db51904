use config::{Config, ConfigError, File};
use serde::Deserialize;

/// Default store: a local SQLite file next to the process, used when neither
/// the config file nor DATABASE_URL names a database.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://product_reviews.db";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ReviewlensConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub sentiment: SentimentConfig,
    #[serde(default)]
    pub keypoints: KeyPointsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: 5,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SentimentConfig {
    pub enabled: bool,
    pub model: String,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "distilbert-base-uncased-finetuned-sst-2-english".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct KeyPointsConfig {
    pub model: String,
}

impl Default for KeyPointsConfig {
    fn default() -> Self {
        Self {
            model: "gemini-pro".to_string(),
        }
    }
}

impl ReviewlensConfig {
    /// Load from a TOML file. A missing file yields the defaults, so the
    /// binary runs without any config at all.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(path).required(false))
            .build()?;
        let mut cfg: Self = s.try_deserialize()?;

        // DATABASE_URL wins over the file, matching deployment convention.
        if let Ok(url) = std::env::var("DATABASE_URL") {
            if !url.is_empty() {
                cfg.database.url = url;
            }
        }

        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_sqlite() {
        let cfg = ReviewlensConfig::default();
        assert_eq!(cfg.database.url, DEFAULT_DATABASE_URL);
        assert!(cfg.sentiment.enabled);
        assert_eq!(cfg.keypoints.model, "gemini-pro");
    }
}
