//! Persisted record store for analyzed reviews.
//!
//! One table, insert-and-read only. `key_points` travels as a JSON text array
//! and decode degrades rather than erroring: unparseable text reads back as a
//! single-element list, NULL as an empty list.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::ReviewlensError;
use crate::models::{AnalysisResult, ReviewRecord, Sentiment};

/// Raw row shape, decoded before the key_points/sentiment degradation rules
/// are applied.
#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: i64,
    review_text: String,
    sentiment: String,
    sentiment_score: f64,
    key_points: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ReviewRow> for ReviewRecord {
    fn from(row: ReviewRow) -> Self {
        ReviewRecord {
            id: row.id,
            review_text: row.review_text,
            sentiment: Sentiment::parse_or_neutral(&row.sentiment),
            sentiment_score: row.sentiment_score,
            key_points: decode_key_points(row.key_points),
            created_at: row.created_at,
        }
    }
}

#[derive(Clone)]
pub struct ReviewStore {
    pool: SqlitePool,
}

impl ReviewStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a review with its analysis. Assigns the id and creation
    /// timestamp and returns the stored record. The record is immutable
    /// afterwards; no update or delete exists.
    pub async fn insert(
        &self,
        review_text: &str,
        analysis: &AnalysisResult,
    ) -> Result<ReviewRecord, ReviewlensError> {
        if review_text.trim().is_empty() {
            return Err(ReviewlensError::EmptyReview);
        }

        let created_at = Utc::now();
        let key_points_json = serde_json::to_string(&analysis.key_points)?;

        let result = sqlx::query(
            r#"
            INSERT INTO reviews (review_text, sentiment, sentiment_score, key_points, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(review_text)
        .bind(analysis.sentiment.as_str())
        .bind(analysis.sentiment_score)
        .bind(&key_points_json)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        tracing::info!(id, sentiment = %analysis.sentiment, "stored review analysis");

        Ok(ReviewRecord {
            id,
            review_text: review_text.to_string(),
            sentiment: analysis.sentiment,
            sentiment_score: analysis.sentiment_score,
            key_points: analysis.key_points.clone(),
            created_at,
        })
    }

    pub async fn get(&self, id: i64) -> Result<Option<ReviewRecord>, ReviewlensError> {
        let row: Option<ReviewRow> = sqlx::query_as(
            r#"
            SELECT id, review_text, sentiment, sentiment_score, key_points, created_at
            FROM reviews WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ReviewRecord::from))
    }

    /// Stored reviews, newest first.
    pub async fn list(&self, limit: i64) -> Result<Vec<ReviewRecord>, ReviewlensError> {
        let rows: Vec<ReviewRow> = sqlx::query_as(
            r#"
            SELECT id, review_text, sentiment, sentiment_score, key_points, created_at
            FROM reviews ORDER BY id DESC LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ReviewRecord::from).collect())
    }
}

/// Decode the stored key_points column.
///
/// A JSON array of strings yields that list. Any other stored text yields a
/// single-element list holding the raw text; NULL yields an empty list. Never
/// errors.
fn decode_key_points(stored: Option<String>) -> Vec<String> {
    match stored {
        None => Vec::new(),
        Some(text) => serde_json::from_str::<Vec<String>>(&text).unwrap_or_else(|_| vec![text]),
    }
}
