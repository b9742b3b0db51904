//! Integration tests for the review store against an in-memory SQLite db.
//!
//! These tests verify:
//! 1. Insert assigns id + created_at and round-trips key_points in order
//! 2. Malformed stored key_points degrade instead of erroring
//! 3. Listing returns newest first and never updates existing rows

use reviewlens_core::config::DatabaseConfig;
use reviewlens_core::models::{AnalysisResult, Sentiment};
use reviewlens_core::{db, ReviewStore, ReviewlensError};
use sqlx::SqlitePool;

async fn test_pool() -> SqlitePool {
    // max_connections must stay at 1: every connection to :memory: is its
    // own database
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
    };
    let pool = db::create_pool(&config).await.expect("Failed to open db");
    db::init_schema(&pool).await.expect("Failed to init schema");
    pool
}

fn analysis(sentiment: Sentiment, score: f64, points: &[&str]) -> AnalysisResult {
    AnalysisResult {
        sentiment,
        sentiment_score: score,
        key_points: points.iter().map(|p| p.to_string()).collect(),
    }
}

#[tokio::test]
async fn insert_and_get_round_trips_key_points_in_order() {
    let store = ReviewStore::new(test_pool().await);

    let stored = store
        .insert(
            "Battery is great but the screen scratches",
            &analysis(Sentiment::Positive, 0.93, &["a", "b"]),
        )
        .await
        .expect("insert failed");

    assert!(stored.id > 0);
    assert_eq!(stored.key_points, vec!["a", "b"]);

    let fetched = store
        .get(stored.id)
        .await
        .expect("get failed")
        .expect("row missing");

    assert_eq!(fetched.review_text, "Battery is great but the screen scratches");
    assert_eq!(fetched.sentiment, Sentiment::Positive);
    assert_eq!(fetched.sentiment_score, 0.93);
    assert_eq!(fetched.key_points, vec!["a", "b"]);
    assert_eq!(fetched.created_at, stored.created_at);
}

#[tokio::test]
async fn empty_key_points_round_trip_as_empty_list() {
    let store = ReviewStore::new(test_pool().await);

    let stored = store
        .insert("meh", &analysis(Sentiment::Neutral, 0.5, &[]))
        .await
        .unwrap();

    let fetched = store.get(stored.id).await.unwrap().unwrap();
    assert!(fetched.key_points.is_empty());
}

#[tokio::test]
async fn malformed_stored_key_points_degrade_to_single_element() {
    let pool = test_pool().await;

    // Write a row that bypasses the store, simulating legacy or hand-edited
    // data that is not a JSON list.
    sqlx::query(
        r#"
        INSERT INTO reviews (review_text, sentiment, sentiment_score, key_points, created_at)
        VALUES ('old row', 'positive', 0.9, 'not a json list', ?1)
        "#,
    )
    .bind(chrono::Utc::now())
    .execute(&pool)
    .await
    .expect("raw insert failed");

    let store = ReviewStore::new(pool);
    let rows = store.list(10).await.expect("list failed");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].key_points, vec!["not a json list"]);
}

#[tokio::test]
async fn null_stored_key_points_read_as_empty_list() {
    let pool = test_pool().await;

    sqlx::query(
        r#"
        INSERT INTO reviews (review_text, sentiment, sentiment_score, key_points, created_at)
        VALUES ('no points', 'neutral', 0.5, NULL, ?1)
        "#,
    )
    .bind(chrono::Utc::now())
    .execute(&pool)
    .await
    .expect("raw insert failed");

    let store = ReviewStore::new(pool);
    let row = store.get(1).await.unwrap().unwrap();
    assert!(row.key_points.is_empty());
}

#[tokio::test]
async fn unknown_stored_sentiment_reads_as_neutral() {
    let pool = test_pool().await;

    sqlx::query(
        r#"
        INSERT INTO reviews (review_text, sentiment, sentiment_score, key_points, created_at)
        VALUES ('odd row', 'ecstatic', 0.7, '[]', ?1)
        "#,
    )
    .bind(chrono::Utc::now())
    .execute(&pool)
    .await
    .expect("raw insert failed");

    let store = ReviewStore::new(pool);
    let row = store.get(1).await.unwrap().unwrap();
    assert_eq!(row.sentiment, Sentiment::Neutral);
}

#[tokio::test]
async fn insert_rejects_empty_review_text() {
    let store = ReviewStore::new(test_pool().await);

    let err = store
        .insert("   ", &analysis(Sentiment::Neutral, 0.5, &[]))
        .await
        .expect_err("empty review should be rejected");

    assert!(matches!(err, ReviewlensError::EmptyReview));
}

#[tokio::test]
async fn list_returns_newest_first_and_honors_limit() {
    let store = ReviewStore::new(test_pool().await);

    for text in ["first", "second", "third"] {
        store
            .insert(text, &analysis(Sentiment::Neutral, 0.5, &[]))
            .await
            .unwrap();
    }

    let rows = store.list(2).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].review_text, "third");
    assert_eq!(rows[1].review_text, "second");
}
