//! SQLite-backed verdict store and audit log
//!
//! Tables:
//! - `phishing_urls (url PRIMARY KEY, prediction, confidence, timestamp)`
//! - `reports (id, user, url, prediction, timestamp)`
//!
//! Timestamps are stored as RFC 3339 text with nanosecond precision so a
//! stored record reads back identical.

use super::{AuditLog, CacheRecord, VerdictStore};
use crate::error::{Result, RuntimeError};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use phishscan_core::{AuditRecord, Label};
use sqlx::{Row, SqlitePool};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

const SCHEMA: [&str; 3] = [
    "CREATE TABLE IF NOT EXISTS phishing_urls (
        url TEXT PRIMARY KEY NOT NULL,
        prediction TEXT NOT NULL,
        confidence REAL NOT NULL,
        timestamp TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS reports (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user TEXT NOT NULL,
        url TEXT NOT NULL,
        prediction TEXT NOT NULL,
        timestamp TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_reports_user ON reports (user)",
];

/// SQLite store
///
/// The connection pool is created on first use, together with the schema.
pub struct SqliteStore {
    db_path: PathBuf,
    pool: Arc<RwLock<Option<SqlitePool>>>,
}

impl SqliteStore {
    /// Store backed by the database file at `db_path`, created if missing
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            pool: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    async fn get_pool(&self) -> Result<SqlitePool> {
        {
            let pool_guard = self.pool.read().await;
            if let Some(pool) = pool_guard.as_ref() {
                return Ok(pool.clone());
            }
        }

        let mut pool_guard = self.pool.write().await;
        if let Some(pool) = pool_guard.as_ref() {
            return Ok(pool.clone());
        }

        let db_url = format!("sqlite:{}?mode=rwc", self.db_path.display());
        let pool = SqlitePool::connect(&db_url).await.map_err(|e| {
            RuntimeError::StoreUnavailable(format!(
                "failed to open SQLite database at {:?}: {}",
                self.db_path, e
            ))
        })?;

        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&pool)
                .await
                .map_err(|e| RuntimeError::StoreUnavailable(format!("schema setup failed: {}", e)))?;
        }

        info!("Opened SQLite store at {}", self.db_path.display());
        *pool_guard = Some(pool.clone());
        Ok(pool)
    }

    fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
        timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
    }

    fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(|e| RuntimeError::InvalidRecord(format!("bad timestamp '{}': {}", raw, e)))
    }

    fn parse_label(raw: &str) -> Result<Label> {
        raw.parse()
            .map_err(|e| RuntimeError::InvalidRecord(format!("{}", e)))
    }
}

fn query_failed(e: sqlx::Error) -> RuntimeError {
    RuntimeError::StoreUnavailable(format!("SQLite query failed: {}", e))
}

#[async_trait]
impl VerdictStore for SqliteStore {
    async fn get(&self, url: &str) -> Result<Option<CacheRecord>> {
        let pool = self.get_pool().await?;

        let row = sqlx::query(
            "SELECT url, prediction, confidence, timestamp FROM phishing_urls WHERE url = ?1",
        )
        .bind(url)
        .fetch_optional(&pool)
        .await
        .map_err(query_failed)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let prediction: String = row.try_get("prediction").map_err(query_failed)?;
        let timestamp: String = row.try_get("timestamp").map_err(query_failed)?;

        Ok(Some(CacheRecord {
            url: row.try_get("url").map_err(query_failed)?,
            prediction: Self::parse_label(&prediction)?,
            confidence: row.try_get("confidence").map_err(query_failed)?,
            timestamp: Self::parse_timestamp(&timestamp)?,
        }))
    }

    async fn put(&self, record: &CacheRecord) -> Result<()> {
        let pool = self.get_pool().await?;

        sqlx::query(
            "INSERT INTO phishing_urls (url, prediction, confidence, timestamp) \
             VALUES (?1, ?2, ?3, ?4) \
             ON CONFLICT(url) DO UPDATE SET \
             prediction = excluded.prediction, \
             confidence = excluded.confidence, \
             timestamp = excluded.timestamp",
        )
        .bind(&record.url)
        .bind(record.prediction.as_str())
        .bind(record.confidence)
        .bind(Self::format_timestamp(&record.timestamp))
        .execute(&pool)
        .await
        .map_err(query_failed)?;

        debug!("Stored verdict for {}", record.url);
        Ok(())
    }
}

#[async_trait]
impl AuditLog for SqliteStore {
    async fn append(&self, record: &AuditRecord) -> Result<()> {
        let pool = self.get_pool().await?;

        sqlx::query(
            "INSERT INTO reports (user, url, prediction, timestamp) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&record.user)
        .bind(&record.url)
        .bind(record.prediction.as_str())
        .bind(Self::format_timestamp(&record.timestamp))
        .execute(&pool)
        .await
        .map_err(query_failed)?;

        Ok(())
    }

    async fn history(&self, user: &str) -> Result<Vec<AuditRecord>> {
        let pool = self.get_pool().await?;

        let rows = sqlx::query(
            "SELECT user, url, prediction, timestamp FROM reports WHERE user = ?1 ORDER BY id",
        )
        .bind(user)
        .fetch_all(&pool)
        .await
        .map_err(query_failed)?;

        rows.iter()
            .map(|row| {
                let prediction: String = row.try_get("prediction").map_err(query_failed)?;
                let timestamp: String = row.try_get("timestamp").map_err(query_failed)?;
                Ok(AuditRecord {
                    user: row.try_get("user").map_err(query_failed)?,
                    url: row.try_get("url").map_err(query_failed)?,
                    prediction: Self::parse_label(&prediction)?,
                    timestamp: Self::parse_timestamp(&timestamp)?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use phishscan_core::Verdict;

    #[tokio::test]
    async fn test_round_trip_is_exact() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::new(dir.path().join("verdicts.db"));

        let verdict = Verdict::from_probability("https://bit.ly/abc123", 0.524_979_187_4, Utc::now());
        let record = CacheRecord::from(&verdict);
        store.put(&record).await.unwrap();

        let fetched = store.get("https://bit.ly/abc123").await.unwrap().unwrap();
        assert_eq!(fetched, record);
        assert_eq!(fetched.into_verdict(), verdict);
    }

    #[tokio::test]
    async fn test_upsert_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::new(dir.path().join("verdicts.db"));
        let now = Utc::now();

        store
            .put(&CacheRecord::from(&Verdict::from_probability("u", 0.9, now)))
            .await
            .unwrap();
        store
            .put(&CacheRecord::from(&Verdict::from_probability("u", 0.1, now)))
            .await
            .unwrap();

        let fetched = store.get("u").await.unwrap().unwrap();
        assert_eq!(fetched.prediction, Label::Legitimate);
        assert_eq!(fetched.confidence, 0.1);
    }

    #[tokio::test]
    async fn test_missing_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::new(dir.path().join("verdicts.db"));
        assert!(store.get("https://nowhere.test").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reports_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("verdicts.db");
        let verdict = Verdict::from_probability("https://evil.test", 0.97, Utc::now());

        {
            let store = SqliteStore::new(&path);
            store
                .append(&AuditRecord::new("alice", &verdict, Utc::now()))
                .await
                .unwrap();
            store
                .append(&AuditRecord::new("bob", &verdict, Utc::now()))
                .await
                .unwrap();
        }

        let reopened = SqliteStore::new(&path);
        let history = reopened.history("alice").await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].url, "https://evil.test");
        assert_eq!(history[0].prediction, Label::Phishing);
    }
}
