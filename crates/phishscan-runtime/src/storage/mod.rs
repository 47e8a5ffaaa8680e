//! Persistent storage for verdicts and reports
//!
//! Two async seams live here:
//! - [`VerdictStore`]: the classification cache's backing store, keyed by the
//!   exact URL string
//! - [`AuditLog`]: append-only log of user reports

mod memory;
#[cfg(feature = "sqlx")]
mod sqlite;

pub use memory::{MemoryAuditLog, MemoryStore};
#[cfg(feature = "sqlx")]
pub use sqlite::SqliteStore;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use phishscan_core::{AuditRecord, Label, Verdict};
use serde::{Deserialize, Serialize};

/// Stored form of a verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub url: String,
    pub prediction: Label,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

impl CacheRecord {
    /// Rebuild the verdict; the stored label is kept as-is, not re-derived
    pub fn into_verdict(self) -> Verdict {
        Verdict {
            url: self.url,
            label: self.prediction,
            confidence: self.confidence,
            timestamp: self.timestamp,
        }
    }
}

impl From<&Verdict> for CacheRecord {
    fn from(verdict: &Verdict) -> Self {
        Self {
            url: verdict.url.clone(),
            prediction: verdict.label,
            confidence: verdict.confidence,
            timestamp: verdict.timestamp,
        }
    }
}

/// Key-value store of verdicts keyed by exact URL
#[async_trait]
pub trait VerdictStore: Send + Sync {
    /// Look up the record for `url`
    async fn get(&self, url: &str) -> Result<Option<CacheRecord>>;

    /// Insert or replace the record for `record.url`
    async fn put(&self, record: &CacheRecord) -> Result<()>;
}

/// Append-only log of user reports
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Append a report
    async fn append(&self, record: &AuditRecord) -> Result<()>;

    /// All reports filed by `user`, oldest first
    async fn history(&self, user: &str) -> Result<Vec<AuditRecord>>;
}
