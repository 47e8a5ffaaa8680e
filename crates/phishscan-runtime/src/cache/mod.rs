//! Classification cache
//!
//! Read-through layer over a [`VerdictStore`]. Every store call is bounded by
//! a timeout so a slow backend surfaces as an error instead of a hang; what
//! to do about the error is the caller's decision.

use crate::error::{Result, RuntimeError};
use crate::storage::{CacheRecord, VerdictStore};
use phishscan_core::Verdict;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Default bound on a single store call
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_millis(2000);

/// Cache hit/miss statistics
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub writes: u64,
    pub errors: u64,
}

impl CacheStats {
    /// Hit rate in percent over all completed lookups
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total > 0 {
            (self.hits as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Cache of verdicts keyed by the exact submitted URL
pub struct ClassificationCache {
    store: Arc<dyn VerdictStore>,
    timeout: Duration,
    stats: Arc<RwLock<CacheStats>>,
}

impl ClassificationCache {
    pub fn new(store: Arc<dyn VerdictStore>) -> Self {
        Self {
            store,
            timeout: DEFAULT_STORE_TIMEOUT,
            stats: Arc::new(RwLock::new(CacheStats::default())),
        }
    }

    /// Set the per-call store timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Previously stored verdict for `url`, if any
    pub async fn lookup(&self, url: &str) -> Result<Option<Verdict>> {
        let result = self.bounded("get", self.store.get(url)).await;
        let mut stats = self.stats.write().await;

        match result {
            Ok(Some(record)) => {
                stats.hits += 1;
                debug!("Cache hit for {}", url);
                Ok(Some(record.into_verdict()))
            }
            Ok(None) => {
                stats.misses += 1;
                debug!("Cache miss for {}", url);
                Ok(None)
            }
            Err(e) => {
                stats.errors += 1;
                warn!("Cache lookup for {} failed: {}", url, e);
                Err(e)
            }
        }
    }

    /// Persist `verdict`, replacing any previous record for its URL
    pub async fn store(&self, verdict: &Verdict) -> Result<()> {
        let record = CacheRecord::from(verdict);
        let result = self.bounded("put", self.store.put(&record)).await;
        let mut stats = self.stats.write().await;

        match result {
            Ok(()) => {
                stats.writes += 1;
                debug!("Cached verdict for {}", verdict.url);
                Ok(())
            }
            Err(e) => {
                stats.errors += 1;
                warn!("Cache write for {} failed: {}", verdict.url, e);
                Err(e)
            }
        }
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(RuntimeError::StoreTimeout {
                operation,
                timeout: self.timeout,
            }),
        }
    }

    pub async fn stats(&self) -> CacheStats {
        self.stats.read().await.clone()
    }

    /// Log current statistics
    pub async fn print_stats(&self) {
        let stats = self.stats.read().await;
        info!(
            "Cache hits: {}, misses: {}, writes: {}, errors: {}, hit rate: {:.2}%",
            stats.hits,
            stats.misses,
            stats.writes,
            stats.errors,
            stats.hit_rate()
        );
    }
}
