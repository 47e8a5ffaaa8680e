//! Classifier - Main API for classifying URLs

use crate::config::StoreFailurePolicy;
use crate::error::Result;
use chrono::Utc;
use phishscan_core::{AuditRecord, ExtractionError, Label, Verdict, VerdictSource};
use phishscan_runtime::{
    ArtifactInfo, AuditLog, CacheStats, ClassificationCache, FeatureSource, Metrics,
    MetricsCollector, RuntimeError, Scorer,
};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Outcome of a classification request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub verdict: Verdict,

    /// Whether the verdict came from the cache or was computed now
    pub source: VerdictSource,

    /// Whether the verdict is persisted in the cache
    pub cached: bool,
}

/// URL classifier
///
/// Composes extraction, scoring and caching. All collaborators are injected
/// at construction and shared read-only, so one instance serves concurrent
/// callers.
pub struct Classifier {
    extractor: Arc<dyn FeatureSource>,
    scorer: Arc<dyn Scorer>,
    cache: ClassificationCache,
    audit_log: Arc<dyn AuditLog>,
    policy: StoreFailurePolicy,
    metrics: Arc<MetricsCollector>,
    enable_metrics: bool,
}

impl Classifier {
    pub(crate) fn new(
        extractor: Arc<dyn FeatureSource>,
        scorer: Arc<dyn Scorer>,
        cache: ClassificationCache,
        audit_log: Arc<dyn AuditLog>,
        policy: StoreFailurePolicy,
        metrics: Arc<MetricsCollector>,
        enable_metrics: bool,
    ) -> Self {
        Self {
            extractor,
            scorer,
            cache,
            audit_log,
            policy,
            metrics,
            enable_metrics,
        }
    }

    /// Classify `url`, consulting the cache first
    pub async fn classify(&self, url: &str) -> Result<Classification> {
        let start = Instant::now();
        let result = self.classify_uncounted(url).await;

        if self.enable_metrics {
            self.record(&result, start.elapsed());
        }

        result
    }

    async fn classify_uncounted(&self, url: &str) -> Result<Classification> {
        if url.trim().is_empty() {
            return Err(RuntimeError::from(ExtractionError::EmptyUrl).into());
        }

        let store_reachable = match self.cache.lookup(url).await {
            Ok(Some(verdict)) => {
                debug!("Serving cached verdict for {}", url);
                return Ok(Classification {
                    verdict,
                    source: VerdictSource::Cache,
                    cached: true,
                });
            }
            Ok(None) => true,
            Err(e) => {
                self.on_store_failure(e)?;
                false
            }
        };

        let verdict = self.score(url)?;

        // A store that just failed the lookup is not asked again for the write
        let cached = if store_reachable {
            match self.cache.store(&verdict).await {
                Ok(()) => true,
                Err(e) => {
                    self.on_store_failure(e)?;
                    false
                }
            }
        } else {
            false
        };

        info!(
            "Classified {} as {} (confidence {:.4}, cached: {})",
            url, verdict.label, verdict.confidence, cached
        );

        Ok(Classification {
            verdict,
            source: VerdictSource::Fresh,
            cached,
        })
    }

    /// Extract and score without touching the cache
    fn score(&self, url: &str) -> Result<Verdict> {
        let vector = self.extractor.extract(url).map_err(RuntimeError::from)?;
        let probability = self.scorer.score(&vector)?;

        if !(0.0..=1.0).contains(&probability) {
            return Err(RuntimeError::Scoring(format!(
                "probability {} outside [0, 1]",
                probability
            ))
            .into());
        }

        Ok(Verdict::from_probability(url, probability, Utc::now()))
    }

    fn on_store_failure(&self, error: RuntimeError) -> Result<()> {
        match self.policy {
            StoreFailurePolicy::Strict => Err(error.into()),
            StoreFailurePolicy::Degrade => {
                warn!("Verdict store unavailable, continuing without cache: {}", error);
                Ok(())
            }
        }
    }

    fn record(&self, result: &Result<Classification>, elapsed: Duration) {
        self.metrics.counter("classify_total").inc();
        self.metrics.record_execution_time("classify", elapsed);

        match result {
            Ok(classification) => {
                let source = match classification.source {
                    VerdictSource::Cache => "cache_hits",
                    VerdictSource::Fresh => "cache_misses",
                };
                self.metrics.counter(source).inc();

                let label = match classification.verdict.label {
                    Label::Phishing => "verdicts_phishing",
                    Label::Legitimate => "verdicts_legitimate",
                };
                self.metrics.counter(label).inc();
            }
            Err(e) => self.metrics.record_error(e.reason().as_str()),
        }
    }

    /// Classify `url` and append a report by `user` to the audit log
    pub async fn report(&self, user: &str, url: &str) -> Result<AuditRecord> {
        let classification = self.classify(url).await?;
        let record = AuditRecord::new(user, &classification.verdict, Utc::now());

        self.bounded("append", self.audit_log.append(&record)).await?;
        info!("Recorded report by {} for {} ({})", user, url, record.prediction);

        Ok(record)
    }

    /// Reports filed by `user`, oldest first
    pub async fn history(&self, user: &str) -> Result<Vec<AuditRecord>> {
        self.bounded("history", self.audit_log.history(user)).await
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = phishscan_runtime::Result<T>>,
    ) -> Result<T> {
        let timeout = self.cache.timeout();
        match tokio::time::timeout(timeout, call).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(RuntimeError::StoreTimeout { operation, timeout }.into()),
        }
    }

    /// Identity of the loaded scoring artifact
    pub fn artifact_info(&self) -> Option<&ArtifactInfo> {
        self.scorer.info()
    }

    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    pub fn store_failure_policy(&self) -> StoreFailurePolicy {
        self.policy
    }
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("policy", &self.policy)
            .field("artifact", &self.scorer.info().map(|i| i.sha256.as_str()))
            .field("enable_metrics", &self.enable_metrics)
            .finish()
    }
}
