//! Common test utilities for SDK integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use phishscan_core::{ExtractionError, FeatureVector};
use phishscan_runtime::{
    CacheRecord, FeatureExtractor, FeatureSource, RuntimeError, Scorer, VerdictStore,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const TINY_MODEL: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../phishscan-runtime/tests/fixtures/tiny_model.json"
);

/// Built-in extractor that counts calls
#[derive(Default)]
pub struct CountingExtractor {
    inner: FeatureExtractor,
    calls: AtomicUsize,
}

impl CountingExtractor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FeatureSource for CountingExtractor {
    fn extract(&self, url: &str) -> Result<FeatureVector, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.extract(url)
    }
}

/// Scorer returning a fixed probability, counting calls
pub struct FixedScorer {
    probability: f64,
    calls: AtomicUsize,
}

impl FixedScorer {
    pub fn new(probability: f64) -> Arc<Self> {
        Arc::new(Self {
            probability,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Scorer for FixedScorer {
    fn score(&self, _vector: &FeatureVector) -> phishscan_runtime::Result<f64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.probability)
    }
}

/// Store whose every call fails
pub struct FailingStore;

#[async_trait]
impl VerdictStore for FailingStore {
    async fn get(&self, _url: &str) -> phishscan_runtime::Result<Option<CacheRecord>> {
        Err(RuntimeError::StoreUnavailable("connection refused".to_string()))
    }

    async fn put(&self, _record: &CacheRecord) -> phishscan_runtime::Result<()> {
        Err(RuntimeError::StoreUnavailable("connection refused".to_string()))
    }
}

/// Store that never answers within any sane timeout
pub struct StalledStore;

#[async_trait]
impl VerdictStore for StalledStore {
    async fn get(&self, _url: &str) -> phishscan_runtime::Result<Option<CacheRecord>> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(None)
    }

    async fn put(&self, _record: &CacheRecord) -> phishscan_runtime::Result<()> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(())
    }
}

/// Store that answers lookups but rejects writes
pub struct ReadOnlyStore;

#[async_trait]
impl VerdictStore for ReadOnlyStore {
    async fn get(&self, _url: &str) -> phishscan_runtime::Result<Option<CacheRecord>> {
        Ok(None)
    }

    async fn put(&self, _record: &CacheRecord) -> phishscan_runtime::Result<()> {
        Err(RuntimeError::StoreUnavailable("read-only replica".to_string()))
    }
}
