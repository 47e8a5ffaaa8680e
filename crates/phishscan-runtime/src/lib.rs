//! PhishScan Runtime - Classification runtime for the PhishScan URL classifier
//!
//! This crate provides the building blocks the orchestrator composes:
//! - Feature extraction from raw URL strings
//! - Tree-ensemble scoring against a loaded artifact
//! - Verdict storage backends and the timeout-aware classification cache
//! - In-process metrics

pub mod cache;
pub mod error;
pub mod feature;
pub mod observability;
pub mod scoring;
pub mod storage;

// Re-export main types
pub use cache::{CacheStats, ClassificationCache, DEFAULT_STORE_TIMEOUT};
pub use error::{Result, RuntimeError};
pub use feature::{
    ConstantProvider, FeatureExtractor, FeatureProvider, FeatureSource, SuffixList, UrlParts,
};
pub use observability::{Counter, Histogram, Metrics, MetricsCollector, MetricsSnapshot};
pub use scoring::{ArtifactInfo, Scorer, ScoringArtifact, ScoringEngine};
pub use storage::{AuditLog, CacheRecord, MemoryAuditLog, MemoryStore, VerdictStore};

#[cfg(feature = "sqlx")]
pub use storage::SqliteStore;
