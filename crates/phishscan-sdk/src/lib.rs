//! PhishScan SDK
//!
//! High-level API for classifying URLs: a [`Classifier`] composes the feature
//! extractor, the scoring engine and the classification cache, and records
//! user reports in an audit log.

pub mod builder;
pub mod classifier;
pub mod config;
pub mod error;

// Re-export main types
pub use builder::ClassifierBuilder;
pub use classifier::{Classification, Classifier};
pub use config::{ClassifierConfig, StoreConfig, StoreFailurePolicy, StoreType};
pub use error::{FailureReason, Result, SdkError};

// Re-export commonly used types from dependencies
pub use phishscan_core::{AuditRecord, FeatureName, Label, Verdict, VerdictSource};
pub use phishscan_runtime::{ArtifactInfo, CacheStats, MetricsCollector, MetricsSnapshot};
