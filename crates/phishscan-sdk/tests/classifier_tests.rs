//! Integration tests for the Classifier

mod common;

use common::*;
use phishscan_core::{FeatureName, Label, VerdictSource};
use phishscan_runtime::{MemoryStore, VerdictStore};
use phishscan_sdk::{
    ClassifierBuilder, ClassifierConfig, FailureReason, StoreFailurePolicy,
};
use std::sync::Arc;
use std::time::Duration;

// ========== Cache precedence ==========

#[tokio::test]
async fn test_second_call_is_served_from_cache() {
    let extractor = CountingExtractor::new();
    let scorer = FixedScorer::new(0.81);
    let classifier = ClassifierBuilder::new()
        .with_feature_source(extractor.clone())
        .with_scorer(scorer.clone())
        .build()
        .await
        .unwrap();

    let url = "http://192.168.1.1@evil-bank.com/login";
    let first = classifier.classify(url).await.unwrap();
    let second = classifier.classify(url).await.unwrap();

    assert_eq!(first.source, VerdictSource::Fresh);
    assert!(first.cached);
    assert_eq!(first.verdict.label, Label::Phishing);
    assert_eq!(first.verdict.confidence, 0.81);

    assert_eq!(second.source, VerdictSource::Cache);
    assert_eq!(second.verdict, first.verdict);

    assert_eq!(extractor.calls(), 1);
    assert_eq!(scorer.calls(), 1);
}

#[tokio::test]
async fn test_cached_verdict_round_trips_field_for_field() {
    let store = Arc::new(MemoryStore::new());
    let classifier = ClassifierBuilder::new()
        .with_scorer(FixedScorer::new(0.3))
        .with_store(store.clone())
        .build()
        .await
        .unwrap();

    let fresh = classifier.classify("https://example.com").await.unwrap();
    let stored = store.get("https://example.com").await.unwrap().unwrap();

    assert_eq!(stored.into_verdict(), fresh.verdict);
}

#[tokio::test]
async fn test_urls_are_not_normalized() {
    let extractor = CountingExtractor::new();
    let classifier = ClassifierBuilder::new()
        .with_feature_source(extractor.clone())
        .with_scorer(FixedScorer::new(0.2))
        .build()
        .await
        .unwrap();

    classifier.classify("https://example.com").await.unwrap();
    let other = classifier.classify("https://example.com/").await.unwrap();

    assert_eq!(other.source, VerdictSource::Fresh);
    assert_eq!(extractor.calls(), 2);
}

// ========== Threshold ==========

#[tokio::test]
async fn test_exact_threshold_is_legitimate() {
    let classifier = ClassifierBuilder::new()
        .with_scorer(FixedScorer::new(0.5))
        .build()
        .await
        .unwrap();
    let result = classifier.classify("https://example.com").await.unwrap();
    assert_eq!(result.verdict.label, Label::Legitimate);

    let classifier = ClassifierBuilder::new()
        .with_scorer(FixedScorer::new(0.5000001))
        .build()
        .await
        .unwrap();
    let result = classifier.classify("https://example.com").await.unwrap();
    assert_eq!(result.verdict.label, Label::Phishing);
}

#[tokio::test]
async fn test_out_of_range_probability_is_scoring_failure() {
    let classifier = ClassifierBuilder::new()
        .with_scorer(FixedScorer::new(1.5))
        .build()
        .await
        .unwrap();

    let err = classifier.classify("https://example.com").await.unwrap_err();
    assert_eq!(err.reason(), FailureReason::Scoring);
}

// ========== Extraction failures ==========

#[tokio::test]
async fn test_extraction_failure_is_typed_and_not_cached() {
    let store = Arc::new(MemoryStore::new());
    let scorer = FixedScorer::new(0.9);
    let classifier = ClassifierBuilder::new()
        .with_scorer(scorer.clone())
        .with_store(store.clone())
        .build()
        .await
        .unwrap();

    let err = classifier.classify("http://[::1/login").await.unwrap_err();
    assert_eq!(err.reason(), FailureReason::Extraction);

    let err = classifier.classify("").await.unwrap_err();
    assert_eq!(err.reason(), FailureReason::Extraction);

    assert_eq!(scorer.calls(), 0);
    assert!(store.is_empty().await);
}

// ========== Store failures ==========

#[tokio::test]
async fn test_degrade_policy_returns_uncached_fresh_verdict() {
    let classifier = ClassifierBuilder::new()
        .with_scorer(FixedScorer::new(0.9))
        .with_store(Arc::new(FailingStore))
        .build()
        .await
        .unwrap();

    let result = classifier.classify("https://bit.ly/abc123").await.unwrap();
    assert_eq!(result.source, VerdictSource::Fresh);
    assert!(!result.cached);
    assert_eq!(result.verdict.label, Label::Phishing);
}

#[tokio::test]
async fn test_strict_policy_reports_store_unavailable() {
    let scorer = FixedScorer::new(0.9);
    let classifier = ClassifierBuilder::new()
        .with_scorer(scorer.clone())
        .with_store(Arc::new(FailingStore))
        .with_store_failure_policy(StoreFailurePolicy::Strict)
        .build()
        .await
        .unwrap();

    let err = classifier.classify("https://bit.ly/abc123").await.unwrap_err();
    assert_eq!(err.reason(), FailureReason::StoreUnavailable);
    assert_eq!(scorer.calls(), 0);
}

#[tokio::test]
async fn test_failed_write_under_degrade_still_answers() {
    let classifier = ClassifierBuilder::new()
        .with_scorer(FixedScorer::new(0.1))
        .with_store(Arc::new(ReadOnlyStore))
        .build()
        .await
        .unwrap();

    let result = classifier.classify("https://example.com").await.unwrap();
    assert!(!result.cached);

    let classifier = ClassifierBuilder::new()
        .with_scorer(FixedScorer::new(0.1))
        .with_store(Arc::new(ReadOnlyStore))
        .with_store_failure_policy(StoreFailurePolicy::Strict)
        .build()
        .await
        .unwrap();

    let err = classifier.classify("https://example.com").await.unwrap_err();
    assert_eq!(err.reason(), FailureReason::StoreUnavailable);
}

#[tokio::test(start_paused = true)]
async fn test_stalled_store_times_out_instead_of_hanging() {
    let strict = ClassifierBuilder::new()
        .with_scorer(FixedScorer::new(0.9))
        .with_store(Arc::new(StalledStore))
        .with_store_timeout(Duration::from_millis(100))
        .with_store_failure_policy(StoreFailurePolicy::Strict)
        .build()
        .await
        .unwrap();

    let err = strict.classify("https://bit.ly/abc123").await.unwrap_err();
    assert_eq!(err.reason(), FailureReason::StoreUnavailable);

    let degrade = ClassifierBuilder::new()
        .with_scorer(FixedScorer::new(0.9))
        .with_store(Arc::new(StalledStore))
        .with_store_timeout(Duration::from_millis(100))
        .build()
        .await
        .unwrap();

    let result = degrade.classify("https://bit.ly/abc123").await.unwrap();
    assert_eq!(result.source, VerdictSource::Fresh);
    assert!(!result.cached);
}

// ========== Concurrency ==========

#[tokio::test]
async fn test_concurrent_first_requests_converge() {
    let store = Arc::new(MemoryStore::new());
    let classifier = Arc::new(
        ClassifierBuilder::new()
            .with_model_path(TINY_MODEL)
            .with_store(store.clone())
            .build()
            .await
            .unwrap(),
    );

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let classifier = classifier.clone();
            tokio::spawn(async move { classifier.classify("https://bit.ly/abc123").await })
        })
        .collect();

    let mut confidences = Vec::new();
    for handle in handles {
        let result = handle.await.unwrap().unwrap();
        assert_eq!(result.verdict.label, Label::Phishing);
        confidences.push(result.verdict.confidence);
    }

    assert!(confidences.iter().all(|c| *c == confidences[0]));
    assert_eq!(store.len().await, 1);
}

// ========== Real artifact ==========

#[tokio::test]
async fn test_tiny_model_end_to_end() {
    let classifier = ClassifierBuilder::new()
        .with_model_path(TINY_MODEL)
        .build()
        .await
        .unwrap();

    let phishing = classifier
        .classify("http://192.168.1.1@evil-bank.com/login")
        .await
        .unwrap();
    assert_eq!(phishing.verdict.label, Label::Phishing);
    assert!((phishing.verdict.confidence - 0.668_187_8).abs() < 1e-5);

    let legitimate = classifier.classify("https://example.com").await.unwrap();
    assert_eq!(legitimate.verdict.label, Label::Legitimate);

    let info = classifier.artifact_info().unwrap();
    assert_eq!(info.num_trees, 2);
}

#[tokio::test]
async fn test_schema_mismatch_fails_at_build() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("renamed.json");
    let content = std::fs::read_to_string(TINY_MODEL)
        .unwrap()
        .replace("\"Shortining_Service\"", "\"Shortening_Service\"");
    std::fs::write(&path, content).unwrap();

    let err = ClassifierBuilder::new()
        .with_model_path(&path)
        .build()
        .await
        .unwrap_err();
    assert_eq!(err.reason(), FailureReason::SchemaMismatch);
}

#[tokio::test]
async fn test_builder_from_yaml_config() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("classifier.yaml");
    std::fs::write(
        &config_path,
        format!(
            "model_path: {}\nstore_timeout_ms: 250\nshortening_services: [\"rb.gy\"]\nfeature_defaults:\n  port: 1\n",
            TINY_MODEL
        ),
    )
    .unwrap();

    let config = ClassifierConfig::from_yaml_file(&config_path).unwrap();
    assert_eq!(config.store_timeout(), Duration::from_millis(250));

    let classifier = ClassifierBuilder::from_config(config).build().await.unwrap();
    // bit.ly is no longer a known shortener, so only the https flag is set
    let result = classifier.classify("https://bit.ly/abc123").await.unwrap();
    assert_eq!(result.verdict.label, Label::Legitimate);
}

#[tokio::test]
async fn test_feature_default_feeds_the_model() {
    let classifier = ClassifierBuilder::new()
        .with_model_path(TINY_MODEL)
        .with_feature_default(FeatureName::HavingIpAddress, 1.0)
        .build()
        .await
        .unwrap();

    // forced IP flag moves example.com from -0.6 to 0.1
    let result = classifier.classify("https://example.com").await.unwrap();
    assert_eq!(result.verdict.label, Label::Phishing);
}

// ========== Reports ==========

#[tokio::test]
async fn test_report_and_history() {
    let classifier = ClassifierBuilder::new()
        .with_model_path(TINY_MODEL)
        .build()
        .await
        .unwrap();

    let record = classifier
        .report("alice", "http://192.168.1.1@evil-bank.com/login")
        .await
        .unwrap();
    assert_eq!(record.prediction, Label::Phishing);

    classifier.report("alice", "https://example.com").await.unwrap();
    classifier.report("bob", "https://example.com").await.unwrap();

    let history = classifier.history("alice").await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].url, "http://192.168.1.1@evil-bank.com/login");
    assert_eq!(history[1].prediction, Label::Legitimate);

    assert!(classifier.history("carol").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_report_uses_cached_prediction() {
    let scorer = FixedScorer::new(0.7);
    let classifier = ClassifierBuilder::new()
        .with_scorer(scorer.clone())
        .build()
        .await
        .unwrap();

    classifier.classify("https://bit.ly/abc123").await.unwrap();
    classifier.report("alice", "https://bit.ly/abc123").await.unwrap();

    assert_eq!(scorer.calls(), 1);
}

// ========== Metrics ==========

#[tokio::test]
async fn test_metrics_track_outcomes() {
    let classifier = ClassifierBuilder::new()
        .with_scorer(FixedScorer::new(0.9))
        .build()
        .await
        .unwrap();

    classifier.classify("https://bit.ly/abc123").await.unwrap();
    classifier.classify("https://bit.ly/abc123").await.unwrap();
    let _ = classifier.classify("").await;

    let snapshot = classifier.metrics().snapshot();
    assert_eq!(snapshot.counters["classify_total"], 3);
    assert_eq!(snapshot.counters["cache_misses"], 1);
    assert_eq!(snapshot.counters["cache_hits"], 1);
    assert_eq!(snapshot.counters["verdicts_phishing"], 2);
    assert_eq!(snapshot.counters["errors_extraction"], 1);
    assert_eq!(snapshot.histograms["classify_duration"].count, 3);

    let stats = classifier.cache_stats().await;
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.writes, 1);
}

#[tokio::test]
async fn test_metrics_can_be_disabled() {
    let classifier = ClassifierBuilder::new()
        .with_scorer(FixedScorer::new(0.9))
        .enable_metrics(false)
        .build()
        .await
        .unwrap();

    classifier.classify("https://bit.ly/abc123").await.unwrap();
    assert!(classifier.metrics().snapshot().counters.is_empty());
}
