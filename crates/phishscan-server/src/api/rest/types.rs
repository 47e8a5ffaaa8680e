//! REST API type definitions
//!
//! Request and response types for the REST API endpoints.

use phishscan_sdk::{
    AuditRecord, CacheStats, Classification, Classifier, Label, MetricsSnapshot, VerdictSource,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Decimal places kept in response confidences
const CONFIDENCE_DECIMALS: i32 = 4;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<Classifier>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,

    /// Digest of the loaded scoring artifact
    pub model_sha256: Option<String>,
}

/// Body of `/v1/predict` and `/v1/report`.
///
/// `url` is optional at the serde level so an absent field can be reported
/// as a missing field rather than a generic JSON error.
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub url: Option<String>,
}

/// Prediction response
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    /// URL exactly as received
    pub url: String,
    pub prediction: Label,

    /// Phishing probability rounded to four decimals
    pub confidence: f64,
    pub source: VerdictSource,
    pub cached: bool,
}

impl From<Classification> for PredictResponse {
    fn from(classification: Classification) -> Self {
        let verdict = classification.verdict;
        Self {
            url: verdict.url,
            prediction: verdict.label,
            confidence: round_confidence(verdict.confidence),
            source: classification.source,
            cached: classification.cached,
        }
    }
}

/// Report response
#[derive(Debug, Serialize, Deserialize)]
pub struct ReportResponse {
    pub message: String,
    pub url: String,
    pub prediction: Label,
}

impl From<AuditRecord> for ReportResponse {
    fn from(record: AuditRecord) -> Self {
        Self {
            message: "Report saved successfully".to_string(),
            url: record.url,
            prediction: record.prediction,
        }
    }
}

/// Report history response
#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub history: Vec<AuditRecord>,
}

/// Metrics response
#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    #[serde(flatten)]
    pub metrics: MetricsSnapshot,
    pub cache: CacheStats,

    /// Cache hit rate in percent
    pub cache_hit_rate: f64,
}

pub(crate) fn round_confidence(confidence: f64) -> f64 {
    let scale = 10f64.powi(CONFIDENCE_DECIMALS);
    (confidence * scale).round() / scale
}
