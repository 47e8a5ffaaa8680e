//! API endpoint handlers

use super::extractors::{JsonExtractor, UserId};
use super::types::*;
use crate::error::ServerError;
use axum::{extract::State, Json};
use tracing::info;

/// Health check endpoint
pub(super) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model_sha256: state
            .classifier
            .artifact_info()
            .map(|artifact| artifact.sha256.clone()),
    })
}

/// Metrics endpoint
pub(super) async fn metrics(State(state): State<AppState>) -> Json<MetricsResponse> {
    let cache = state.classifier.cache_stats().await;

    Json(MetricsResponse {
        metrics: state.classifier.metrics().snapshot(),
        cache_hit_rate: cache.hit_rate(),
        cache,
    })
}

/// Classify a URL
pub(super) async fn predict(
    State(state): State<AppState>,
    JsonExtractor(payload): JsonExtractor<PredictRequest>,
) -> Result<Json<PredictResponse>, ServerError> {
    let url = required_url(payload)?;

    let classification = state.classifier.classify(&url).await?;

    Ok(Json(classification.into()))
}

/// Classify a URL and record the caller's report
pub(super) async fn report(
    State(state): State<AppState>,
    UserId(user): UserId,
    JsonExtractor(payload): JsonExtractor<PredictRequest>,
) -> Result<Json<ReportResponse>, ServerError> {
    let url = required_url(payload)?;
    info!("Received report from {} for {}", user, url);

    let record = state.classifier.report(&user, &url).await?;

    Ok(Json(record.into()))
}

/// Reports filed by the caller
pub(super) async fn history(
    State(state): State<AppState>,
    UserId(user): UserId,
) -> Result<Json<HistoryResponse>, ServerError> {
    let history = state.classifier.history(&user).await?;

    Ok(Json(HistoryResponse { history }))
}

/// The URL is passed on exactly as received; only absence and emptiness are
/// rejected here
fn required_url(payload: PredictRequest) -> Result<String, ServerError> {
    match payload.url {
        None => Err(ServerError::MissingField("url")),
        Some(url) if url.trim().is_empty() => Err(ServerError::InvalidRequest(
            "url must be a non-empty string".to_string(),
        )),
        Some(url) => Ok(url),
    }
}
