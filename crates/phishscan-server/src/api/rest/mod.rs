//! REST API implementation
//!
//! - types: request/response payloads and shared state
//! - extractors: JSON body and caller identity extractors
//! - handlers: endpoint handlers
//! - router: router creation and configuration

mod extractors;
mod handlers;
mod router;
pub mod types;

// Re-export public API
pub use extractors::{JsonExtractor, UserId, USER_ID_HEADER};
pub use router::create_router;
pub use types::{
    AppState, HealthResponse, HistoryResponse, MetricsResponse, PredictRequest, PredictResponse,
    ReportResponse,
};
