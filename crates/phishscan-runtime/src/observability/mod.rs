//! Observability module
//!
//! In-process counters and histograms for classification throughput,
//! cache effectiveness and failures.

pub mod metrics;

pub use metrics::{
    Counter, Histogram, HistogramSummary, Metrics, MetricsCollector, MetricsSnapshot,
    DEFAULT_HISTOGRAM_WINDOW,
};
