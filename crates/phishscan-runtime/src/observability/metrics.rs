//! Metrics collection and reporting

use serde::Serialize;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::Duration;

/// Counter metric
#[derive(Debug)]
pub struct Counter {
    name: String,
    value: AtomicU64,
}

impl Counter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inc(&self) {
        self.add(1);
    }

    pub fn add(&self, value: u64) {
        self.value.fetch_add(value, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.value.store(0, Ordering::Relaxed);
    }
}

/// Samples kept per histogram for percentile estimates
pub const DEFAULT_HISTOGRAM_WINDOW: usize = 1024;

#[derive(Debug, Default)]
struct HistogramState {
    window: VecDeque<f64>,
    count: u64,
    sum: f64,
}

/// Histogram metric for tracking distributions
///
/// `count` and `sum` cover every observation. Percentiles are computed
/// over the most recent `capacity` samples.
#[derive(Debug)]
pub struct Histogram {
    name: String,
    capacity: usize,
    state: Mutex<HistogramState>,
}

impl Histogram {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_capacity(name, DEFAULT_HISTOGRAM_WINDOW)
    }

    pub fn with_capacity(name: impl Into<String>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            name: name.into(),
            capacity,
            state: Mutex::new(HistogramState {
                window: VecDeque::with_capacity(capacity),
                ..Default::default()
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn state(&self) -> MutexGuard<'_, HistogramState> {
        // A panic while holding the lock cannot leave the state half-written
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn observe(&self, value: f64) {
        let mut state = self.state();
        state.count += 1;
        state.sum += value;
        if state.window.len() == self.capacity {
            state.window.pop_front();
        }
        state.window.push_back(value);
    }

    /// Observe a duration in seconds
    pub fn observe_duration(&self, duration: Duration) {
        self.observe(duration.as_secs_f64());
    }

    pub fn count(&self) -> u64 {
        self.state().count
    }

    /// Number of samples currently held for percentiles
    pub fn retained(&self) -> usize {
        self.state().window.len()
    }

    pub fn sum(&self) -> f64 {
        self.state().sum
    }

    pub fn avg(&self) -> f64 {
        let state = self.state();
        average(state.sum, state.count)
    }

    /// Get percentile (0-100)
    pub fn percentile(&self, p: f64) -> f64 {
        percentile_of(&self.sorted_window(), p)
    }

    pub fn reset(&self) {
        let mut state = self.state();
        state.window.clear();
        state.count = 0;
        state.sum = 0.0;
    }

    fn sorted_window(&self) -> Vec<f64> {
        let mut values: Vec<f64> = self.state().window.iter().copied().collect();
        values.sort_by(|a, b| a.total_cmp(b));
        values
    }

    fn summary(&self) -> HistogramSummary {
        let (count, sum, mut values) = {
            let state = self.state();
            let values: Vec<f64> = state.window.iter().copied().collect();
            (state.count, state.sum, values)
        };
        values.sort_by(|a, b| a.total_cmp(b));

        HistogramSummary {
            count,
            sum,
            avg: average(sum, count),
            p50: percentile_of(&values, 50.0),
            p95: percentile_of(&values, 95.0),
            p99: percentile_of(&values, 99.0),
        }
    }
}

fn average(sum: f64, count: u64) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn percentile_of(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let index = ((p / 100.0) * (sorted.len() - 1) as f64).round() as usize;
    sorted[index.min(sorted.len() - 1)]
}

/// Metrics trait
pub trait Metrics: Send + Sync {
    /// Get or create a counter
    fn counter(&self, name: &str) -> Arc<Counter>;

    /// Get or create a histogram
    fn histogram(&self, name: &str) -> Arc<Histogram>;

    /// Record the duration of `operation` into `<operation>_duration`
    fn record_execution_time(&self, operation: &str, duration: Duration);

    /// Increment `errors_<error_type>`
    fn record_error(&self, error_type: &str);
}

/// Point-in-time view of all metrics
#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricsSnapshot {
    pub counters: BTreeMap<String, u64>,
    pub histograms: BTreeMap<String, HistogramSummary>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct HistogramSummary {
    pub count: u64,
    pub sum: f64,
    pub avg: f64,
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
}

/// Metrics collector
#[derive(Default)]
pub struct MetricsCollector {
    counters: RwLock<HashMap<String, Arc<Counter>>>,
    histograms: RwLock<HashMap<String, Arc<Histogram>>>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counter_names(&self) -> Vec<String> {
        self.counters
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .keys()
            .cloned()
            .collect()
    }

    pub fn histogram_names(&self) -> Vec<String> {
        self.histograms
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .keys()
            .cloned()
            .collect()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let counters = self
            .counters
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .map(|(name, counter)| (name.clone(), counter.get()))
            .collect();

        let histograms = self
            .histograms
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .map(|(name, histogram)| (name.clone(), histogram.summary()))
            .collect();

        MetricsSnapshot {
            counters,
            histograms,
        }
    }

    pub fn reset_all(&self) {
        for counter in self
            .counters
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .values()
        {
            counter.reset();
        }
        for histogram in self
            .histograms
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .values()
        {
            histogram.reset();
        }
    }
}

impl Metrics for MetricsCollector {
    fn counter(&self, name: &str) -> Arc<Counter> {
        self.counters
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Counter::new(name)))
            .clone()
    }

    fn histogram(&self, name: &str) -> Arc<Histogram> {
        self.histograms
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Histogram::new(name)))
            .clone()
    }

    fn record_execution_time(&self, operation: &str, duration: Duration) {
        self.histogram(&format!("{}_duration", operation))
            .observe_duration(duration);
    }

    fn record_error(&self, error_type: &str) {
        self.counter(&format!("errors_{}", error_type)).inc();
    }
}
