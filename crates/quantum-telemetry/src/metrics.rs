//! Prometheus metrics for the state-management and genesis-export subsystems.
//!
//! All metrics follow the naming convention: `qc_<subsystem>_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g., state_commits_total)
//! - **Gauge**: Value that can go up or down (e.g., state_latest_height)
//! - **Histogram**: Distribution of values (e.g., export_duration_seconds)

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Gauge, Histogram, HistogramOpts, Opts,
    Registry, TextEncoder,
};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // STATE MANAGEMENT METRICS (Subsystem 4)
    // =========================================================================

    /// Total versions committed to the versioned store
    pub static ref STATE_COMMITS: Counter = Counter::new(
        "qc_state_commits_total",
        "Total number of state versions committed"
    ).expect("metric creation failed");

    /// Latest committed height
    pub static ref STATE_LATEST_HEIGHT: Gauge = Gauge::new(
        "qc_state_latest_height",
        "Height of the most recently committed state version"
    ).expect("metric creation failed");

    /// Versions removed by pruning
    pub static ref STATE_VERSIONS_PRUNED: Counter = Counter::new(
        "qc_state_versions_pruned_total",
        "Total number of historical state versions pruned"
    ).expect("metric creation failed");

    // =========================================================================
    // GENESIS EXPORT METRICS (Subsystem 18)
    // =========================================================================

    /// Export requests by outcome
    pub static ref EXPORT_REQUESTS: CounterVec = CounterVec::new(
        Opts::new("qc_export_requests_total", "Total state export requests"),
        &["outcome"]  // outcome: success/failed/cancelled
    ).expect("metric creation failed");

    /// Export duration histogram
    pub static ref EXPORT_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "qc_export_duration_seconds",
            "Time spent producing an exported application state"
        ).buckets(exponential_buckets(0.001, 2.0, 15).expect("valid bucket layout"))
    ).expect("metric creation failed");
}

/// Handle to the metrics registry
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Register all metrics with the global registry.
///
/// Registering twice fails with `MetricsInit`.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // State
        Box::new(STATE_COMMITS.clone()),
        Box::new(STATE_LATEST_HEIGHT.clone()),
        Box::new(STATE_VERSIONS_PRUNED.clone()),
        // Export
        Box::new(EXPORT_REQUESTS.clone()),
        Box::new(EXPORT_DURATION.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }

    Ok(MetricsHandle {
        _registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        self.histogram.observe(duration);
    }
}

/// Start timing for a histogram. Observation happens on drop.
#[macro_export]
macro_rules! time_histogram {
    ($histogram:expr) => {
        $crate::metrics::HistogramTimer::new(&$histogram)
    };
}
