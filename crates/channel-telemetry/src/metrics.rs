//! Prometheus metrics for the sales-channel pipeline.
//!
//! All metrics carry the `sc_` prefix and a unit suffix where one applies.
//!
//! Metrics are created lazily and can be recorded before
//! [`register_metrics`] runs; registration only makes them visible to
//! [`encode_metrics`].

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Gauge, Histogram, Opts, Registry,
    TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // SUBMISSION QUEUE
    // =========================================================================

    /// Commands accepted into the submission queue
    pub static ref SUBMISSIONS_ENQUEUED: Counter = Counter::new(
        "sc_submissions_enqueued_total",
        "Total commands enqueued for submission"
    ).expect("metric creation failed");

    /// Terminal submission outcomes
    pub static ref SUBMISSIONS: CounterVec = CounterVec::new(
        Opts::new("sc_submissions_total", "Terminal submission outcomes"),
        &["command", "outcome"]  // outcome: confirmed/failed
    ).expect("metric creation failed");

    /// Commands waiting behind the in-flight submission
    pub static ref QUEUE_DEPTH: Gauge = Gauge::new(
        "sc_submission_queue_depth",
        "Number of pending submissions"
    ).expect("metric creation failed");

    /// Time from dequeue to terminal state
    pub static ref SUBMISSION_DURATION: Histogram = Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "sc_submission_duration_seconds",
            "Time spent signing and submitting one command"
        ).buckets(exponential_buckets(0.001, 2.0, 15).expect("valid buckets"))
    ).expect("metric creation failed");

    // =========================================================================
    // LEDGER CLIENT
    // =========================================================================

    /// HTTP requests against the ledger
    pub static ref LEDGER_REQUESTS: CounterVec = CounterVec::new(
        Opts::new("sc_ledger_requests_total", "Ledger HTTP requests"),
        &["endpoint", "outcome"]  // endpoint: submit/fetch_channel
    ).expect("metric creation failed");

    // =========================================================================
    // RECONCILER
    // =========================================================================

    /// Reconciliation outcomes
    pub static ref RECONCILIATIONS: CounterVec = CounterVec::new(
        Opts::new("sc_reconciliations_total", "Reconciliation outcomes"),
        &["outcome"]  // outcome: owner/seller/not_a_member/error
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; already-registered collectors are skipped.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(SUBMISSIONS_ENQUEUED.clone()),
        Box::new(SUBMISSIONS.clone()),
        Box::new(QUEUE_DEPTH.clone()),
        Box::new(SUBMISSION_DURATION.clone()),
        Box::new(LEDGER_REQUESTS.clone()),
        Box::new(RECONCILIATIONS.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(())
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
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_metrics_is_idempotent() {
        register_metrics().unwrap();
        register_metrics().unwrap();
    }

    #[test]
    fn test_encode_contains_registered_metric() {
        register_metrics().unwrap();
        SUBMISSIONS_ENQUEUED.inc();

        let text = encode_metrics().unwrap();
        assert!(text.contains("sc_submissions_enqueued_total"));
    }

    #[test]
    fn test_labelled_counter() {
        SUBMISSIONS
            .with_label_values(&["AddSeller", "confirmed"])
            .inc();
        assert!(
            SUBMISSIONS
                .with_label_values(&["AddSeller", "confirmed"])
                .get()
                >= 1.0
        );
    }

    #[test]
    fn test_histogram_timer() {
        let before = SUBMISSION_DURATION.get_sample_count();
        {
            let _timer = HistogramTimer::new(&SUBMISSION_DURATION);
        }
        assert!(SUBMISSION_DURATION.get_sample_count() > before);
    }
}
