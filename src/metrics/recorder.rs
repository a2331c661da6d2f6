//! Metrics recording implementation using Prometheus.

use prometheus::{
    register_counter_vec_with_registry, register_histogram_vec_with_registry,
    register_int_counter_with_registry, CounterVec, Encoder, HistogramVec, IntCounter, Opts,
    Registry, TextEncoder,
};
use std::sync::Arc;

/// Trait for recording interceptor metrics.
pub trait MetricsRecorder: Send + Sync + 'static {
    /// Records a refresh attempt with its outcome (`success` or `failure`).
    fn record_refresh(&self, result: &str);

    /// Records how long a refresh call took.
    fn record_refresh_duration(&self, duration_secs: f64, result: &str);

    /// Records what the interceptor did with a request.
    fn record_intercepted(&self, outcome: &str);

    /// Records a request that parked behind an in-flight refresh.
    fn record_waiter(&self);
}

/// Prometheus metrics collector.
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,

    // Refresh metrics
    refresh_total: CounterVec,
    refresh_duration_seconds: HistogramVec,

    // Interception metrics
    intercepted_requests_total: CounterVec,
    refresh_waiters_total: IntCounter,
}

impl Metrics {
    /// Creates a new metrics instance with its own Prometheus registry.
    pub fn new() -> Self {
        let registry = Arc::new(Registry::new());

        let refresh_total = register_counter_vec_with_registry!(
            Opts::new("session_refresh_total", "Total number of session refreshes"),
            &["result"],
            registry.clone()
        )
        .expect("Failed to register session_refresh_total");

        let refresh_duration_seconds = register_histogram_vec_with_registry!(
            "session_refresh_duration_seconds",
            "Session refresh duration in seconds",
            &["result"],
            vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
            registry.clone()
        )
        .expect("Failed to register session_refresh_duration_seconds");

        let intercepted_requests_total = register_counter_vec_with_registry!(
            Opts::new(
                "intercepted_requests_total",
                "Requests seen by the auth interceptor, by outcome"
            ),
            &["outcome"],
            registry.clone()
        )
        .expect("Failed to register intercepted_requests_total");

        let refresh_waiters_total = register_int_counter_with_registry!(
            Opts::new(
                "refresh_waiters_total",
                "Requests that waited on an in-flight refresh"
            ),
            registry.clone()
        )
        .expect("Failed to register refresh_waiters_total");

        Metrics {
            registry,
            refresh_total,
            refresh_duration_seconds,
            intercepted_requests_total,
            refresh_waiters_total,
        }
    }

    /// Renders all metrics in Prometheus text format.
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .expect("Failed to encode metrics");
        String::from_utf8(buffer).expect("Metrics encoding produced invalid UTF-8")
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRecorder for Metrics {
    fn record_refresh(&self, result: &str) {
        self.refresh_total.with_label_values(&[result]).inc();
    }

    fn record_refresh_duration(&self, duration_secs: f64, result: &str) {
        self.refresh_duration_seconds
            .with_label_values(&[result])
            .observe(duration_secs);
    }

    fn record_intercepted(&self, outcome: &str) {
        self.intercepted_requests_total
            .with_label_values(&[outcome])
            .inc();
    }

    fn record_waiter(&self) {
        self.refresh_waiters_total.inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_contains_recorded_series() {
        let metrics = Metrics::new();
        metrics.record_refresh("success");
        metrics.record_refresh_duration(0.12, "success");
        metrics.record_intercepted("retried");
        metrics.record_intercepted("retried");
        metrics.record_waiter();

        let text = metrics.render();
        assert!(text.contains("session_refresh_total{result=\"success\"} 1"));
        assert!(text.contains("intercepted_requests_total{outcome=\"retried\"} 2"));
        assert!(text.contains("refresh_waiters_total 1"));
        assert!(text.contains("session_refresh_duration_seconds_bucket"));
    }

    #[test]
    fn test_instances_do_not_share_registries() {
        let a = Metrics::new();
        let b = Metrics::new();
        a.record_waiter();
        assert!(b.render().contains("refresh_waiters_total 0"));
    }
}
