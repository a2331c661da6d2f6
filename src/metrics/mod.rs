//! Metrics collection and exposition for Prometheus.
//!
//! Counts refreshes and what the interceptor did with each failed request.

mod recorder;

pub use recorder::{Metrics, MetricsRecorder};
