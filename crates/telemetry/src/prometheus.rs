// Path: crates/telemetry/src/prometheus.rs
//! A concrete implementation of the metrics sinks using the Prometheus crate.

use crate::sinks::*;
use once_cell::sync::Lazy;
use prometheus::{
    exponential_buckets, register_histogram_vec, register_int_counter_vec, HistogramVec,
    IntCounterVec, TextEncoder,
};

// --- Metric Definitions ---

static CALLS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "gateway_forge_calls_total",
        "Total gateway calls by path and outcome.",
        &["path", "outcome"]
    )
    .unwrap()
});
static POLL_ATTEMPTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "gateway_forge_poll_attempts_total",
        "Total allowance re-queries made while confirming approvals.",
        &["token"]
    )
    .unwrap()
});
static STEPS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "gateway_forge_steps_total",
        "Total scenario steps by step name and result.",
        &["step", "result"]
    )
    .unwrap()
});
static CALL_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "gateway_forge_call_duration_seconds",
        "Round-trip latency of gateway calls.",
        &["path"],
        exponential_buckets(0.005, 2.0, 14).unwrap()
    )
    .unwrap()
});

#[derive(Debug, Clone, Copy)]
pub struct PrometheusSink;

impl CallMetricsSink for PrometheusSink {
    fn inc_calls_total(&self, path: &str, outcome: &'static str) {
        CALLS_TOTAL.with_label_values(&[path, outcome]).inc();
    }
    fn observe_call_duration(&self, path: &str, duration_secs: f64) {
        CALL_DURATION_SECONDS
            .with_label_values(&[path])
            .observe(duration_secs);
    }
}

impl ScenarioMetricsSink for PrometheusSink {
    fn inc_poll_attempts(&self, token: &str) {
        POLL_ATTEMPTS_TOTAL.with_label_values(&[token]).inc();
    }
    fn inc_steps_total(&self, step: &'static str, result: &'static str) {
        STEPS_TOTAL.with_label_values(&[step, result]).inc();
    }
}

pub fn install() -> &'static dyn MetricsSink {
    static SINK: PrometheusSink = PrometheusSink;
    &SINK
}

/// Renders every registered metric in the Prometheus text exposition format.
pub fn render() -> Result<String, prometheus::Error> {
    TextEncoder::new().encode_to_string(&prometheus::gather())
}
