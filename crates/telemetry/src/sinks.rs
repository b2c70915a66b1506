// Path: crates/telemetry/src/sinks.rs
//! Defines abstract traits for metrics reporting, decoupling the forge from the backend.

/// A no-op sink for use in tests where metrics are not needed.
#[derive(Debug, Clone, Copy)]
pub struct NopSink;

/// Metrics recorded by the request dispatcher.
pub trait CallMetricsSink: Send + Sync + std::fmt::Debug {
    /// Counts one gateway call by path and outcome (`ok`, `rejected`, `transport`, `malformed`).
    fn inc_calls_total(&self, path: &str, outcome: &'static str);
    /// Observes the round-trip latency of one gateway call.
    fn observe_call_duration(&self, path: &str, duration_secs: f64);
}
impl CallMetricsSink for NopSink {
    fn inc_calls_total(&self, _path: &str, _outcome: &'static str) {}
    fn observe_call_duration(&self, _path: &str, _duration_secs: f64) {}
}

/// Metrics recorded by the scenario and its confirmation poller.
pub trait ScenarioMetricsSink: Send + Sync + std::fmt::Debug {
    /// Counts one allowance re-query while confirming `token`.
    fn inc_poll_attempts(&self, token: &str);
    /// Counts one finished scenario step by result (`passed` or `failed`).
    fn inc_steps_total(&self, step: &'static str, result: &'static str);
}
impl ScenarioMetricsSink for NopSink {
    fn inc_poll_attempts(&self, _token: &str) {}
    fn inc_steps_total(&self, _step: &'static str, _result: &'static str) {}
}

// A unified sink that implements all domain-specific traits
pub trait MetricsSink: CallMetricsSink + ScenarioMetricsSink {}

// Blanket implementation
impl<T> MetricsSink for T where T: CallMetricsSink + ScenarioMetricsSink {}

/// The sink used when nothing else is installed.
pub fn nop() -> &'static dyn MetricsSink {
    static SINK: NopSink = NopSink;
    &SINK
}
