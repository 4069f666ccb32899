//! Bridge metrics.
//!
//! OpenTelemetry counters for requests, failures, cancellations, stream
//! chunks and preparation attempts, labelled by provider. Without the
//! `metrics` feature every recorder is a no-op.

#[cfg(feature = "metrics")]
use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram, Meter},
};

/// Metrics recorded by the bridge for one provider.
///
/// Available with the `metrics` feature.
#[cfg(feature = "metrics")]
#[derive(Clone)]
pub struct BridgeMetrics {
    /// Meter handle kept alive for metric instruments
    _meter: Meter,
    provider: &'static str,
    /// Generation calls started, one-shot and streaming
    pub requests: Counter<u64>,
    /// Generation calls that ended in an error other than cancellation
    pub failures: Counter<u64>,
    /// Generation calls cancelled by the caller or by disposal
    pub cancellations: Counter<u64>,
    /// Content chunks delivered to stream consumers
    pub chunks: Counter<u64>,
    /// Native preparation calls started
    pub preparation_attempts: Counter<u64>,
    /// Wall time of successful one-shot generations
    pub duration: Histogram<f64>,
}

#[cfg(feature = "metrics")]
impl BridgeMetrics {
    /// Create metrics for `provider` from the global meter.
    pub fn new(provider: &'static str) -> Self {
        tracing::debug!(provider, "Building bridge metrics instruments");
        let meter = global::meter("ondevice_bridge");

        Self {
            _meter: meter.clone(),
            provider,
            requests: meter
                .u64_counter("generation.requests")
                .with_description("Generation calls started")
                .build(),
            failures: meter
                .u64_counter("generation.failures")
                .with_description("Generation calls that failed")
                .build(),
            cancellations: meter
                .u64_counter("generation.cancellations")
                .with_description("Generation calls cancelled")
                .build(),
            chunks: meter
                .u64_counter("stream.chunks")
                .with_description("Stream chunks delivered")
                .build(),
            preparation_attempts: meter
                .u64_counter("preparation.attempts")
                .with_description("Native preparation calls started")
                .build(),
            duration: meter
                .f64_histogram("generation.duration")
                .with_unit("seconds")
                .with_description("One-shot generation duration")
                .build(),
        }
    }

    fn labels(&self, mode: &'static str) -> [KeyValue; 2] {
        [
            KeyValue::new("provider", self.provider),
            KeyValue::new("mode", mode),
        ]
    }

    /// Record a generation call starting.
    pub fn record_request(&self, mode: &'static str) {
        self.requests.add(1, &self.labels(mode));
    }

    /// Record a failed generation call.
    pub fn record_failure(&self, mode: &'static str) {
        self.failures.add(1, &self.labels(mode));
    }

    /// Record a cancelled generation call.
    pub fn record_cancellation(&self, mode: &'static str) {
        self.cancellations.add(1, &self.labels(mode));
    }

    /// Record one delivered stream chunk.
    pub fn record_chunk(&self) {
        self.chunks.add(1, &self.labels("stream"));
    }

    /// Record a native preparation call.
    pub fn record_preparation_attempt(&self) {
        self.preparation_attempts
            .add(1, &[KeyValue::new("provider", self.provider)]);
    }

    /// Record the duration of a successful one-shot generation.
    pub fn record_duration(&self, duration_secs: f64) {
        self.duration.record(duration_secs, &self.labels("generate"));
    }
}

/// No-op metrics used when the `metrics` feature is disabled.
#[cfg(not(feature = "metrics"))]
#[derive(Debug, Clone)]
pub struct BridgeMetrics;

#[cfg(not(feature = "metrics"))]
impl BridgeMetrics {
    /// Create no-op metrics.
    pub fn new(_provider: &'static str) -> Self {
        Self
    }

    /// No-op.
    pub fn record_request(&self, _mode: &'static str) {}

    /// No-op.
    pub fn record_failure(&self, _mode: &'static str) {}

    /// No-op.
    pub fn record_cancellation(&self, _mode: &'static str) {}

    /// No-op.
    pub fn record_chunk(&self) {}

    /// No-op.
    pub fn record_preparation_attempt(&self) {}

    /// No-op.
    pub fn record_duration(&self, _duration_secs: f64) {}
}
