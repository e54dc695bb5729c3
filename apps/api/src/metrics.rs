//! Fire-and-forget metrics sink.
//!
//! The workflow records named counters (skill counts, match score, execution
//! time) and tags (provider, model, job name). Delivery is best-effort by
//! contract: an implementation must never fail the caller, and workflow
//! correctness never depends on a recording reaching its destination.

use tracing::debug;

/// Sink for named workflow metrics and tags. Carried as `Arc<dyn MetricsSink>`.
pub trait MetricsSink: Send + Sync {
    fn record_metric(&self, name: &str, value: f64);
    fn set_tag(&self, name: &str, value: &str);
}

/// Default sink: emits every recording as a structured tracing event, so an
/// external collector can scrape them from the log stream.
pub struct LogMetricsSink;

impl MetricsSink for LogMetricsSink {
    fn record_metric(&self, name: &str, value: f64) {
        debug!(metric = name, value, "workflow metric");
    }

    fn set_tag(&self, name: &str, value: &str) {
        debug!(tag = name, value, "workflow tag");
    }
}

/// Discards every recording. Used in tests and anywhere metrics are unwanted.
pub struct NoopMetricsSink;

impl MetricsSink for NoopMetricsSink {
    fn record_metric(&self, _name: &str, _value: f64) {}

    fn set_tag(&self, _name: &str, _value: &str) {}
}
