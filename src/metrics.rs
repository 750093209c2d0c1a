//! Application metrics
//!
//! Owns the global Prometheus recorder and the helpers that record request,
//! token, upload and extraction metrics. The `/metrics` route renders it.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;

/// Global Prometheus handle for metrics export
static PROMETHEUS_HANDLE: Lazy<PrometheusHandle> = Lazy::new(|| {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
});

/// Initialize metrics (call once at startup)
pub fn init_metrics() {
    // Force initialization of the lazy static
    let _ = &*PROMETHEUS_HANDLE;

    register_metrics();
}

/// Register all custom metrics
fn register_metrics() {
    metrics::describe_counter!(
        "tally_requests_total",
        "Total number of tokenize requests processed"
    );
    metrics::describe_histogram!(
        "tally_request_duration_seconds",
        "Tokenize request duration in seconds"
    );
    metrics::describe_counter!("tally_tokens_counted_total", "Total tokens counted");
    metrics::describe_counter!("tally_upload_bytes_total", "Total uploaded bytes read");
    metrics::describe_counter!(
        "tally_extraction_failures_total",
        "Documents that could not be parsed and were treated as empty"
    );
}

/// Render all metrics in Prometheus text format
pub fn render() -> String {
    PROMETHEUS_HANDLE.render()
}

/// Record a finished request
pub fn record_request(endpoint: &str, status: &str, duration_secs: f64) {
    metrics::counter!(
        "tally_requests_total",
        "endpoint" => endpoint.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("tally_request_duration_seconds", "endpoint" => endpoint.to_string())
        .record(duration_secs);
}

/// Record tokens counted for a request
pub fn record_tokens(endpoint: &str, encoding: &str, count: u64) {
    metrics::counter!(
        "tally_tokens_counted_total",
        "endpoint" => endpoint.to_string(),
        "encoding" => encoding.to_string()
    )
    .increment(count);
}

/// Record the size of an upload
pub fn record_upload_bytes(count: u64) {
    metrics::counter!("tally_upload_bytes_total").increment(count);
}

/// Record a document that failed to parse
pub fn record_extraction_failure(kind: &str) {
    metrics::counter!("tally_extraction_failures_total", "kind" => kind.to_string()).increment(1);
}
