//! Prometheus metrics for chat-service.
//!
//! Recording goes through the `metrics` facade; the Prometheus recorder is
//! installed once at startup and rendered by `GET /metrics`.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global Prometheus recorder. Call once at startup.
pub fn init_metrics() -> anyhow::Result<()> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("failed to install Prometheus recorder: {}", e))?;

    if METRICS_HANDLE.set(handle).is_err() {
        anyhow::bail!("metrics recorder already initialized");
    }

    tracing::info!("Prometheus metrics initialized");
    Ok(())
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

/// Record the outcome of a chat request: `ok`, `unavailable` or `error`.
pub fn record_chat_request(outcome: &'static str) {
    counter!("chat_requests_total", "outcome" => outcome).increment(1);
}

/// Record model call latency.
pub fn record_model_latency(model: &str, duration_secs: f64) {
    histogram!("chat_model_latency_seconds", "model" => model.to_string()).record(duration_secs);
}

/// Record a failed model call.
pub fn record_model_error(error_type: &'static str) {
    counter!("chat_model_errors_total", "error_type" => error_type).increment(1);
}

/// Record token usage reported by the provider.
pub fn record_tokens(model: &str, input_tokens: u64, output_tokens: u64) {
    counter!("chat_tokens_total", "model" => model.to_string(), "type" => "input")
        .increment(input_tokens);
    counter!("chat_tokens_total", "model" => model.to_string(), "type" => "output")
        .increment(output_tokens);
}

/// Record the number of sessions held in memory.
pub fn set_session_count(count: usize) {
    gauge!("chat_sessions").set(count as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_without_recorder_reports_uninitialized() {
        if METRICS_HANDLE.get().is_none() {
            assert!(get_metrics().starts_with("# Metrics recorder not initialized"));
        }
    }

    #[test]
    fn recording_without_recorder_is_a_noop() {
        record_chat_request("ok");
        record_model_latency("mock", 0.1);
        record_model_error("api_error");
        record_tokens("mock", 3, 10);
        set_session_count(2);
    }
}
