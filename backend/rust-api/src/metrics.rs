use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, register_int_gauge, Encoder, HistogramVec,
    IntCounterVec, IntGauge, TextEncoder,
};

lazy_static! {
    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .unwrap();

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .unwrap();

    // Business Metrics
    pub static ref SESSIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "sessions_total",
        "Total number of practice sessions",
        &["status"]
    )
    .unwrap();

    pub static ref SESSIONS_ACTIVE: IntGauge = register_int_gauge!(
        "sessions_active",
        "Number of currently active practice sessions"
    )
    .unwrap();

    pub static ref ATTEMPTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "attempts_total",
        "Total number of prompt attempts recorded",
        &["outcome"]
    )
    .unwrap();

    pub static ref INTERPRET_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "interpret_requests_total",
        "Total number of interpretation gateway calls",
        &["result"]
    )
    .unwrap();

    pub static ref CAPTURE_ERRORS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "capture_errors_total",
        "Total number of speech capture failures reported by clients",
        &["reason"]
    )
    .unwrap();

    pub static ref GAMES_COMPLETED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "games_completed_total",
        "Total number of mini games finished",
        &["kind", "perfect"]
    )
    .unwrap();

    pub static ref BADGES_UNLOCKED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "badges_unlocked_total",
        "Total number of badges unlocked",
        &["rarity"]
    )
    .unwrap();

    pub static ref PIN_UNLOCKS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "pin_unlocks_total",
        "Total number of parent dashboard unlock attempts",
        &["result"]
    )
    .unwrap();
}

/// Renders all metrics in Prometheus text format
pub fn render_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| prometheus::Error::Msg(format!("Failed to convert metrics to UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_register_and_render() {
        SESSIONS_TOTAL.with_label_values(&["started"]).inc();
        ATTEMPTS_TOTAL.with_label_values(&["answered"]).inc();
        INTERPRET_REQUESTS_TOTAL.with_label_values(&["ok"]).inc();

        let rendered = render_metrics().unwrap();
        assert!(rendered.contains("sessions_total"));
        assert!(rendered.contains("attempts_total"));
    }
}
