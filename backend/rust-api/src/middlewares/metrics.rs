use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

use crate::metrics::{HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION_SECONDS};

/// Records request count and latency for every route.
pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = normalize_path(req.uri().path());

    let response = next.run(req).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[&method, &path])
        .observe(duration);

    response
}

/// Replaces dynamic path segments (uuids, YYYY-MM-DD dates) with
/// placeholders so metric cardinality stays bounded.
fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if is_uuid_like(segment) {
                "{id}"
            } else if is_date_like(segment) {
                "{date}"
            } else {
                segment
            }
        })
        .collect::<Vec<&str>>()
        .join("/")
}

fn is_uuid_like(s: &str) -> bool {
    s.len() == 36 && s.chars().all(|c| c.is_ascii_hexdigit() || c == '-')
}

fn is_date_like(s: &str) -> bool {
    s.len() == 10
        && s.chars().enumerate().all(|(i, c)| match i {
            4 | 7 => c == '-',
            _ => c.is_ascii_digit(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_uuids_and_dates() {
        assert_eq!(
            normalize_path("/api/v1/sessions/0b418a5e-9612-4e52-a2f1-8a1f6f2f8f11/skip"),
            "/api/v1/sessions/{id}/skip"
        );
        assert_eq!(normalize_path("/api/v1/progress/2025-03-05"), "/api/v1/progress/{date}");
        assert_eq!(normalize_path("/api/v1/games/topics"), "/api/v1/games/topics");
    }
}
