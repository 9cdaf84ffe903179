//! Prometheus metrics collection middleware
//!
//! Records `http_requests_total` (counter) and `http_request_duration_seconds`
//! (histogram) for every request, with method/path/status labels.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

/// Paths served by the router; anything else is labelled `other` so stray
/// requests cannot blow up label cardinality
const KNOWN_PATHS: [&str; 8] = [
    "/",
    "/start",
    "/back",
    "/assess",
    "/doctors",
    "/api/assess",
    "/health",
    "/metrics",
];

fn normalize_path(path: &str) -> &'static str {
    KNOWN_PATHS
        .into_iter()
        .find(|known| *known == path)
        .unwrap_or("other")
}

/// Middleware that records request count and duration metrics.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = normalize_path(request.uri().path());

    let start = Instant::now();
    let response = next.run(request).await;
    let duration = start.elapsed().as_secs_f64();

    let status = response.status().as_u16().to_string();

    metrics::counter!(
        "http_requests_total",
        "method" => method.clone(),
        "path" => path,
        "status" => status
    )
    .increment(1);

    metrics::histogram!(
        "http_request_duration_seconds",
        "method" => method,
        "path" => path
    )
    .record(duration);

    response
}
