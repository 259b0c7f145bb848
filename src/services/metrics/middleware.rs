use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;

use super::MetricsRegistry;

/// Counts and times every request, labelled by a normalized route.
pub async fn metrics_middleware(
    State(metrics): State<Arc<MetricsRegistry>>,
    req: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = normalize_path(req.uri().path());

    // Process request
    let response = next.run(req).await;

    // Record metrics
    let status = response.status().as_u16().to_string();
    // HTTP request counter
    metrics
        .http_requests_total
        .with_label_values(&[&method, &path, &status])
        .inc();
    // HTTP request duration
    metrics
        .http_request_duration_seconds
        .with_label_values(&[&method, &path])
        .observe(start.elapsed().as_secs_f64());

    response
}

/// `/api/properties/550e8400-...` -> `/api/properties/:id`
fn normalize_path(path: &str) -> String {
    let normalized: Vec<&str> = path
        .split('/')
        .filter(|s| !s.is_empty())
        // Swap id-looking segments for a placeholder
        .map(|s| if is_id_like(s) { ":id" } else { s })
        .collect();

    format!("/{}", normalized.join("/"))
}

fn is_id_like(segment: &str) -> bool {
    // UUID pattern
    if segment.len() == 36 && segment.chars().filter(|c| *c == '-').count() == 4 {
        return true;
    }

    // All digits (numeric ID)
    if segment.chars().all(|c| c.is_ascii_digit()) {
        return true;
    }

    // Hex object id or hash (24+ chars)
    segment.len() >= 24 && segment.chars().all(|c| c.is_ascii_hexdigit())
}
