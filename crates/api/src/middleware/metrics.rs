//! Prometheus metrics middleware.
//!
//! Provides HTTP request/response metrics collection and export, plus the
//! business counters recorded by route handlers.

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{header, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Instant;

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Route label set on responses produced outside the router, such as
/// public site pages, so their paths do not explode label cardinality.
#[derive(Debug, Clone, Copy)]
pub struct RouteLabel(pub &'static str);

/// Middleware to record HTTP request metrics.
///
/// Records the following metrics:
/// - `http_requests_total`: Counter with labels (method, path, status)
/// - `http_request_duration_seconds`: Histogram with labels (method, path)
pub async fn metrics_middleware(req: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = method_to_str(req.method());
    let matched = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string());

    let response = next.run(req).await;

    let path = response
        .extensions()
        .get::<RouteLabel>()
        .map(|l| l.0.to_string())
        .or(matched)
        .unwrap_or_else(|| "unmatched".to_string());
    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    counter!(
        "http_requests_total",
        "method" => method,
        "path" => path.clone(),
        "status" => status
    )
    .increment(1);

    histogram!(
        "http_request_duration_seconds",
        "method" => method,
        "path" => path
    )
    .record(duration);

    response
}

/// Convert HTTP method to string for metric labels.
fn method_to_str(method: &Method) -> &'static str {
    match *method {
        Method::GET => "GET",
        Method::POST => "POST",
        Method::PUT => "PUT",
        Method::DELETE => "DELETE",
        Method::PATCH => "PATCH",
        Method::HEAD => "HEAD",
        Method::OPTIONS => "OPTIONS",
        _ => "OTHER",
    }
}

/// Count a site save by trigger (`manual` or `auto`).
pub fn record_site_saved(mode: &'static str) {
    counter!("site_saves_total", "mode" => mode).increment(1);
}

/// Count a stored photo by slot (`hero` or `album`).
pub fn record_photo_uploaded(slot: &'static str) {
    counter!("site_photos_uploaded_total", "slot" => slot).increment(1);
}

/// Count an accepted RSVP; duplicates are retries inside the dedup window.
pub fn record_rsvp_submitted(duplicate: bool) {
    let kind = if duplicate { "duplicate" } else { "new" };
    counter!("rsvp_submissions_total", "kind" => kind).increment(1);
}

/// Count a rejected RSVP by error kind.
pub fn record_rsvp_rejected(reason: &'static str) {
    counter!("rsvp_rejections_total", "reason" => reason).increment(1);
}

/// Count a guest ledger sync outcome.
pub fn record_guest_sync(outcome: &'static str) {
    counter!("guest_sync_total", "outcome" => outcome).increment(1);
}

/// Handler for /metrics endpoint that returns Prometheus text format.
pub async fn metrics_handler() -> Response {
    match PROMETHEUS_HANDLE.get() {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            [(header::CONTENT_TYPE, "text/plain")],
            "Metrics not initialized",
        )
            .into_response(),
    }
}

/// Initialize the Prometheus metrics recorder.
///
/// Called once during startup. A second call keeps the first recorder.
pub fn init_metrics() -> Result<(), BuildError> {
    if PROMETHEUS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .set_buckets(&[0.001, 0.005, 0.01, 0.05, 0.1, 0.2, 0.5, 1.0, 2.0, 5.0])?
        .install_recorder()?;

    // Lost a race with another initializer; its recorder is the global one.
    let _ = PROMETHEUS_HANDLE.set(handle);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_to_str() {
        assert_eq!(method_to_str(&Method::GET), "GET");
        assert_eq!(method_to_str(&Method::POST), "POST");
        assert_eq!(method_to_str(&Method::PATCH), "PATCH");
        assert_eq!(method_to_str(&Method::TRACE), "OTHER");
    }

    #[test]
    fn test_business_counters_without_recorder() {
        record_site_saved("manual");
        record_photo_uploaded("hero");
        record_rsvp_submitted(true);
        record_rsvp_rejected("validation");
        record_guest_sync("created");
    }
}
