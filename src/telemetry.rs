//! Prometheus metrics: the HTTP request counter and latency histogram, the
//! business counters, and the `/metrics` scrape router.

use std::time::Instant;

use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_RESPONSE_TIME_MS: &str = "http_response_time_milliseconds";
pub const PVZ_CREATED_TOTAL: &str = "pvz_created_total";
pub const RECEPTIONS_CREATED_TOTAL: &str = "receptions_created_total";
pub const PRODUCTS_ADDED_TOTAL: &str = "products_added_total";

const RESPONSE_TIME_BUCKETS_MS: &[f64] = &[5.0, 10.0, 25.0, 50.0, 75.0, 100.0, 200.0, 500.0];

fn builder() -> anyhow::Result<PrometheusBuilder> {
    Ok(PrometheusBuilder::new().set_buckets_for_metric(
        Matcher::Full(HTTP_RESPONSE_TIME_MS.to_string()),
        RESPONSE_TIME_BUCKETS_MS,
    )?)
}

/// Installs the global recorder. Call once, before any metric is touched.
pub fn install() -> anyhow::Result<PrometheusHandle> {
    let handle = builder()?.install_recorder()?;
    tracing::info!("prometheus recorder installed");
    Ok(handle)
}

pub fn pvz_created() {
    metrics::counter!(PVZ_CREATED_TOTAL).increment(1);
}

pub fn reception_created() {
    metrics::counter!(RECEPTIONS_CREATED_TOTAL).increment(1);
}

pub fn product_added() {
    metrics::counter!(PRODUCTS_ADDED_TOTAL).increment(1);
}

/// Counts every request and records its latency in milliseconds.
pub async fn track_http(request: Request<Body>, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let start = Instant::now();
    let response = next.run(request).await;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    let status = response.status().as_u16().to_string();
    metrics::counter!(HTTP_REQUESTS_TOTAL, "method" => method.clone(), "path" => path.clone(), "status" => status)
        .increment(1);
    metrics::histogram!(HTTP_RESPONSE_TIME_MS, "method" => method, "path" => path).record(elapsed_ms);

    response
}

async fn scrape(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        handle.render(),
    )
}

/// `GET /metrics`, served on its own listener without auth.
pub fn router(handle: PrometheusHandle) -> Router {
    Router::new()
        .route("/metrics", get(scrape))
        .with_state(handle)
}
