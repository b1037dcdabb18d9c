//! Per-request accounting: metrics counters plus a structured access log.

use std::sync::Arc;
use std::time::Instant;

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use tracing::info;

use crate::web::AppState;

pub async fn track(
    State(state): State<Arc<AppState>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let started = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();

    state.metrics.increment_request_count();
    let response = next.run(req).await;

    let duration_ms = started.elapsed().as_millis() as u64;
    state.metrics.record_latency(duration_ms);
    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        state.metrics.increment_error_count();
    }

    info!(
        method = %method,
        uri = %uri,
        status = status.as_u16(),
        duration_ms,
        "request completed"
    );

    response
}
