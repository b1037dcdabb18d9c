//! Liveness and metrics endpoints.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde_json::{json, Value};

use crate::version::VERSION;
use crate::web::models::success;
use crate::web::AppState;

pub fn create_status_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ws/health", get(get_health))
        .route("/ws/metrics", get(get_metrics))
}

async fn get_health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(success(json!({
        "status": "ok",
        "uptime": state.started_at.elapsed().as_secs(),
        "timestamp": Utc::now().timestamp_millis(),
        "version": VERSION,
    })))
}

async fn get_metrics(State(state): State<Arc<AppState>>) -> Json<Value> {
    let snapshot = state.metrics.snapshot();
    Json(success(
        serde_json::to_value(snapshot).unwrap_or(Value::Null),
    ))
}
