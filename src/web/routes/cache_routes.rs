//! Manual cache administration.

use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use serde_json::{json, Value};
use tracing::info;

use crate::web::models::success;
use crate::web::AppState;

pub fn create_cache_router() -> Router<Arc<AppState>> {
    Router::new().route("/api/clear-cache", post(clear_cache))
}

/// Empties every cache instance immediately; the next read on each
/// endpoint goes back to the upstream.
async fn clear_cache(State(state): State<Arc<AppState>>) -> Json<Value> {
    state.caches.clear_all();
    info!("cache cleared manually");
    Json(success(json!({
        "message": "Cache cleared successfully",
    })))
}
