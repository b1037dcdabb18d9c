//! Public status page listing.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::mappings::map_psps_response;
use crate::web::error::AppError;
use crate::web::models::success;
use crate::web::AppState;

const PUBLIC_PAGES_CACHE_KEY: &str = "public_pages";

pub fn create_psp_router() -> Router<Arc<AppState>> {
    Router::new().route("/api/public-pages", get(get_public_pages))
}

async fn get_public_pages(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    if let Some(cached) = state.caches.public_pages.get(PUBLIC_PAGES_CACHE_KEY) {
        debug!("returning cached public pages data");
        state.metrics.record_cache_hit();
        return Ok(Json(success(cached)));
    }

    state.metrics.record_cache_miss();
    info!("fetching fresh public pages data from the upstream API");

    let response = state.upstream.get_public_pages().await?;
    if !response.is_success() {
        error!(status = response.status, "upstream public pages request failed");
        return Err(AppError::Upstream {
            status: response.status,
            message: "Failed to fetch public pages".to_string(),
            details: response.body,
        });
    }

    let mut body = response.body;
    map_psps_response(&mut body);
    state.caches.public_pages.set(PUBLIC_PAGES_CACHE_KEY, body.clone());
    Ok(Json(success(body)))
}
