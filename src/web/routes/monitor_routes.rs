//! Monitor listing and detail endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::db::models::extract_mirror_records;
use crate::db::services::mirror_service;
use crate::mappings::map_monitors_response;
use crate::web::error::AppError;
use crate::web::models::success;
use crate::web::AppState;

const MONITORS_CACHE_KEY: &str = "all_monitors";

pub fn create_monitor_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/monitors", get(get_monitors))
        .route("/api/monitor/{monitor_id}", get(get_monitor_detail))
        .route(
            "/api/monitor/{page_id}/{monitor_id}",
            get(get_public_monitor_detail),
        )
}

fn validate_monitor_id(monitor_id: &str) -> Result<(), AppError> {
    if monitor_id.is_empty() || !monitor_id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::Validation(
            "monitorId must be a numeric id".to_string(),
        ));
    }
    Ok(())
}

/// All monitors, enum-mapped, mirrored to the relational store when
/// persistence is enabled.
async fn get_monitors(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    if let Some(cached) = state.caches.monitors.get(MONITORS_CACHE_KEY) {
        debug!("returning cached monitors data");
        state.metrics.record_cache_hit();
        return Ok(Json(success(cached)));
    }

    state.metrics.record_cache_miss();
    info!("fetching fresh monitors data from the upstream API");

    let response = state.upstream.get_monitors().await?;
    if !response.is_success() {
        error!(status = response.status, "upstream monitors request failed");
        return Err(AppError::Upstream {
            status: response.status,
            message: "Failed to fetch monitors".to_string(),
            details: response.body,
        });
    }

    let mut body = response.body;

    // Mirror the raw records before mapping rewrites the enum fields the
    // store keeps numeric.
    if state.config.persistence_enabled {
        if let Some(pool) = state.db_pool.clone() {
            let (monitors, logs) = extract_mirror_records(&body);
            tokio::spawn(mirror_service::mirror_fetched_monitors(pool, monitors, logs));
        }
    }

    map_monitors_response(&mut body);
    state.caches.monitors.set(MONITORS_CACHE_KEY, body.clone());
    Ok(Json(success(body)))
}

/// One monitor by id through the authenticated upstream API.
async fn get_monitor_detail(
    State(state): State<Arc<AppState>>,
    Path(monitor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    validate_monitor_id(&monitor_id)?;
    let cache_key = format!("monitor_{monitor_id}");

    if let Some(cached) = state.caches.monitor_details.get(&cache_key) {
        debug!(%monitor_id, "returning cached monitor data");
        state.metrics.record_cache_hit();
        return Ok(Json(success(cached)));
    }

    state.metrics.record_cache_miss();
    info!(%monitor_id, "fetching fresh monitor data");

    let response = state.upstream.get_monitor(&monitor_id).await?;
    if !response.is_success() {
        error!(status = response.status, %monitor_id, "upstream monitor request failed");
        return Err(AppError::Upstream {
            status: response.status,
            message: "Failed to fetch monitor details".to_string(),
            details: response.body,
        });
    }

    let mut body = response.body;
    map_monitors_response(&mut body);
    state.caches.monitor_details.set(&cache_key, body.clone());
    Ok(Json(success(body)))
}

/// One monitor through its public status page.
async fn get_public_monitor_detail(
    State(state): State<Arc<AppState>>,
    Path((page_id, monitor_id)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    if page_id.is_empty() {
        return Err(AppError::Validation("pageId must not be empty".to_string()));
    }
    validate_monitor_id(&monitor_id)?;
    let cache_key = format!("monitor_{page_id}_{monitor_id}");

    if let Some(cached) = state.caches.monitor_details.get(&cache_key) {
        debug!(%monitor_id, "returning cached monitor data");
        state.metrics.record_cache_hit();
        return Ok(Json(success(cached)));
    }

    state.metrics.record_cache_miss();
    info!(%page_id, %monitor_id, "fetching fresh monitor data from the status page");

    let response = state
        .upstream
        .get_public_monitor(&page_id, &monitor_id)
        .await?;
    if !response.is_success() {
        error!(status = response.status, %monitor_id, "upstream status page request failed");
        return Err(AppError::Upstream {
            status: response.status,
            message: "Failed to fetch monitor details".to_string(),
            details: response.body,
        });
    }

    let mut body = response.body;
    map_monitors_response(&mut body);
    state.caches.monitor_details.set(&cache_key, body.clone());
    Ok(Json(success(body)))
}
