//! HTTP surface: application state, router assembly and the 404 fallback.

pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;

use std::sync::Arc;
use std::time::Instant;

use axum::{
    http::{header, HeaderValue, Method, StatusCode, Uri},
    middleware as axum_middleware,
    response::IntoResponse,
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde_json::json;
use sqlx::PgPool;
use tokio::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

use crate::cache::Cache;
use crate::metrics::Metrics;
use crate::server::config::ServerConfig;
use crate::upstream::UptimeRobotClient;
use crate::web::middleware::rate_limit::RateLimiter;

/// One cache instance per read endpoint, each with the TTL the endpoint's
/// data deserves: monitor details change fastest, the rest are stable.
pub struct Caches {
    pub monitors: Cache,
    pub monitor_details: Cache,
    pub public_pages: Cache,
    pub account: Cache,
}

impl Caches {
    pub fn with_default_ttls() -> Self {
        Self {
            monitors: Cache::new(Duration::from_secs(5 * 60)),
            monitor_details: Cache::new(Duration::from_secs(2 * 60)),
            public_pages: Cache::new(Duration::from_secs(5 * 60)),
            account: Cache::new(Duration::from_secs(5 * 60)),
        }
    }

    pub fn clear_all(&self) {
        self.monitors.clear();
        self.monitor_details.clear();
        self.public_pages.clear();
        self.account.clear();
    }
}

/// Shared state for every handler. Constructed once in the composition
/// root and handed to the router behind an `Arc`.
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub caches: Caches,
    pub metrics: Metrics,
    pub upstream: UptimeRobotClient,
    pub db_pool: Option<PgPool>,
    pub rate_limiter: RateLimiter,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        config: Arc<ServerConfig>,
        upstream: UptimeRobotClient,
        db_pool: Option<PgPool>,
    ) -> Self {
        let rate_limiter = RateLimiter::new(config.rate_limit_window, config.rate_limit_max);
        Self {
            config,
            caches: Caches::with_default_ttls(),
            metrics: Metrics::new(),
            upstream,
            db_pool,
            rate_limiter,
            started_at: Instant::now(),
        }
    }
}

fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION]);

    if allowed_origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(%origin, "ignoring unparseable CORS origin");
                    None
                }
            })
            .collect();
        cors.allow_origin(AllowOrigin::list(origins))
    }
}

async fn not_found_handler(method: Method, uri: Uri) -> impl IntoResponse {
    warn!(method = %method, uri = %uri, "route not found");
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "error": {
                "code": 404,
                "message": "The requested resource has not been found.",
                "method": method.as_str(),
                "endpoint": uri.to_string(),
                "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            }
        })),
    )
}

/// Assembles the full application router. Layer order mirrors the request
/// path: CORS, then the rate limiter, then request tracking, then the
/// handlers; the 404 fallback sits inside all three.
pub fn create_axum_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::status_routes::create_status_router())
        .merge(routes::monitor_routes::create_monitor_router())
        .merge(routes::psp_routes::create_psp_router())
        .merge(routes::account_routes::create_account_router())
        .merge(routes::cache_routes::create_cache_router())
        .fallback(not_found_handler)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::track::track,
        ))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit::rate_limit,
        ))
        .layer(build_cors_layer(&state.config.allowed_origins))
        .with_state(state)
}
