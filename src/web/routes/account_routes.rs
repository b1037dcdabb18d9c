//! Account details, with optional PII redaction.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use tracing::{debug, error, info};

use crate::web::error::AppError;
use crate::web::models::success;
use crate::web::AppState;

const ACCOUNT_CACHE_KEY: &str = "account_details";

pub fn create_account_router() -> Router<Arc<AppState>> {
    Router::new().route("/api/account-details", get(get_account_details))
}

/// Masks the contact email. Limits and monitor counts are not PII and pass
/// through untouched.
fn redact_account(body: &mut Value) {
    if let Some(account) = body.get_mut("account") {
        if account.get("email").is_some() {
            account["email"] = json!("[redacted]");
        }
    }
}

async fn get_account_details(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    if let Some(cached) = state.caches.account.get(ACCOUNT_CACHE_KEY) {
        debug!("returning cached account details");
        state.metrics.record_cache_hit();
        return Ok(Json(success(cached)));
    }

    state.metrics.record_cache_miss();
    info!("fetching fresh account details from the upstream API");

    let response = state.upstream.get_account_details().await?;
    if !response.is_success() {
        error!(status = response.status, "upstream account details request failed");
        return Err(AppError::Upstream {
            status: response.status,
            message: "Failed to fetch account details".to_string(),
            details: response.body,
        });
    }

    let mut body = response.body;
    // Redact before caching so hits and misses serve the same payload.
    if state.config.redact_account_details {
        redact_account(&mut body);
    }
    state.caches.account.set(ACCOUNT_CACHE_KEY, body.clone());
    Ok(Json(success(body)))
}
