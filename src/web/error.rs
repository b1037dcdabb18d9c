use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use thiserror::Error;

use crate::upstream::FetchError;
use crate::web::models::error_body;

/// Closed set of failures a handler can surface. Persistence errors never
/// appear here; the mirror logs and swallows them off the request path.
#[derive(Error, Debug)]
pub enum AppError {
    /// The upstream API answered with a non-2xx status. Passed through
    /// with the upstream's status code and body.
    #[error("upstream responded with status {status}")]
    Upstream {
        status: u16,
        message: String,
        details: Value,
    },
    /// Network-level failure after the retry budget was spent.
    #[error("upstream request failed")]
    Transport(#[from] FetchError),
    /// A malformed path parameter.
    #[error("invalid request: {0}")]
    Validation(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Upstream {
                status,
                message,
                details,
            } => (
                StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                error_body(status, &message, Some(details)),
            ),
            // The cause is already logged by the fetcher; the client gets a
            // fixed generic envelope.
            AppError::Transport(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body(500, "Internal server error", None),
            ),
            AppError::Validation(message) => {
                (StatusCode::BAD_REQUEST, error_body(400, &message, None))
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::TransportError;
    use serde_json::json;

    #[test]
    fn upstream_error_keeps_status_and_details() {
        let response = AppError::Upstream {
            status: 429,
            message: "Failed to fetch monitors".to_string(),
            details: json!({"stat": "fail"}),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn invalid_upstream_status_falls_back_to_500() {
        let response = AppError::Upstream {
            status: 0,
            message: "Failed to fetch monitors".to_string(),
            details: Value::Null,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn transport_errors_map_to_500() {
        let err = AppError::Transport(FetchError::Exhausted {
            attempts: 3,
            source: TransportError::Network("connection refused".to_string()),
        });
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn validation_errors_map_to_400() {
        let err = AppError::Validation("monitorId must be numeric".to_string());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
