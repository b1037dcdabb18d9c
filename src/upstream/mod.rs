//! Outbound HTTP plumbing for the upstream monitoring API.
//!
//! The [`Transport`] trait is the seam between the retrying fetcher and the
//! network: production uses [`HttpTransport`] over a shared `reqwest`
//! client, tests substitute a scripted transport that counts calls.

pub mod client;
pub mod fetch;

pub use client::UptimeRobotClient;
pub use fetch::{fetch_with_retry, FetchError};

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// HTTP method subset the upstream API needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamMethod {
    Get,
    Post,
}

/// A single outbound request, cheap to clone for retries.
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub method: UpstreamMethod,
    pub url: String,
    pub body: Option<Value>,
}

impl UpstreamRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: UpstreamMethod::Get,
            url: url.into(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: UpstreamMethod::Post,
            url: url.into(),
            body: Some(body),
        }
    }
}

/// Decoded upstream response. Non-2xx statuses are carried here rather
/// than treated as transport failures; the handlers pass them through.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: Value,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            TransportError::Decode(err.to_string())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

/// Executes one request attempt. Implementations must not retry; the
/// fetcher owns the retry policy.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: UpstreamRequest) -> Result<UpstreamResponse, TransportError>;
}

/// Production transport over a shared `reqwest` client.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Builds the shared client with a request-level timeout; the upstream
    /// API can otherwise hang a handler for the client's full default.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: UpstreamRequest) -> Result<UpstreamResponse, TransportError> {
        let builder = match request.method {
            UpstreamMethod::Get => self.client.get(&request.url),
            UpstreamMethod::Post => {
                let builder = self.client.post(&request.url);
                match request.body {
                    Some(body) => builder.json(&body),
                    None => builder,
                }
            }
        };

        let response = builder
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.json::<Value>().await?;
        Ok(UpstreamResponse { status, body })
    }
}
