//! Retry wrapper around a single upstream request.

use thiserror::Error;
use tokio::time::{sleep, Duration};
use tracing::{error, warn};

use super::{Transport, TransportError, UpstreamRequest, UpstreamResponse};

/// Multiplier applied to the delay before each subsequent retry.
const BACKOFF_FACTOR: f64 = 1.5;

/// Default total attempt count.
pub const DEFAULT_RETRIES: u32 = 3;

/// Default delay before the first retry.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("upstream request failed after {attempts} attempt(s): {source}")]
    Exhausted {
        attempts: u32,
        source: TransportError,
    },
}

/// Issues `request` through `transport`, retrying network-level failures.
/// Decode failures and HTTP error statuses are never retried.
///
/// `retries` is the TOTAL number of attempts: `3` means at most three
/// attempts, `1` means a single attempt with no retry, and `0` is clamped
/// to `1` so the request is always attempted once.
///
/// The delay before the first retry is `initial_delay`, growing by 1.5x
/// before each further retry. No jitter, no cap.
pub async fn fetch_with_retry(
    transport: &dyn Transport,
    request: UpstreamRequest,
    retries: u32,
    initial_delay: Duration,
) -> Result<UpstreamResponse, FetchError> {
    let max_attempts = retries.max(1);
    let mut delay = initial_delay;
    let mut attempt = 1;

    loop {
        match transport.execute(request.clone()).await {
            Ok(response) => return Ok(response),
            Err(err) => {
                // A body that fails to decode is a malformed answer, not a
                // transient network fault; asking again will not fix it.
                let retryable = matches!(err, TransportError::Network(_));
                if !retryable || attempt >= max_attempts {
                    error!(url = %request.url, error = %err, attempts = attempt,
                        "upstream request failed after all retries");
                    return Err(FetchError::Exhausted {
                        attempts: attempt,
                        source: err,
                    });
                }
                warn!(url = %request.url, error = %err,
                    attempts_left = max_attempts - attempt,
                    "upstream request failed, retrying");
                sleep(delay).await;
                delay = delay.mul_f64(BACKOFF_FACTOR);
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::UpstreamMethod;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::Instant;

    /// Fails the first `failures` calls, then answers 200.
    struct FlakyTransport {
        failures: usize,
        calls: AtomicUsize,
    }

    impl FlakyTransport {
        fn new(failures: usize) -> Self {
            Self {
                failures,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Transport for FlakyTransport {
        async fn execute(
            &self,
            _request: UpstreamRequest,
        ) -> Result<UpstreamResponse, TransportError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(TransportError::Network("connection reset".to_string()))
            } else {
                Ok(UpstreamResponse {
                    status: 200,
                    body: json!({"stat": "ok"}),
                })
            }
        }
    }

    fn request() -> UpstreamRequest {
        UpstreamRequest {
            method: UpstreamMethod::Get,
            url: "https://api.example.test/v2/getMonitors".to_string(),
            body: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_two_failures_with_growing_delay() {
        let transport = FlakyTransport::new(2);
        let started = Instant::now();

        let response =
            fetch_with_retry(&transport, request(), 3, Duration::from_millis(1000))
                .await
                .expect("third attempt succeeds");

        assert_eq!(response.status, 200);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 3);
        // 1000ms before the first retry, 1500ms before the second.
        assert_eq!(started.elapsed(), Duration::from_millis(2500));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_exactly_three_attempts() {
        let transport = FlakyTransport::new(usize::MAX);

        let err = fetch_with_retry(&transport, request(), 3, Duration::from_millis(1000))
            .await
            .expect_err("all attempts fail");

        assert_eq!(transport.calls.load(Ordering::SeqCst), 3);
        let FetchError::Exhausted { attempts, .. } = err;
        assert_eq!(attempts, 3);
    }

    #[tokio::test]
    async fn retries_of_one_means_a_single_attempt() {
        let transport = FlakyTransport::new(usize::MAX);

        let result =
            fetch_with_retry(&transport, request(), 1, Duration::from_millis(1000)).await;

        assert!(result.is_err());
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_of_zero_still_attempts_once() {
        let transport = FlakyTransport::new(0);

        let response =
            fetch_with_retry(&transport, request(), 0, Duration::from_millis(1000))
                .await
                .expect("single attempt succeeds");

        assert_eq!(response.status, 200);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn decode_errors_are_not_retried() {
        struct GarbageTransport {
            calls: AtomicUsize,
        }

        #[async_trait]
        impl Transport for GarbageTransport {
            async fn execute(
                &self,
                _request: UpstreamRequest,
            ) -> Result<UpstreamResponse, TransportError> {
                self.calls.fetch_add(1, Ordering::SeqCst);
                Err(TransportError::Decode("expected value at line 1".to_string()))
            }
        }

        let transport = GarbageTransport {
            calls: AtomicUsize::new(0),
        };
        let err = fetch_with_retry(&transport, request(), 3, Duration::from_millis(1000))
            .await
            .expect_err("decode failure");

        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
        let FetchError::Exhausted { attempts, .. } = err;
        assert_eq!(attempts, 1);
    }

    #[tokio::test]
    async fn http_error_statuses_are_returned_without_retry() {
        struct ServerErrorTransport {
            calls: AtomicUsize,
        }

        #[async_trait]
        impl Transport for ServerErrorTransport {
            async fn execute(
                &self,
                _request: UpstreamRequest,
            ) -> Result<UpstreamResponse, TransportError> {
                self.calls.fetch_add(1, Ordering::SeqCst);
                Ok(UpstreamResponse {
                    status: 500,
                    body: json!({"stat": "fail"}),
                })
            }
        }

        let transport = ServerErrorTransport {
            calls: AtomicUsize::new(0),
        };
        let response =
            fetch_with_retry(&transport, request(), 3, Duration::from_millis(1000))
                .await
                .expect("status errors are not transport errors");

        assert_eq!(response.status, 500);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }
}
