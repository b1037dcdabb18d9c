//! Fixed-window request limiter at the server boundary.
//!
//! Counts requests per client IP in a rolling fixed window; the window
//! resets on the first request after it elapses. Purely in-process; the
//! cache and fetcher know nothing about it.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use dashmap::DashMap;
use tokio::time::{Duration, Instant};
use tracing::warn;

use crate::web::models::error_body;
use crate::web::AppState;

struct WindowState {
    window_started: Instant,
    count: u64,
}

pub struct RateLimiter {
    window: Duration,
    max: u64,
    buckets: DashMap<IpAddr, WindowState>,
}

impl RateLimiter {
    pub fn new(window: Duration, max: u64) -> Self {
        Self {
            window,
            max,
            buckets: DashMap::new(),
        }
    }

    /// Returns false when the client has exhausted its window budget.
    pub fn try_acquire(&self, ip: IpAddr) -> bool {
        let now = Instant::now();
        let mut entry = self.buckets.entry(ip).or_insert_with(|| WindowState {
            window_started: now,
            count: 0,
        });
        if now.duration_since(entry.window_started) >= self.window {
            entry.window_started = now;
            entry.count = 0;
        }
        if entry.count >= self.max {
            false
        } else {
            entry.count += 1;
            true
        }
    }
}

pub async fn rate_limit(
    State(state): State<Arc<AppState>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    // Requests driven in-process (tests) carry no peer address; bucket
    // them under the unspecified IP.
    let ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    if state.rate_limiter.try_acquire(ip) {
        next.run(req).await
    } else {
        warn!(%ip, "rate limit exceeded");
        (
            StatusCode::TOO_MANY_REQUESTS,
            Json(error_body(
                429,
                "Too many requests, please try again later.",
                None,
            )),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, last))
    }

    #[tokio::test]
    async fn allows_up_to_max_within_the_window() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 3);
        assert!(limiter.try_acquire(ip(1)));
        assert!(limiter.try_acquire(ip(1)));
        assert!(limiter.try_acquire(ip(1)));
        assert!(!limiter.try_acquire(ip(1)));
    }

    #[tokio::test]
    async fn clients_are_counted_separately() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 1);
        assert!(limiter.try_acquire(ip(1)));
        assert!(!limiter.try_acquire(ip(1)));
        assert!(limiter.try_acquire(ip(2)));
    }

    #[tokio::test(start_paused = true)]
    async fn window_resets_after_it_elapses() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 1);
        assert!(limiter.try_acquire(ip(1)));
        assert!(!limiter.try_acquire(ip(1)));

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(limiter.try_acquire(ip(1)));
    }
}
