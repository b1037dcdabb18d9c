//! Process-lifetime request metrics.
//!
//! Counters are monotonic and reset only on restart. Latency samples
//! accumulate in a rolling buffer that a periodic task prunes to the most
//! recent [`LATENCY_SAMPLE_LIMIT`] entries once per minute.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use serde::Serialize;

/// Number of latency samples kept after a prune pass.
pub const LATENCY_SAMPLE_LIMIT: usize = 100;

/// How often the prune task runs.
pub const LATENCY_PRUNE_INTERVAL_SECS: u64 = 60;

#[derive(Default)]
pub struct Metrics {
    request_count: AtomicU64,
    error_count: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    latencies_ms: Mutex<Vec<u64>>,
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub requests: RequestStats,
    pub cache: CacheStats,
    pub latency: LatencyStats,
}

#[derive(Debug, Serialize)]
pub struct RequestStats {
    pub total: u64,
    pub errors: u64,
    pub success_rate: String,
}

#[derive(Debug, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: String,
}

#[derive(Debug, Serialize)]
pub struct LatencyStats {
    pub average_ms: String,
    pub samples: usize,
}

fn percentage(numerator: u64, denominator: u64) -> String {
    if denominator == 0 {
        "0%".to_string()
    } else {
        format!("{:.2}%", numerator as f64 / denominator as f64 * 100.0)
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_request_count(&self) {
        self.request_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_error_count(&self) {
        self.error_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_latency(&self, ms: u64) {
        self.latencies_ms.lock().unwrap().push(ms);
    }

    /// Discards all but the most recent [`LATENCY_SAMPLE_LIMIT`] samples.
    /// Called once per minute from the prune task spawned in `main`.
    pub fn prune_latencies(&self) {
        let mut samples = self.latencies_ms.lock().unwrap();
        let len = samples.len();
        if len > LATENCY_SAMPLE_LIMIT {
            samples.drain(..len - LATENCY_SAMPLE_LIMIT);
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let total = self.request_count.load(Ordering::Relaxed);
        let errors = self.error_count.load(Ordering::Relaxed);
        let hits = self.cache_hits.load(Ordering::Relaxed);
        let misses = self.cache_misses.load(Ordering::Relaxed);

        let samples = self.latencies_ms.lock().unwrap();
        let average_ms = if samples.is_empty() {
            0.0
        } else {
            samples.iter().sum::<u64>() as f64 / samples.len() as f64
        };

        MetricsSnapshot {
            requests: RequestStats {
                total,
                errors,
                success_rate: percentage(total.saturating_sub(errors), total),
            },
            cache: CacheStats {
                hits,
                misses,
                hit_rate: percentage(hits, hits + misses),
            },
            latency: LatencyStats {
                average_ms: format!("{average_ms:.2}"),
                samples: samples.len(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reports_zero_rates_without_traffic() {
        let metrics = Metrics::new();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.requests.total, 0);
        assert_eq!(snapshot.requests.success_rate, "0%");
        assert_eq!(snapshot.cache.hit_rate, "0%");
        assert_eq!(snapshot.latency.average_ms, "0.00");
        assert_eq!(snapshot.latency.samples, 0);
    }

    #[test]
    fn success_rate_counts_non_error_requests() {
        let metrics = Metrics::new();
        for _ in 0..4 {
            metrics.increment_request_count();
        }
        metrics.increment_error_count();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.requests.total, 4);
        assert_eq!(snapshot.requests.errors, 1);
        assert_eq!(snapshot.requests.success_rate, "75.00%");
    }

    #[test]
    fn hit_rate_uses_hits_plus_misses_as_denominator() {
        let metrics = Metrics::new();
        metrics.record_cache_hit();
        metrics.record_cache_hit();
        metrics.record_cache_hit();
        metrics.record_cache_miss();
        assert_eq!(metrics.snapshot().cache.hit_rate, "75.00%");
    }

    #[test]
    fn latency_average_covers_current_samples() {
        let metrics = Metrics::new();
        metrics.record_latency(10);
        metrics.record_latency(20);
        metrics.record_latency(33);
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.latency.samples, 3);
        assert_eq!(snapshot.latency.average_ms, "21.00");
    }

    #[test]
    fn prune_keeps_most_recent_hundred_samples() {
        let metrics = Metrics::new();
        for ms in 0..250u64 {
            metrics.record_latency(ms);
        }
        metrics.prune_latencies();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.latency.samples, LATENCY_SAMPLE_LIMIT);
        // Oldest 150 samples dropped: remaining are 150..=249.
        assert_eq!(snapshot.latency.average_ms, "199.50");
    }

    #[test]
    fn prune_is_a_no_op_under_the_limit() {
        let metrics = Metrics::new();
        metrics.record_latency(5);
        metrics.prune_latencies();
        assert_eq!(metrics.snapshot().latency.samples, 1);
    }
}
