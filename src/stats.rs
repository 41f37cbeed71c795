//! Request and cache counters for a gateway instance

use serde::Serialize;
use tokio::sync::Mutex;

/// Serializable snapshot of gateway activity
#[derive(Debug, Clone, Default, Serialize)]
pub struct GatewayStats {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub fallbacks_served: u64,
    pub average_response_time_ms: f64,
}

#[derive(Debug, Default)]
struct StatsInner {
    total_requests: u64,
    successful_requests: u64,
    failed_requests: u64,
    cache_hits: u64,
    cache_misses: u64,
    fallbacks_served: u64,
    total_response_time_ms: f64,
}

/// Mutable tracker behind an async lock; cloned snapshots via [`get_stats`].
#[derive(Debug, Default)]
pub struct StatsTracker {
    inner: Mutex<StatsInner>,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed upstream request (all attempts folded into one)
    pub async fn record_request(&self, success: bool, elapsed_ms: f64) {
        let mut inner = self.inner.lock().await;
        inner.total_requests += 1;
        inner.total_response_time_ms += elapsed_ms;
        if success {
            inner.successful_requests += 1;
        } else {
            inner.failed_requests += 1;
        }
    }

    pub async fn record_cache_hit(&self) {
        self.inner.lock().await.cache_hits += 1;
    }

    pub async fn record_cache_miss(&self) {
        self.inner.lock().await.cache_misses += 1;
    }

    pub async fn record_fallback(&self) {
        self.inner.lock().await.fallbacks_served += 1;
    }

    pub async fn get_stats(&self) -> GatewayStats {
        let inner = self.inner.lock().await;
        let average_response_time_ms = if inner.total_requests > 0 {
            inner.total_response_time_ms / inner.total_requests as f64
        } else {
            0.0
        };

        GatewayStats {
            total_requests: inner.total_requests,
            successful_requests: inner.successful_requests,
            failed_requests: inner.failed_requests,
            cache_hits: inner.cache_hits,
            cache_misses: inner.cache_misses,
            fallbacks_served: inner.fallbacks_served,
            average_response_time_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counters_and_average() {
        let tracker = StatsTracker::new();

        tracker.record_request(true, 100.0).await;
        tracker.record_request(false, 300.0).await;
        tracker.record_cache_hit().await;
        tracker.record_cache_miss().await;
        tracker.record_cache_miss().await;
        tracker.record_fallback().await;

        let stats = tracker.get_stats().await;
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.successful_requests, 1);
        assert_eq!(stats.failed_requests, 1);
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.cache_misses, 2);
        assert_eq!(stats.fallbacks_served, 1);
        assert!((stats.average_response_time_ms - 200.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn empty_tracker_has_zero_average() {
        let tracker = StatsTracker::new();
        let stats = tracker.get_stats().await;
        assert_eq!(stats.total_requests, 0);
        assert_eq!(stats.average_response_time_ms, 0.0);
    }
}
