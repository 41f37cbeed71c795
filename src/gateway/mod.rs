//! Rate-limited market-data gateway
//!
//! Every operation funnels through the same pipeline: check the response
//! cache, then queue the request for the single worker, which paces
//! dispatches and retries transient failures with exponential backoff. The
//! listing operations degrade to a static catalog when the upstream stays
//! down through the whole retry budget; detail and history lookups surface
//! the failure instead, since synthesized data would be useless there.
//!
//! Construction takes the transport as `Arc<dyn MarketApi>`, so tests drive
//! the full pipeline with a scripted in-process transport.

pub mod cache;
pub mod fallback;
pub mod pacer;
pub mod queue;
pub mod retry;

#[cfg(test)]
pub(crate) mod testing;

use crate::api::types::{CoinSnapshot, DetailedCoin, MarketChart, PricePoint};
use crate::api::MarketApi;
use crate::config::GatewayConfig;
use crate::errors::{FetchError, FetchResult};
use crate::logger::{self, LogTag};
use crate::stats::{GatewayStats, StatsTracker};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use cache::ResponseCache;
use pacer::RequestPacer;
use queue::RequestQueue;
use retry::RetryPolicy;

pub use cache::{CacheKeyStatus, CacheStatus};

// ============================================================================
// GATEWAY
// ============================================================================

pub struct MarketGateway {
    config: GatewayConfig,
    cache: Arc<ResponseCache>,
    queue: RequestQueue,
    stats: Arc<StatsTracker>,
}

impl MarketGateway {
    /// Build the gateway and spawn its request worker.
    ///
    /// Must be called from within a Tokio runtime. The worker stops once the
    /// gateway is dropped and its queued requests have settled.
    pub fn new(config: GatewayConfig, api: Arc<dyn MarketApi>) -> Self {
        let cache = Arc::new(ResponseCache::new(config.cache_ttl()));
        let stats = Arc::new(StatsTracker::new());
        let queue = RequestQueue::spawn(
            api,
            Arc::clone(&cache),
            RequestPacer::new(config.min_request_interval()),
            RetryPolicy::new(config.max_attempts, config.retry_base_delay()),
            Arc::clone(&stats),
        );

        logger::debug(
            LogTag::Gateway,
            &format!(
                "Gateway ready: ttl={}s interval={}ms attempts={}",
                config.cache_ttl_secs, config.min_request_interval_ms, config.max_attempts
            ),
        );

        Self {
            config,
            cache,
            queue,
            stats,
        }
    }

    // ===== LISTING OPERATIONS =====

    /// Top coins by market cap, at most `limit` entries
    pub async fn top_coins(&self, limit: u32) -> FetchResult<Vec<CoinSnapshot>> {
        self.top_coins_with_cancel(limit, None).await
    }

    pub async fn top_coins_with_cancel(
        &self,
        limit: u32,
        cancel: Option<CancellationToken>,
    ) -> FetchResult<Vec<CoinSnapshot>> {
        self.ensure_enabled()?;

        let key = format!("top_coins_{}", limit);
        let url = self.markets_url(limit);
        match self.fetch(url, &key, cancel).await {
            Ok(value) => parse(value),
            Err(err) if err.is_exhausted() => {
                self.note_degraded("top coins", &err).await;
                Ok(fallback::top_coins(limit))
            }
            Err(err) => Err(err),
        }
    }

    /// Market records for the given coin ids.
    ///
    /// Ids are trimmed, deduplicated and sorted first, so any ordering of
    /// the same set shares one cache entry and one upstream request. An
    /// empty set resolves to an empty listing without touching the queue.
    pub async fn coin_prices(&self, ids: &[String]) -> FetchResult<Vec<CoinSnapshot>> {
        self.coin_prices_with_cancel(ids, None).await
    }

    pub async fn coin_prices_with_cancel(
        &self,
        ids: &[String],
        cancel: Option<CancellationToken>,
    ) -> FetchResult<Vec<CoinSnapshot>> {
        self.ensure_enabled()?;

        let ids = canonical_ids(ids);
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let key = format!("prices_{}", ids.join(","));
        let url = self.prices_url(&ids);
        match self.fetch(url, &key, cancel).await {
            Ok(value) => parse(value),
            Err(err) if err.is_exhausted() => {
                self.note_degraded("coin prices", &err).await;
                Ok(fallback::coin_prices(&ids))
            }
            Err(err) => Err(err),
        }
    }

    // ===== DETAIL OPERATIONS =====

    /// Full record for one coin; failures are surfaced, never papered over
    pub async fn coin_details(&self, id: &str) -> FetchResult<DetailedCoin> {
        self.ensure_enabled()?;

        let key = format!("details_{}", id);
        let url = self.details_url(id);
        let value = self.fetch(url, &key, None).await?;
        parse(value)
    }

    /// Price series for one coin over `range` days ("1", "7", "30", "max")
    pub async fn price_history(&self, id: &str, range: &str) -> FetchResult<Vec<PricePoint>> {
        self.ensure_enabled()?;

        let key = format!("history_{}_{}", id, range);
        let url = self.history_url(id, range);
        let value = self.fetch(url, &key, None).await?;
        let chart: MarketChart = parse(value)?;
        Ok(chart.points())
    }

    // ===== CACHE MAINTENANCE =====

    pub async fn clear_cache(&self) {
        self.cache.clear().await;
        logger::info(LogTag::Cache, "Response cache cleared");
    }

    pub async fn cache_status(&self) -> CacheStatus {
        self.cache.status().await
    }

    pub async fn stats(&self) -> GatewayStats {
        self.stats.get_stats().await
    }

    // ===== INTERNALS =====

    fn ensure_enabled(&self) -> FetchResult<()> {
        if self.config.enabled {
            Ok(())
        } else {
            Err(FetchError::Disabled)
        }
    }

    /// Cache-first fetch; the queue re-checks the key at dispatch time, so
    /// concurrent calls for one key collapse into a single upstream request
    async fn fetch(
        &self,
        url: String,
        cache_key: &str,
        cancel: Option<CancellationToken>,
    ) -> FetchResult<Value> {
        if let Some(value) = self.cache.get(cache_key).await {
            self.stats.record_cache_hit().await;
            return Ok(value);
        }
        self.stats.record_cache_miss().await;

        self.queue
            .submit(url, Some(cache_key.to_string()), cancel)
            .await
    }

    async fn note_degraded(&self, what: &str, err: &FetchError) {
        logger::info(
            LogTag::Fallback,
            &format!("Serving degraded {} after upstream failure: {}", what, err),
        );
        self.stats.record_fallback().await;
    }

    fn markets_url(&self, limit: u32) -> String {
        format!(
            "{}/coins/markets?vs_currency={}&order=market_cap_desc&per_page={}&page=1&sparkline=false",
            self.config.base_url, self.config.vs_currency, limit
        )
    }

    fn prices_url(&self, ids: &[String]) -> String {
        format!(
            "{}/coins/markets?vs_currency={}&order=market_cap_desc&per_page={}&page=1&sparkline=false&ids={}",
            self.config.base_url,
            self.config.vs_currency,
            ids.len(),
            ids.join(",")
        )
    }

    fn details_url(&self, id: &str) -> String {
        format!(
            "{}/coins/{}?localization=false&tickers=false&market_data=true&community_data=false&developer_data=false",
            self.config.base_url, id
        )
    }

    fn history_url(&self, id: &str, range: &str) -> String {
        format!(
            "{}/coins/{}/market_chart?vs_currency={}&days={}",
            self.config.base_url, id, self.config.vs_currency, range
        )
    }
}

/// Order-independent request identity: trimmed, deduplicated, sorted
fn canonical_ids(ids: &[String]) -> Vec<String> {
    let mut ids: Vec<String> = ids
        .iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect();
    ids.sort();
    ids.dedup();
    ids
}

/// Decode a raw payload into the operation's typed view.
///
/// The worker judges transport only, so a well-formed JSON body with an
/// unexpected shape settles Ok and lands in the cache. The shape error
/// surfaces here as `Transient` straight to the caller, with no retry and
/// no fallback, and repeats on every read of that entry until it expires
/// or the cache is cleared.
fn parse<T: DeserializeOwned>(value: Value) -> FetchResult<T> {
    serde_json::from_value(value)
        .map_err(|err| FetchError::Transient(format!("Unexpected payload shape: {}", err)))
}

// ============================================================================
// TESTS
// ============================================================================
