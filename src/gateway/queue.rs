/// Channel-fed request scheduler
///
/// Producers submit work onto an unbounded channel and await a oneshot
/// reply; a single worker task drains the channel in order. FIFO dispatch
/// and the one-in-flight discipline hold by construction; there is no
/// drain-loop state to guard against re-entrant starts.
///
/// Per item the worker: honors an already-cancelled token, re-checks the
/// cache (a fresh value may have landed while the item sat queued), then
/// runs the retried request. Every attempt, retries included, waits for the
/// pacer first, so upstream spacing holds across item boundaries. On success
/// the cache is written and the caller settled. A failed item settles only
/// itself; the loop runs until the gateway side of the channel is dropped.
use crate::api::MarketApi;
use crate::errors::{FetchError, FetchResult};
use crate::logger::{self, LogTag};
use crate::stats::StatsTracker;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use super::cache::ResponseCache;
use super::pacer::RequestPacer;
use super::retry::RetryPolicy;

/// One pending upstream call
pub struct QueueItem {
    pub url: String,
    /// Key to re-check before dispatch and to populate on success; None
    /// skips both (caller handles caching, or the result is uncacheable)
    pub cache_key: Option<String>,
    pub reply: oneshot::Sender<FetchResult<Value>>,
    /// Best-effort cancellation: only consulted before dispatch, an
    /// in-flight network call is never aborted
    pub cancel: Option<CancellationToken>,
}

/// Submission handle; the worker exits when every handle is dropped
pub struct RequestQueue {
    tx: mpsc::UnboundedSender<QueueItem>,
}

impl RequestQueue {
    /// Spawn the worker task and return the submission handle
    pub fn spawn(
        api: Arc<dyn MarketApi>,
        cache: Arc<ResponseCache>,
        pacer: RequestPacer,
        retry: RetryPolicy,
        stats: Arc<StatsTracker>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(worker_loop(rx, api, cache, pacer, retry, stats));
        Self { tx }
    }

    /// Enqueue one request and wait for it to settle
    pub async fn submit(
        &self,
        url: String,
        cache_key: Option<String>,
        cancel: Option<CancellationToken>,
    ) -> FetchResult<Value> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.tx
            .send(QueueItem {
                url,
                cache_key,
                reply: reply_tx,
                cancel,
            })
            .map_err(|_| FetchError::Internal("Request worker is gone".to_string()))?;

        reply_rx
            .await
            .map_err(|_| FetchError::Internal("Request dropped without settling".to_string()))?
    }
}

async fn worker_loop(
    mut rx: mpsc::UnboundedReceiver<QueueItem>,
    api: Arc<dyn MarketApi>,
    cache: Arc<ResponseCache>,
    pacer: RequestPacer,
    retry: RetryPolicy,
    stats: Arc<StatsTracker>,
) {
    logger::debug(
        LogTag::Queue,
        &format!(
            "Request worker started ({} ms between dispatches, {} attempt budget)",
            pacer.min_interval().as_millis(),
            retry.max_attempts()
        ),
    );

    while let Some(item) = rx.recv().await {
        if let Some(token) = &item.cancel {
            if token.is_cancelled() {
                logger::debug(
                    LogTag::Queue,
                    &format!("Dropping cancelled request: {}", item.url),
                );
                let _ = item.reply.send(Err(FetchError::Cancelled));
                continue;
            }
        }

        // An earlier item may have populated this key while we were queued
        if let Some(key) = &item.cache_key {
            if let Some(value) = cache.get(key).await {
                logger::debug(
                    LogTag::Queue,
                    &format!("Settling {} from cache, no dispatch needed", key),
                );
                let _ = item.reply.send(Ok(value));
                continue;
            }
        }

        let start = Instant::now();
        let pacer_ref = &pacer;
        let api_ref = &api;
        let url = item.url.as_str();
        let result = retry
            .run(move || async move {
                pacer_ref.wait_turn().await;
                api_ref.fetch_json(url).await
            })
            .await;
        let elapsed_ms = start.elapsed().as_millis() as f64;
        stats.record_request(result.is_ok(), elapsed_ms).await;

        match &result {
            Ok(value) => {
                if let Some(key) = &item.cache_key {
                    cache.put(key, value.clone()).await;
                }
            }
            Err(err) => {
                logger::warning(
                    LogTag::Queue,
                    &format!("Request failed: {} ({})", item.url, err),
                );
            }
        }

        // A closed receiver means the caller went away; nothing to settle
        let _ = item.reply.send(result);
    }

    logger::debug(LogTag::Queue, "Request worker stopped");
}
