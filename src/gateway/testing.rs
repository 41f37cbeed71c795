/// Test doubles shared by the gateway test modules
use crate::api::MarketApi;
use crate::config::GatewayConfig;
use crate::errors::{FetchError, FetchResult};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::time::Instant;
use tokio::sync::Mutex;

/// Scripted [`MarketApi`] that records every dispatch.
///
/// Responses are scripted per URL fragment: the first script whose fragment
/// appears in the requested URL is popped from. An exhausted or unmatched
/// request falls through to the default response.
pub(crate) struct MockApi {
    scripts: Mutex<Vec<(String, VecDeque<FetchResult<Value>>)>>,
    fallthrough: FetchResult<Value>,
    log: Mutex<Vec<(String, Instant)>>,
}

impl MockApi {
    /// Every unscripted request succeeds with an empty array
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(Vec::new()),
            fallthrough: Ok(json!([])),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Every unscripted request fails with a retryable error
    pub fn failing() -> Self {
        Self {
            scripts: Mutex::new(Vec::new()),
            fallthrough: Err(FetchError::Transient("HTTP 500: upstream down".to_string())),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Queue responses for URLs containing `fragment`, served in order
    pub async fn script(&self, fragment: &str, responses: Vec<FetchResult<Value>>) {
        self.scripts
            .lock()
            .await
            .push((fragment.to_string(), responses.into_iter().collect()));
    }

    pub async fn dispatch_count(&self) -> usize {
        self.log.lock().await.len()
    }

    pub async fn dispatched_urls(&self) -> Vec<String> {
        self.log.lock().await.iter().map(|(url, _)| url.clone()).collect()
    }

    pub async fn dispatch_times(&self) -> Vec<Instant> {
        self.log.lock().await.iter().map(|(_, at)| *at).collect()
    }
}

#[async_trait]
impl MarketApi for MockApi {
    async fn fetch_json(&self, url: &str) -> FetchResult<Value> {
        self.log
            .lock()
            .await
            .push((url.to_string(), Instant::now()));

        let mut scripts = self.scripts.lock().await;
        for (fragment, responses) in scripts.iter_mut() {
            if url.contains(fragment.as_str()) {
                if let Some(response) = responses.pop_front() {
                    return response;
                }
            }
        }
        self.fallthrough.clone()
    }
}

/// Config with intervals short enough for tests to finish quickly
pub(crate) fn test_config() -> GatewayConfig {
    GatewayConfig {
        base_url: "http://upstream.test".to_string(),
        min_request_interval_ms: 20,
        retry_base_delay_ms: 25,
        max_attempts: 3,
        cache_ttl_secs: 30,
        request_timeout_secs: 5,
        ..Default::default()
    }
}
