/// Upstream HTTP transport
///
/// [`MarketApi`] is the seam between the gateway and the network: exactly
/// one attempt per call, no retry, no pacing, since those policies live in
/// the gateway. Production uses [`HttpMarketApi`]; tests inject a scripted
/// implementation.
pub mod types;

pub use self::types::{CoinSnapshot, DetailedCoin, MarketChart, MarketData, PricePoint};

use crate::config::GatewayConfig;
use crate::errors::{FetchError, FetchResult};
use crate::logger::{self, LogTag};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Instant;

/// Header carrying the demo-tier API key
const API_KEY_HEADER: &str = "x-cg-demo-api-key";

/// Longest upstream body fragment quoted in error messages
const ERROR_BODY_SNIPPET_LEN: usize = 200;

/// Single-attempt JSON fetch against the upstream provider
#[async_trait]
pub trait MarketApi: Send + Sync {
    /// Perform exactly one network attempt for `url`.
    ///
    /// Failure mapping: HTTP 429 → [`FetchError::RateLimited`]; any other
    /// network, HTTP or payload-decoding failure → [`FetchError::Transient`].
    async fn fetch_json(&self, url: &str) -> FetchResult<Value>;
}

/// Live reqwest-backed transport
pub struct HttpMarketApi {
    client: Client,
    api_key: String,
}

impl HttpMarketApi {
    /// Build a client with the per-request timeout from configuration
    pub fn new(config: &GatewayConfig) -> FetchResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| FetchError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl MarketApi for HttpMarketApi {
    async fn fetch_json(&self, url: &str) -> FetchResult<Value> {
        logger::debug(LogTag::Api, &format!("GET {}", url));
        let start = Instant::now();

        let mut request = self.client.get(url).header("Accept", "application/json");
        if !self.api_key.is_empty() {
            request = request.header(API_KEY_HEADER, &self.api_key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Transient(format!("Request timed out: {}", e))
            } else {
                FetchError::Transient(format!("Request failed: {}", e))
            }
        })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            logger::warning(LogTag::Api, &format!("Upstream throttling (HTTP 429): {}", url));
            return Err(FetchError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Transient(format!(
                "HTTP {}: {}",
                status,
                snippet(&body)
            )));
        }

        let value = response
            .json::<Value>()
            .await
            .map_err(|e| FetchError::Transient(format!("Failed to parse response: {}", e)))?;

        logger::debug(
            LogTag::Api,
            &format!("200 OK in {} ms: {}", start.elapsed().as_millis(), url),
        );

        Ok(value)
    }
}

/// Truncate an upstream body for inclusion in an error message
fn snippet(body: &str) -> &str {
    let end = body
        .char_indices()
        .take(ERROR_BODY_SNIPPET_LEN)
        .last()
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    &body[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_builds_from_default_config() {
        let config = GatewayConfig::default();
        assert!(HttpMarketApi::new(&config).is_ok());
    }

    #[test]
    fn snippet_truncates_long_bodies() {
        let long = "x".repeat(500);
        assert_eq!(snippet(&long).len(), ERROR_BODY_SNIPPET_LEN);
        assert_eq!(snippet("short"), "short");
        assert_eq!(snippet(""), "");
    }
}
