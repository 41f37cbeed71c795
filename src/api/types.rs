/// Upstream payload views
///
/// The gateway moves raw `serde_json::Value` payloads through its queue and
/// cache; these structs are the typed views deserialized at the public
/// surface. Fields the gateway never interprets stay optional and default so
/// upstream schema drift does not break parsing.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// MARKET LIST / PRICE RECORDS
// ============================================================================

/// One row of the coins/markets listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinSnapshot {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub total_volume: Option<f64>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    /// Set on synthesized records served in degraded mode; never present in
    /// upstream payloads, so deserialization defaults it to false.
    #[serde(default)]
    pub degraded: bool,
}

// ============================================================================
// COIN DETAILS
// ============================================================================

/// Image URL set from the coin detail endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ImageSet {
    #[serde(default)]
    pub thumb: Option<String>,
    #[serde(default)]
    pub small: Option<String>,
    #[serde(default)]
    pub large: Option<String>,
}

/// Per-currency market figures from the coin detail endpoint
///
/// The upstream keys these maps by quote currency ("usd", "eur", ...).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MarketData {
    #[serde(default)]
    pub current_price: HashMap<String, f64>,
    #[serde(default)]
    pub market_cap: HashMap<String, f64>,
    #[serde(default)]
    pub total_volume: HashMap<String, f64>,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
}

/// Single full record from the coin detail endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedCoin {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub image: Option<ImageSet>,
    #[serde(default)]
    pub market_data: Option<MarketData>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl DetailedCoin {
    /// Current price in the given quote currency, if the upstream sent one
    pub fn price_in(&self, vs_currency: &str) -> Option<f64> {
        self.market_data
            .as_ref()
            .and_then(|md| md.current_price.get(vs_currency))
            .copied()
    }
}

// ============================================================================
// PRICE HISTORY
// ============================================================================

/// Raw market_chart response; series come as [timestamp_ms, value] pairs
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MarketChart {
    #[serde(default)]
    pub prices: Vec<[f64; 2]>,
}

/// One point of a price time series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp_ms: i64,
    pub price: f64,
}

impl MarketChart {
    /// Flatten the raw pair array into typed points
    pub fn points(&self) -> Vec<PricePoint> {
        self.prices
            .iter()
            .map(|pair| PricePoint {
                timestamp_ms: pair[0] as i64,
                price: pair[1],
            })
            .collect()
    }
}
