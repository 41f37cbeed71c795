/// Static fallback catalog
///
/// Last-resort data served when the upstream stays down through the whole
/// retry budget. Reference figures are coarse snapshots of the major coins;
/// every synthesized record carries `degraded: true` so callers can tell it
/// apart from live data.
use crate::api::types::CoinSnapshot;
use chrono::Utc;

struct CatalogCoin {
    id: &'static str,
    symbol: &'static str,
    name: &'static str,
    reference_price: f64,
    market_cap: f64,
}

/// Majors by market cap, descending; rank in degraded listings is the
/// position in this table
const CATALOG: [CatalogCoin; 8] = [
    CatalogCoin {
        id: "bitcoin",
        symbol: "btc",
        name: "Bitcoin",
        reference_price: 60000.0,
        market_cap: 1_200_000_000_000.0,
    },
    CatalogCoin {
        id: "ethereum",
        symbol: "eth",
        name: "Ethereum",
        reference_price: 3000.0,
        market_cap: 360_000_000_000.0,
    },
    CatalogCoin {
        id: "tether",
        symbol: "usdt",
        name: "Tether",
        reference_price: 1.0,
        market_cap: 110_000_000_000.0,
    },
    CatalogCoin {
        id: "binancecoin",
        symbol: "bnb",
        name: "BNB",
        reference_price: 550.0,
        market_cap: 85_000_000_000.0,
    },
    CatalogCoin {
        id: "solana",
        symbol: "sol",
        name: "Solana",
        reference_price: 150.0,
        market_cap: 65_000_000_000.0,
    },
    CatalogCoin {
        id: "usd-coin",
        symbol: "usdc",
        name: "USDC",
        reference_price: 1.0,
        market_cap: 32_000_000_000.0,
    },
    CatalogCoin {
        id: "ripple",
        symbol: "xrp",
        name: "XRP",
        reference_price: 0.5,
        market_cap: 28_000_000_000.0,
    },
    CatalogCoin {
        id: "dogecoin",
        symbol: "doge",
        name: "Dogecoin",
        reference_price: 0.1,
        market_cap: 12_000_000_000.0,
    },
];

fn synthesize(coin: &CatalogCoin, rank: Option<u32>) -> CoinSnapshot {
    CoinSnapshot {
        id: coin.id.to_string(),
        symbol: coin.symbol.to_string(),
        name: coin.name.to_string(),
        image: None,
        current_price: Some(coin.reference_price),
        price_change_percentage_24h: Some(0.0),
        market_cap: Some(coin.market_cap),
        market_cap_rank: rank,
        total_volume: Some(0.0),
        last_updated: Some(Utc::now()),
        degraded: true,
    }
}

/// Degraded stand-in for the top-coins listing, at most `limit` entries
pub fn top_coins(limit: u32) -> Vec<CoinSnapshot> {
    CATALOG
        .iter()
        .take(limit as usize)
        .enumerate()
        .map(|(index, coin)| synthesize(coin, Some(index as u32 + 1)))
        .collect()
}

/// Degraded stand-in for a price lookup, one record per requested id
///
/// Ids outside the catalog still get a record so the result covers the
/// request; their price is zero and their display fields echo the id.
pub fn coin_prices(ids: &[String]) -> Vec<CoinSnapshot> {
    ids.iter()
        .map(|id| match CATALOG.iter().find(|coin| coin.id == id.as_str()) {
            Some(coin) => synthesize(coin, None),
            None => CoinSnapshot {
                id: id.clone(),
                symbol: id.clone(),
                name: id.clone(),
                image: None,
                current_price: Some(0.0),
                price_change_percentage_24h: Some(0.0),
                market_cap: None,
                market_cap_rank: None,
                total_volume: None,
                last_updated: Some(Utc::now()),
                degraded: true,
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_coins_honors_limit_and_flags_degraded() {
        let coins = top_coins(5);
        assert_eq!(coins.len(), 5);
        assert_eq!(coins[0].id, "bitcoin");
        for (index, coin) in coins.iter().enumerate() {
            assert!(coin.degraded);
            assert_eq!(coin.market_cap_rank, Some(index as u32 + 1));
            assert!(coin.current_price.is_some());
        }
    }

    #[test]
    fn top_coins_never_exceeds_the_catalog() {
        let coins = top_coins(100);
        assert_eq!(coins.len(), CATALOG.len());
    }

    #[test]
    fn prices_cover_known_and_unknown_ids() {
        let ids = vec!["bitcoin".to_string(), "no-such-coin".to_string()];
        let coins = coin_prices(&ids);

        assert_eq!(coins.len(), 2);
        assert_eq!(coins[0].id, "bitcoin");
        assert_eq!(coins[0].current_price, Some(60000.0));
        assert_eq!(coins[1].id, "no-such-coin");
        assert_eq!(coins[1].current_price, Some(0.0));
        assert!(coins.iter().all(|coin| coin.degraded));
    }
}
