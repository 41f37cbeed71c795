use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use coinfeed::api::types::{CoinSnapshot, DetailedCoin, PricePoint};
use coinfeed::api::HttpMarketApi;
use coinfeed::config::{Config, GatewayConfig, DEFAULT_CONFIG_PATH};
use coinfeed::gateway::{CacheStatus, MarketGateway};
use coinfeed::logger::{self, LogTag};
use coinfeed::stats::GatewayStats;
use colored::Colorize;
use std::sync::Arc;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Parser)]
#[command(name = "coinfeed")]
#[command(about = "Rate-limited market data gateway for the CoinGecko API", long_about = None)]
struct Args {
    /// Config file path; created with defaults when missing
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, global = true)]
    config: String,

    /// Verbose logging for every subsystem
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress everything below error level
    #[arg(long, global = true)]
    quiet: bool,

    /// Explicit log threshold: error, warning, info, debug or verbose
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Extra logging for single subsystems
    #[arg(long, global = true)]
    debug_api: bool,
    #[arg(long, global = true)]
    debug_gateway: bool,
    #[arg(long, global = true)]
    debug_cache: bool,
    #[arg(long, global = true)]
    debug_queue: bool,
    /// Extra logging for every subsystem at once
    #[arg(long, global = true)]
    debug_all: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the top coins by market cap
    Top {
        /// Number of coins to fetch
        #[arg(short, long, default_value = "10")]
        limit: u32,
    },
    /// Current market records for specific coins
    Prices {
        /// Coin ids, space or comma separated, e.g. bitcoin ethereum
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Full record for one coin
    Details {
        /// Coin id, e.g. bitcoin
        id: String,
    },
    /// Price series for one coin
    History {
        /// Coin id, e.g. bitcoin
        id: String,
        /// Days to cover: a number or "max"
        #[arg(short, long, default_value = "7")]
        range: String,
    },
    /// Check upstream reachability and show the effective configuration
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Raw args feed the logger's debug-flag scan; clap parses them after
    coinfeed::arguments::set_cmd_args(std::env::args().collect());
    logger::init();

    let args = Args::parse();

    logger::info(LogTag::System, "🚀 coinfeed starting up...");
    print_debug_summary(&args);

    let config = Config::load(&args.config)?;
    let api = Arc::new(HttpMarketApi::new(&config.gateway)?);
    let gateway = MarketGateway::new(config.gateway.clone(), api);

    match args.command {
        Command::Top { limit } => {
            let coins = gateway.top_coins(limit).await?;
            print_snapshots(&coins);
        }
        Command::Prices { ids } => {
            // Accept both `prices bitcoin ethereum` and `prices bitcoin,ethereum`
            let ids: Vec<String> = ids
                .iter()
                .flat_map(|arg| arg.split(','))
                .map(|id| id.trim().to_string())
                .collect();
            let coins = gateway.coin_prices(&ids).await?;
            print_snapshots(&coins);
        }
        Command::Details { id } => {
            let details = gateway.coin_details(&id).await?;
            print_details(&details, &config.gateway.vs_currency);
        }
        Command::History { id, range } => {
            let points = gateway.price_history(&id, &range).await?;
            print_history(&id, &range, &points);
        }
        Command::Status => {
            // One cheap listing call tells us whether the upstream answers
            let upstream = match gateway.top_coins(1).await {
                Ok(coins) if coins.iter().any(|coin| coin.degraded) => {
                    "degraded (serving fallback data)".to_string()
                }
                Ok(_) => "reachable".to_string(),
                Err(err) => format!("unreachable ({err})"),
            };
            print_status(&config.gateway, &upstream, &gateway.cache_status().await);
        }
    }

    print_stats(&gateway.stats().await);

    Ok(())
}

/// Announce non-default logging modes at startup
fn print_debug_summary(args: &Args) {
    // The logger already swallows info lines under --quiet
    if args.quiet {
        return;
    }
    if args.verbose {
        logger::info(LogTag::System, "Verbose logging enabled");
        return;
    }
    if let Some(level) = &args.log_level {
        logger::info(LogTag::System, &format!("Log level set to {}", level));
    }
    if args.debug_all {
        logger::info(LogTag::System, "Debug logging enabled for every subsystem");
        return;
    }

    let active: Vec<&str> = [
        ("api", args.debug_api),
        ("gateway", args.debug_gateway),
        ("cache", args.debug_cache),
        ("queue", args.debug_queue),
    ]
    .iter()
    .filter(|(_, enabled)| *enabled)
    .map(|(name, _)| *name)
    .collect();

    if !active.is_empty() {
        logger::info(
            LogTag::System,
            &format!("Debug logging enabled for: {}", active.join(", ")),
        );
    }
}

// ============================================================================
// OUTPUT FORMATTING
// ============================================================================

#[derive(Tabled)]
struct CoinRow {
    #[tabled(rename = "#")]
    rank: String,
    #[tabled(rename = "Coin")]
    name: String,
    #[tabled(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "24h %")]
    change: String,
    #[tabled(rename = "Market Cap")]
    market_cap: String,
    #[tabled(rename = "Source")]
    source: String,
}

#[derive(Tabled)]
struct SettingRow {
    #[tabled(rename = "Setting")]
    setting: String,
    #[tabled(rename = "Value")]
    value: String,
}

fn print_snapshots(coins: &[CoinSnapshot]) {
    if coins.is_empty() {
        println!("No records returned");
        return;
    }

    let rows: Vec<CoinRow> = coins
        .iter()
        .map(|coin| CoinRow {
            rank: coin
                .market_cap_rank
                .map(|rank| rank.to_string())
                .unwrap_or_else(|| "-".to_string()),
            name: coin.name.clone(),
            symbol: coin.symbol.to_uppercase(),
            price: format_price(coin.current_price),
            change: coin
                .price_change_percentage_24h
                .map(|change| format!("{:+.2}%", change))
                .unwrap_or_else(|| "-".to_string()),
            market_cap: format_amount(coin.market_cap),
            source: if coin.degraded { "degraded" } else { "live" }.to_string(),
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    println!();
    println!("{}", table);

    if coins.iter().any(|coin| coin.degraded) {
        println!(
            "{}",
            "⚠️  Upstream unavailable - showing reference data".bright_red()
        );
    }
}

fn print_details(coin: &DetailedCoin, vs_currency: &str) {
    println!("\n[{}] {} ({})", coin.id, coin.name, coin.symbol.to_uppercase());
    println!("{}", "=".repeat(60));

    if let Some(rank) = coin.market_cap_rank {
        println!("Rank: #{}", rank);
    }
    match coin.price_in(vs_currency) {
        Some(price) => println!("Price: {} {}", format_price(Some(price)), vs_currency),
        None => println!("Price: n/a"),
    }
    if let Some(market_data) = &coin.market_data {
        if let Some(change) = market_data.price_change_percentage_24h {
            println!("24h Change: {:+.2}%", change);
        }
        if let Some(cap) = market_data.market_cap.get(vs_currency) {
            println!("Market Cap: {}", format_amount(Some(*cap)));
        }
        if let Some(volume) = market_data.total_volume.get(vs_currency) {
            println!("24h Volume: {}", format_amount(Some(*volume)));
        }
    }
    if let Some(updated) = &coin.last_updated {
        println!("Updated: {}", updated.format("%Y-%m-%d %H:%M:%S UTC"));
    }
}

fn print_history(id: &str, range: &str, points: &[PricePoint]) {
    println!("\n[{}] {} points over {} day(s)", id, points.len(), range);
    println!("{}", "=".repeat(60));

    let (first, last) = match (points.first(), points.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => {
            println!("No price points returned");
            return;
        }
    };

    let high = points.iter().map(|point| point.price).fold(f64::MIN, f64::max);
    let low = points.iter().map(|point| point.price).fold(f64::MAX, f64::min);
    let change = if first.price != 0.0 {
        (last.price - first.price) / first.price * 100.0
    } else {
        0.0
    };

    println!("Start:  {}", format_point(first));
    println!("End:    {}", format_point(last));
    println!("High:   {}", format_price(Some(high)));
    println!("Low:    {}", format_price(Some(low)));
    println!("Change: {:+.2}%", change);
}

fn print_status(config: &GatewayConfig, upstream: &str, cache: &CacheStatus) {
    let rows = vec![
        SettingRow {
            setting: "Base URL".to_string(),
            value: config.base_url.clone(),
        },
        SettingRow {
            setting: "Upstream".to_string(),
            value: upstream.to_string(),
        },
        SettingRow {
            setting: "Quote Currency".to_string(),
            value: config.vs_currency.clone(),
        },
        SettingRow {
            setting: "API Key".to_string(),
            value: if config.api_key.is_empty() {
                "not set".to_string()
            } else {
                "set".to_string()
            },
        },
        SettingRow {
            setting: "Cache TTL".to_string(),
            value: format!("{}s", config.cache_ttl_secs),
        },
        SettingRow {
            setting: "Request Interval".to_string(),
            value: format!("{}ms", config.min_request_interval_ms),
        },
        SettingRow {
            setting: "Retry Budget".to_string(),
            value: format!(
                "{} attempts, {}ms base delay",
                config.max_attempts, config.retry_base_delay_ms
            ),
        },
        SettingRow {
            setting: "Request Timeout".to_string(),
            value: format!("{}s", config.request_timeout_secs),
        },
        SettingRow {
            setting: "Enabled".to_string(),
            value: config.enabled.to_string(),
        },
    ];

    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    println!();
    println!("{}", table);
    println!("Cached responses: {}", cache.count);
}

fn print_stats(stats: &GatewayStats) {
    println!("\n{}", "=".repeat(60));
    println!("[GATEWAY STATS]");
    println!("Total Requests: {}", stats.total_requests);
    println!("Successful: {}", stats.successful_requests);
    println!("Failed: {}", stats.failed_requests);
    println!("Cache Hits: {}", stats.cache_hits);
    println!("Cache Misses: {}", stats.cache_misses);
    println!("Fallbacks Served: {}", stats.fallbacks_served);
    println!("Avg Response Time: {:.2}ms", stats.average_response_time_ms);
}

fn format_point(point: &PricePoint) -> String {
    let when = DateTime::<Utc>::from_timestamp_millis(point.timestamp_ms)
        .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| point.timestamp_ms.to_string());
    format!("{} at {}", format_price(Some(point.price)), when)
}

fn format_price(price: Option<f64>) -> String {
    match price {
        Some(price) if price >= 1.0 => format!("${:.2}", price),
        Some(price) => format!("${:.6}", price),
        None => "-".to_string(),
    }
}

fn format_amount(amount: Option<f64>) -> String {
    match amount {
        Some(amount) if amount >= 1e9 => format!("${:.2}B", amount / 1e9),
        Some(amount) if amount >= 1e6 => format!("${:.2}M", amount / 1e6),
        Some(amount) => format!("${:.0}", amount),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_accepts_every_logger_flag() {
        let args = Args::try_parse_from([
            "coinfeed",
            "--quiet",
            "--log-level",
            "warning",
            "--debug-all",
            "--debug-api",
            "status",
        ])
        .unwrap();

        assert!(args.quiet);
        assert!(args.debug_all);
        assert!(args.debug_api);
        assert_eq!(args.log_level.as_deref(), Some("warning"));
        assert!(matches!(args.command, Command::Status));
    }

    #[test]
    fn prices_takes_multiple_ids() {
        let args = Args::try_parse_from(["coinfeed", "prices", "bitcoin", "ethereum"]).unwrap();
        match args.command {
            Command::Prices { ids } => assert_eq!(ids, vec!["bitcoin", "ethereum"]),
            _ => panic!("Expected the prices subcommand"),
        }
    }
}
