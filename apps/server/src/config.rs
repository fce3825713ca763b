use std::{net::SocketAddr, time::Duration};

use anyhow::Context;
use stockdash_market_data::normalize_symbol;

/// Symbols shown on the market page, in display order.
pub const DEFAULT_WATCHLIST: &[&str] = &[
    "AAPL", "TSLA", "MSFT", "NVDA", "AMZN", "GOOGL", "META", "NFLX", "BABA", "INTC", "AMD", "ORCL",
    "ADBE", "PYPL", "CRM", "UBER", "SHOP", "DIS", "SBUX", "NKE",
];

/// Symbols in the scrolling ticker strip.
pub const DEFAULT_TICKER_SYMBOLS: &[&str] =
    &["AAPL", "MSFT", "AMZN", "TSLA", "NVDA", "GOOGL", "META", "NFLX"];

pub struct Config {
    pub listen_addr: SocketAddr,
    pub finnhub_api_key: Option<String>,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub quote_ttl: Duration,
    pub primary_cooldown: Duration,
    pub candle_cooldown: Duration,
    pub watchlist: Vec<String>,
    pub ticker_symbols: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            finnhub_api_key: None,
            cors_allow: vec!["*".to_string()],
            request_timeout: Duration::from_millis(30_000),
            quote_ttl: Duration::from_millis(15_000),
            primary_cooldown: Duration::from_millis(60_000),
            candle_cooldown: Duration::from_millis(300_000),
            watchlist: DEFAULT_WATCHLIST.iter().map(|s| s.to_string()).collect(),
            ticker_symbols: DEFAULT_TICKER_SYMBOLS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let listen_addr = match std::env::var("SD_LISTEN_ADDR") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("Invalid SD_LISTEN_ADDR: {}", raw))?,
            Err(_) => defaults.listen_addr,
        };
        let finnhub_api_key = std::env::var("FINNHUB_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        let cors_allow = std::env::var("SD_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let watchlist = std::env::var("SD_WATCHLIST")
            .ok()
            .map(|raw| parse_symbols(&raw))
            .filter(|list| !list.is_empty())
            .unwrap_or(defaults.watchlist);
        let ticker_symbols = std::env::var("SD_TICKER_SYMBOLS")
            .ok()
            .map(|raw| parse_symbols(&raw))
            .filter(|list| !list.is_empty())
            .unwrap_or(defaults.ticker_symbols);

        Ok(Self {
            listen_addr,
            finnhub_api_key,
            cors_allow,
            request_timeout: env_millis("SD_REQUEST_TIMEOUT_MS", defaults.request_timeout),
            quote_ttl: env_millis("SD_QUOTE_TTL_MS", defaults.quote_ttl),
            primary_cooldown: env_millis("SD_PRIMARY_COOLDOWN_MS", defaults.primary_cooldown),
            candle_cooldown: env_millis("SD_CANDLE_COOLDOWN_MS", defaults.candle_cooldown),
            watchlist,
            ticker_symbols,
        })
    }
}

fn env_millis(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}

/// Split a comma-separated symbol list, normalizing and dropping blanks.
pub fn parse_symbols(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(normalize_symbol)
        .filter(|s| !s.is_empty())
        .collect()
}
