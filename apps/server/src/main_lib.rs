use std::sync::Arc;

use stockdash_market_data::{
    FinnhubProvider, QuoteResolver, QuoteResolverConfig, SeriesResolver, SeriesResolverConfig,
    StooqProvider, YahooProvider,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

pub struct AppState {
    pub quotes: Arc<QuoteResolver>,
    pub series: Arc<SeriesResolver>,
    pub watchlist: Vec<String>,
    pub ticker_symbols: Vec<String>,
}

pub fn init_tracing() {
    let log_format = std::env::var("SD_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let api_key = match &config.finnhub_api_key {
        Some(key) => key.clone(),
        None => {
            tracing::warn!("FINNHUB_API_KEY is not set, primary quotes and candles will fail");
            String::new()
        }
    };

    let finnhub = Arc::new(FinnhubProvider::new(api_key));
    let yahoo = Arc::new(YahooProvider::new());
    let stooq = Arc::new(StooqProvider::new());

    let quotes = QuoteResolver::with_config(
        finnhub.clone(),
        yahoo,
        QuoteResolverConfig {
            ttl: config.quote_ttl,
            primary_cooldown: config.primary_cooldown,
            ..Default::default()
        },
    );
    let series = SeriesResolver::with_config(
        finnhub,
        stooq,
        SeriesResolverConfig {
            candle_cooldown: config.candle_cooldown,
            ..Default::default()
        },
    );

    tracing::info!(
        "Quote TTL {:?}, primary cooldown {:?}, candle cooldown {:?}",
        config.quote_ttl,
        config.primary_cooldown,
        config.candle_cooldown
    );

    Ok(Arc::new(AppState {
        quotes: Arc::new(quotes),
        series: Arc::new(series),
        watchlist: config.watchlist.clone(),
        ticker_symbols: config.ticker_symbols.clone(),
    }))
}
