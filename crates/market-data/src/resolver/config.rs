use std::time::Duration;

/// How long a cached quote short-circuits the network.
pub const DEFAULT_QUOTE_TTL: Duration = Duration::from_secs(15);

/// Timeout for one primary quote request.
pub const DEFAULT_PRIMARY_TIMEOUT: Duration = Duration::from_secs(8);

/// Timeout for one backup quote request.
pub const DEFAULT_BACKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// How long the primary quote source is skipped after a 429.
pub const DEFAULT_PRIMARY_COOLDOWN: Duration = Duration::from_secs(60);

/// Timeout for each daily-series request.
pub const DEFAULT_SERIES_TIMEOUT: Duration = Duration::from_secs(8);

/// How long candles are skipped after a 403 or 429.
pub const DEFAULT_CANDLE_COOLDOWN: Duration = Duration::from_secs(5 * 60);

/// Days of history requested when the caller does not say.
pub const DEFAULT_SERIES_DAYS: u32 = 30;

/// Tunables for [`QuoteResolver`](super::QuoteResolver).
#[derive(Clone, Debug)]
pub struct QuoteResolverConfig {
    /// Maximum age at which a cached quote is served without a fetch.
    pub ttl: Duration,
    pub primary_timeout: Duration,
    pub backup_timeout: Duration,
    pub primary_cooldown: Duration,
}

impl Default for QuoteResolverConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_QUOTE_TTL,
            primary_timeout: DEFAULT_PRIMARY_TIMEOUT,
            backup_timeout: DEFAULT_BACKUP_TIMEOUT,
            primary_cooldown: DEFAULT_PRIMARY_COOLDOWN,
        }
    }
}

/// Tunables for [`SeriesResolver`](super::SeriesResolver).
#[derive(Clone, Debug)]
pub struct SeriesResolverConfig {
    pub primary_timeout: Duration,
    pub backup_timeout: Duration,
    pub candle_cooldown: Duration,
    /// Also arm the candle cooldown on HTTP 403. Finnhub's free tier answers
    /// 403 for candles once the plan quota is gone.
    pub cooldown_on_forbidden: bool,
}

impl Default for SeriesResolverConfig {
    fn default() -> Self {
        Self {
            primary_timeout: DEFAULT_SERIES_TIMEOUT,
            backup_timeout: DEFAULT_SERIES_TIMEOUT,
            candle_cooldown: DEFAULT_CANDLE_COOLDOWN,
            cooldown_on_forbidden: true,
        }
    }
}
