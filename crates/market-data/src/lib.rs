//! Stockdash Market Data Crate
//!
//! Best-effort quotes and daily history for the stock dashboard, kept
//! populated despite free-tier rate limits on the upstream APIs.
//!
//! # Overview
//!
//! - [`QuoteResolver`]: fresh cache, Finnhub, Yahoo Finance, stale cache,
//!   empty placeholder
//! - [`SeriesResolver`]: Finnhub candles, Stooq CSV, flat synthetic series
//! - Per-source cooldown after rate limiting, expiring on its own
//! - Resolvers never return errors; degradation is reported through the
//!   `stale` and `source` fields of the result
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |   HTTP handler   |
//! +------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! |  QuoteResolver   | --> |   QuoteCache     |  (last known good, per symbol)
//! |  SeriesResolver  |     +------------------+
//! +------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! |  FallbackChain   | --> | CooldownTracker  |  (blocked-until, per source)
//! +------------------+     +------------------+
//!          |
//!          v
//! +------------------+
//! |    Provider      |  (Finnhub, Yahoo, Stooq)
//! +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`QuoteRecord`] / [`QuoteResult`] - Resolved quote with provenance
//! - [`DailySeries`] / [`SeriesResult`] - Chart-ready daily closes
//! - [`MarketDataProvider`] - Trait implemented by every upstream

pub mod errors;
pub mod models;
pub mod provider;
pub mod registry;
pub mod resolver;

// Re-export all public types from models
pub use models::{
    normalize_symbol, DailyBar, DailySeries, ProviderId, ProviderQuote, QuoteRecord, QuoteResult,
    QuoteSource, SeriesResult, SeriesSource,
};

// Re-export resolver types
pub use resolver::{QuoteResolver, QuoteResolverConfig, SeriesResolver, SeriesResolverConfig};

// Re-export provider types
pub use provider::finnhub::FinnhubProvider;
pub use provider::stooq::StooqProvider;
pub use provider::yahoo::YahooProvider;
pub use provider::MarketDataProvider;

// Re-export error types
pub use errors::{FailureClass, MarketDataError};
