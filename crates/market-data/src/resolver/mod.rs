//! Layered fallback resolution for quotes and daily series.
//!
//! # Architecture
//!
//! ```text
//! QuoteResolver                         SeriesResolver
//!
//!  1. fresh cache (< ttl)  ── hit ──►    1. primary candles  (cooldown on 403/429)
//!  2. primary quote  (cooldown on 429)   2. backup daily CSV
//!  3. backup quote                       3. flat synthetic series
//!  4. stale cache
//!  5. empty placeholder
//! ```
//!
//! Each live step runs through [`FallbackChain::attempt`], which bounds the
//! request with the slot's timeout and arms the slot's cooldown when the
//! provider signals rate limiting. Resolvers never return errors.

mod chain;
mod config;
mod quote_resolver;
mod series_resolver;

pub use chain::{Attempt, CooldownPolicy, FallbackChain, SourceSlot};
pub use config::{
    QuoteResolverConfig, SeriesResolverConfig, DEFAULT_BACKUP_TIMEOUT, DEFAULT_CANDLE_COOLDOWN,
    DEFAULT_PRIMARY_COOLDOWN, DEFAULT_PRIMARY_TIMEOUT, DEFAULT_QUOTE_TTL, DEFAULT_SERIES_DAYS,
    DEFAULT_SERIES_TIMEOUT,
};
pub use quote_resolver::QuoteResolver;
pub use series_resolver::SeriesResolver;
