//! Market data models
//!
//! This module contains the core data types for quote resolution:
//! - `types` - Provider identifier alias and symbol normalization
//! - `quote` - Quote data structures (ProviderQuote, QuoteRecord, QuoteResult)
//! - `series` - Daily series structures (DailyBar, DailySeries, SeriesResult)

mod quote;
mod series;
mod types;

pub use quote::{ProviderQuote, QuoteRecord, QuoteResult, QuoteSource};
pub use series::{DailyBar, DailySeries, SeriesResult, SeriesSource, SYNTHETIC_POINTS};
pub use types::{normalize_symbol, ProviderId};
