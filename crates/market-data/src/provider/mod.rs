//! Market data provider abstractions and implementations.
//!
//! This module contains:
//! - The `MarketDataProvider` trait that all providers implement
//! - Concrete provider implementations (Finnhub, Yahoo, Stooq)
//!
//! Providers only translate HTTP into [`ProviderQuote`](crate::models::ProviderQuote)
//! and [`DailyBar`](crate::models::DailyBar) values and classify failures.
//! Timeouts, cooldowns and caching belong to the resolvers.

mod traits;

pub mod finnhub;
pub mod stooq;
pub mod yahoo;

pub use traits::MarketDataProvider;
