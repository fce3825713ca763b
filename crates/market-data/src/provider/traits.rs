//! Market data provider trait definitions.
//!
//! This module defines the core `MarketDataProvider` trait that all
//! market data providers must implement.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{DailyBar, ProviderQuote};

/// Trait for market data providers.
///
/// Implement this trait to add support for a new market data source. A
/// provider only has to implement the operations it supports; the defaults
/// return [`MarketDataError::NotSupported`], which resolvers treat as an
/// ordinary fall-through.
///
/// Providers do not enforce the per-attempt time budget themselves. The
/// resolver wraps every call in its own timeout.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use stockdash_market_data::provider::MarketDataProvider;
///
/// struct MyProvider;
///
/// #[async_trait]
/// impl MarketDataProvider for MyProvider {
///     fn id(&self) -> &'static str {
///         "MY_PROVIDER"
///     }
///
///     async fn get_latest_quote(&self, symbol: &str) -> Result<ProviderQuote, MarketDataError> {
///         // ...
///     }
/// }
/// ```
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Should be a constant string like "FINNHUB", "YAHOO", etc.
    /// Used for logging and as the cooldown key.
    fn id(&self) -> &'static str;

    /// Fetch the current quote for an upper-case ticker.
    async fn get_latest_quote(&self, symbol: &str) -> Result<ProviderQuote, MarketDataError> {
        let _ = symbol;
        Err(MarketDataError::NotSupported {
            operation: "latest quote".to_string(),
            provider: self.id().to_string(),
        })
    }

    /// Fetch up to `days` of daily closes, ordered by date ascending.
    async fn get_daily_series(
        &self,
        symbol: &str,
        days: u32,
    ) -> Result<Vec<DailyBar>, MarketDataError> {
        let _ = (symbol, days);
        Err(MarketDataError::NotSupported {
            operation: "daily series".to_string(),
            provider: self.id().to_string(),
        })
    }
}
