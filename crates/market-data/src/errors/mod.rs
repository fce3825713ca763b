//! Error types and failure classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The error enum returned by every provider call
//! - [`FailureClass`]: How a resolver reacts to a failed attempt

mod retry;

pub use retry::FailureClass;

use thiserror::Error;

/// Errors that can occur while talking to an upstream provider.
///
/// Resolvers never surface these to their callers. Each variant is mapped to a
/// [`FailureClass`] via [`failure_class`](Self::failure_class), which decides
/// whether the failing source is put on cooldown.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The provider does not know the symbol.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// No data available for the requested date range.
    #[error("No data for date range")]
    NoDataForRange,

    /// The provider rate limited the request (HTTP 429).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The provider refused the request (HTTP 403), usually because the
    /// free-tier quota is exhausted or the endpoint is not in the plan.
    #[error("Quota exceeded: {provider}")]
    QuotaExceeded {
        /// The provider that refused the request
        provider: String,
    },

    /// The request did not complete within the attempt's time budget.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// A provider-specific error occurred (bad status, unparsable body, ...).
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The provider does not implement the requested operation.
    #[error("{operation} is not supported by {provider}")]
    NotSupported {
        /// The operation that was requested
        operation: String,
        /// The provider that was asked
        provider: String,
    },

    /// A network error occurred while communicating with a provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    /// Returns the failure classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use stockdash_market_data::errors::{FailureClass, MarketDataError};
    ///
    /// let error = MarketDataError::RateLimited { provider: "FINNHUB".to_string() };
    /// assert_eq!(error.failure_class(), FailureClass::RateLimited);
    ///
    /// let error = MarketDataError::SymbolNotFound("INVALID".to_string());
    /// assert_eq!(error.failure_class(), FailureClass::Transient);
    /// ```
    pub fn failure_class(&self) -> FailureClass {
        match self {
            Self::RateLimited { .. } => FailureClass::RateLimited,
            Self::QuotaExceeded { .. } => FailureClass::Forbidden,
            Self::SymbolNotFound(_)
            | Self::NoDataForRange
            | Self::Timeout { .. }
            | Self::ProviderError { .. }
            | Self::NotSupported { .. }
            | Self::Network(_) => FailureClass::Transient,
        }
    }
}
