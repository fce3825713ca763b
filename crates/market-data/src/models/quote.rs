use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Where a quote came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteSource {
    /// Live answer from the primary provider (Finnhub).
    Primary,
    /// Live answer from the backup provider (Yahoo Finance).
    Backup,
    /// Served from the cache layer as a fallback.
    Cache,
}

impl std::fmt::Display for QuoteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Backup => write!(f, "backup"),
            Self::Cache => write!(f, "cache"),
        }
    }
}

/// Quote fields as returned by a provider, before validation.
///
/// Providers hand back whatever floats the upstream sent; the resolver decides
/// whether the answer is usable.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProviderQuote {
    /// Current price
    pub price: Option<f64>,
    /// Absolute change since previous close
    pub change: Option<f64>,
    /// Percent change since previous close
    pub change_percent: Option<f64>,
}

impl ProviderQuote {
    /// True when the price is a finite number.
    pub fn has_finite_price(&self) -> bool {
        self.price.is_some_and(f64::is_finite)
    }
}

/// A resolved quote for one symbol.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRecord {
    /// Upper-case ticker
    pub symbol: String,

    /// Current price, `None` when unknown
    pub price: Option<Decimal>,

    /// Absolute change, `None` when unknown
    pub change: Option<Decimal>,

    /// Percent change, `None` when unknown
    pub change_percent: Option<Decimal>,

    /// When the quote was retrieved from a live source
    pub fetched_at: Option<DateTime<Utc>>,

    /// Which layer produced the quote
    pub source: QuoteSource,

    /// True when served from cache instead of a live source
    pub stale: bool,
}

impl QuoteRecord {
    /// Build a fresh record from a live provider answer.
    ///
    /// Non-finite fields become `None`.
    pub fn from_provider(symbol: &str, quote: &ProviderQuote, source: QuoteSource) -> Self {
        Self {
            symbol: symbol.to_string(),
            price: finite_decimal(quote.price),
            change: finite_decimal(quote.change),
            change_percent: finite_decimal(quote.change_percent),
            fetched_at: Some(Utc::now()),
            source,
            stale: false,
        }
    }

    /// The well-formed "nothing known" record.
    pub fn placeholder(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            price: None,
            change: None,
            change_percent: None,
            fetched_at: None,
            source: QuoteSource::Cache,
            stale: true,
        }
    }

    /// Re-label a cached record as a stale fallback.
    pub fn into_stale(mut self) -> Self {
        self.source = QuoteSource::Cache;
        self.stale = true;
        self
    }

    pub fn has_price(&self) -> bool {
        self.price.is_some()
    }
}

/// What a resolver hands back to its caller.
///
/// `stale` and `source` mirror the record so handlers can branch on them
/// without digging into the quote.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResult {
    pub quote: QuoteRecord,
    pub stale: bool,
    pub source: QuoteSource,
}

impl From<QuoteRecord> for QuoteResult {
    fn from(quote: QuoteRecord) -> Self {
        Self {
            stale: quote.stale,
            source: quote.source,
            quote,
        }
    }
}

/// Convert an upstream float, dropping NaN and infinities.
pub(crate) fn finite_decimal(value: Option<f64>) -> Option<Decimal> {
    value.filter(|v| v.is_finite()).and_then(Decimal::from_f64)
}
