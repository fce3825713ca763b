//! Yahoo Finance API response models.
//!
//! These models parse the v7 quote endpoint, which returns plain numbers for
//! the regular-market fields (unlike quoteSummary's `{raw, fmt}` objects).

use serde::Deserialize;

/// Main response wrapper for the v7 quote API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooQuoteResponse {
    pub quote_response: YahooQuoteEnvelope,
}

/// Quote result container
#[derive(Debug, Deserialize)]
pub struct YahooQuoteEnvelope {
    #[serde(default)]
    pub result: Vec<YahooQuoteResult>,
    // Note: error field exists in API but we handle errors via HTTP status/empty results
}

/// Individual quote. Yahoo returns dozens of fields; only the regular-market
/// price and change are mapped.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooQuoteResult {
    pub symbol: String,
    pub regular_market_price: Option<f64>,
    pub regular_market_change: Option<f64>,
    pub regular_market_change_percent: Option<f64>,
}
