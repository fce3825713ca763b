//! Finnhub market data provider implementation.
//!
//! This module provides market data from Finnhub API:
//! - Current quotes via the /quote endpoint
//! - Daily candles via the /stock/candle endpoint
//!
//! Finnhub free tier is limited to 60 API calls per minute and answers 429
//! beyond that. Candles are outside the free plan and answer 403.
//! API documentation: https://finnhub.io/docs/api

use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::errors::MarketDataError;
use crate::models::{DailyBar, ProviderQuote};
use crate::provider::MarketDataProvider;

const BASE_URL: &str = "https://finnhub.io/api/v1";
const PROVIDER_ID: &str = "FINNHUB";

// ============================================================================
// API Response Structures
// ============================================================================

/// Response from /quote endpoint
#[derive(Debug, Deserialize)]
struct QuoteResponse {
    /// Current price
    c: Option<f64>,
    /// Change
    d: Option<f64>,
    /// Percent change
    dp: Option<f64>,
    /// Open price of the day
    o: Option<f64>,
    // Note: h, l, pc, t exist but the dashboard only shows price and change
}

/// Response from /stock/candle endpoint
#[derive(Debug, Deserialize)]
struct CandleResponse {
    /// Status: "ok" or "no_data"
    s: String,
    /// Close prices
    #[serde(default)]
    c: Vec<f64>,
    /// Timestamps (Unix)
    #[serde(default)]
    t: Vec<i64>,
}

/// Error response from Finnhub
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<String>,
}

// ============================================================================
// FinnhubProvider
// ============================================================================

/// Finnhub market data provider.
pub struct FinnhubProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl FinnhubProvider {
    /// Create a new Finnhub provider with the given API key.
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the provider at a different API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Make a GET request to the Finnhub API.
    async fn fetch(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<String, MarketDataError> {
        let url = format!("{}{}", self.base_url, endpoint);

        let request = self
            .client
            .get(&url)
            .header("X-Finnhub-Token", &self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(params);

        debug!("Finnhub request: {} with {} params", endpoint, params.len());

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                MarketDataError::Timeout {
                    provider: PROVIDER_ID.to_string(),
                }
            } else {
                MarketDataError::ProviderError {
                    provider: PROVIDER_ID.to_string(),
                    message: format!("Request failed: {}", e),
                }
            }
        })?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        // Quota exhausted or endpoint not in plan
        if status == reqwest::StatusCode::FORBIDDEN {
            return Err(MarketDataError::QuotaExceeded {
                provider: PROVIDER_ID.to_string(),
            });
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: "Invalid or missing API key".to_string(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            if let Ok(ErrorResponse {
                error: Some(error_msg),
            }) = serde_json::from_str::<ErrorResponse>(&body)
            {
                return Err(MarketDataError::ProviderError {
                    provider: PROVIDER_ID.to_string(),
                    message: error_msg,
                });
            }

            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("HTTP {} - {}", status, truncate(&body, 160)),
            });
        }

        response
            .text()
            .await
            .map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to read response: {}", e),
            })
    }

    fn parse_quote(symbol: &str, text: &str) -> Result<ProviderQuote, MarketDataError> {
        let response: QuoteResponse =
            serde_json::from_str(text).map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to parse quote response: {}", e),
            })?;

        // Finnhub returns zeros for unknown symbols instead of an error
        if response.c.unwrap_or(0.0) == 0.0 && response.o.unwrap_or(0.0) == 0.0 {
            return Err(MarketDataError::SymbolNotFound(symbol.to_string()));
        }

        Ok(ProviderQuote {
            price: response.c,
            change: response.d,
            change_percent: response.dp,
        })
    }

    fn parse_candles(text: &str) -> Result<Vec<DailyBar>, MarketDataError> {
        let response: CandleResponse =
            serde_json::from_str(text).map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to parse candle response: {}", e),
            })?;

        if response.s == "no_data" {
            return Err(MarketDataError::NoDataForRange);
        }

        if response.s != "ok" {
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Unexpected candle status: {}", response.s),
            });
        }

        if response.c.len() != response.t.len() {
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: "Mismatched array lengths in candle response".to_string(),
            });
        }

        let mut bars = Vec::with_capacity(response.t.len());
        for (&ts, &close) in response.t.iter().zip(response.c.iter()) {
            match Utc.timestamp_opt(ts, 0).single() {
                Some(dt) => bars.push(DailyBar {
                    date: dt.date_naive(),
                    close,
                }),
                None => warn!("Invalid candle timestamp: {}", ts),
            }
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

// ============================================================================
// MarketDataProvider Implementation
// ============================================================================

#[async_trait]
impl MarketDataProvider for FinnhubProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn get_latest_quote(&self, symbol: &str) -> Result<ProviderQuote, MarketDataError> {
        debug!("Fetching latest quote for {} from Finnhub", symbol);

        let text = self.fetch("/quote", &[("symbol", symbol)]).await?;
        Self::parse_quote(symbol, &text)
    }

    async fn get_daily_series(
        &self,
        symbol: &str,
        days: u32,
    ) -> Result<Vec<DailyBar>, MarketDataError> {
        let to = Utc::now().timestamp();
        let from = to - i64::from(days) * 24 * 60 * 60;
        let (from, to) = (from.to_string(), to.to_string());

        debug!("Fetching {} days of candles for {} from Finnhub", days, symbol);

        let params = [
            ("symbol", symbol),
            ("resolution", "D"),
            ("from", from.as_str()),
            ("to", to.as_str()),
        ];
        let text = self.fetch("/stock/candle", &params).await?;
        let bars = Self::parse_candles(&text)?;

        if bars.is_empty() {
            return Err(MarketDataError::NoDataForRange);
        }

        Ok(bars)
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

// ============================================================================
// Tests
// ============================================================================
