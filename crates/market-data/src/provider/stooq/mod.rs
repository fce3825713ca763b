//! Stooq daily history provider.
//!
//! Stooq serves free end-of-day history as CSV
//! (`Date,Open,High,Low,Close,Volume`) without an API key. It is the backup
//! source for dashboard sparklines. US tickers are addressed as `aapl.us`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use csv::ReaderBuilder;
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::errors::MarketDataError;
use crate::models::DailyBar;
use crate::provider::MarketDataProvider;

const BASE_URL: &str = "https://stooq.com";
const PROVIDER_ID: &str = "STOOQ";

const DATE_COLUMN: usize = 0;
const CLOSE_COLUMN: usize = 4;

/// Stooq CSV history provider.
pub struct StooqProvider {
    client: Client,
    base_url: String,
}

impl StooqProvider {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the provider at a different host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Stooq's symbol for a US listing.
    fn stooq_symbol(symbol: &str) -> String {
        format!("{}.us", symbol.to_lowercase())
    }

    /// Parse the CSV body and keep the last `days` usable rows.
    ///
    /// Rows with an unparsable date or a non-finite close are dropped.
    fn parse_csv(body: &str, days: u32) -> Result<Vec<DailyBar>, MarketDataError> {
        let body = body.trim();

        // Stooq answers 200 with a plain-text notice ("No data", hit limits)
        if !body.starts_with("Date") {
            let notice = body.lines().next().unwrap_or_default();
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Unexpected response: {}", notice),
            });
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(body.as_bytes());

        let mut bars = Vec::new();
        for record in reader.records() {
            let Ok(record) = record else { continue };

            let date = record
                .get(DATE_COLUMN)
                .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok());
            let close = record
                .get(CLOSE_COLUMN)
                .and_then(|c| c.trim().parse::<f64>().ok())
                .filter(|c| c.is_finite());

            if let (Some(date), Some(close)) = (date, close) {
                bars.push(DailyBar { date, close });
            }
        }

        if bars.is_empty() {
            return Err(MarketDataError::NoDataForRange);
        }

        let keep = days as usize;
        if bars.len() > keep {
            bars.drain(..bars.len() - keep);
        }

        Ok(bars)
    }
}

impl Default for StooqProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataProvider for StooqProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn get_daily_series(
        &self,
        symbol: &str,
        days: u32,
    ) -> Result<Vec<DailyBar>, MarketDataError> {
        let url = format!("{}/q/d/l/", self.base_url);
        let stooq_symbol = Self::stooq_symbol(symbol);

        debug!("Fetching {} days of history for {} from Stooq", days, stooq_symbol);

        let response = self
            .client
            .get(&url)
            .query(&[("s", stooq_symbol.as_str()), ("i", "d")])
            .send()
            .await
            .map_err(|e| {
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

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        if !response.status().is_success() {
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("HTTP {}", response.status()),
            });
        }

        let body = response.text().await?;
        Self::parse_csv(&body, days)
    }
}
