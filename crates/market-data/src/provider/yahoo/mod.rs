//! Yahoo Finance market data provider.
//!
//! Used as the backup quote source. Yahoo's quote API requires a cookie and
//! a matching "crumb" token; both are fetched once and cached on the provider
//! until Yahoo rejects them.

mod models;

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use tracing::{debug, warn};
use urlencoding::encode;

use crate::errors::MarketDataError;
use crate::models::ProviderQuote;
use crate::provider::MarketDataProvider;

use models::YahooQuoteResponse;

const PROVIDER_ID: &str = "YAHOO";
const COOKIE_URL: &str = "https://fc.yahoo.com";
const QUERY_BASE_URL: &str = "https://query1.finance.yahoo.com";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

// ============================================================================
// Crumb/Cookie Authentication
// ============================================================================

/// Cached Yahoo authentication data
#[derive(Debug, Clone)]
struct CrumbData {
    cookie: String,
    crumb: String,
}

// ============================================================================
// Yahoo Provider
// ============================================================================

/// Yahoo Finance market data provider.
pub struct YahooProvider {
    client: Client,
    cookie_url: String,
    query_base_url: String,
    crumb: RwLock<Option<CrumbData>>,
}

impl YahooProvider {
    /// Create a new Yahoo Finance provider.
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            cookie_url: COOKIE_URL.to_string(),
            query_base_url: QUERY_BASE_URL.to_string(),
            crumb: RwLock::new(None),
        }
    }

    /// Point the provider at different cookie and query hosts.
    pub fn with_endpoints(
        mut self,
        cookie_url: impl Into<String>,
        query_base_url: impl Into<String>,
    ) -> Self {
        self.cookie_url = cookie_url.into();
        self.query_base_url = query_base_url.into();
        self
    }

    fn read_crumb(&self) -> RwLockReadGuard<'_, Option<CrumbData>> {
        self.crumb.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_crumb(&self) -> RwLockWriteGuard<'_, Option<CrumbData>> {
        self.crumb.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ========================================================================
    // Crumb/Cookie Authentication
    // ========================================================================

    /// Ensure we have a valid Yahoo authentication crumb.
    async fn ensure_crumb(&self) -> Result<CrumbData, MarketDataError> {
        let cached = self.read_crumb().clone();
        if let Some(crumb) = cached {
            return Ok(crumb);
        }

        self.fetch_crumb().await
    }

    /// Fetch a new Yahoo authentication crumb.
    async fn fetch_crumb(&self) -> Result<CrumbData, MarketDataError> {
        // Step 1: Get cookie
        let response = self
            .client
            .get(&self.cookie_url)
            .send()
            .await
            .map_err(|e| provider_error(format!("Failed to get cookie: {}", e)))?;

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.split_once(';').map(|(v, _)| v.to_string()))
            .ok_or_else(|| provider_error("Failed to parse Yahoo cookie".to_string()))?;

        // Step 2: Get crumb using cookie
        let url = format!("{}/v1/test/getcrumb", self.query_base_url);
        let response = self
            .client
            .get(&url)
            .header(header::COOKIE, &cookie)
            .send()
            .await
            .map_err(|e| provider_error(format!("Failed to get crumb: {}", e)))?;

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(MarketDataError::RateLimited {
                    provider: PROVIDER_ID.to_string(),
                });
            }
            status if !status.is_success() => {
                return Err(provider_error(format!("Crumb request failed: HTTP {}", status)));
            }
            _ => {}
        }

        let crumb = response
            .text()
            .await
            .map_err(|e| provider_error(format!("Failed to read crumb: {}", e)))?;

        if crumb.trim().is_empty() {
            return Err(provider_error("Empty crumb".to_string()));
        }

        let crumb_data = CrumbData { cookie, crumb };
        *self.write_crumb() = Some(crumb_data.clone());

        Ok(crumb_data)
    }

    /// Clear the cached crumb (used when authentication fails)
    fn clear_crumb(&self) {
        *self.write_crumb() = None;
    }

    // ========================================================================
    // Quote Fetching
    // ========================================================================

    async fn fetch_quote(&self, symbol: &str) -> Result<ProviderQuote, MarketDataError> {
        let crumb = self.ensure_crumb().await?;

        let url = format!(
            "{}/v7/finance/quote?symbols={}&crumb={}",
            self.query_base_url,
            encode(symbol),
            encode(&crumb.crumb)
        );

        let response = self
            .client
            .get(&url)
            .header(header::COOKIE, &crumb.cookie)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MarketDataError::Timeout {
                        provider: PROVIDER_ID.to_string(),
                    }
                } else {
                    provider_error(format!("Quote request failed: {}", e))
                }
            })?;

        match response.status() {
            StatusCode::UNAUTHORIZED => {
                warn!("Yahoo rejected the cached crumb, clearing it");
                self.clear_crumb();
                return Err(provider_error("Yahoo authentication expired".to_string()));
            }
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(MarketDataError::RateLimited {
                    provider: PROVIDER_ID.to_string(),
                });
            }
            status if !status.is_success() => {
                return Err(provider_error(format!("HTTP {}", status)));
            }
            _ => {}
        }

        let data: YahooQuoteResponse = response
            .json()
            .await
            .map_err(|e| provider_error(format!("Failed to parse quote response: {}", e)))?;

        let quote = data
            .quote_response
            .result
            .into_iter()
            .find(|q| q.symbol.eq_ignore_ascii_case(symbol))
            .ok_or_else(|| MarketDataError::SymbolNotFound(symbol.to_string()))?;

        Ok(ProviderQuote {
            price: quote.regular_market_price,
            change: quote.regular_market_change,
            change_percent: quote.regular_market_change_percent,
        })
    }
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// MarketDataProvider Implementation
// ============================================================================

#[async_trait]
impl MarketDataProvider for YahooProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn get_latest_quote(&self, symbol: &str) -> Result<ProviderQuote, MarketDataError> {
        debug!("Fetching latest quote for {} from Yahoo", symbol);
        self.fetch_quote(symbol).await
    }
}

fn provider_error(message: String) -> MarketDataError {
    MarketDataError::ProviderError {
        provider: PROVIDER_ID.to_string(),
        message,
    }
}
