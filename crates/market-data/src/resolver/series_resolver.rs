//! Daily close series for dashboard sparklines.
//!
//! Same walk as the quote resolver, with a synthetic flat series at the end
//! instead of a cache. Only the candle cooldown deadline is retained between
//! calls.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::chain::{Attempt, CooldownPolicy, FallbackChain, SourceSlot};
use super::config::SeriesResolverConfig;
use crate::models::{normalize_symbol, DailyBar, DailySeries, SeriesResult, SeriesSource};
use crate::provider::MarketDataProvider;

pub struct SeriesResolver {
    primary: Arc<dyn MarketDataProvider>,
    backup: Arc<dyn MarketDataProvider>,
    primary_slot: SourceSlot,
    backup_slot: SourceSlot,
    chain: FallbackChain,
}

impl SeriesResolver {
    pub fn new(primary: Arc<dyn MarketDataProvider>, backup: Arc<dyn MarketDataProvider>) -> Self {
        Self::with_config(primary, backup, SeriesResolverConfig::default())
    }

    pub fn with_config(
        primary: Arc<dyn MarketDataProvider>,
        backup: Arc<dyn MarketDataProvider>,
        config: SeriesResolverConfig,
    ) -> Self {
        let primary_slot = SourceSlot::new(primary.id(), config.primary_timeout).with_cooldown(
            CooldownPolicy {
                duration: config.candle_cooldown,
                on_forbidden: config.cooldown_on_forbidden,
            },
        );
        let backup_slot = SourceSlot::new(backup.id(), config.backup_timeout);

        Self {
            primary,
            backup,
            primary_slot,
            backup_slot,
            chain: FallbackChain::new(),
        }
    }

    /// Resolve `days` of daily closes for `symbol`.
    ///
    /// Falls back to a flat series seeded from `last_price` (or zero) when no
    /// source has data. A `days` of zero is treated as one.
    pub async fn resolve_series(
        &self,
        symbol: &str,
        days: u32,
        last_price: Option<Decimal>,
    ) -> SeriesResult {
        let symbol = normalize_symbol(symbol);
        let days = days.max(1);

        if !symbol.is_empty() {
            let live = [
                (&self.primary, &self.primary_slot, SeriesSource::Primary),
                (&self.backup, &self.backup_slot, SeriesSource::Backup),
            ];
            for (provider, slot, source) in live {
                let attempt = self
                    .chain
                    .attempt(slot, provider.get_daily_series(&symbol, days), |bars: &Vec<DailyBar>| {
                        bars.iter().any(|bar| bar.close.is_finite())
                    })
                    .await;

                if let Attempt::Usable(bars) = attempt {
                    let series = DailySeries::from_bars(&bars);
                    debug!("{}: {} daily closes from {:?}", symbol, series.len(), source);
                    return SeriesResult { series, source };
                }
            }

            warn!("{}: no daily history available, using flat series", symbol);
        }

        SeriesResult {
            series: DailySeries::synthetic(last_price.unwrap_or(Decimal::ZERO)),
            source: SeriesSource::Synthetic,
        }
    }

    pub fn candles_in_cooldown(&self) -> bool {
        self.chain.in_cooldown(&self.primary_slot)
    }

    pub fn candle_cooldown_remaining(&self) -> Option<Duration> {
        self.chain.cooldown_remaining(&self.primary_slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::MarketDataError;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Copy)]
    enum Behavior {
        Bars(usize),
        Forbidden,
        RateLimited,
        NoData,
        NonFinite,
    }

    struct MockProvider {
        id: &'static str,
        behavior: Behavior,
        call_count: AtomicUsize,
    }

    impl MockProvider {
        fn new(id: &'static str, behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                id,
                behavior,
                call_count: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MarketDataProvider for MockProvider {
        fn id(&self) -> &'static str {
            self.id
        }

        async fn get_daily_series(
            &self,
            _symbol: &str,
            days: u32,
        ) -> Result<Vec<DailyBar>, MarketDataError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
            match self.behavior {
                Behavior::Bars(n) => Ok((0..n.min(days as usize))
                    .map(|i| DailyBar {
                        date: start + chrono::Days::new(i as u64),
                        close: 100.0 + i as f64,
                    })
                    .collect()),
                Behavior::Forbidden => Err(MarketDataError::QuotaExceeded {
                    provider: self.id.to_string(),
                }),
                Behavior::RateLimited => Err(MarketDataError::RateLimited {
                    provider: self.id.to_string(),
                }),
                Behavior::NoData => Err(MarketDataError::NoDataForRange),
                Behavior::NonFinite => Ok(vec![DailyBar {
                    date: start,
                    close: f64::NAN,
                }]),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_primary_candles() {
        let primary = MockProvider::new("CANDLES", Behavior::Bars(30));
        let backup = MockProvider::new("CSV", Behavior::Bars(30));
        let resolver = SeriesResolver::new(primary.clone(), backup.clone());

        let result = resolver.resolve_series("AAPL", 5, None).await;

        assert_eq!(result.source, SeriesSource::Primary);
        assert_eq!(result.series.len(), 5);
        assert_eq!(result.series.labels[0], "2024-01-01");
        assert_eq!(result.series.prices[4], dec!(104));
        assert_eq!(backup.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_forbidden_candles_cool_down_for_five_minutes() {
        let primary = MockProvider::new("CANDLES", Behavior::Forbidden);
        let backup = MockProvider::new("CSV", Behavior::Bars(30));
        let resolver = SeriesResolver::new(primary.clone(), backup.clone());

        let result = resolver.resolve_series("AAPL", 30, None).await;
        assert_eq!(result.source, SeriesSource::Backup);
        assert!(resolver.candles_in_cooldown());
        assert_eq!(
            resolver.candle_cooldown_remaining(),
            Some(Duration::from_secs(300))
        );

        resolver.resolve_series("MSFT", 30, None).await;
        assert_eq!(primary.calls(), 1);
        assert_eq!(backup.calls(), 2);

        tokio::time::advance(Duration::from_secs(300)).await;
        resolver.resolve_series("MSFT", 30, None).await;
        assert_eq!(primary.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_candles_cool_down() {
        let primary = MockProvider::new("CANDLES", Behavior::RateLimited);
        let backup = MockProvider::new("CSV", Behavior::NoData);
        let resolver = SeriesResolver::new(primary.clone(), backup.clone());

        resolver.resolve_series("AAPL", 30, None).await;
        assert!(resolver.candles_in_cooldown());
    }

    #[tokio::test(start_paused = true)]
    async fn test_forbidden_without_opt_in_does_not_cool_down() {
        let primary = MockProvider::new("CANDLES", Behavior::Forbidden);
        let backup = MockProvider::new("CSV", Behavior::Bars(3));
        let config = SeriesResolverConfig {
            cooldown_on_forbidden: false,
            ..Default::default()
        };
        let resolver = SeriesResolver::with_config(primary.clone(), backup.clone(), config);

        resolver.resolve_series("AAPL", 30, None).await;
        assert!(!resolver.candles_in_cooldown());
    }

    #[tokio::test(start_paused = true)]
    async fn test_synthetic_seeded_from_last_price() {
        let primary = MockProvider::new("CANDLES", Behavior::NoData);
        let backup = MockProvider::new("CSV", Behavior::NonFinite);
        let resolver = SeriesResolver::new(primary.clone(), backup.clone());

        let result = resolver.resolve_series("AAPL", 30, Some(dec!(178.5))).await;

        assert_eq!(result.source, SeriesSource::Synthetic);
        assert_eq!(result.series.labels, vec!["1", "2", "3"]);
        assert_eq!(result.series.prices, vec![dec!(178.5); 3]);
        assert_eq!(primary.calls(), 1);
        assert_eq!(backup.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_synthetic_defaults_to_zero() {
        let primary = MockProvider::new("CANDLES", Behavior::NoData);
        let backup = MockProvider::new("CSV", Behavior::NoData);
        let resolver = SeriesResolver::new(primary.clone(), backup.clone());

        let result = resolver.resolve_series("AAPL", 30, None).await;
        assert_eq!(result.series.prices, vec![Decimal::ZERO; 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_symbol_is_synthetic_without_network() {
        let primary = MockProvider::new("CANDLES", Behavior::Bars(3));
        let backup = MockProvider::new("CSV", Behavior::Bars(3));
        let resolver = SeriesResolver::new(primary.clone(), backup.clone());

        let result = resolver.resolve_series(" ", 30, Some(dec!(1))).await;
        assert_eq!(result.source, SeriesSource::Synthetic);
        assert_eq!(primary.calls() + backup.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_days_requests_one() {
        let primary = MockProvider::new("CANDLES", Behavior::Bars(30));
        let backup = MockProvider::new("CSV", Behavior::NoData);
        let resolver = SeriesResolver::new(primary.clone(), backup.clone());

        let result = resolver.resolve_series("AAPL", 0, None).await;
        assert_eq!(result.series.len(), 1);
    }
}
