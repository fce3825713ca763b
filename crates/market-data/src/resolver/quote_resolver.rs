//! Best-effort current quote per symbol.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, warn};

use super::chain::{Attempt, CooldownPolicy, FallbackChain, SourceSlot};
use super::config::QuoteResolverConfig;
use crate::models::{normalize_symbol, ProviderQuote, QuoteRecord, QuoteResult, QuoteSource};
use crate::provider::MarketDataProvider;
use crate::registry::QuoteCache;

/// Resolves quotes through fresh cache, primary, backup, stale cache and
/// finally an empty placeholder.
///
/// Never fails: every upstream problem degrades to an older or emptier
/// answer, reported through `stale` and `source` on the result.
///
/// # Example
///
/// ```ignore
/// let resolver = QuoteResolver::new(
///     Arc::new(FinnhubProvider::new(api_key)),
///     Arc::new(YahooProvider::new()),
/// );
///
/// let result = resolver.resolve_quote("aapl").await;
/// // result.source == QuoteSource::Primary, result.stale == false
/// ```
pub struct QuoteResolver {
    primary: Arc<dyn MarketDataProvider>,
    backup: Arc<dyn MarketDataProvider>,
    primary_slot: SourceSlot,
    backup_slot: SourceSlot,
    chain: FallbackChain,
    cache: QuoteCache,
    ttl: Duration,
}

impl QuoteResolver {
    pub fn new(primary: Arc<dyn MarketDataProvider>, backup: Arc<dyn MarketDataProvider>) -> Self {
        Self::with_config(primary, backup, QuoteResolverConfig::default())
    }

    pub fn with_config(
        primary: Arc<dyn MarketDataProvider>,
        backup: Arc<dyn MarketDataProvider>,
        config: QuoteResolverConfig,
    ) -> Self {
        let primary_slot = SourceSlot::new(primary.id(), config.primary_timeout)
            .with_cooldown(CooldownPolicy::on_rate_limit(config.primary_cooldown));
        // The backup has no cooldown of its own
        let backup_slot = SourceSlot::new(backup.id(), config.backup_timeout);

        Self {
            primary,
            backup,
            primary_slot,
            backup_slot,
            chain: FallbackChain::new(),
            cache: QuoteCache::new(),
            ttl: config.ttl,
        }
    }

    /// Resolve the current quote for `symbol`.
    ///
    /// The symbol is trimmed and upper-cased first. Blank symbols resolve to
    /// the empty placeholder without touching any source.
    pub async fn resolve_quote(&self, symbol: &str) -> QuoteResult {
        let symbol = normalize_symbol(symbol);
        if symbol.is_empty() {
            return QuoteRecord::placeholder(&symbol).into();
        }

        let cached = self.cache.get(&symbol);
        if let Some(entry) = &cached {
            if entry.is_fresh(self.ttl) {
                debug!("{}: fresh cache hit ({:?} old)", symbol, entry.age());
                return entry.record.clone().into();
            }
        }

        let live = [
            (&self.primary, &self.primary_slot, QuoteSource::Primary),
            (&self.backup, &self.backup_slot, QuoteSource::Backup),
        ];
        for (provider, slot, source) in live {
            let attempt = self
                .chain
                .attempt(
                    slot,
                    provider.get_latest_quote(&symbol),
                    ProviderQuote::has_finite_price,
                )
                .await;

            if let Attempt::Usable(raw) = attempt {
                let record = QuoteRecord::from_provider(&symbol, &raw, source);
                self.cache.store(record.clone());
                return record.into();
            }
        }

        match cached {
            Some(entry) => {
                warn!(
                    "{}: live sources unavailable, serving cache ({:?} old)",
                    symbol,
                    entry.age()
                );
                entry.record.into_stale().into()
            }
            None => {
                warn!("{}: live sources unavailable and nothing cached", symbol);
                QuoteRecord::placeholder(&symbol).into()
            }
        }
    }

    /// Resolve several symbols concurrently. Results keep the input order.
    pub async fn resolve_many(&self, symbols: &[String]) -> Vec<QuoteResult> {
        join_all(symbols.iter().map(|symbol| self.resolve_quote(symbol))).await
    }

    pub fn primary_in_cooldown(&self) -> bool {
        self.chain.in_cooldown(&self.primary_slot)
    }

    pub fn primary_cooldown_remaining(&self) -> Option<Duration> {
        self.chain.cooldown_remaining(&self.primary_slot)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of symbols with a last-known-good quote.
    pub fn cached_symbols(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::MarketDataError;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Clone, Copy)]
    enum Behavior {
        Price(f64),
        RateLimited,
        Fail,
        Hang,
    }

    struct MockProvider {
        id: &'static str,
        behavior: Mutex<Behavior>,
        call_count: AtomicUsize,
    }

    impl MockProvider {
        fn new(id: &'static str, behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                id,
                behavior: Mutex::new(behavior),
                call_count: AtomicUsize::new(0),
            })
        }

        fn set(&self, behavior: Behavior) {
            *self.behavior.lock().unwrap() = behavior;
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

        async fn get_latest_quote(&self, _symbol: &str) -> Result<ProviderQuote, MarketDataError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            let behavior = *self.behavior.lock().unwrap();
            match behavior {
                Behavior::Price(price) => Ok(ProviderQuote {
                    price: Some(price),
                    change: Some(2.5),
                    change_percent: Some(1.42),
                }),
                Behavior::RateLimited => Err(MarketDataError::RateLimited {
                    provider: self.id.to_string(),
                }),
                Behavior::Fail => Err(MarketDataError::ProviderError {
                    provider: self.id.to_string(),
                    message: "HTTP 500".to_string(),
                }),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Err(MarketDataError::NoDataForRange)
                }
            }
        }
    }

    fn resolver(primary: &Arc<MockProvider>, backup: &Arc<MockProvider>) -> QuoteResolver {
        QuoteResolver::new(primary.clone(), backup.clone())
    }

    #[tokio::test(start_paused = true)]
    async fn test_primary_success_updates_cache_and_skips_backup() {
        let primary = MockProvider::new("PRIMARY", Behavior::Price(178.5));
        let backup = MockProvider::new("BACKUP", Behavior::Price(1.0));
        let resolver = resolver(&primary, &backup);

        let result = resolver.resolve_quote("AAPL").await;

        assert_eq!(result.source, QuoteSource::Primary);
        assert!(!result.stale);
        assert_eq!(result.quote.price, Some(dec!(178.5)));
        assert_eq!(result.quote.change, Some(dec!(2.5)));
        assert_eq!(resolver.cached_symbols(), 1);
        assert_eq!(primary.calls(), 1);
        assert_eq!(backup.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_cache_makes_no_network_call() {
        let primary = MockProvider::new("PRIMARY", Behavior::Price(178.5));
        let backup = MockProvider::new("BACKUP", Behavior::Fail);
        let resolver = resolver(&primary, &backup);

        let first = resolver.resolve_quote("AAPL").await;
        tokio::time::advance(Duration::from_secs(5)).await;
        let second = resolver.resolve_quote("AAPL").await;

        assert_eq!(first, second);
        assert!(!second.stale);
        assert_eq!(primary.calls(), 1);
        assert_eq!(backup.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_aapl_timeline() {
        let primary = MockProvider::new("PRIMARY", Behavior::Price(178.5));
        let backup = MockProvider::new("BACKUP", Behavior::Fail);
        let resolver = resolver(&primary, &backup);

        let at_zero = resolver.resolve_quote("AAPL").await;
        assert_eq!(at_zero.source, QuoteSource::Primary);

        tokio::time::advance(Duration::from_secs(5)).await;
        let at_five = resolver.resolve_quote("AAPL").await;
        assert_eq!(at_five, at_zero);
        assert_eq!(primary.calls(), 1);

        tokio::time::advance(Duration::from_secs(15)).await;
        let at_twenty = resolver.resolve_quote("AAPL").await;
        assert_eq!(at_twenty.source, QuoteSource::Primary);
        assert_eq!(primary.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_symbol_is_normalized() {
        let primary = MockProvider::new("PRIMARY", Behavior::Price(10.0));
        let backup = MockProvider::new("BACKUP", Behavior::Fail);
        let resolver = resolver(&primary, &backup);

        let result = resolver.resolve_quote("  aapl ").await;
        assert_eq!(result.quote.symbol, "AAPL");

        resolver.resolve_quote("AAPL").await;
        assert_eq!(primary.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_symbol_is_placeholder_without_network() {
        let primary = MockProvider::new("PRIMARY", Behavior::Price(10.0));
        let backup = MockProvider::new("BACKUP", Behavior::Price(10.0));
        let resolver = resolver(&primary, &backup);

        let result = resolver.resolve_quote("   ").await;
        assert!(result.stale);
        assert_eq!(result.source, QuoteSource::Cache);
        assert!(result.quote.price.is_none());
        assert_eq!(primary.calls() + backup.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_skips_primary_during_cooldown() {
        let primary = MockProvider::new("PRIMARY", Behavior::RateLimited);
        let backup = MockProvider::new("BACKUP", Behavior::Price(99.0));
        let resolver = resolver(&primary, &backup);

        let first = resolver.resolve_quote("AAPL").await;
        assert_eq!(first.source, QuoteSource::Backup);
        assert!(resolver.primary_in_cooldown());
        assert_eq!(
            resolver.primary_cooldown_remaining(),
            Some(Duration::from_secs(60))
        );

        // Different symbol so the cache does not answer
        primary.set(Behavior::Price(1.0));
        let second = resolver.resolve_quote("MSFT").await;
        assert_eq!(second.source, QuoteSource::Backup);
        assert_eq!(primary.calls(), 1);
        assert_eq!(backup.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cooldown_expires_implicitly() {
        let primary = MockProvider::new("PRIMARY", Behavior::RateLimited);
        let backup = MockProvider::new("BACKUP", Behavior::Price(99.0));
        let resolver = resolver(&primary, &backup);

        resolver.resolve_quote("AAPL").await;
        primary.set(Behavior::Price(178.5));

        tokio::time::advance(Duration::from_secs(60)).await;
        assert!(!resolver.primary_in_cooldown());

        let result = resolver.resolve_quote("AAPL").await;
        assert_eq!(result.source, QuoteSource::Primary);
        assert_eq!(primary.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backup_failures_never_arm_cooldown() {
        let primary = MockProvider::new("PRIMARY", Behavior::Fail);
        let backup = MockProvider::new("BACKUP", Behavior::RateLimited);
        let resolver = resolver(&primary, &backup);

        resolver.resolve_quote("AAPL").await;
        resolver.resolve_quote("AAPL").await;

        assert!(!resolver.primary_in_cooldown());
        assert_eq!(primary.calls(), 2);
        assert_eq!(backup.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_primary_timeout_falls_through_to_backup() {
        let primary = MockProvider::new("PRIMARY", Behavior::Hang);
        let backup = MockProvider::new("BACKUP", Behavior::Price(50.0));
        let resolver = resolver(&primary, &backup);

        let started = tokio::time::Instant::now();
        let result = resolver.resolve_quote("AAPL").await;

        assert_eq!(result.source, QuoteSource::Backup);
        assert_eq!(started.elapsed(), Duration::from_secs(8));
        assert!(!resolver.primary_in_cooldown());
    }

    #[tokio::test(start_paused = true)]
    async fn test_worst_case_latency_is_sum_of_timeouts() {
        let primary = MockProvider::new("PRIMARY", Behavior::Hang);
        let backup = MockProvider::new("BACKUP", Behavior::Hang);
        let resolver = resolver(&primary, &backup);

        let started = tokio::time::Instant::now();
        let result = resolver.resolve_quote("AAPL").await;

        assert!(result.quote.price.is_none());
        assert_eq!(started.elapsed(), Duration::from_secs(13));
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_finite_primary_price_falls_through() {
        let primary = MockProvider::new("PRIMARY", Behavior::Price(f64::NAN));
        let backup = MockProvider::new("BACKUP", Behavior::Price(12.0));
        let resolver = resolver(&primary, &backup);

        let result = resolver.resolve_quote("AAPL").await;
        assert_eq!(result.source, QuoteSource::Backup);
        assert_eq!(result.quote.price, Some(dec!(12)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_both_fail_serves_old_cache_as_stale() {
        let primary = MockProvider::new("PRIMARY", Behavior::Price(178.5));
        let backup = MockProvider::new("BACKUP", Behavior::Fail);
        let resolver = resolver(&primary, &backup);

        let live = resolver.resolve_quote("AAPL").await;

        primary.set(Behavior::Fail);
        tokio::time::advance(Duration::from_secs(600)).await;
        let result = resolver.resolve_quote("AAPL").await;

        assert!(result.stale);
        assert_eq!(result.source, QuoteSource::Cache);
        assert_eq!(result.quote.price, live.quote.price);
        assert_eq!(result.quote.change, live.quote.change);
        assert_eq!(result.quote.fetched_at, live.quote.fetched_at);
    }

    #[tokio::test(start_paused = true)]
    async fn test_both_fail_without_cache_is_placeholder() {
        let primary = MockProvider::new("PRIMARY", Behavior::Fail);
        let backup = MockProvider::new("BACKUP", Behavior::Fail);
        let resolver = resolver(&primary, &backup);

        let result = resolver.resolve_quote("AAPL").await;

        assert!(result.stale);
        assert_eq!(result.source, QuoteSource::Cache);
        assert_eq!(result.quote.symbol, "AAPL");
        assert!(result.quote.price.is_none());
        assert!(result.quote.change.is_none());
        assert!(result.quote.change_percent.is_none());
        assert_eq!(resolver.cached_symbols(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolve_many_keeps_input_order() {
        let primary = MockProvider::new("PRIMARY", Behavior::Price(10.0));
        let backup = MockProvider::new("BACKUP", Behavior::Fail);
        let resolver = resolver(&primary, &backup);

        let symbols = vec!["NVDA".to_string(), "aapl".to_string(), "MSFT".to_string()];
        let results = resolver.resolve_many(&symbols).await;

        let order: Vec<&str> = results.iter().map(|r| r.quote.symbol.as_str()).collect();
        assert_eq!(order, vec!["NVDA", "AAPL", "MSFT"]);
        assert_eq!(resolver.cached_symbols(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_ttl() {
        let primary = MockProvider::new("PRIMARY", Behavior::Price(10.0));
        let backup = MockProvider::new("BACKUP", Behavior::Fail);
        let config = QuoteResolverConfig {
            ttl: Duration::from_secs(2),
            ..Default::default()
        };
        let resolver = QuoteResolver::with_config(primary.clone(), backup.clone(), config);

        resolver.resolve_quote("AAPL").await;
        tokio::time::advance(Duration::from_secs(2)).await;
        resolver.resolve_quote("AAPL").await;

        assert_eq!(resolver.ttl(), Duration::from_secs(2));
        assert_eq!(primary.calls(), 2);
    }
}
