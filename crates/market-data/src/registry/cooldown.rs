//! Per-source cooldown after rate limiting.
//!
//! When an upstream signals rate limiting, the resolver records a deadline for
//! that source and skips it until the deadline passes. Expiry is implicit: a
//! deadline in the past is simply ignored, there is no timer and no reset on
//! the hot path.
//!
//! State is in-memory and resets on application restart.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use log::{debug, warn};
use tokio::time::Instant;

use crate::models::ProviderId;

/// Per-source cooldown deadlines.
///
/// Thread-safe; the lock is never held across an `.await`.
#[derive(Default)]
pub struct CooldownTracker {
    deadlines: Mutex<HashMap<String, Instant>>,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the deadlines mutex, recovering from poison if necessary.
    ///
    /// The worst case after a poisoned lock is a slightly wrong deadline,
    /// which is better than panicking inside a request.
    fn lock_deadlines(&self) -> MutexGuard<'_, HashMap<String, Instant>> {
        self.deadlines.lock().unwrap_or_else(|poisoned| {
            warn!("Cooldown mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// True while `now < blocked_until` for the source.
    pub fn is_blocked(&self, source: &ProviderId) -> bool {
        self.remaining(source).is_some()
    }

    /// Time left on the source's cooldown, `None` when it is not blocked.
    pub fn remaining(&self, source: &ProviderId) -> Option<Duration> {
        let deadlines = self.lock_deadlines();
        let blocked_until = deadlines.get(source.as_ref())?;
        let now = Instant::now();
        (now < *blocked_until).then(|| *blocked_until - now)
    }

    /// Skip the source for `duration` from now.
    ///
    /// A later call overwrites the deadline.
    pub fn block(&self, source: &ProviderId, duration: Duration) {
        let blocked_until = Instant::now() + duration;
        self.lock_deadlines().insert(source.to_string(), blocked_until);
        debug!("Cooldown: '{}' blocked for {:?}", source, duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    #[tokio::test(start_paused = true)]
    async fn test_unknown_source_is_not_blocked() {
        let cooldowns = CooldownTracker::new();
        let source: ProviderId = Cow::Borrowed("FINNHUB");

        assert!(!cooldowns.is_blocked(&source));
        assert_eq!(cooldowns.remaining(&source), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_block_expires_implicitly() {
        let cooldowns = CooldownTracker::new();
        let source: ProviderId = Cow::Borrowed("FINNHUB");

        cooldowns.block(&source, Duration::from_secs(60));
        assert!(cooldowns.is_blocked(&source));
        assert_eq!(cooldowns.remaining(&source), Some(Duration::from_secs(60)));

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(cooldowns.is_blocked(&source));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(!cooldowns.is_blocked(&source));
    }

    #[tokio::test(start_paused = true)]
    async fn test_block_overwrites_deadline() {
        let cooldowns = CooldownTracker::new();
        let source: ProviderId = Cow::Borrowed("FINNHUB");

        cooldowns.block(&source, Duration::from_secs(300));
        cooldowns.block(&source, Duration::from_secs(10));
        assert_eq!(cooldowns.remaining(&source), Some(Duration::from_secs(10)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_source_isolation() {
        let cooldowns = CooldownTracker::new();
        let quotes: ProviderId = Cow::Borrowed("FINNHUB");
        let candles: ProviderId = Cow::Borrowed("FINNHUB_CANDLES");

        cooldowns.block(&candles, Duration::from_secs(300));
        assert!(cooldowns.is_blocked(&candles));
        assert!(!cooldowns.is_blocked(&quotes));
    }
}
