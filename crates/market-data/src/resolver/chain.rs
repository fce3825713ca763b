//! Ordered source attempts with per-source timeout and cooldown.
//!
//! Both resolvers walk a fixed list of [`SourceSlot`]s. Each step goes through
//! [`FallbackChain::attempt`], which turns the provider's `Result` into an
//! [`Attempt`] the resolver can branch on. Nothing here retries: a failed
//! attempt is reported and the resolver moves to the next slot.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, info};

use crate::errors::{FailureClass, MarketDataError};
use crate::models::ProviderId;
use crate::registry::CooldownTracker;

/// When a slot is put on cooldown and for how long.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CooldownPolicy {
    pub duration: Duration,
    /// Treat HTTP 403 like a 429.
    pub on_forbidden: bool,
}

impl CooldownPolicy {
    pub fn on_rate_limit(duration: Duration) -> Self {
        Self {
            duration,
            on_forbidden: false,
        }
    }

    fn arms_on(&self, class: FailureClass) -> bool {
        match class {
            FailureClass::RateLimited => true,
            FailureClass::Forbidden => self.on_forbidden,
            FailureClass::Transient => false,
        }
    }
}

/// One position in a fallback chain.
#[derive(Clone, Debug)]
pub struct SourceSlot {
    /// Cooldown key, normally the provider id.
    pub id: ProviderId,
    /// Bound on a single request to this source.
    pub timeout: Duration,
    /// `None` for sources that are never skipped.
    pub cooldown: Option<CooldownPolicy>,
}

impl SourceSlot {
    pub fn new(id: impl Into<ProviderId>, timeout: Duration) -> Self {
        Self {
            id: id.into(),
            timeout,
            cooldown: None,
        }
    }

    pub fn with_cooldown(mut self, policy: CooldownPolicy) -> Self {
        self.cooldown = Some(policy);
        self
    }
}

/// Outcome of one attempt against one slot.
#[derive(Debug, PartialEq)]
pub enum Attempt<T> {
    /// The source answered with something the caller accepts.
    Usable(T),
    /// The source signalled rate limiting and its cooldown is now armed.
    RateLimited,
    /// Timeout, error, or an answer the caller rejected.
    Failed,
    /// The source is cooling down and was not contacted.
    Skipped,
}

/// Runs attempts and owns the cooldown deadlines of its slots.
#[derive(Default)]
pub struct FallbackChain {
    cooldowns: CooldownTracker,
}

impl FallbackChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_cooldown(&self, slot: &SourceSlot) -> bool {
        slot.cooldown.is_some() && self.cooldowns.is_blocked(&slot.id)
    }

    pub fn cooldown_remaining(&self, slot: &SourceSlot) -> Option<Duration> {
        slot.cooldown?;
        self.cooldowns.remaining(&slot.id)
    }

    /// Try one source.
    ///
    /// `fetch` is only polled when the slot is not cooling down, and is
    /// abandoned after `slot.timeout`. `is_usable` decides whether a
    /// successful answer counts; rejected answers are reported as
    /// [`Attempt::Failed`].
    pub async fn attempt<T, Fut>(
        &self,
        slot: &SourceSlot,
        fetch: Fut,
        is_usable: impl FnOnce(&T) -> bool,
    ) -> Attempt<T>
    where
        Fut: Future<Output = Result<T, MarketDataError>>,
    {
        if self.in_cooldown(slot) {
            debug!("{}: skipped, cooling down", slot.id);
            return Attempt::Skipped;
        }

        let error = match tokio::time::timeout(slot.timeout, fetch).await {
            Ok(Ok(value)) if is_usable(&value) => return Attempt::Usable(value),
            Ok(Ok(_)) => {
                debug!("{}: answer rejected as unusable", slot.id);
                return Attempt::Failed;
            }
            Ok(Err(error)) => error,
            Err(_) => {
                debug!("{}: timed out after {:?}", slot.id, slot.timeout);
                return Attempt::Failed;
            }
        };

        debug!("{}: {}", slot.id, error);

        match slot.cooldown {
            Some(policy) if policy.arms_on(error.failure_class()) => {
                info!(
                    "{}: rate limited, cooling down for {:?}",
                    slot.id, policy.duration
                );
                self.cooldowns.block(&slot.id, policy.duration);
                Attempt::RateLimited
            }
            _ => Attempt::Failed,
        }
    }
}
