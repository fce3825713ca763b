//! Process-wide resolver state.
//!
//! This module holds the mutable state the resolvers share across requests:
//! - Last-known-good quotes per symbol
//! - Cooldown deadlines per upstream source

mod cooldown;
mod quote_cache;

pub use cooldown::CooldownTracker;
pub use quote_cache::{CacheEntry, QuoteCache};
