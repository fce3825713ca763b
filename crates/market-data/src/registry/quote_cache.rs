//! Last-known-good quote per symbol.
//!
//! Uses `DashMap` so concurrent resolutions of different symbols do not
//! contend on one lock. Entries live for the process lifetime and are only
//! replaced by the next successful fetch.

use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

use crate::models::QuoteRecord;

/// A cached quote with the instant it was stored.
#[derive(Clone, Debug)]
pub struct CacheEntry {
    pub record: QuoteRecord,
    pub stored_at: Instant,
}

impl CacheEntry {
    pub fn age(&self) -> Duration {
        self.stored_at.elapsed()
    }

    /// Strictly younger than `ttl`.
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.age() < ttl
    }
}

/// Symbol-keyed quote cache.
#[derive(Default)]
pub struct QuoteCache {
    entries: DashMap<String, CacheEntry>,
}

impl QuoteCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, symbol: &str) -> Option<CacheEntry> {
        self.entries.get(symbol).map(|entry| entry.value().clone())
    }

    /// Store a record under its symbol.
    ///
    /// Records without a price are rejected so an all-null answer can never
    /// overwrite a good entry. Returns whether the record was stored.
    pub fn store(&self, record: QuoteRecord) -> bool {
        if !record.has_price() {
            return false;
        }

        self.entries.insert(
            record.symbol.clone(),
            CacheEntry {
                record,
                stored_at: Instant::now(),
            },
        );
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
