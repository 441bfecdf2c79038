//! Per-identity request throttling over an injected counter store.
//!
//! The counter store only needs eventual consistency; a lost increment under
//! concurrent requests widens the limit by one, which is acceptable here.
//! Entries expire when their window elapses.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Key/value counter storage with per-entry expiry. Swap point for a
/// distributed cache in production.
pub trait CounterStore: Send + Sync {
    /// Current value, if present and unexpired.
    fn get(&self, key: &str) -> Option<u64>;

    /// Set a value with a time-to-live.
    fn set(&self, key: &str, value: u64, ttl: Duration);

    /// Remaining time-to-live, if the key is present and unexpired.
    fn ttl(&self, key: &str) -> Option<Duration>;

    /// Drop a key.
    fn expire(&self, key: &str);
}

/// In-memory [`CounterStore`] backed by a `DashMap`. Expired entries are
/// dropped lazily on access.
#[derive(Default)]
pub struct InMemoryCounterStore {
    entries: DashMap<String, (u64, Instant)>,
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CounterStore for InMemoryCounterStore {
    fn get(&self, key: &str) -> Option<u64> {
        let expired = match self.entries.get(key) {
            Some(entry) => {
                let (value, deadline) = *entry;
                if Instant::now() < deadline {
                    return Some(value);
                }
                true
            }
            None => false,
        };
        if expired {
            self.entries.remove(key);
        }
        None
    }

    fn set(&self, key: &str, value: u64, ttl: Duration) {
        self.entries
            .insert(key.to_string(), (value, Instant::now() + ttl));
    }

    fn ttl(&self, key: &str) -> Option<Duration> {
        self.entries
            .get(key)
            .and_then(|entry| entry.1.checked_duration_since(Instant::now()))
    }

    fn expire(&self, key: &str) {
        self.entries.remove(key);
    }
}

/// Sliding time-window limiter: at most `limit` requests per identity per
/// window. The window starts at the identity's first request and resets once
/// it elapses.
pub struct RateLimiter {
    store: Arc<dyn CounterStore>,
    limit: u64,
    window: Duration,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn CounterStore>, limit: u64, window: Duration) -> Self {
        Self {
            store,
            limit,
            window,
        }
    }

    /// Record a request for `identity`. `Err` carries the retry-after hint.
    pub fn check(&self, identity: &str) -> Result<(), Duration> {
        match (self.store.get(identity), self.store.ttl(identity)) {
            (Some(count), Some(remaining)) if count >= self.limit => {
                tracing::warn!(
                    identity = identity,
                    count = count,
                    limit = self.limit,
                    "request throttled"
                );
                Err(remaining)
            }
            (Some(count), Some(remaining)) => {
                // Keep the original window deadline while counting up.
                self.store.set(identity, count + 1, remaining);
                Ok(())
            }
            _ => {
                self.store.set(identity, 1, self.window);
                Ok(())
            }
        }
    }
}
