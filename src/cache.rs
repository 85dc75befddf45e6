//! In-memory TTL cache for fetched payloads.
//!
//! Fetchers hold a shared reference to one of these and key entries by
//! source id + query parameters. Expiry is checked against a caller-supplied
//! [`Instant`] so tests can drive a fake clock; the convenience methods use
//! the real one. Concurrent refills after expiry are allowed to race — a few
//! redundant remote calls are acceptable, so there is no single-flight
//! coordination.

use std::time::{Duration, Instant};

use dashmap::DashMap;

#[derive(Debug)]
struct Entry<T> {
    value: T,
    expires_at: Instant,
}

/// Thread-safe key→value cache with time-to-live expiration.
///
/// Expired entries are lazily evicted on the next `get` for their key.
#[derive(Debug)]
pub struct TtlCache<T> {
    store: DashMap<String, Entry<T>>,
    ttl: Duration,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            store: DashMap::new(),
            ttl,
        }
    }

    /// Returns the cached value for `key`, or `None` if missing or expired
    /// as of `now`.
    pub fn get_at(&self, key: &str, now: Instant) -> Option<T> {
        let entry = self.store.get(key)?;
        if now > entry.expires_at {
            drop(entry);
            self.store.remove(key);
            return None;
        }
        Some(entry.value.clone())
    }

    /// Inserts or overwrites an entry expiring one TTL after `now`.
    pub fn insert_at(&self, key: String, value: T, now: Instant) {
        self.store.insert(
            key,
            Entry {
                value,
                expires_at: now + self.ttl,
            },
        );
    }

    pub fn get(&self, key: &str) -> Option<T> {
        self.get_at(key, Instant::now())
    }

    pub fn insert(&self, key: String, value: T) {
        self.insert_at(key, value, Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("fred:X:2018-01-01".to_string(), 1.0_f64);
        assert_eq!(cache.get("fred:X:2018-01-01"), Some(1.0));
    }

    #[test]
    fn miss() {
        let cache: TtlCache<f64> = TtlCache::new(Duration::from_secs(60));
        assert_eq!(cache.get("nope"), None);
    }

    #[test]
    fn expiration_with_fake_clock() {
        let cache = TtlCache::new(Duration::from_secs(3600));
        let t0 = Instant::now();
        cache.insert_at("k".to_string(), 7_i32, t0);

        assert_eq!(cache.get_at("k", t0 + Duration::from_secs(3599)), Some(7));
        assert_eq!(cache.get_at("k", t0 + Duration::from_secs(3601)), None);
        // Lazy eviction removed the entry for good.
        assert_eq!(cache.get_at("k", t0), None);
    }

    #[test]
    fn overwrite() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("k".to_string(), "old".to_string());
        cache.insert("k".to_string(), "new".to_string());
        assert_eq!(cache.get("k"), Some("new".to_string()));
    }
}
