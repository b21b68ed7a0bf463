//! In-memory cache for query results.
//!
//! Identical queries within a short window are answered without refetching
//! the source page. Entries expire lazily on read; when the store grows past
//! its capacity the entry with the oldest write time is evicted (FIFO by
//! write, not LRU).

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::models::TripQuery;

/// Default TTL for cached results (5 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Default maximum number of cached queries.
pub const DEFAULT_CAPACITY: usize = 50;

/// Query signature: origin, destination, date and passenger count.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub origin: String,
    pub destination: String,
    pub date: String,
    pub passengers: u32,
}

impl CacheKey {
    pub fn new(origin: &str, destination: &str, date: &str, passengers: u32) -> Self {
        Self {
            origin: origin.to_string(),
            destination: destination.to_string(),
            date: date.to_string(),
            passengers,
        }
    }
}

impl From<&TripQuery> for CacheKey {
    fn from(query: &TripQuery) -> Self {
        Self::new(
            &query.origin,
            &query.destination,
            &query.date.format("%Y-%m-%d").to_string(),
            query.passengers,
        )
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}|{}|{}|{}",
            self.origin, self.destination, self.date, self.passengers
        )
    }
}

/// A cached value with its write time.
struct CacheEntry<T> {
    value: T,
    stored_at: Instant,
    /// Write order, breaks ties between identical instants.
    seq: u64,
}

struct Store<T> {
    entries: HashMap<CacheKey, CacheEntry<T>>,
    next_seq: u64,
}

/// Bounded, time-expiring cache keyed by query signature.
pub struct QueryCache<T> {
    store: Mutex<Store<T>>,
    ttl: Duration,
    capacity: usize,
}

impl<T: Clone> QueryCache<T> {
    /// Create a new cache with default TTL and capacity.
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_TTL, DEFAULT_CAPACITY)
    }

    /// Create a new cache with custom TTL and capacity.
    pub fn with_limits(ttl: Duration, capacity: usize) -> Self {
        Self {
            store: Mutex::new(Store {
                entries: HashMap::new(),
                next_seq: 0,
            }),
            ttl,
            capacity: capacity.max(1),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get a cached value, or None if missing or expired.
    pub fn get(&self, key: &CacheKey) -> Option<T> {
        self.get_at(key, Instant::now())
    }

    /// Store a value, evicting the oldest write if over capacity.
    pub fn set(&self, key: CacheKey, value: T) {
        self.set_at(key, value, Instant::now());
    }

    /// Lookup as of `now`. An expired entry is removed as a side effect.
    ///
    /// An entry whose age equals the TTL exactly is still returned.
    pub fn get_at(&self, key: &CacheKey, now: Instant) -> Option<T> {
        let mut guard = self.store.lock().ok()?;
        let expired = match guard.entries.get(key) {
            None => return None,
            Some(entry) => now.saturating_duration_since(entry.stored_at) > self.ttl,
        };
        if expired {
            guard.entries.remove(key);
            return None;
        }
        guard.entries.get(key).map(|e| e.value.clone())
    }

    /// Insert as of `now`.
    pub fn set_at(&self, key: CacheKey, value: T, now: Instant) {
        if let Ok(mut guard) = self.store.lock() {
            let seq = guard.next_seq;
            guard.next_seq += 1;
            guard.entries.insert(
                key,
                CacheEntry {
                    value,
                    stored_at: now,
                    seq,
                },
            );

            if guard.entries.len() > self.capacity {
                let oldest = guard
                    .entries
                    .iter()
                    .min_by_key(|(_, e)| (e.stored_at, e.seq))
                    .map(|(k, _)| k.clone());
                if let Some(oldest) = oldest {
                    guard.entries.remove(&oldest);
                }
            }
        }
    }

    /// Number of stored entries, expired ones included until read.
    pub fn len(&self) -> usize {
        self.store.lock().map(|g| g.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry.
    pub fn clear(&self) {
        if let Ok(mut guard) = self.store.lock() {
            guard.entries.clear();
        }
    }
}

impl<T: Clone> Default for QueryCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(n: usize) -> CacheKey {
        CacheKey::new("Buenos Aires", &format!("Dest {}", n), "2025-01-10", 1)
    }

    #[test]
    fn test_key_display() {
        let k = CacheKey::new("Retiro", "Bariloche", "2025-01-10", 2);
        assert_eq!(k.to_string(), "Retiro|Bariloche|2025-01-10|2");
    }

    #[test]
    fn test_missing_key() {
        let cache: QueryCache<u32> = QueryCache::new();
        assert_eq!(cache.get(&key(1)), None);
    }

    #[test]
    fn test_ttl_boundaries() {
        let cache = QueryCache::new();
        let t0 = Instant::now();
        cache.set_at(key(1), 7u32, t0);

        assert_eq!(cache.get_at(&key(1), t0 + Duration::from_secs(299)), Some(7));
        assert_eq!(cache.get_at(&key(1), t0 + Duration::from_secs(300)), Some(7));
        assert_eq!(cache.get_at(&key(1), t0 + Duration::from_secs(301)), None);
    }

    #[test]
    fn test_expired_entry_removed_on_read() {
        let cache = QueryCache::new();
        let t0 = Instant::now();
        cache.set_at(key(1), 1u32, t0);
        assert_eq!(cache.len(), 1);

        assert_eq!(cache.get_at(&key(1), t0 + Duration::from_secs(301)), None);
        assert_eq!(cache.len(), 0);
        // Reading earlier again does not resurrect it
        assert_eq!(cache.get_at(&key(1), t0), None);
    }

    #[test]
    fn test_capacity_evicts_oldest_write() {
        let cache = QueryCache::with_limits(DEFAULT_TTL, 50);
        let t0 = Instant::now();

        // Write key 0 last but with the oldest timestamp
        for n in 1..=49 {
            cache.set_at(key(n), n, t0 + Duration::from_secs(n as u64));
        }
        cache.set_at(key(0), 0, t0);
        assert_eq!(cache.len(), 50);

        let now = t0 + Duration::from_secs(60);
        cache.set_at(key(50), 50, now);

        assert_eq!(cache.len(), 50);
        assert_eq!(cache.get_at(&key(0), now), None);
        for n in 1..=50 {
            assert_eq!(cache.get_at(&key(n), now), Some(n), "key {} evicted", n);
        }
    }

    #[test]
    fn test_same_instant_ties_evict_first_write() {
        let cache = QueryCache::with_limits(DEFAULT_TTL, 2);
        let t0 = Instant::now();

        // Keys chosen so write order differs from any hash or key ordering
        cache.set_at(key(9), 9u32, t0);
        cache.set_at(key(1), 1u32, t0);
        cache.set_at(key(5), 5u32, t0);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get_at(&key(9), t0), None);
        assert_eq!(cache.get_at(&key(1), t0), Some(1));
        assert_eq!(cache.get_at(&key(5), t0), Some(5));

        cache.set_at(key(3), 3u32, t0);
        assert_eq!(cache.get_at(&key(1), t0), None);
        assert_eq!(cache.get_at(&key(5), t0), Some(5));
        assert_eq!(cache.get_at(&key(3), t0), Some(3));
    }

    #[test]
    fn test_reading_does_not_refresh_age() {
        let cache = QueryCache::with_limits(DEFAULT_TTL, 2);
        let t0 = Instant::now();
        cache.set_at(key(1), 1u32, t0);
        cache.set_at(key(2), 2u32, t0 + Duration::from_secs(1));

        // Access key 1; FIFO eviction still targets it
        assert_eq!(cache.get_at(&key(1), t0 + Duration::from_secs(2)), Some(1));
        cache.set_at(key(3), 3u32, t0 + Duration::from_secs(3));

        let now = t0 + Duration::from_secs(4);
        assert_eq!(cache.get_at(&key(1), now), None);
        assert_eq!(cache.get_at(&key(2), now), Some(2));
        assert_eq!(cache.get_at(&key(3), now), Some(3));
    }

    #[test]
    fn test_overwrite_same_key_keeps_size() {
        let cache = QueryCache::with_limits(DEFAULT_TTL, 2);
        cache.set(key(1), 1u32);
        cache.set(key(1), 2u32);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&key(1)), Some(2));
    }

    #[test]
    fn test_clear() {
        let cache = QueryCache::new();
        cache.set(key(1), 1u32);
        cache.set(key(2), 2u32);
        cache.clear();
        assert!(cache.is_empty());
    }
}
