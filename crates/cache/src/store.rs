use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use lru::LruCache;

use crate::config::CacheConfig;
use crate::stats::CacheStats;

struct Entry<V> {
    value: V,
    #[allow(dead_code)]
    created_at: Instant,
    expires_at: Option<Instant>,
}

impl<V> Entry<V> {
    fn new(value: V, ttl: Option<Duration>) -> Self {
        let now = Instant::now();
        Self {
            value,
            created_at: now,
            expires_at: ttl.map(|ttl| now + ttl),
        }
    }

    fn expired(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(deadline) if now > deadline)
    }
}

/// Thread-safe LRU cache with per-entry TTLs.
///
/// All methods take `&self`; an internal mutex serializes access so the cache
/// can be shared across enrichment workers behind an `Arc` without external
/// locking. Values are cloned out on read, so `V` should be cheap to clone
/// (or wrapped in an `Arc` by the caller).
pub struct TtlCache<K: Hash + Eq, V> {
    entries: Mutex<LruCache<K, Entry<V>>>,
    default_ttl: Option<Duration>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    expirations: AtomicU64,
}

impl<K, V> TtlCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Build a cache from `config`. A zero `max_entries` is coerced to 1;
    /// call [`CacheConfig::validate`] first to reject it loudly instead.
    pub fn new(config: &CacheConfig) -> Self {
        let capacity =
            NonZeroUsize::new(config.max_entries.max(1)).expect("clamped capacity is non-zero");
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            default_ttl: config.default_ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            expirations: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<K, Entry<V>>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Look up `key`, repositioning it as most-recently-used on a hit.
    ///
    /// An expired entry behaves as a miss and is removed as a side effect.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        let mut entries = self.lock();

        let live = match entries.get(key) {
            Some(entry) if !entry.expired(now) => Some(entry.value.clone()),
            Some(_) => None,
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            }
        };

        match live {
            Some(value) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(value)
            }
            None => {
                entries.pop(key);
                self.expirations.fetch_add(1, Ordering::Relaxed);
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Insert with the configured default TTL.
    pub fn insert(&self, key: K, value: V) {
        self.insert_with_ttl(key, value, self.default_ttl);
    }

    /// Insert with an explicit TTL (`None` = no expiry). The key becomes
    /// most-recently-used; the least-recently-used entry is evicted if the
    /// cache grew past its capacity.
    pub fn insert_with_ttl(&self, key: K, value: V, ttl: Option<Duration>) {
        let probe = key.clone();
        let mut entries = self.lock();
        if let Some((displaced, _)) = entries.push(key, Entry::new(value, ttl)) {
            // `push` returns either the replaced value for the same key or
            // the evicted LRU pair; only the latter counts as an eviction.
            if displaced != probe {
                self.evictions.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Whether a live entry exists for `key`, without touching recency.
    /// Expired entries are removed, as with [`get`](Self::get).
    pub fn contains(&self, key: &K) -> bool {
        let now = Instant::now();
        let mut entries = self.lock();
        let expired = match entries.peek(key) {
            Some(entry) => entry.expired(now),
            None => return false,
        };
        if expired {
            entries.pop(key);
            self.expirations.fetch_add(1, Ordering::Relaxed);
            return false;
        }
        true
    }

    /// Remove `key`; returns whether an entry was present.
    pub fn remove(&self, key: &K) -> bool {
        self.lock().pop(key).is_some()
    }

    /// Drop every entry. Counters are preserved.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Remove every expired entry and return how many were swept.
    pub fn cleanup(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.lock();
        let stale: Vec<K> = entries
            .iter()
            .filter(|(_, entry)| entry.expired(now))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &stale {
            entries.pop(key);
        }
        self.expirations
            .fetch_add(stale.len() as u64, Ordering::Relaxed);
        stale.len()
    }

    /// Number of stored entries, expired ones included until they are swept
    /// or lazily removed by a read.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the hit/miss/eviction/expiration counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
        }
    }
}
